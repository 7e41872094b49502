//! Session-scoped interview state and the in-memory store that owns it.
//!
//! Each session sits behind its own `Mutex`, held for the whole of a request, so
//! a session has a single thread of control. Only the total-interview counter is
//! shared across sessions. Sessions nobody touches for the idle TTL are
//! treated as abandoned and dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::intake::IntakeForm;
use crate::interview::models::{CandidateProfile, FeedbackEntry, Message};
use crate::interview::prompts::{welcome_back, WELCOME_MESSAGE};
use crate::interview::state_machine::InterviewState;
use crate::interview::transcript::Transcript;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Number of interviews started since the process came up.
#[derive(Debug, Default)]
pub struct InterviewCounter(AtomicU64);

impl InterviewCounter {
    pub fn increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct SessionState {
    id: Uuid,
    transcript: Transcript,
    phase: u32,
    profile: Option<CandidateProfile>,
    submitted: bool,
    feedback_submitted: bool,
    feedback: Vec<FeedbackEntry>,
    total_interviews: Arc<InterviewCounter>,
}

impl SessionState {
    pub fn new(id: Uuid, total_interviews: Arc<InterviewCounter>) -> Self {
        let mut transcript = Transcript::new();
        if let Ok(welcome) = Message::assistant(WELCOME_MESSAGE) {
            transcript.append(welcome);
        }
        Self {
            id,
            transcript,
            phase: 0,
            profile: None,
            submitted: false,
            feedback_submitted: false,
            feedback: Vec::new(),
            total_interviews,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn phase(&self) -> u32 {
        self.phase
    }

    pub fn state(&self) -> InterviewState {
        InterviewState::from_phase(self.phase)
    }

    pub fn profile(&self) -> Option<&CandidateProfile> {
        self.profile.as_ref()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn is_feedback_submitted(&self) -> bool {
        self.feedback_submitted
    }

    pub fn feedback(&self) -> &[FeedbackEntry] {
        &self.feedback
    }

    pub fn total_interviews(&self) -> u64 {
        self.total_interviews.get()
    }

    /// Stores the candidate profile and greets the candidate by name.
    /// Nothing is mutated unless the form is valid.
    pub fn submit_profile(&mut self, form: IntakeForm, today: NaiveDate) -> Result<(), AppError> {
        if self.submitted {
            return Err(AppError::StateInvariant(
                "candidate details were already submitted for this session".to_string(),
            ));
        }

        let profile = form.into_profile(today)?;
        let greeting = Message::assistant(welcome_back(&profile.name, &profile.tech_stack))?;

        self.transcript.append(greeting);
        self.profile = Some(profile);
        self.submitted = true;
        let total = self.total_interviews.increment();
        info!(session_id = %self.id, total_interviews = total, "Candidate profile submitted");
        Ok(())
    }

    /// Records feedback once per concluded session.
    /// Returns `false` when feedback was already recorded.
    pub fn submit_feedback(
        &mut self,
        rating: u8,
        comment: String,
        submitted_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        if self.state() != InterviewState::Concluded {
            return Err(AppError::StateInvariant(
                "feedback is only accepted once the assessment has concluded".to_string(),
            ));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::Validation(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }
        if self.feedback_submitted {
            return Ok(false);
        }

        info!(session_id = %self.id, rating, "Feedback received");
        self.feedback.push(FeedbackEntry {
            rating,
            comment,
            submitted_at,
        });
        self.feedback_submitted = true;
        Ok(true)
    }

    /// Replaces the whole session with a fresh one. The session id and the
    /// shared interview counter carry over.
    pub fn reset(&mut self) {
        *self = SessionState::new(self.id, Arc::clone(&self.total_interviews));
    }

    /// Appends the messages of one transition and moves to `phase`.
    pub(in crate::interview) fn commit_turn(&mut self, messages: Vec<Message>, phase: u32) {
        for message in messages {
            self.transcript.append(message);
        }
        self.phase = phase;
    }
}

pub type SharedSession = Arc<Mutex<SessionState>>;

/// How often the background sweeper looks for idle sessions.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct StoredSession {
    session: SharedSession,
    last_active: Instant,
}

/// Process-wide registry of live sessions.
///
/// A session that sees no request for `idle_ttl` counts as abandoned and is
/// dropped, either by the sweeper, by the next `create`, or on lookup.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, StoredSession>>,
    idle_ttl: Duration,
    total_interviews: Arc<InterviewCounter>,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
            total_interviews: Arc::new(InterviewCounter::default()),
        }
    }

    pub async fn create(&self) -> SharedSession {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(SessionState::new(
            id,
            Arc::clone(&self.total_interviews),
        )));

        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        evict_expired(&mut sessions, now, self.idle_ttl);
        sessions.insert(
            id,
            StoredSession {
                session: Arc::clone(&session),
                last_active: now,
            },
        );
        info!(session_id = %id, live_sessions = sessions.len(), "Session created");
        session
    }

    /// Looks up a session and marks it as active.
    pub async fn get(&self, id: Uuid) -> Result<SharedSession, AppError> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let expired = match sessions.get_mut(&id) {
            Some(stored) if now.duration_since(stored.last_active) <= self.idle_ttl => {
                stored.last_active = now;
                return Ok(Arc::clone(&stored.session));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            sessions.remove(&id);
            info!(session_id = %id, "Idle session expired");
        }
        Err(AppError::NotFound(format!("Session {id} not found")))
    }

    /// Ends a session. Its state is dropped; the interview counter is kept.
    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                info!(session_id = %id, "Session ended");
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Session {id} not found"))),
        }
    }

    /// Drops every session idle for longer than the TTL. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        evict_expired(&mut sessions, Instant::now(), self.idle_ttl)
    }

    /// Runs `evict_idle` every `every` for as long as the store is alive.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let store = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(live) = store.upgrade() else { break };
                live.evict_idle().await;
            }
        })
    }

    pub async fn live_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub fn total_interviews(&self) -> u64 {
        self.total_interviews.get()
    }
}

fn evict_expired(
    sessions: &mut HashMap<Uuid, StoredSession>,
    now: Instant,
    idle_ttl: Duration,
) -> usize {
    let before = sessions.len();
    sessions.retain(|_, stored| now.duration_since(stored.last_active) <= idle_ttl);
    let evicted = before - sessions.len();
    if evicted > 0 {
        info!(evicted, live_sessions = sessions.len(), "Evicted idle sessions");
    }
    evicted
}
