//! Interview state machine.
//!
//! ```text
//! NotStarted --start--> AwaitingAnswer(1) --answer--> AwaitingAnswer(2)
//!     --answer--> AwaitingAnswer(3) --answer--> Concluded --restart--> NotStarted
//! ```
//!
//! Questions 1 and 2 are followed by a generated reply. The third answer is
//! closed with `CONCLUDING_MESSAGE` and never reaches the completion service.
//! A failed completion call leaves the session exactly as it was.

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::models::Message;
use crate::interview::prompts::CONCLUDING_MESSAGE;
use crate::interview::session::SessionState;
use crate::llm_client::{CompletionClient, LlmError};

pub const QUESTION_COUNT: u32 = 3;
pub const CONCLUDED_PHASE: u32 = QUESTION_COUNT + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewState {
    NotStarted,
    AwaitingAnswer(u32),
    Concluded,
}

impl InterviewState {
    pub fn from_phase(phase: u32) -> Self {
        match phase {
            0 => InterviewState::NotStarted,
            n if n <= QUESTION_COUNT => InterviewState::AwaitingAnswer(n),
            _ => InterviewState::Concluded,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InterviewState::NotStarted => "not_started",
            InterviewState::AwaitingAnswer(_) => "awaiting_answer",
            InterviewState::Concluded => "concluded",
        }
    }
}

/// UI widgets the client should offer for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Affordance {
    IntakeForm,
    StartQuestions,
    AnswerInput,
    FeedbackForm,
    Restart,
}

pub fn affordances(session: &SessionState) -> Vec<Affordance> {
    if !session.is_submitted() {
        return vec![Affordance::IntakeForm];
    }
    match session.state() {
        InterviewState::NotStarted => vec![Affordance::StartQuestions],
        InterviewState::AwaitingAnswer(_) => vec![Affordance::AnswerInput],
        InterviewState::Concluded if session.is_feedback_submitted() => vec![Affordance::Restart],
        InterviewState::Concluded => vec![Affordance::FeedbackForm, Affordance::Restart],
    }
}

/// Share of the scripted questions answered so far, 0–100.
pub fn progress_percent(phase: u32) -> u8 {
    (phase.min(QUESTION_COUNT) * 100 / QUESTION_COUNT) as u8
}

/// NotStarted → AwaitingAnswer(1): asks the service for the opening question.
pub async fn start(
    session: &mut SessionState,
    client: &dyn CompletionClient,
) -> Result<(), AppError> {
    if session.state() != InterviewState::NotStarted {
        return Err(AppError::StateInvariant(
            "technical questions have already started".to_string(),
        ));
    }
    let tech_stack = match session.profile() {
        Some(profile) => profile.tech_stack.clone(),
        None => {
            return Err(AppError::StateInvariant(
                "candidate details must be submitted before the assessment starts".to_string(),
            ))
        }
    };

    let reply = client
        .complete("", session.transcript(), &tech_stack)
        .await
        .map_err(|e| {
            warn!(session_id = %session.id(), "Opening question failed: {e}");
            AppError::from(e)
        })?;
    let question = generated(reply)?;

    session.commit_turn(vec![question], 1);
    info!(session_id = %session.id(), phase = 1, "Assessment started");
    Ok(())
}

/// AwaitingAnswer(n) → AwaitingAnswer(n + 1), or Concluded after the last answer.
pub async fn submit_answer(
    session: &mut SessionState,
    answer: &str,
    client: &dyn CompletionClient,
) -> Result<(), AppError> {
    let question = match session.state() {
        InterviewState::AwaitingAnswer(n) => n,
        other => {
            return Err(AppError::StateInvariant(format!(
                "answers are not accepted in state {other:?}"
            )))
        }
    };
    let answer = Message::candidate(answer)?;

    if question == QUESTION_COUNT {
        let closing = Message::assistant(CONCLUDING_MESSAGE)?;
        session.commit_turn(vec![answer, closing], CONCLUDED_PHASE);
        info!(session_id = %session.id(), "Assessment concluded");
        return Ok(());
    }

    let tech_stack = session
        .profile()
        .map(|p| p.tech_stack.clone())
        .unwrap_or_default();

    // The service sees the answer as part of the history, but the session only
    // records it once the reply has arrived.
    let mut pending = session.transcript().clone();
    pending.append(answer.clone());

    let reply = client
        .complete(answer.content(), &pending, &tech_stack)
        .await
        .map_err(|e| {
            warn!(session_id = %session.id(), question, "Follow-up failed: {e}");
            AppError::from(e)
        })?;
    let reply = generated(reply)?;

    session.commit_turn(vec![answer, reply], question + 1);
    info!(session_id = %session.id(), phase = question + 1, "Answer recorded");
    Ok(())
}

fn generated(reply: String) -> Result<Message, AppError> {
    Message::assistant(reply).map_err(|_| AppError::Upstream(LlmError::EmptyContent))
}

/// Concluded → NotStarted with a brand-new session state.
pub fn restart(session: &mut SessionState) -> Result<(), AppError> {
    if session.state() != InterviewState::Concluded {
        return Err(AppError::StateInvariant(
            "an interview can only be restarted once it has concluded".to_string(),
        ));
    }
    session.reset();
    info!(session_id = %session.id(), "Interview restarted");
    Ok(())
}
