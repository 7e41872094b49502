//! Axum route handlers for the Interview API.
//!
//! Each handler locks one session for the whole request and returns the
//! resulting `SessionView`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::interview::intake::IntakeForm;
use crate::interview::models::{CandidateProfile, Message};
use crate::interview::session::SessionState;
use crate::interview::state_machine::{self, progress_percent, Affordance, InterviewState};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub phase: u32,
    pub state: &'static str,
    pub submitted: bool,
    pub feedback_submitted: bool,
    pub profile: Option<CandidateProfile>,
    pub transcript: Vec<Message>,
    pub progress_percent: u8,
    pub completed: bool,
    pub affordances: Vec<Affordance>,
    pub total_interviews: u64,
}

impl From<&SessionState> for SessionView {
    fn from(session: &SessionState) -> Self {
        Self {
            session_id: session.id(),
            phase: session.phase(),
            state: session.state().label(),
            submitted: session.is_submitted(),
            feedback_submitted: session.is_feedback_submitted(),
            profile: session.profile().cloned(),
            transcript: session.transcript().render().to_vec(),
            progress_percent: progress_percent(session.phase()),
            completed: session.state() == InterviewState::Concluded,
            affordances: state_machine::affordances(session),
            total_interviews: session.total_interviews(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub accepted: bool,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_interviews: u64,
    pub live_sessions: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let session = state.sessions.create().await;
    let session = session.lock().await;
    Ok((StatusCode::CREATED, Json(SessionView::from(&*session))))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let session = session.lock().await;
    Ok(Json(SessionView::from(&*session)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/profile
pub async fn handle_submit_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(form): AppJson<IntakeForm>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    session.submit_profile(form, Utc::now().date_naive())?;
    Ok(Json(SessionView::from(&*session)))
}

/// POST /api/v1/sessions/:id/start
///
/// Generates the opening technical question.
pub async fn handle_start(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    state_machine::start(&mut session, state.llm.as_ref()).await?;
    Ok(Json(SessionView::from(&*session)))
}

/// POST /api/v1/sessions/:id/answers
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(request): AppJson<AnswerRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    state_machine::submit_answer(&mut session, &request.content, state.llm.as_ref()).await?;
    Ok(Json(SessionView::from(&*session)))
}

/// POST /api/v1/sessions/:id/feedback
pub async fn handle_submit_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(request): AppJson<FeedbackRequest>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    let accepted = session.submit_feedback(request.rating, request.comment, Utc::now())?;
    Ok(Json(FeedbackResponse {
        accepted,
        session: SessionView::from(&*session),
    }))
}

/// POST /api/v1/sessions/:id/restart
pub async fn handle_restart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    state_machine::restart(&mut session)?;
    Ok(Json(SessionView::from(&*session)))
}

/// GET /api/v1/stats
pub async fn handle_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        total_interviews: state.sessions.total_interviews(),
        live_sessions: state.sessions.live_sessions().await,
    })
}
