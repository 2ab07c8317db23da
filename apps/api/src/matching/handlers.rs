//! Axum route handlers for screening, simulated interviews and evaluation.
//!
//! The interview is stateless on the server: every next-question request
//! carries the whole history, and the client decides when to stop.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::matching::models::{
    ApplicantRef, EvaluationResult, JobView, MatchResult, TriageSubject, TurnHistory,
};
use crate::matching::orchestrator::{
    load_interview_views, next_question, record_evaluation, screen_pair, triage, TRIAGE_CALL,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub job_id: String,
    pub applicant_id: String,
}

#[derive(Debug, Serialize)]
pub struct StartInterviewResponse {
    pub job_id: String,
    pub applicant_id: String,
    pub score: Option<f64>,
    pub keywords: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NextQuestionRequest {
    pub job_id: String,
    pub applicant_id: String,
    #[serde(default)]
    pub history: TurnHistory,
}

#[derive(Debug, Serialize)]
pub struct NextQuestionResponse {
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub job_id: String,
    pub applicant_id: String,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default, alias = "responses")]
    pub answers: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TriageRequest {
    pub job_id: String,
    pub cv_text: String,
}

#[derive(Debug, Serialize)]
pub struct TriageResponse {
    pub name: Option<String>,
    pub score: f64,
    pub keywords: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews/start
///
/// Screens the pair before the interview opens. Registered applicants are
/// triaged once and the stored result is reused afterwards; trial users were
/// already triaged on upload.
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Json(req): Json<StartInterviewRequest>,
) -> Result<Json<StartInterviewResponse>, AppError> {
    let applicant = parse_pair(&req.job_id, &req.applicant_id)?;

    let (score, keywords) = match &applicant {
        ApplicantRef::Registered(applicant_id) => {
            let result: MatchResult = screen_pair(
                state.store.as_ref(),
                state.llm.as_ref(),
                &req.job_id,
                applicant_id,
                TRIAGE_CALL,
            )
            .await?;
            (Some(result.score), Some(result.keywords))
        }
        ApplicantRef::TryIt(user_id) => {
            if state.store.job(&req.job_id).await?.is_none() {
                return Err(AppError::NotFound(format!("Job {} not found", req.job_id)));
            }
            let user = state
                .store
                .tryit_user(*user_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Trial user {user_id} not found")))?;
            (user.score, user.keywords)
        }
    };

    Ok(Json(StartInterviewResponse {
        job_id: req.job_id,
        applicant_id: req.applicant_id,
        score,
        keywords,
    }))
}

/// POST /api/v1/interviews/next-question
pub async fn handle_next_question(
    State(state): State<AppState>,
    Json(req): Json<NextQuestionRequest>,
) -> Result<Json<NextQuestionResponse>, AppError> {
    let applicant = parse_pair(&req.job_id, &req.applicant_id)?;

    let (job, applicant) =
        load_interview_views(state.store.as_ref(), &req.job_id, &applicant).await?;
    let question = next_question(state.llm.as_ref(), &job, &applicant, &req.history).await?;

    Ok(Json(NextQuestionResponse { question }))
}

/// POST /api/v1/interviews/evaluate
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<EvaluationResult>, AppError> {
    let applicant = parse_pair(&req.job_id, &req.applicant_id)?;

    let evaluation = record_evaluation(
        state.store.as_ref(),
        state.llm.as_ref(),
        &req.job_id,
        &applicant,
        &req.questions,
        &req.answers,
    )
    .await?;

    Ok(Json(evaluation))
}

/// POST /api/v1/triage
///
/// Triage of raw CV text against a stored job. Nothing is persisted.
pub async fn handle_triage(
    State(state): State<AppState>,
    Json(req): Json<TriageRequest>,
) -> Result<Json<TriageResponse>, AppError> {
    if req.cv_text.trim().is_empty() {
        return Err(AppError::Validation("cv_text must not be empty".to_string()));
    }

    let job = state
        .store
        .job(&req.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", req.job_id)))?;

    let outcome = triage(
        state.llm.as_ref(),
        &JobView::from(&job),
        TriageSubject::CvText(&req.cv_text),
        TRIAGE_CALL,
    )
    .await?;

    Ok(Json(TriageResponse {
        name: outcome.candidate_name,
        score: outcome.result.score,
        keywords: outcome.result.keywords,
    }))
}

fn parse_pair(job_id: &str, applicant_id: &str) -> Result<ApplicantRef, AppError> {
    if job_id.trim().is_empty() || applicant_id.trim().is_empty() {
        return Err(AppError::Validation(
            "job_id and applicant_id are required".to_string(),
        ));
    }
    ApplicantRef::parse(applicant_id)
        .ok_or_else(|| AppError::Validation(format!("Invalid applicant id: {applicant_id}")))
}
