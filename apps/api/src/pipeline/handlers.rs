//! Axum route handlers for the recruiter dashboards.
//!
//! Listings query the pool directly; single-record lookups go through the
//! store so the 404 behaviour matches the interview endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::errors::AppError;
use crate::matching::models::MatchResult;
use crate::models::pipeline::{HrInterviewRow, InterviewRecordRow, CLOSING_SITUATIONS};
use crate::models::recruitment::{ApplicantRow, JobRow};
use crate::pipeline::screening::{plan_batches, screen_batches, ScreenRequest, ScreenSummary};
use crate::state::AppState;

const CLOSED_PLACEMENTS_LIMIT: i64 = 100;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScreenedQuery {
    pub recruiter: Option<String>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct ScreenedPair {
    pub job_id: String,
    pub applicant_id: String,
    pub title: Option<String>,
    pub name: Option<String>,
    pub score: f64,
    pub recruiter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OpenJob {
    pub id: String,
    pub title: String,
    pub client: String,
    pub contract_type: String,
    pub location: String,
}

#[derive(Debug, Serialize, FromRow)]
pub struct ClosedPlacement {
    pub job_id: String,
    pub applicant_id: String,
    pub title: Option<String>,
    pub name: Option<String>,
    pub recruiter: Option<String>,
    pub situation: Option<String>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct JobCandidate {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct PairDetails {
    pub job: JobRow,
    pub applicant: ApplicantRow,
    pub match_result: Option<MatchResult>,
    pub interview: Option<InterviewRecordRow>,
    pub hr_interview: Option<HrInterviewRow>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct ChatbotInterview {
    pub job_id: String,
    pub applicant_id: String,
    pub title: Option<String>,
    pub name: Option<String>,
    pub score: i32,
    pub summary: String,
}

#[derive(Debug, Serialize, FromRow)]
pub struct HrInterviewOverview {
    pub job_id: String,
    pub applicant_id: String,
    pub title: Option<String>,
    pub name: Option<String>,
    pub match_score: Option<f64>,
    pub chatbot_score: Option<i32>,
    pub status: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HrFeedbackRequest {
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub applicant_id: String,
    pub notes: Option<String>,
    pub status: Option<i32>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/pipeline/screened
///
/// Screened pairs on open jobs that have not been interviewed yet.
pub async fn handle_screened(
    State(state): State<AppState>,
    Query(params): Query<ScreenedQuery>,
) -> Result<Json<Vec<ScreenedPair>>, AppError> {
    let recruiter = params.recruiter.filter(|r| !r.is_empty());

    let rows = sqlx::query_as::<_, ScreenedPair>(
        r#"
        SELECT m.job_id, m.applicant_id, j.title, a.name, m.score, p.recruiter
        FROM match_results m
        JOIN jobs j ON j.id = m.job_id
        JOIN applicants a ON a.id = m.applicant_id
        JOIN prospects p ON p.job_id = m.job_id AND p.applicant_id = m.applicant_id
        WHERE m.job_id NOT IN (SELECT job_id FROM prospects WHERE situation = ANY($1))
          AND NOT EXISTS (
              SELECT 1 FROM interview_records i
              WHERE i.job_id = m.job_id AND i.applicant_id = m.applicant_id
          )
          AND ($2::TEXT IS NULL OR p.recruiter = $2)
        ORDER BY m.score DESC
        "#,
    )
    .bind(CLOSING_SITUATIONS.to_vec())
    .bind(recruiter)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}

/// GET /api/v1/pipeline/recruiters
pub async fn handle_recruiters(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    let recruiters: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT DISTINCT p.recruiter
        FROM prospects p
        JOIN match_results m ON m.job_id = p.job_id AND m.applicant_id = p.applicant_id
        WHERE COALESCE(p.situation, '') <> ALL($1)
          AND COALESCE(p.recruiter, '') <> ''
        ORDER BY p.recruiter
        "#,
    )
    .bind(CLOSING_SITUATIONS.to_vec())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(recruiters))
}

/// GET /api/v1/pipeline/jobs/open
pub async fn handle_open_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<OpenJob>>, AppError> {
    let jobs = sqlx::query_as::<_, JobRow>(
        r#"
        SELECT * FROM jobs
        WHERE id NOT IN (SELECT job_id FROM prospects WHERE situation = ANY($1))
        ORDER BY id
        "#,
    )
    .bind(CLOSING_SITUATIONS.to_vec())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(jobs.iter().map(OpenJob::from).collect()))
}

/// GET /api/v1/pipeline/jobs/closed
pub async fn handle_closed_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClosedPlacement>>, AppError> {
    let rows = sqlx::query_as::<_, ClosedPlacement>(
        r#"
        SELECT p.job_id, p.applicant_id, j.title, a.name, p.recruiter, p.situation
        FROM prospects p
        JOIN jobs j ON j.id = p.job_id
        JOIN applicants a ON a.id = p.applicant_id
        WHERE p.situation = ANY($1)
        ORDER BY p.id
        LIMIT $2
        "#,
    )
    .bind(CLOSING_SITUATIONS.to_vec())
    .bind(CLOSED_PLACEMENTS_LIMIT)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}

/// GET /api/v1/pipeline/jobs/:job_id
pub async fn handle_job_detail(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobRow>, AppError> {
    let job = state
        .store
        .job(&job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    Ok(Json(job))
}

/// GET /api/v1/pipeline/jobs/:job_id/candidates
///
/// Prospects still in play for the job; placed candidates are left out.
pub async fn handle_job_candidates(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<Vec<JobCandidate>>, AppError> {
    if state.store.job(&job_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Job {job_id} not found")));
    }

    let rows = sqlx::query_as::<_, JobCandidate>(
        r#"
        SELECT p.applicant_id AS id, a.name, a.email,
               COALESCE(a.professional_title, '') AS title
        FROM prospects p
        JOIN applicants a ON a.id = p.applicant_id
        WHERE p.job_id = $1
          AND COALESCE(p.situation, '') <> ALL($2)
        ORDER BY p.id
        "#,
    )
    .bind(&job_id)
    .bind(CLOSING_SITUATIONS.to_vec())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}

/// GET /api/v1/pipeline/details/:job_id/:applicant_id
pub async fn handle_pair_details(
    State(state): State<AppState>,
    Path((job_id, applicant_id)): Path<(String, String)>,
) -> Result<Json<PairDetails>, AppError> {
    let job = state.store.job(&job_id).await?;
    let applicant = state.store.applicant(&applicant_id).await?;
    let (Some(job), Some(applicant)) = (job, applicant) else {
        return Err(AppError::NotFound(format!(
            "No data for job {job_id} and applicant {applicant_id}"
        )));
    };

    let match_result = state.store.match_result(&job_id, &applicant_id).await?;

    let interview = sqlx::query_as::<_, InterviewRecordRow>(
        r#"
        SELECT * FROM interview_records
        WHERE job_id = $1 AND applicant_id = $2
        "#,
    )
    .bind(&job_id)
    .bind(&applicant_id)
    .fetch_optional(&state.db)
    .await?;

    let hr_interview = sqlx::query_as::<_, HrInterviewRow>(
        r#"
        SELECT * FROM hr_interviews
        WHERE job_id = $1 AND applicant_id = $2
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(&job_id)
    .bind(&applicant_id)
    .fetch_optional(&state.db)
    .await?;

    Ok(Json(PairDetails {
        job,
        applicant,
        match_result,
        interview,
        hr_interview,
    }))
}

/// GET /api/v1/pipeline/interviews/chatbot
///
/// Chatbot interviews still waiting for an HR follow-up.
pub async fn handle_chatbot_interviews(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChatbotInterview>>, AppError> {
    let rows = sqlx::query_as::<_, ChatbotInterview>(
        r#"
        SELECT i.job_id, i.applicant_id, j.title, a.name, i.score, i.summary
        FROM interview_records i
        JOIN jobs j ON j.id = i.job_id
        JOIN applicants a ON a.id = i.applicant_id
        WHERE NOT EXISTS (
            SELECT 1 FROM hr_interviews h
            WHERE h.job_id = i.job_id AND h.applicant_id = i.applicant_id
        )
        ORDER BY i.created_at DESC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}

/// GET /api/v1/pipeline/interviews/hr
pub async fn handle_hr_interviews(
    State(state): State<AppState>,
) -> Result<Json<Vec<HrInterviewOverview>>, AppError> {
    let rows = sqlx::query_as::<_, HrInterviewOverview>(
        r#"
        SELECT h.job_id, h.applicant_id, j.title, a.name,
               m.score AS match_score, i.score AS chatbot_score,
               h.status, h.notes
        FROM hr_interviews h
        JOIN jobs j ON j.id = h.job_id
        JOIN applicants a ON a.id = h.applicant_id
        LEFT JOIN match_results m ON m.job_id = h.job_id AND m.applicant_id = h.applicant_id
        LEFT JOIN interview_records i ON i.job_id = h.job_id AND i.applicant_id = h.applicant_id
        ORDER BY h.created_at DESC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}

/// POST /api/v1/pipeline/hr-feedback
pub async fn handle_hr_feedback(
    State(state): State<AppState>,
    Json(req): Json<HrFeedbackRequest>,
) -> Result<(StatusCode, Json<HrInterviewRow>), AppError> {
    let status = validate_feedback(&req)?;

    let row = sqlx::query_as::<_, HrInterviewRow>(
        r#"
        INSERT INTO hr_interviews (job_id, applicant_id, notes, status)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&req.job_id)
    .bind(&req.applicant_id)
    .bind(&req.notes)
    .bind(status)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(
        "Recorded HR feedback for job {}, applicant {}: status={status}",
        req.job_id,
        req.applicant_id
    );
    Ok((StatusCode::CREATED, Json(row)))
}

/// POST /api/v1/pipeline/screen
pub async fn handle_screen(
    State(state): State<AppState>,
    Json(req): Json<ScreenRequest>,
) -> Result<Json<ScreenSummary>, AppError> {
    let batches = plan_batches(&state.db, &req).await?;
    let summary = screen_batches(state.store.as_ref(), state.llm.as_ref(), &batches).await;
    Ok(Json(summary))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

impl From<&JobRow> for OpenJob {
    fn from(job: &JobRow) -> Self {
        Self {
            id: job.id.clone(),
            title: job.title.clone().unwrap_or_default(),
            client: job.client.clone().unwrap_or_default(),
            contract_type: job.contract_type.clone().unwrap_or_default(),
            location: job_location(job),
        }
    }
}

/// `"city, state, country"`, keeping empty slots so the shape is stable.
fn job_location(job: &JobRow) -> String {
    [&job.city, &job.state, &job.country]
        .iter()
        .map(|part| part.as_deref().unwrap_or(""))
        .collect::<Vec<_>>()
        .join(", ")
}

fn validate_feedback(req: &HrFeedbackRequest) -> Result<i32, AppError> {
    match req.status {
        Some(status) if !req.job_id.is_empty() && !req.applicant_id.is_empty() => Ok(status),
        _ => Err(AppError::Validation(
            "job_id, applicant_id and status are required".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::matching::orchestrator::tests::{job_row, MemoryStore, StubLlm};
    use crate::state::tests::test_state;

    #[test]
    fn test_job_location_keeps_empty_slots() {
        let mut job = job_row("1", "Dev", "API");
        job.city = Some("São Paulo".to_string());
        job.country = Some("Brasil".to_string());
        assert_eq!(job_location(&job), "São Paulo, , Brasil");
    }

    #[test]
    fn test_open_job_defaults_missing_text() {
        let job = job_row("7", "Analista SAP", "Suporte");
        let open = OpenJob::from(&job);
        assert_eq!(open.title, "Analista SAP");
        assert_eq!(open.client, "");
        assert_eq!(open.location, ", , ");
    }

    #[test]
    fn test_feedback_requires_status() {
        let req: HrFeedbackRequest = serde_json::from_value(serde_json::json!({
            "job_id": "1",
            "applicant_id": "10",
            "notes": "Boa comunicação"
        }))
        .unwrap();
        assert!(matches!(
            validate_feedback(&req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_feedback_accepts_complete_payload() {
        let req: HrFeedbackRequest = serde_json::from_value(serde_json::json!({
            "job_id": "1",
            "applicant_id": "10",
            "status": 2
        }))
        .unwrap();
        assert_eq!(validate_feedback(&req).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_job_detail_unknown_job_is_not_found() {
        let state = test_state(
            Arc::new(MemoryStore::default()),
            Arc::new(StubLlm::replying("")),
        );
        let err = handle_job_detail(State(state), Path("404".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_pair_details_requires_both_records() {
        let store = MemoryStore::default();
        store
            .jobs
            .lock()
            .unwrap()
            .insert("1".to_string(), job_row("1", "Dev", "API"));
        let state = test_state(Arc::new(store), Arc::new(StubLlm::replying("")));

        let err = handle_pair_details(State(state), Path(("1".to_string(), "10".to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
