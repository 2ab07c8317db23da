//! Anonymous "try it" flow: a visitor uploads a CV PDF for a job, is triaged,
//! and can then take the simulated interview as `tryit-<uuid>`.

use aws_sdk_s3::primitives::ByteStream;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::models::{ApplicantRef, JobView, TriageSubject};
use crate::matching::orchestrator::{triage, TRIAGE_CALL};
use crate::models::pipeline::TryItUserRow;
use crate::state::AppState;
use crate::store::NewTryItUser;

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub user_id: Uuid,
    /// Identifier to use with the interview endpoints.
    pub applicant_id: String,
    pub job_id: String,
    pub name: Option<String>,
    pub score: f64,
    pub keywords: String,
}

#[derive(Debug, Serialize)]
pub struct TryItResult {
    pub user: TryItUserRow,
    pub job_title: Option<String>,
}

/// Fields read from the upload form.
#[derive(Debug, Default)]
struct ApplyForm {
    cv: Option<Bytes>,
    name: Option<String>,
}

/// POST /api/v1/tryit/jobs/:job_id/apply
///
/// Multipart body: `cv` (PDF, required) and `name` (optional; the name the
/// triage reads from the CV is used otherwise).
pub async fn handle_apply(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApplyResponse>), AppError> {
    let job = state
        .store
        .job(&job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let form = read_apply_form(multipart).await?;
    let pdf = form
        .cv
        .filter(|cv| !cv.is_empty())
        .ok_or_else(|| AppError::Validation("A CV file is required".to_string()))?;
    if !pdf.starts_with(PDF_MAGIC) {
        return Err(AppError::Validation("The CV must be a PDF file".to_string()));
    }

    let cv_text = extract_pdf_text(pdf.clone()).await?;
    if cv_text.is_empty() {
        return Err(AppError::Validation(
            "No text could be extracted from the CV".to_string(),
        ));
    }

    let outcome = triage(
        state.llm.as_ref(),
        &JobView::from(&job),
        TriageSubject::CvText(&cv_text),
        TRIAGE_CALL,
    )
    .await?;

    let name = form.name.or(outcome.candidate_name);
    let user = state
        .store
        .create_tryit_user(NewTryItUser {
            job_id: &job_id,
            name: name.as_deref(),
            cv_text: &cv_text,
            result: &outcome.result,
        })
        .await?;

    archive_cv(&state, user.id, pdf).await;

    info!(
        "Trial user {} applied to job {job_id}: score={:.1}",
        user.id, outcome.result.score
    );

    Ok((
        StatusCode::CREATED,
        Json(ApplyResponse {
            user_id: user.id,
            applicant_id: ApplicantRef::tryit_id(user.id),
            job_id,
            name: user.name,
            score: outcome.result.score,
            keywords: outcome.result.keywords,
        }),
    ))
}

/// GET /api/v1/tryit/users
pub async fn handle_list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<TryItUserRow>>, AppError> {
    let users =
        sqlx::query_as::<_, TryItUserRow>("SELECT * FROM tryit_users ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(users))
}

/// GET /api/v1/tryit/users/:user_id/result
pub async fn handle_result(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<TryItResult>, AppError> {
    let user = state
        .store
        .tryit_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Trial user {user_id} not found")))?;
    let job_title = state.store.job(&user.job_id).await?.and_then(|j| j.title);

    Ok(Json(TryItResult { user, job_title }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn read_apply_form(mut multipart: Multipart) -> Result<ApplyForm, AppError> {
    let mut form = ApplyForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("cv") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid CV upload: {e}")))?;
                form.cv = Some(data);
            }
            Some("name") => {
                let name = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid name field: {e}")))?;
                form.name = Some(name.trim().to_string()).filter(|n| !n.is_empty());
            }
            _ => {}
        }
    }

    Ok(form)
}

/// PDF parsing is CPU-bound, so it runs on the blocking pool.
async fn extract_pdf_text(pdf: Bytes) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF extraction: {e}"))
        })?
        .map_err(|e| AppError::Validation(format!("Could not read the PDF: {e}")))?;
    Ok(text.trim().to_string())
}

/// Keeps the uploaded PDF. A failed upload does not undo the application.
async fn archive_cv(state: &AppState, user_id: Uuid, pdf: Bytes) {
    let s3_key = format!("tryit/{user_id}.pdf");
    let result = state
        .s3
        .put_object()
        .bucket(&state.config.s3_bucket)
        .key(&s3_key)
        .body(ByteStream::from(pdf))
        .content_type("application/pdf")
        .send()
        .await;

    match result {
        Ok(_) => info!("Archived CV at s3://{}/{}", state.config.s3_bucket, s3_key),
        Err(e) => warn!("Failed to archive CV for trial user {user_id}: {e}"),
    }
}
