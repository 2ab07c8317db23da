//! Persistence collaborator for the matching core.
//!
//! The orchestrator only sees `RecruitmentStore`; `PgStore` is the production
//! implementation. Dashboard listings query the pool directly in their handlers.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::models::{EvaluationResult, MatchResult};
use crate::models::pipeline::TryItUserRow;
use crate::models::recruitment::{ApplicantRow, JobRow};

/// A finished interview ready to be recorded for a registered applicant.
#[derive(Debug, Clone)]
pub struct InterviewRecordInput<'a> {
    pub job_id: &'a str,
    pub applicant_id: &'a str,
    pub questions: &'a [String],
    pub answers: &'a [String],
    pub evaluation: &'a EvaluationResult,
}

/// A trial user created from an uploaded CV.
#[derive(Debug, Clone)]
pub struct NewTryItUser<'a> {
    pub job_id: &'a str,
    pub name: Option<&'a str>,
    pub cv_text: &'a str,
    pub result: &'a MatchResult,
}

#[async_trait]
pub trait RecruitmentStore: Send + Sync {
    async fn job(&self, job_id: &str) -> Result<Option<JobRow>, AppError>;

    async fn applicant(&self, applicant_id: &str) -> Result<Option<ApplicantRow>, AppError>;

    async fn match_result(
        &self,
        job_id: &str,
        applicant_id: &str,
    ) -> Result<Option<MatchResult>, AppError>;

    /// Upsert keyed by the pair; the last writer wins.
    async fn save_match_result(
        &self,
        job_id: &str,
        applicant_id: &str,
        result: &MatchResult,
    ) -> Result<(), AppError>;

    /// Upsert keyed by the pair.
    async fn save_interview(&self, record: InterviewRecordInput<'_>) -> Result<(), AppError>;

    async fn tryit_user(&self, user_id: Uuid) -> Result<Option<TryItUserRow>, AppError>;

    async fn create_tryit_user(&self, user: NewTryItUser<'_>) -> Result<TryItUserRow, AppError>;

    /// Returns `false` when the trial user does not exist.
    async fn save_tryit_evaluation(
        &self,
        user_id: Uuid,
        evaluation: &EvaluationResult,
    ) -> Result<bool, AppError>;
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecruitmentStore for PgStore {
    async fn job(&self, job_id: &str) -> Result<Option<JobRow>, AppError> {
        let job = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    async fn applicant(&self, applicant_id: &str) -> Result<Option<ApplicantRow>, AppError> {
        let applicant = sqlx::query_as::<_, ApplicantRow>("SELECT * FROM applicants WHERE id = $1")
            .bind(applicant_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(applicant)
    }

    async fn match_result(
        &self,
        job_id: &str,
        applicant_id: &str,
    ) -> Result<Option<MatchResult>, AppError> {
        let row: Option<(f64, String)> = sqlx::query_as(
            "SELECT score, keywords FROM match_results WHERE job_id = $1 AND applicant_id = $2",
        )
        .bind(job_id)
        .bind(applicant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(score, keywords)| MatchResult { score, keywords }))
    }

    async fn save_match_result(
        &self,
        job_id: &str,
        applicant_id: &str,
        result: &MatchResult,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO match_results (job_id, applicant_id, score, keywords)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (job_id, applicant_id)
            DO UPDATE SET score = EXCLUDED.score, keywords = EXCLUDED.keywords
            "#,
        )
        .bind(job_id)
        .bind(applicant_id)
        .bind(result.score)
        .bind(&result.keywords)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save_interview(&self, record: InterviewRecordInput<'_>) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO interview_records (job_id, applicant_id, questions, answers, summary, score)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (job_id, applicant_id)
            DO UPDATE SET questions = EXCLUDED.questions,
                          answers = EXCLUDED.answers,
                          summary = EXCLUDED.summary,
                          score = EXCLUDED.score,
                          created_at = NOW()
            "#,
        )
        .bind(record.job_id)
        .bind(record.applicant_id)
        .bind(Json(record.questions))
        .bind(Json(record.answers))
        .bind(&record.evaluation.summary)
        .bind(i32::from(record.evaluation.score))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn tryit_user(&self, user_id: Uuid) -> Result<Option<TryItUserRow>, AppError> {
        let user = sqlx::query_as::<_, TryItUserRow>("SELECT * FROM tryit_users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_tryit_user(&self, user: NewTryItUser<'_>) -> Result<TryItUserRow, AppError> {
        let row = sqlx::query_as::<_, TryItUserRow>(
            r#"
            INSERT INTO tryit_users (id, name, job_id, score, keywords, cv_text)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.name)
        .bind(user.job_id)
        .bind(user.result.score)
        .bind(&user.result.keywords)
        .bind(user.cv_text)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn save_tryit_evaluation(
        &self,
        user_id: Uuid,
        evaluation: &EvaluationResult,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE tryit_users SET summary = $1, grade = $2 WHERE id = $3")
            .bind(&evaluation.summary)
            .bind(i32::from(evaluation.score))
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
