use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Prospect situations that mean the job has been filled.
pub const CLOSING_SITUATIONS: [&str; 2] = ["Contratado como Hunting", "Contratado pela Decision"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRecordRow {
    pub id: i64,
    pub job_id: String,
    pub applicant_id: String,
    pub questions: Json<Vec<String>>,
    pub answers: Json<Vec<String>>,
    pub summary: String,
    pub score: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HrInterviewRow {
    pub id: i64,
    pub job_id: String,
    pub applicant_id: String,
    pub notes: Option<String>,
    pub status: i32,
    pub created_at: DateTime<Utc>,
}

/// Anonymous candidate from the "try it" flow.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TryItUserRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub job_id: String,
    pub score: Option<f64>,
    pub keywords: Option<String>,
    pub cv_text: Option<String>,
    pub summary: Option<String>,
    pub grade: Option<i32>,
    pub created_at: DateTime<Utc>,
}
