use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::matching::orchestrator::MatchingError;
use crate::speech::SpeechError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Could not parse LLM response: {reason}")]
    Parse { raw: String, reason: String },

    #[error("Speech service error: {0}")]
    Speech(String),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Llm(e.to_string())
    }
}

impl From<SpeechError> for AppError {
    fn from(e: SpeechError) -> Self {
        AppError::Speech(e.to_string())
    }
}

impl From<MatchingError> for AppError {
    fn from(e: MatchingError) -> Self {
        match e {
            MatchingError::Llm(e) => AppError::Llm(e.to_string()),
            MatchingError::Parse { raw, reason } => AppError::Parse { raw, reason },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut raw_content = None;

        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Parse { raw, reason } => {
                tracing::error!("LLM parse error: {reason}; raw content: {raw}");
                raw_content = Some(raw.clone());
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_PARSE_ERROR",
                    format!("The AI response could not be interpreted: {reason}"),
                )
            }
            AppError::Speech(msg) => {
                tracing::error!("Speech error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "SPEECH_ERROR",
                    "The speech service failed".to_string(),
                )
            }
            AppError::S3(msg) => {
                tracing::error!("S3 error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "S3_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(raw) = raw_content {
            error["raw"] = json!(raw);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_maps_to_404() {
        let response = AppError::NotFound("Job 7 not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Job 7 not found");
    }

    #[tokio::test]
    async fn test_parse_error_exposes_raw_content() {
        let err: AppError = MatchingError::Parse {
            raw: "nota 80".to_string(),
            reason: "expected value".to_string(),
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "LLM_PARSE_ERROR");
        assert_eq!(body["error"]["raw"], "nota 80");
    }

    #[tokio::test]
    async fn test_llm_error_hides_details() {
        let response = AppError::from(LlmError::EmptyContent).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "An AI processing error occurred");
        assert!(body["error"].get("raw").is_none());
    }

    #[tokio::test]
    async fn test_speech_error_maps_to_bad_gateway() {
        let err: AppError = SpeechError::Api {
            status: 500,
            message: "upstream down".to_string(),
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "SPEECH_ERROR");
    }
}
