//! Axum route handlers for speech: synthesize, transcribe, and serving stored audio.

use aws_sdk_s3::primitives::ByteStream;
use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::speech::AudioClip;
use crate::state::AppState;

const AUDIO_PREFIX: &str = "audio/";
const AUDIO_URL_PREFIX: &str = "/static/audio/";

#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SynthesizeResponse {
    pub status: &'static str,
    pub audio_url: String,
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
}

/// POST /api/v1/speech/synthesize
pub async fn handle_synthesize(
    State(state): State<AppState>,
    Json(req): Json<SynthesizeRequest>,
) -> Result<Json<SynthesizeResponse>, AppError> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Text is empty".to_string()));
    }

    let audio = state.speech.synthesize(text).await?;

    let file_name = format!("tts_{}.mp3", Uuid::new_v4().simple());
    let s3_key = format!("{AUDIO_PREFIX}{file_name}");
    state
        .s3
        .put_object()
        .bucket(&state.config.s3_bucket)
        .key(&s3_key)
        .body(ByteStream::from(audio))
        .content_type("audio/mpeg")
        .send()
        .await
        .map_err(|e| AppError::S3(format!("upload of {s3_key} failed: {e}")))?;

    info!("Stored synthesized audio at s3://{}/{}", state.config.s3_bucket, s3_key);

    Ok(Json(SynthesizeResponse {
        status: "ok",
        audio_url: format!("{AUDIO_URL_PREFIX}{file_name}"),
    }))
}

/// POST /api/v1/speech/transcribe
///
/// Multipart body with one `audio` file field.
pub async fn handle_transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscribeResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("audio") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("audio.wav").to_string();
        let content_type = field.content_type().unwrap_or("audio/wav").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid audio upload: {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Audio file is empty".to_string()));
        }

        let text = state
            .speech
            .transcribe(AudioClip {
                bytes: bytes.to_vec(),
                file_name,
                content_type,
            })
            .await?;
        return Ok(Json(TranscribeResponse { text }));
    }

    Err(AppError::Validation("No audio file provided".to_string()))
}

/// GET /static/audio/:file
pub async fn handle_get_audio(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !is_audio_file_name(&file) {
        return Err(AppError::NotFound(format!("Audio {file} not found")));
    }

    let s3_key = format!("{AUDIO_PREFIX}{file}");
    let object = state
        .s3
        .get_object()
        .bucket(&state.config.s3_bucket)
        .key(&s3_key)
        .send()
        .await
        .map_err(|e| match e.as_service_error() {
            Some(service) if service.is_no_such_key() => {
                AppError::NotFound(format!("Audio {file} not found"))
            }
            _ => AppError::S3(format!("download of {s3_key} failed: {e}")),
        })?;

    let bytes = object
        .body
        .collect()
        .await
        .map_err(|e| AppError::S3(format!("reading {s3_key} failed: {e}")))?
        .into_bytes();

    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], bytes))
}

/// Only names this service could have produced are served.
fn is_audio_file_name(name: &str) -> bool {
    name.ends_with(".mp3")
        && !name.contains('/')
        && !name.contains('\\')
        && !name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_file_name_accepts_generated_names() {
        assert!(is_audio_file_name("tts_0f8fad5bd9cb469fa16570867728950e.mp3"));
    }

    #[test]
    fn test_audio_file_name_rejects_traversal() {
        assert!(!is_audio_file_name("../secrets.mp3"));
        assert!(!is_audio_file_name("a/b.mp3"));
        assert!(!is_audio_file_name("notes.txt"));
    }
}
