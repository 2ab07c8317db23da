//! Speech adapter: transcription and synthesis through OpenAI-compatible audio
//! endpoints. Audio bytes pass through untouched; no codec handling happens here.

pub mod handlers;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Returned to the candidate when the recording held no recognisable speech.
pub const UNRECOGNIZED_SPEECH: &str = "[Não entendi o que foi dito]";

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

/// An uploaded recording.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

#[derive(Clone)]
pub struct SpeechClient {
    client: Client,
    base_url: String,
    api_key: String,
    stt_model: String,
    tts_model: String,
    voice: String,
    language: String,
}

impl SpeechClient {
    pub fn from_config(config: &Config) -> Result<Self, SpeechError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            stt_model: config.stt_model.clone(),
            tts_model: config.tts_model.clone(),
            voice: config.tts_voice.clone(),
            language: config.speech_language.clone(),
        })
    }

    /// Transcribes a recording. A blank transcription yields
    /// [`UNRECOGNIZED_SPEECH`]; transport and API failures are errors.
    pub async fn transcribe(&self, clip: AudioClip) -> Result<String, SpeechError> {
        let size = clip.bytes.len();
        let part = Part::bytes(clip.bytes)
            .file_name(clip.file_name)
            .mime_str(&clip.content_type)?;
        let form = Form::new()
            .part("file", part)
            .text("model", self.stt_model.clone())
            .text("language", self.language.clone());

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response).await?;

        let body: TranscriptionResponse = response.json().await?;
        debug!("Transcribed {size} bytes of audio");
        Ok(normalize_transcription(&body.text))
    }

    /// Synthesizes `text` to MP3 bytes.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let body = serde_json::json!({
            "model": self.tts_model,
            "input": text,
            "voice": self.voice,
            "response_format": "mp3",
        });

        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        Ok(response.bytes().await?.to_vec())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SpeechError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(SpeechError::Api {
        status: status.as_u16(),
        message,
    })
}

pub fn normalize_transcription(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        UNRECOGNIZED_SPEECH.to_string()
    } else {
        text.to_string()
    }
}
