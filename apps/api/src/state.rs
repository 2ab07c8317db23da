use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::Completion;
use crate::speech::SpeechClient;
use crate::store::RecruitmentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Used directly by the dashboard listings.
    pub db: PgPool,
    pub store: Arc<dyn RecruitmentStore>,
    pub llm: Arc<dyn Completion>,
    pub speech: SpeechClient,
    pub s3: S3Client,
    pub config: Config,
}
