//! Bulk screening of open jobs.
//!
//! Pairs are screened one after another through the idempotent `screen_pair`,
//! so re-running a batch only pays for pairs that were never scored. A failed
//! pair is logged and counted; it never aborts the batch.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::Completion;
use crate::matching::orchestrator::{screen_pair, BATCH_TRIAGE_CALL};
use crate::models::pipeline::CLOSING_SITUATIONS;
use crate::store::RecruitmentStore;

pub const DEFAULT_PROSPECTS_PER_JOB: i64 = 5;
pub const MAX_PROSPECTS_PER_JOB: i64 = 50;

#[derive(Debug, Clone, Deserialize)]
pub struct ScreenRequest {
    /// Restricts the batch to these jobs. Empty means every open job.
    #[serde(default)]
    pub job_ids: Vec<String>,
    #[serde(default = "default_per_job")]
    pub per_job: i64,
}

fn default_per_job() -> i64 {
    DEFAULT_PROSPECTS_PER_JOB
}

/// One job and the applicants to screen for it.
#[derive(Debug, Clone, PartialEq)]
pub struct JobBatch {
    pub job_id: String,
    pub applicant_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScreenSummary {
    pub jobs: usize,
    pub screened: usize,
    pub failed: usize,
}

/// Loads the open jobs to screen and the first `per_job` prospects of each.
pub async fn plan_batches(pool: &PgPool, req: &ScreenRequest) -> Result<Vec<JobBatch>, AppError> {
    if !(1..=MAX_PROSPECTS_PER_JOB).contains(&req.per_job) {
        return Err(AppError::Validation(format!(
            "per_job must be between 1 and {MAX_PROSPECTS_PER_JOB}"
        )));
    }

    let job_ids: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT id FROM jobs
        WHERE id NOT IN (SELECT job_id FROM prospects WHERE situation = ANY($1))
          AND (cardinality($2::TEXT[]) = 0 OR id = ANY($2))
        ORDER BY id
        "#,
    )
    .bind(CLOSING_SITUATIONS.to_vec())
    .bind(&req.job_ids)
    .fetch_all(pool)
    .await?;

    let mut batches = Vec::with_capacity(job_ids.len());
    for job_id in job_ids {
        let applicant_ids: Vec<String> = sqlx::query_scalar(
            "SELECT applicant_id FROM prospects WHERE job_id = $1 ORDER BY id LIMIT $2",
        )
        .bind(&job_id)
        .bind(req.per_job)
        .fetch_all(pool)
        .await?;
        batches.push(JobBatch {
            job_id,
            applicant_ids,
        });
    }

    Ok(batches)
}

/// Screens every pair in `batches` sequentially.
pub async fn screen_batches(
    store: &dyn RecruitmentStore,
    llm: &dyn Completion,
    batches: &[JobBatch],
) -> ScreenSummary {
    let mut summary = ScreenSummary {
        jobs: batches.len(),
        ..ScreenSummary::default()
    };

    for batch in batches {
        info!(
            "Screening job {} with {} prospects",
            batch.job_id,
            batch.applicant_ids.len()
        );
        for applicant_id in &batch.applicant_ids {
            match screen_pair(store, llm, &batch.job_id, applicant_id, BATCH_TRIAGE_CALL).await {
                Ok(_) => summary.screened += 1,
                Err(e) => {
                    warn!(
                        "Screening failed for job {}, applicant {applicant_id}: {e}",
                        batch.job_id
                    );
                    summary.failed += 1;
                }
            }
        }
    }

    info!(
        "Batch screening finished: {} jobs, {} screened, {} failed",
        summary.jobs, summary.screened, summary.failed
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::matching::orchestrator::tests::{applicant_row, job_row, MemoryStore, StubLlm};

    fn store() -> MemoryStore {
        let store = MemoryStore::default();
        store
            .jobs
            .lock()
            .unwrap()
            .insert("1".to_string(), job_row("1", "Dev", "construir API"));
        for id in ["10", "11"] {
            store
                .applicants
                .lock()
                .unwrap()
                .insert(id.to_string(), applicant_row(id, "Python"));
        }
        store
    }

    #[tokio::test]
    async fn test_failures_are_counted_not_fatal() {
        let store = store();
        let llm = StubLlm::replying(r#"{"nome":"Ana","score":80,"keywords":"Python"}"#);
        let batches = vec![JobBatch {
            job_id: "1".to_string(),
            applicant_ids: vec!["10".to_string(), "missing".to_string(), "11".to_string()],
        }];

        let summary = screen_batches(&store, &llm, &batches).await;

        assert_eq!(
            summary,
            ScreenSummary {
                jobs: 1,
                screened: 2,
                failed: 1
            }
        );
        assert_eq!(store.matches.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rerun_skips_already_screened_pairs() {
        let store = store();
        let llm = StubLlm::replying(r#"{"nome":"Ana","score":80,"keywords":"Python"}"#);
        let batches = vec![JobBatch {
            job_id: "1".to_string(),
            applicant_ids: vec!["10".to_string(), "11".to_string()],
        }];

        screen_batches(&store, &llm, &batches).await;
        let second = screen_batches(&store, &llm, &batches).await;

        assert_eq!(second.screened, 2);
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_llm_outage_fails_every_pair() {
        let store = store();
        let llm = StubLlm::failing(503);
        let batches = vec![JobBatch {
            job_id: "1".to_string(),
            applicant_ids: vec!["10".to_string(), "11".to_string()],
        }];

        let summary = screen_batches(&store, &llm, &batches).await;

        assert_eq!(summary.failed, 2);
        assert!(store.matches.lock().unwrap().is_empty());
    }

    #[test]
    fn test_screen_request_defaults() {
        let req: ScreenRequest = serde_json::from_str("{}").unwrap();
        assert!(req.job_ids.is_empty());
        assert_eq!(req.per_job, DEFAULT_PROSPECTS_PER_JOB);
    }
}
