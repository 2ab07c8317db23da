//! Matching/Interview Orchestrator.
//!
//! Per (job, applicant) pair: `Unscreened → Screened` via [`screen_pair`]
//! (idempotent), any number of [`next_question`] turns driven entirely by the
//! client-held history, then [`evaluate`] once the caller ends the interview.
//! Each operation makes exactly one completion call and never retries.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::llm_client::{Completion, LlmError};
use crate::matching::models::{
    ApplicantRef, ApplicantView, EvaluationResult, JobView, MatchResult, TriageOutcome,
    TriageSubject, TurnHistory,
};
use crate::matching::parsing::{extract_evaluation_score, parse_triage_reply, JsonParse};
use crate::prompting::builders::{
    build_evaluation_prompt, build_interview_prompt, build_triage_prompt,
};
use crate::store::{InterviewRecordInput, RecruitmentStore};

/// Sampling parameters for one kind of completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

pub const TRIAGE_CALL: CallParams = CallParams {
    temperature: 0.7,
    max_tokens: 200,
};
/// Bulk screening favours stable scores over variety.
pub const BATCH_TRIAGE_CALL: CallParams = CallParams {
    temperature: 0.3,
    max_tokens: 300,
};
pub const QUESTION_CALL: CallParams = CallParams {
    temperature: 0.7,
    max_tokens: 150,
};
pub const EVALUATION_CALL: CallParams = CallParams {
    temperature: 0.7,
    max_tokens: 500,
};

#[derive(Debug, Error)]
pub enum MatchingError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// The reply was not the expected JSON even after quote normalization.
    #[error("could not parse triage reply: {reason}")]
    Parse { raw: String, reason: String },
}

/// Triage a CV against a job. One completion call, no persistence.
pub async fn triage(
    llm: &dyn Completion,
    job: &JobView,
    subject: TriageSubject<'_>,
    params: CallParams,
) -> Result<TriageOutcome, MatchingError> {
    let prompt = build_triage_prompt(job, subject);
    debug!("Triage prompt:\n{prompt}");

    let reply = llm
        .complete(&prompt, params.temperature, params.max_tokens)
        .await?;

    match parse_triage_reply(&reply) {
        JsonParse::Parsed(outcome) => Ok(outcome),
        JsonParse::Failed { raw, reason } => {
            warn!("Triage reply could not be parsed: {reason}");
            Err(MatchingError::Parse { raw, reason })
        }
    }
}

/// Screens a registered applicant for a job, reusing an existing match result
/// when there is one. Concurrent first calls for the same pair both reach the
/// LLM; the store keeps the last write.
pub async fn screen_pair(
    store: &dyn RecruitmentStore,
    llm: &dyn Completion,
    job_id: &str,
    applicant_id: &str,
    params: CallParams,
) -> Result<MatchResult, AppError> {
    if let Some(existing) = store.match_result(job_id, applicant_id).await? {
        debug!("Reusing match result for job {job_id}, applicant {applicant_id}");
        return Ok(existing);
    }

    let job = store
        .job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    let applicant = store
        .applicant(applicant_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Applicant {applicant_id} not found")))?;

    let job_view = JobView::from(&job);
    let applicant_view = ApplicantView::from(&applicant);
    let outcome = triage(
        llm,
        &job_view,
        TriageSubject::Applicant(&applicant_view),
        params,
    )
    .await?;

    store
        .save_match_result(job_id, applicant_id, &outcome.result)
        .await?;

    info!(
        "Screened applicant {applicant_id} for job {job_id}: score={:.1}",
        outcome.result.score
    );
    Ok(outcome.result)
}

/// Produces the next interview question from the full history so far.
pub async fn next_question(
    llm: &dyn Completion,
    job: &JobView,
    applicant: &ApplicantView,
    history: &TurnHistory,
) -> Result<String, LlmError> {
    let prompt = build_interview_prompt(job, applicant, history);
    debug!("Interview prompt (turn {}):\n{prompt}", history.len() + 1);

    let question = llm
        .complete(&prompt, QUESTION_CALL.temperature, QUESTION_CALL.max_tokens)
        .await?;
    Ok(question.trim().to_string())
}

/// Summarises a finished interview and grades it 1–5.
pub async fn evaluate(
    llm: &dyn Completion,
    questions: &[String],
    answers: &[String],
) -> Result<EvaluationResult, LlmError> {
    let prompt = build_evaluation_prompt(questions, answers);

    let summary = llm
        .complete(
            &prompt,
            EVALUATION_CALL.temperature,
            EVALUATION_CALL.max_tokens,
        )
        .await?;
    let score = extract_evaluation_score(&summary);

    Ok(EvaluationResult { summary, score })
}

/// Loads the job and applicant views an interview turn needs.
pub async fn load_interview_views(
    store: &dyn RecruitmentStore,
    job_id: &str,
    applicant: &ApplicantRef,
) -> Result<(JobView, ApplicantView), AppError> {
    let job = store
        .job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let applicant_view = match applicant {
        ApplicantRef::Registered(id) => store
            .applicant(id)
            .await?
            .map(|a| ApplicantView::from(&a))
            .ok_or_else(|| AppError::NotFound(format!("Applicant {id} not found")))?,
        ApplicantRef::TryIt(user_id) => store
            .tryit_user(*user_id)
            .await?
            .map(|u| ApplicantView::from(&u))
            .ok_or_else(|| AppError::NotFound(format!("Trial user {user_id} not found")))?,
    };

    Ok((JobView::from(&job), applicant_view))
}

/// Evaluates an interview and records the result against the pair, or against
/// the trial user for the anonymous flow.
pub async fn record_evaluation(
    store: &dyn RecruitmentStore,
    llm: &dyn Completion,
    job_id: &str,
    applicant: &ApplicantRef,
    questions: &[String],
    answers: &[String],
) -> Result<EvaluationResult, AppError> {
    // Fail before paying for the completion call.
    match applicant {
        ApplicantRef::TryIt(user_id) => {
            if store.tryit_user(*user_id).await?.is_none() {
                return Err(AppError::NotFound(format!("Trial user {user_id} not found")));
            }
        }
        ApplicantRef::Registered(applicant_id) => {
            if store.job(job_id).await?.is_none() {
                return Err(AppError::NotFound(format!("Job {job_id} not found")));
            }
            if store.applicant(applicant_id).await?.is_none() {
                return Err(AppError::NotFound(format!(
                    "Applicant {applicant_id} not found"
                )));
            }
        }
    }

    let evaluation = evaluate(llm, questions, answers).await?;

    match applicant {
        ApplicantRef::TryIt(user_id) => {
            if !store.save_tryit_evaluation(*user_id, &evaluation).await? {
                return Err(AppError::NotFound(format!("Trial user {user_id} not found")));
            }
        }
        ApplicantRef::Registered(applicant_id) => {
            store
                .save_interview(InterviewRecordInput {
                    job_id,
                    applicant_id,
                    questions,
                    answers,
                    evaluation: &evaluation,
                })
                .await?;
        }
    }

    info!(
        "Recorded interview evaluation for job {job_id}: score={}",
        evaluation.score
    );
    Ok(evaluation)
}
