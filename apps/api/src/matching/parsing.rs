//! Interpreting LLM replies: the two-stage triage JSON parse and the
//! evaluation grade scan.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::llm_client::strip_json_fences;
use crate::matching::models::{MatchResult, TriageOutcome};

/// Grade used when the evaluation text carries no digit at all.
pub const DEFAULT_EVALUATION_SCORE: u8 = 3;

/// Outcome of [`parse_lenient_json`]. A failure keeps the raw content so the
/// caller can log it or replay it by hand.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonParse<T> {
    Parsed(T),
    Failed { raw: String, reason: String },
}

/// Strict parse first; if that fails, retry once after replacing every single
/// quote with a double quote. The second failure is final.
pub fn parse_lenient_json<T: DeserializeOwned>(raw: &str) -> JsonParse<T> {
    let content = strip_json_fences(raw);

    match serde_json::from_str::<T>(content) {
        Ok(value) => JsonParse::Parsed(value),
        Err(strict_err) => {
            let normalized = content.replace('\'', "\"");
            match serde_json::from_str::<T>(&normalized) {
                Ok(value) => JsonParse::Parsed(value),
                Err(retry_err) => JsonParse::Failed {
                    raw: raw.to_string(),
                    reason: format!("{strict_err}; after quote normalization: {retry_err}"),
                },
            }
        }
    }
}

/// Score as the model writes it: a number, or a string such as `"87,5"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawScore {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Deserialize)]
struct TriageReply {
    #[serde(default)]
    nome: Option<String>,
    score: RawScore,
    #[serde(default)]
    keywords: Option<String>,
}

/// Decodes a triage reply into a [`TriageOutcome`], with the score clamped to
/// 0–100.
pub fn parse_triage_reply(raw: &str) -> JsonParse<TriageOutcome> {
    let reply = match parse_lenient_json::<TriageReply>(raw) {
        JsonParse::Parsed(reply) => reply,
        JsonParse::Failed { raw, reason } => return JsonParse::Failed { raw, reason },
    };

    let score = match reply.score {
        RawScore::Number(n) => Some(n),
        RawScore::Text(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
    };
    let Some(score) = score.filter(|s| s.is_finite()) else {
        return JsonParse::Failed {
            raw: raw.to_string(),
            reason: "score is not a number".to_string(),
        };
    };

    JsonParse::Parsed(TriageOutcome {
        candidate_name: reply.nome.filter(|n| !n.is_empty()),
        result: MatchResult {
            score: score.clamp(0.0, 100.0),
            keywords: reply.keywords.unwrap_or_default(),
        },
    })
}

/// Grade = the first ASCII digit found anywhere in `summary`, clamped to 1–5;
/// [`DEFAULT_EVALUATION_SCORE`] when there is none.
///
/// The first digit wins even when it belongs to unrelated prose (a year, a
/// count), so a summary like "Em 2023 ..." grades as 2.
pub fn extract_evaluation_score(summary: &str) -> u8 {
    summary
        .chars()
        .find_map(|c| c.to_digit(10))
        .map(|d| (d as u8).clamp(1, 5))
        .unwrap_or(DEFAULT_EVALUATION_SCORE)
}
