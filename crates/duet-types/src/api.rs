use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{DailyPrompt, Tone};
use crate::reveal::RevealState;

// -- JWT Claims --

/// Bearer token claims. Tokens are minted by the external auth provider;
/// the service only verifies them and reads `sub` as the user id. Any other
/// claims in the token are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
}

// -- Generation --

/// Body of the stateless generator. Any tone wording is accepted and handed
/// to the model verbatim.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default)]
    pub less_therapy: bool,
}

impl GenerateRequest {
    /// The requested tone, falling back to the default one when absent or blank.
    pub fn tone(&self) -> &str {
        self.tone
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(Tone::default().as_str())
    }
}

/// Body for storing today's prompt. The stored tone is one of the known ones.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TodayPromptRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
    #[serde(default)]
    pub less_therapy: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub prompt: String,
}

// -- Pairs --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinPairRequest {
    pub code: String,
}

// -- Today --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitAnswerRequest {
    pub answer: String,
}

/// Everything a member polls for: the day's prompt, if generated, and what
/// they may see of the answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodayView {
    pub pair_id: Uuid,
    pub date: NaiveDate,
    pub prompt: Option<DailyPrompt>,
    pub reveal: RevealState,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}
