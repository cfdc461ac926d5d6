use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GenerateError;
use crate::extract::parse_prompt;
use crate::instruction::build_instruction;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const TEMPERATURE: f64 = 0.7;
const TOP_P: f64 = 0.9;
const MAX_OUTPUT_TOKENS: u32 = 200;

/// Raw text used when the provider returns no candidate text at all.
const NO_CONTENT: &str = "No content returned.";

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Absent key is not a startup error; each generation request fails instead.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

// ── Wire types ──────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_p: f64,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

// ── Client ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl GeminiClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key().is_some()
    }

    fn api_key(&self) -> Option<&str> {
        self.config.api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Ask the model for one prompt in the given tone. The tone is passed
    /// through to the instruction as-is.
    pub async fn generate_prompt(&self, tone: &str, less_therapy: bool) -> Result<String, GenerateError> {
        let api_key = self.api_key().ok_or(GenerateError::MissingCredential)?;

        let instruction = build_instruction(tone, less_therapy);
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: &instruction }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                top_p: TOP_P,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            api_key
        );

        debug!(model = %self.config.model, tone, less_therapy, "Requesting prompt");
        let resp = self.http.post(&url).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            warn!("Gemini request failed ({}): {}", status, detail);
            return Err(GenerateError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        let text = resp.text().await?;
        let data: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|_| GenerateError::Parse { raw: text.clone() })?;

        let raw = data.first_text().map(str::trim).unwrap_or(NO_CONTENT);
        parse_prompt(raw).inspect_err(|e| warn!("Unusable Gemini output: {} (raw: {:?})", e, raw))
    }
}
