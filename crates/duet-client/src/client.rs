use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use duet_types::api::{
    ErrorBody, GenerateRequest, GenerateResponse, JoinPairRequest, SubmitAnswerRequest,
    TodayPromptRequest, TodayView,
};
use duet_types::models::{DailyPrompt, Pair, Tone};

use crate::cache::PairLookup;
use crate::error::ClientError;

/// Thin typed wrapper over the JSON API for one signed-in user.
#[derive(Clone)]
pub struct DuetClient {
    http: Client,
    base_url: String,
    token: String,
}

impl DuetClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        Err(ClientError::Api { status, message })
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn create_pair(&self) -> Result<Pair, ClientError> {
        self.send(self.request(Method::POST, "/api/pairs")).await
    }

    pub async fn join_pair(&self, code: &str) -> Result<Pair, ClientError> {
        self.post_json("/api/pairs/join", &JoinPairRequest { code: code.to_string() })
            .await
    }

    pub async fn current_pair(&self) -> Result<Pair, ClientError> {
        self.send(self.request(Method::GET, "/api/pairs/current")).await
    }

    pub async fn get_pair(&self, pair_id: Uuid) -> Result<Pair, ClientError> {
        self.send(self.request(Method::GET, &format!("/api/pairs/{}", pair_id)))
            .await
    }

    pub async fn today(&self, pair_id: Uuid) -> Result<TodayView, ClientError> {
        self.send(self.request(Method::GET, &format!("/api/pairs/{}/today", pair_id)))
            .await
    }

    pub async fn generate_today_prompt(
        &self,
        pair_id: Uuid,
        tone: Tone,
        less_therapy: bool,
    ) -> Result<DailyPrompt, ClientError> {
        let body = TodayPromptRequest {
            tone: Some(tone),
            less_therapy,
        };
        self.post_json(&format!("/api/pairs/{}/today/prompt", pair_id), &body)
            .await
    }

    pub async fn submit_answer(&self, pair_id: Uuid, answer: &str) -> Result<TodayView, ClientError> {
        let body = SubmitAnswerRequest {
            answer: answer.to_string(),
        };
        self.post_json(&format!("/api/pairs/{}/today/response", pair_id), &body)
            .await
    }

    /// One-off generation without storing anything. `tone` is free-form.
    pub async fn generate(&self, tone: &str, less_therapy: bool) -> Result<String, ClientError> {
        let body = GenerateRequest {
            tone: Some(tone.to_string()),
            less_therapy,
        };
        let resp: GenerateResponse = self.post_json("/api/generate", &body).await?;
        Ok(resp.prompt)
    }
}

impl PairLookup for DuetClient {
    async fn pair_by_id(&self, pair_id: Uuid) -> Result<Option<Pair>, ClientError> {
        match self.get_pair(pair_id).await {
            Ok(pair) => Ok(Some(pair)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn current_pair(&self) -> Result<Option<Pair>, ClientError> {
        match DuetClient::current_pair(self).await {
            Ok(pair) => Ok(Some(pair)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
