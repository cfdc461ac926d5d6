use std::sync::Arc;

use anyhow::anyhow;
use jsonwebtoken::Validation;
use tracing::error;

use duet_db::Database;
use duet_llm::GeminiClient;

use crate::clock::Clock;
use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub llm: GeminiClient,
    pub auth: AuthConfig,
    pub clock: Clock,
}

/// How bearer tokens from the external auth provider are verified.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Expected `aud` claim. When unset the audience is not checked.
    pub audience: Option<String>,
}

impl AuthConfig {
    pub fn validation(&self) -> Validation {
        let mut validation = Validation::default();
        match &self.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        validation
    }
}

/// Run a blocking store call off the async runtime.
pub async fn with_db<F, T, E>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow!("blocking task failed"))
        })?
        .map_err(Into::into)
}
