use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use duet_db::PairingError;
use duet_llm::GenerateError;
use duet_types::api::ErrorBody;

/// Every failure a handler can report, rendered as `{error, detail?, raw?}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Server is missing configuration needed for this request.
    #[error("{0}")]
    Config(String),

    #[error("{error}")]
    BadRequest { error: String, detail: Option<String> },

    #[error("Unauthorized.")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    /// Uniqueness or race loss in the store; the user can simply retry.
    #[error("{0}")]
    Conflict(String),

    #[error("{error}")]
    Upstream {
        status: StatusCode,
        error: String,
        detail: String,
    },

    /// Provider output that could not be turned into a prompt.
    #[error("{error}")]
    Parse { error: String, raw: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(error: impl Into<String>) -> Self {
        ApiError::BadRequest {
            error: error.into(),
            detail: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream { status, .. } => *status,
            ApiError::Parse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GenerateError> for ApiError {
    fn from(e: GenerateError) -> Self {
        let error = e.to_string();
        match e {
            GenerateError::MissingCredential => ApiError::Config(error),
            GenerateError::Upstream { status, detail } => ApiError::Upstream {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                error: "Gemini request failed.".into(),
                detail,
            },
            GenerateError::Transport(inner) => ApiError::Upstream {
                status: StatusCode::BAD_GATEWAY,
                error: "Gemini request failed.".into(),
                detail: inner.to_string(),
            },
            GenerateError::Parse { raw } | GenerateError::MissingPrompt { raw } => {
                ApiError::Parse { error, raw }
            }
        }
    }
}

impl From<PairingError> for ApiError {
    fn from(e: PairingError) -> Self {
        match e {
            PairingError::NotFound => ApiError::NotFound(e.to_string()),
            PairingError::OwnPair => ApiError::bad_request(e.to_string()),
            PairingError::AlreadyFull | PairingError::JoinRace | PairingError::CodeExhausted(_) => {
                ApiError::Conflict(e.to_string())
            }
            PairingError::Store(inner) => ApiError::Internal(inner),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Internal(e) => {
                // Store details stay in the log.
                error!("Internal error: {:#}", e);
                ErrorBody {
                    error: "Something went wrong.".into(),
                    detail: None,
                    raw: None,
                }
            }
            ApiError::BadRequest { error, detail } => ErrorBody { error, detail, raw: None },
            ApiError::Upstream { error, detail, .. } => ErrorBody {
                error,
                detail: Some(detail),
                raw: None,
            },
            ApiError::Parse { error, raw } => ErrorBody {
                error,
                detail: None,
                raw: Some(raw),
            },
            other => ErrorBody {
                error: other.to_string(),
                detail: None,
                raw: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
