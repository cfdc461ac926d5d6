use axum::{Json, body::Bytes, extract::State};

use duet_llm::GenerateError;
use duet_types::api::{GenerateRequest, GenerateResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/generate — stateless proxy to the prompt generator.
///
/// The credential is checked before the body is even parsed, so a server
/// without `GEMINI_API_KEY` answers 500 to every call.
pub async fn generate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, ApiError> {
    if !state.llm.has_credential() {
        return Err(GenerateError::MissingCredential.into());
    }

    let req: GenerateRequest = serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest {
        error: "Invalid JSON payload.".into(),
        detail: Some(e.to_string()),
    })?;

    let prompt = state
        .llm
        .generate_prompt(req.tone(), req.less_therapy)
        .await?;

    Ok(Json(GenerateResponse { prompt }))
}
