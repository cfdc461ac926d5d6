use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use duet_types::api::{Claims, JoinPairRequest};
use duet_types::models::Pair;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::{AppState, with_db};

/// POST /api/pairs — start a pair and get a join code to share.
pub async fn create_pair(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let row = with_db(&state, move |db| db.create_pair(&user_id)).await?;

    Ok((StatusCode::CREATED, Json(Pair::try_from(row)?)))
}

/// POST /api/pairs/join — become the second member of a pair.
pub async fn join_pair(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<JoinPairRequest>,
) -> Result<Json<Pair>, ApiError> {
    if req.code.trim().is_empty() {
        return Err(ApiError::bad_request("Enter a join code first."));
    }

    let user_id = claims.sub.to_string();
    let row = with_db(&state, move |db| db.join_pair(&user_id, &req.code)).await?;
    let pair = Pair::try_from(row)?;

    info!(pair_id = %pair.id, user_id = %claims.sub, "User joined pair");
    Ok(Json(pair))
}

/// GET /api/pairs/current — the caller's most recent pair.
pub async fn current_pair(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Pair>, ApiError> {
    let user_id = claims.sub.to_string();
    let row = with_db(&state, move |db| db.current_pair_for_user(&user_id))
        .await?
        .ok_or_else(|| ApiError::NotFound("No pair found. Create or join a pair first.".into()))?;

    Ok(Json(Pair::try_from(row)?))
}

/// GET /api/pairs/{pair_id}
pub async fn get_pair(
    State(state): State<AppState>,
    Path(pair_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Pair>, ApiError> {
    load_member_pair(&state, pair_id, claims.sub).await.map(Json)
}

/// Fetch a pair the user belongs to. Pairs the user is not part of look
/// exactly like pairs that do not exist.
pub(crate) async fn load_member_pair(
    state: &AppState,
    pair_id: Uuid,
    user_id: Uuid,
) -> Result<Pair, ApiError> {
    let row = with_db(state, move |db| db.get_pair(&pair_id.to_string())).await?;

    row.map(Pair::try_from)
        .transpose()?
        .filter(|pair| pair.is_member(user_id))
        .ok_or_else(|| ApiError::NotFound("Pair not found.".into()))
}
