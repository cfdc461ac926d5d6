use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use duet_db::models::format_date;
use duet_types::api::{Claims, SubmitAnswerRequest, TodayPromptRequest, TodayView};
use duet_types::models::{DailyPrompt, Response as Answer};
use duet_types::reveal::RevealState;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::pairs::load_member_pair;
use crate::state::{AppState, with_db};

pub const MAX_ANSWER_CHARS: usize = 500;

/// Trim an answer and reject blank or overlong ones.
pub fn normalize_answer(answer: &str) -> Result<String, ApiError> {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request("Write a one sentence answer first."));
    }
    if trimmed.chars().count() > MAX_ANSWER_CHARS {
        return Err(ApiError::bad_request(format!(
            "Keep it to one sentence ({} characters max).",
            MAX_ANSWER_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

/// GET /api/pairs/{pair_id}/today — what the client polls.
pub async fn today_view(
    State(state): State<AppState>,
    Path(pair_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<TodayView>, ApiError> {
    load_member_pair(&state, pair_id, claims.sub).await?;
    let date = state.clock.today();

    build_view(&state, pair_id, claims.sub, date).await.map(Json)
}

/// POST /api/pairs/{pair_id}/today/prompt — generate and store today's prompt.
///
/// Generating again on the same day replaces the stored prompt.
pub async fn generate_today_prompt(
    State(state): State<AppState>,
    Path(pair_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<TodayPromptRequest>,
) -> Result<impl IntoResponse, ApiError> {
    load_member_pair(&state, pair_id, claims.sub).await?;

    let tone = req.tone.unwrap_or_default();
    let less_therapy = req.less_therapy;
    let text = state.llm.generate_prompt(tone.as_str(), less_therapy).await?;

    let date = state.clock.today();
    let (pid, day) = (pair_id.to_string(), format_date(date));
    let (row, replaced) = with_db(&state, move |db| {
        db.upsert_daily_prompt(&pid, &day, tone.as_str(), less_therapy, &text)
    })
    .await?;

    if replaced {
        info!(%pair_id, %date, "Replaced existing daily prompt");
    } else {
        info!(%pair_id, %date, %tone, "Daily prompt stored");
    }

    Ok((StatusCode::CREATED, Json(DailyPrompt::try_from(row)?)))
}

/// POST /api/pairs/{pair_id}/today/response — record the caller's answer.
///
/// Answers are only taken once the day's prompt exists.
pub async fn submit_response(
    State(state): State<AppState>,
    Path(pair_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<SubmitAnswerRequest>,
) -> Result<Json<TodayView>, ApiError> {
    let answer = normalize_answer(&req.answer)?;
    load_member_pair(&state, pair_id, claims.sub).await?;

    let date = state.clock.today();
    let (pid, day, uid) = (pair_id.to_string(), format_date(date), claims.sub.to_string());
    with_db(&state, move |db| {
        if db.get_daily_prompt(&pid, &day)?.is_none() {
            return Err(ApiError::Conflict("Generate a prompt first.".into()));
        }
        db.upsert_response(&pid, &day, &uid, &answer)?;
        Ok(())
    })
    .await?;

    let view = build_view(&state, pair_id, claims.sub, date).await?;
    info!(%pair_id, user_id = %claims.sub, %date, reveal = view.reveal.label(), "Answer recorded");
    Ok(Json(view))
}

async fn build_view(
    state: &AppState,
    pair_id: Uuid,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<TodayView, ApiError> {
    let (pid, day) = (pair_id.to_string(), format_date(date));
    let (prompt_row, answer_rows) = with_db(state, move |db| {
        let prompt = db.get_daily_prompt(&pid, &day)?;
        let answers = db.get_responses(&pid, &day)?;
        Ok::<_, anyhow::Error>((prompt, answers))
    })
    .await?;

    let prompt = prompt_row.map(DailyPrompt::try_from).transpose()?;
    let answers = answer_rows
        .into_iter()
        .map(Answer::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(TodayView {
        pair_id,
        date,
        prompt,
        reveal: RevealState::for_user(user_id, &answers),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_are_trimmed() {
        assert_eq!(normalize_answer("  Tacos, obviously.  ").unwrap(), "Tacos, obviously.");
    }

    #[test]
    fn blank_answers_are_rejected() {
        for blank in ["", "   ", "\n\t"] {
            let err = normalize_answer(blank).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn overlong_answers_are_rejected() {
        let long = "a".repeat(MAX_ANSWER_CHARS + 1);
        assert!(normalize_answer(&long).is_err());
        assert!(normalize_answer(&"a".repeat(MAX_ANSWER_CHARS)).is_ok());
    }
}
