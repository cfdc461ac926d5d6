//! Database row types. These map directly to SQLite rows and are kept apart
//! from the duet-types models so the DB layer stays independent.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use duet_types::models::{DailyPrompt, Pair, Response};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct PairRow {
    pub id: String,
    pub join_code: String,
    pub user_a: String,
    pub user_b: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct DailyPromptRow {
    pub id: String,
    pub pair_id: String,
    pub date: String,
    pub tone: String,
    pub less_therapy: bool,
    pub prompt: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct ResponseRow {
    pub id: String,
    pub pair_id: String,
    pub date: String,
    pub user_id: String,
    pub answer: String,
    pub created_at: String,
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).with_context(|| format!("corrupt date '{}'", s))
}

fn parse_uuid(field: &str, s: &str) -> Result<Uuid> {
    s.parse().with_context(|| format!("corrupt {} '{}'", field, s))
}

/// SQLite stores `datetime('now')` as "YYYY-MM-DD HH:MM:SS" without a zone.
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    s.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .map_err(|e| anyhow!("corrupt timestamp '{}': {}", s, e))
}

impl TryFrom<PairRow> for Pair {
    type Error = anyhow::Error;

    fn try_from(row: PairRow) -> Result<Self> {
        Ok(Pair {
            id: parse_uuid("pair id", &row.id)?,
            user_a: parse_uuid("user_a", &row.user_a)?,
            user_b: row.user_b.as_deref().map(|b| parse_uuid("user_b", b)).transpose()?,
            created_at: parse_timestamp(&row.created_at)?,
            join_code: row.join_code,
        })
    }
}

impl TryFrom<DailyPromptRow> for DailyPrompt {
    type Error = anyhow::Error;

    fn try_from(row: DailyPromptRow) -> Result<Self> {
        Ok(DailyPrompt {
            id: parse_uuid("prompt id", &row.id)?,
            pair_id: parse_uuid("pair_id", &row.pair_id)?,
            date: parse_date(&row.date)?,
            tone: row.tone.parse()?,
            less_therapy: row.less_therapy,
            created_at: parse_timestamp(&row.created_at)?,
            prompt: row.prompt,
        })
    }
}

impl TryFrom<ResponseRow> for Response {
    type Error = anyhow::Error;

    fn try_from(row: ResponseRow) -> Result<Self> {
        Ok(Response {
            id: parse_uuid("response id", &row.id)?,
            pair_id: parse_uuid("pair_id", &row.pair_id)?,
            date: parse_date(&row.date)?,
            user_id: parse_uuid("user_id", &row.user_id)?,
            created_at: parse_timestamp(&row.created_at)?,
            answer: row.answer,
        })
    }
}
