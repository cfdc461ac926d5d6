use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wording style requested from the prompt generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Cute,
    Deep,
    Goofy,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Cute, Tone::Deep, Tone::Goofy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Cute => "cute",
            Tone::Deep => "deep",
            Tone::Goofy => "goofy",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown tone: {0}")]
pub struct UnknownTone(pub String);

impl FromStr for Tone {
    type Err = UnknownTone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cute" => Ok(Tone::Cute),
            "deep" => Ok(Tone::Deep),
            "goofy" => Ok(Tone::Goofy),
            other => Err(UnknownTone(other.to_string())),
        }
    }
}

/// Two users sharing one daily prompt. `user_b` stays empty until someone
/// joins with the code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub id: Uuid,
    pub join_code: String,
    pub user_a: Uuid,
    pub user_b: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Pair {
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.user_a == user_id || self.user_b == Some(user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPrompt {
    pub id: Uuid,
    pub pair_id: Uuid,
    pub date: NaiveDate,
    pub tone: Tone,
    pub less_therapy: bool,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
}

/// One member's answer for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub id: Uuid,
    pub pair_id: Uuid,
    pub date: NaiveDate,
    pub user_id: Uuid,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}
