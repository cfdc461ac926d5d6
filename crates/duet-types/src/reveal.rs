use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Response;

/// What a member is allowed to see of today's answers.
///
/// The partner's answer text only ever appears in `Revealed`, which requires
/// at least two response rows for the (pair, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum RevealState {
    /// Nobody has answered yet.
    None,
    /// Exactly one answer exists. `own_answer` is set when it is the
    /// requester's; otherwise the partner went first and their text stays hidden.
    Waiting { own_answer: Option<String> },
    /// Both answered.
    Revealed {
        own_answer: Option<String>,
        partner_answer: String,
    },
}

impl RevealState {
    /// Compute the reveal state of `responses` as seen by `requester`.
    pub fn for_user(requester: Uuid, responses: &[Response]) -> Self {
        let own = responses.iter().find(|r| r.user_id == requester);
        match responses.len() {
            0 => RevealState::None,
            1 => RevealState::Waiting {
                own_answer: own.map(|r| r.answer.clone()),
            },
            _ => {
                // At least one row is not the requester's: the key is
                // (pair, date, user) so the requester owns at most one.
                let partner = responses
                    .iter()
                    .find(|r| r.user_id != requester)
                    .map(|r| r.answer.clone())
                    .unwrap_or_default();
                RevealState::Revealed {
                    own_answer: own.map(|r| r.answer.clone()),
                    partner_answer: partner,
                }
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RevealState::None => "none",
            RevealState::Waiting { .. } => "waiting",
            RevealState::Revealed { .. } => "revealed",
        }
    }
}
