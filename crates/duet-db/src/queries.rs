use crate::Database;
use crate::error::PairingError;
use crate::join_code::{MAX_CODE_ATTEMPTS, generate_join_code, normalize_join_code};
use crate::models::{DailyPromptRow, PairRow, ResponseRow};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, ffi};
use tracing::{debug, info};
use uuid::Uuid;

const PAIR_COLUMNS: &str = "id, join_code, user_a, user_b, created_at";
const PROMPT_COLUMNS: &str = "id, pair_id, date, tone, less_therapy, prompt, created_at";
const RESPONSE_COLUMNS: &str = "id, pair_id, date, user_id, answer, created_at";

impl Database {
    // -- Pairs --

    /// Create a pair owned by `user_a` under a freshly generated join code.
    pub fn create_pair(&self, user_a: &str) -> Result<PairRow, PairingError> {
        let mut rng = rand::rng();
        self.create_pair_with(user_a, || generate_join_code(&mut rng))
    }

    /// Like [`Database::create_pair`] but drawing codes from `next_code`.
    /// A code that collides with an existing pair is discarded and another
    /// drawn, up to [`MAX_CODE_ATTEMPTS`] inserts.
    pub fn create_pair_with<F>(&self, user_a: &str, mut next_code: F) -> Result<PairRow, PairingError>
    where
        F: FnMut() -> String,
    {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let id = Uuid::new_v4().to_string();
            let code = next_code();
            if let Some(row) = self.try_insert_pair(&id, &code, user_a)? {
                info!(pair_id = %row.id, attempt, "Pair created");
                return Ok(row);
            }
            debug!(attempt, "Join code collision, drawing another");
        }
        Err(PairingError::CodeExhausted(MAX_CODE_ATTEMPTS))
    }

    /// Insert a pair; `None` when the join code is already taken.
    fn try_insert_pair(&self, id: &str, code: &str, user_a: &str) -> Result<Option<PairRow>> {
        self.with_conn(|conn| {
            match conn.execute(
                "INSERT INTO pairs (id, join_code, user_a) VALUES (?1, ?2, ?3)",
                (id, code, user_a),
            ) {
                Ok(_) => query_pair(conn, "id", id),
                Err(e) if is_unique_violation(&e) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Join the pair behind `code` as its second member.
    pub fn join_pair(&self, user_id: &str, code: &str) -> Result<PairRow, PairingError> {
        let code = normalize_join_code(code);
        let pair = self.get_pair_by_code(&code)?.ok_or(PairingError::NotFound)?;

        if pair.user_a == user_id {
            return Err(PairingError::OwnPair);
        }
        if pair.user_b.is_some() {
            return Err(PairingError::AlreadyFull);
        }

        if !self.claim_second_slot(&pair.id, user_id)? {
            return Err(PairingError::JoinRace);
        }

        info!(pair_id = %pair.id, "Pair joined");
        self.get_pair(&pair.id)?
            .ok_or_else(|| PairingError::Store(anyhow!("pair {} vanished after join", pair.id)))
    }

    /// Conditionally set `user_b`. Only succeeds while the slot is still
    /// empty, so of two racing joiners exactly one gets `true`.
    pub fn claim_second_slot(&self, pair_id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE pairs SET user_b = ?1 WHERE id = ?2 AND user_b IS NULL",
                (user_id, pair_id),
            )?;
            Ok(updated == 1)
        })
    }

    pub fn get_pair(&self, id: &str) -> Result<Option<PairRow>> {
        self.with_conn(|conn| query_pair(conn, "id", id))
    }

    pub fn get_pair_by_code(&self, code: &str) -> Result<Option<PairRow>> {
        self.with_conn(|conn| query_pair(conn, "join_code", code))
    }

    /// Most recently created pair the user belongs to.
    pub fn current_pair_for_user(&self, user_id: &str) -> Result<Option<PairRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PAIR_COLUMNS} FROM pairs
                 WHERE user_a = ?1 OR user_b = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT 1"
            ))?;
            let row = stmt.query_row([user_id], map_pair).optional()?;
            Ok(row)
        })
    }

    // -- Daily prompts --

    /// Store the prompt for (pair, date), replacing any earlier one for the
    /// same day. Returns the stored row and whether a prompt was replaced.
    pub fn upsert_daily_prompt(
        &self,
        pair_id: &str,
        date: &str,
        tone: &str,
        less_therapy: bool,
        prompt: &str,
    ) -> Result<(DailyPromptRow, bool)> {
        self.with_conn(|conn| {
            let replaced = query_daily_prompt(conn, pair_id, date)?.is_some();

            conn.execute(
                "INSERT INTO daily_prompts (id, pair_id, date, tone, less_therapy, prompt)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(pair_id, date) DO UPDATE SET
                     tone = excluded.tone,
                     less_therapy = excluded.less_therapy,
                     prompt = excluded.prompt",
                rusqlite::params![
                    Uuid::new_v4().to_string(),
                    pair_id,
                    date,
                    tone,
                    less_therapy,
                    prompt
                ],
            )?;

            let row = query_daily_prompt(conn, pair_id, date)?
                .ok_or_else(|| anyhow!("daily prompt missing after upsert"))?;
            Ok((row, replaced))
        })
    }

    pub fn get_daily_prompt(&self, pair_id: &str, date: &str) -> Result<Option<DailyPromptRow>> {
        self.with_conn(|conn| query_daily_prompt(conn, pair_id, date))
    }

    // -- Responses --

    /// Record a member's answer; resubmitting the same day overwrites it.
    pub fn upsert_response(&self, pair_id: &str, date: &str, user_id: &str, answer: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO responses (id, pair_id, date, user_id, answer)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(pair_id, date, user_id) DO UPDATE SET
                     answer = excluded.answer",
                rusqlite::params![Uuid::new_v4().to_string(), pair_id, date, user_id, answer],
            )?;
            Ok(())
        })
    }

    pub fn get_responses(&self, pair_id: &str, date: &str) -> Result<Vec<ResponseRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RESPONSE_COLUMNS} FROM responses
                 WHERE pair_id = ?1 AND date = ?2
                 ORDER BY created_at, rowid"
            ))?;

            let rows = stmt
                .query_map((pair_id, date), |row| {
                    Ok(ResponseRow {
                        id: row.get(0)?,
                        pair_id: row.get(1)?,
                        date: row.get(2)?,
                        user_id: row.get(3)?,
                        answer: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

/// UNIQUE constraint failures only. NOT NULL, foreign key and primary key
/// violations are real store errors.
fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(err, _) if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE)
}

fn map_pair(row: &rusqlite::Row<'_>) -> rusqlite::Result<PairRow> {
    Ok(PairRow {
        id: row.get(0)?,
        join_code: row.get(1)?,
        user_a: row.get(2)?,
        user_b: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// `column` is always one of our own literals, never user input.
fn query_pair(conn: &Connection, column: &str, value: &str) -> Result<Option<PairRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {PAIR_COLUMNS} FROM pairs WHERE {column} = ?1"))?;
    let row = stmt.query_row([value], map_pair).optional()?;
    Ok(row)
}

fn query_daily_prompt(conn: &Connection, pair_id: &str, date: &str) -> Result<Option<DailyPromptRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROMPT_COLUMNS} FROM daily_prompts WHERE pair_id = ?1 AND date = ?2"
    ))?;

    let row = stmt
        .query_row((pair_id, date), |row| {
            Ok(DailyPromptRow {
                id: row.get(0)?,
                pair_id: row.get(1)?,
                date: row.get(2)?,
                tone: row.get(3)?,
                less_therapy: row.get(4)?,
                prompt: row.get(5)?,
                created_at: row.get(6)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
