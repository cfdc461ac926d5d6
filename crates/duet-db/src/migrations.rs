use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (pairs, daily prompts, responses)");
        conn.execute_batch(
            "
            CREATE TABLE pairs (
                id          TEXT PRIMARY KEY,
                join_code   TEXT NOT NULL UNIQUE,
                user_a      TEXT NOT NULL,
                user_b      TEXT,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_pairs_user_a ON pairs(user_a);
            CREATE INDEX idx_pairs_user_b ON pairs(user_b);

            CREATE TABLE daily_prompts (
                id            TEXT PRIMARY KEY,
                pair_id       TEXT NOT NULL REFERENCES pairs(id),
                date          TEXT NOT NULL,
                tone          TEXT NOT NULL,
                less_therapy  INTEGER NOT NULL DEFAULT 0,
                prompt        TEXT NOT NULL,
                created_at    TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(pair_id, date)
            );

            CREATE TABLE responses (
                id          TEXT PRIMARY KEY,
                pair_id     TEXT NOT NULL REFERENCES pairs(id),
                date        TEXT NOT NULL,
                user_id     TEXT NOT NULL,
                answer      TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(pair_id, date, user_id)
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
