//! Relational schema for the PostgreSQL store.
//!
//! The location is embedded in the camp row. Deleting a camp deletes its
//! talks; a speaker referenced by a talk cannot be deleted.

use sqlx::PgPool;
use tracing::instrument;

use super::postgres::map_sqlx_error;
use super::r#trait::RepositoryResult;

pub const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS speakers (
        speaker_id  SERIAL PRIMARY KEY,
        first_name  TEXT NOT NULL,
        last_name   TEXT NOT NULL,
        middle_name TEXT,
        company     TEXT,
        company_url TEXT,
        blog_url    TEXT,
        twitter     TEXT,
        github      TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS camps (
        camp_id        SERIAL PRIMARY KEY,
        name           VARCHAR(100) NOT NULL,
        moniker        TEXT NOT NULL UNIQUE,
        event_date     DATE NOT NULL,
        length         INTEGER NOT NULL CHECK (length BETWEEN 1 AND 100),
        venue_name     TEXT,
        address1       TEXT,
        address2       TEXT,
        address3       TEXT,
        city_town      TEXT,
        state_province TEXT,
        postal_code    TEXT,
        country        TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS talks (
        talk_id    SERIAL PRIMARY KEY,
        camp_id    INTEGER NOT NULL REFERENCES camps (camp_id) ON DELETE CASCADE,
        speaker_id INTEGER NOT NULL REFERENCES speakers (speaker_id),
        title      TEXT NOT NULL,
        abstract   TEXT NOT NULL,
        level      INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS talks_camp_id_idx ON talks (camp_id)",
    "CREATE INDEX IF NOT EXISTS camps_event_date_idx ON camps (event_date)",
];

/// Create any missing tables. Safe to run on every startup.
#[instrument(skip(pool))]
pub async fn ensure_schema(pool: &PgPool) -> RepositoryResult<()> {
    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    }
    Ok(())
}
