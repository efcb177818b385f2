//! Versioned schema migrations.
//!
//! One table per entity, each with the shared tracked-item columns
//! (`id`, optional parent foreign key, dense `ord`, `image_path`,
//! `image_alt`) plus its own fields. Parent links cascade on delete as a
//! storage-level backstop; the engine still deletes children explicitly so
//! image bookkeeping runs bottom-up.

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

/// Current schema version; bump together with a new migration step.
pub const LATEST_SCHEMA_VERSION: u32 = 1;

const V1: &str = "
CREATE TABLE schema_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL
);

CREATE TABLE faqs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ord INTEGER NOT NULL,
    question TEXT NOT NULL,
    answer TEXT NOT NULL,
    image_path TEXT,
    image_alt TEXT
);

CREATE TABLE info_cards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ord INTEGER NOT NULL,
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    color INTEGER NOT NULL,
    image_path TEXT,
    image_alt TEXT
);

CREATE TABLE form_questions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    form_id INTEGER NOT NULL,
    ord INTEGER NOT NULL,
    text TEXT NOT NULL,
    required INTEGER NOT NULL,
    kind TEXT NOT NULL,
    slider_min INTEGER,
    slider_max INTEGER,
    image_path TEXT,
    image_alt TEXT
);
CREATE INDEX idx_form_questions_form ON form_questions (form_id, ord);

CREATE TABLE form_options (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    question_id INTEGER NOT NULL REFERENCES form_questions (id) ON DELETE CASCADE,
    ord INTEGER NOT NULL,
    text TEXT NOT NULL,
    image_path TEXT,
    image_alt TEXT
);
CREATE INDEX idx_form_options_question ON form_options (question_id, ord);

CREATE TABLE slider_labels (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    question_id INTEGER NOT NULL REFERENCES form_questions (id) ON DELETE CASCADE,
    ord INTEGER NOT NULL,
    text TEXT NOT NULL,
    image_path TEXT,
    image_alt TEXT
);
CREATE INDEX idx_slider_labels_question ON slider_labels (question_id, ord);

CREATE TABLE test_groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ord INTEGER NOT NULL,
    label TEXT NOT NULL,
    probability INTEGER NOT NULL,
    image_path TEXT,
    image_alt TEXT
);

CREATE TABLE protocols (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    group_id INTEGER NOT NULL REFERENCES test_groups (id) ON DELETE CASCADE,
    ord INTEGER NOT NULL,
    name TEXT NOT NULL,
    summary TEXT NOT NULL,
    image_path TEXT,
    image_alt TEXT
);
CREATE INDEX idx_protocols_group ON protocols (group_id, ord);

CREATE TABLE phases (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    protocol_id INTEGER NOT NULL REFERENCES protocols (id) ON DELETE CASCADE,
    ord INTEGER NOT NULL,
    title TEXT NOT NULL,
    duration_days INTEGER,
    image_path TEXT,
    image_alt TEXT
);
CREATE INDEX idx_phases_protocol ON phases (protocol_id, ord);

CREATE TABLE test_questions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    phase_id INTEGER NOT NULL REFERENCES phases (id) ON DELETE CASCADE,
    ord INTEGER NOT NULL,
    text TEXT NOT NULL,
    required INTEGER NOT NULL,
    kind TEXT NOT NULL,
    image_path TEXT,
    image_alt TEXT
);
CREATE INDEX idx_test_questions_phase ON test_questions (phase_id, ord);

CREATE TABLE test_options (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    question_id INTEGER NOT NULL REFERENCES test_questions (id) ON DELETE CASCADE,
    ord INTEGER NOT NULL,
    text TEXT NOT NULL,
    image_path TEXT,
    image_alt TEXT
);
CREATE INDEX idx_test_options_question ON test_options (question_id, ord);
";

/// Migrate the schema to [`LATEST_SCHEMA_VERSION`]. Idempotent.
///
/// # Errors
///
/// Returns an error when a migration step or the version bump fails.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    let from = current_schema_version(conn)?;
    if from >= LATEST_SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction().context("begin migration transaction")?;
    if from < 1 {
        tx.execute_batch(V1).context("apply schema v1")?;
    }
    tx.execute(
        "INSERT INTO schema_meta (id, version) VALUES (1, ?1)
         ON CONFLICT (id) DO UPDATE SET version = excluded.version",
        [LATEST_SCHEMA_VERSION],
    )
    .context("record schema version")?;
    tx.commit().context("commit migration")?;

    info!(from, to = LATEST_SCHEMA_VERSION, "schema migrated");
    Ok(())
}

/// Schema version currently recorded; 0 for a fresh database.
///
/// # Errors
///
/// Returns an error when the version query fails.
pub fn current_schema_version(conn: &Connection) -> Result<u32> {
    let has_meta: bool = conn
        .query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_meta')",
            [],
            |row| row.get(0),
        )
        .context("probe schema_meta")?;
    if !has_meta {
        return Ok(0);
    }
    conn.query_row("SELECT version FROM schema_meta WHERE id = 1", [], |row| {
        row.get(0)
    })
    .context("read schema version")
}
