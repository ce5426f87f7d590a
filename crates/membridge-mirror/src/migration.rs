//! Schema migrations for the SQLite mirror.
//!
//! Versions are applied in order inside individual transactions and recorded
//! in `schema_migrations`. Opening a mirror always runs [`migrate`], which is
//! a no-op when the schema is current.

use rusqlite::Connection;

use crate::error::{MirrorError, Result};

/// Schema version the code expects.
pub const CURRENT_VERSION: u32 = 1;

/// Bring the connected database up to [`CURRENT_VERSION`].
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    for version in (current + 1)..=CURRENT_VERSION {
        let tx = conn.transaction()?;
        apply_migration(&tx, version)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
            rusqlite::params![version, now_millis()],
        )?;
        tx.commit()?;
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        v => Err(MirrorError::Migration(format!(
            "unknown migration version {v}"
        ))),
    }
}

/// v1: mirrored collections, the sync cursor table and lookup indexes.
///
/// Column names keep the wire spelling (`deckId`, `serverMod`, ...) so rows
/// decoded from a changeset can be written without renaming, and so a
/// database seeded from a full server snapshot is readable as-is.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One row per remote card. Scheduling columns ride along untouched;
        -- the bridge reads identity, tombstone and field-content columns.
        CREATE TABLE card (
            id INTEGER PRIMARY KEY,
            mod INTEGER NOT NULL,
            serverMod INTEGER NOT NULL,
            del INTEGER NOT NULL,
            deckId INTEGER NOT NULL,
            cardTypeId INTEGER NOT NULL,
            created INTEGER NOT NULL,
            primaryField TEXT NOT NULL,
            secondaryField TEXT NOT NULL,
            fields TEXT NOT NULL,
            words TEXT NOT NULL,
            due INTEGER NOT NULL,
            balancedDue INTEGER NOT NULL,
            interval REAL NOT NULL,
            factor REAL NOT NULL,
            lastReview INTEGER NOT NULL,
            reviewCount INTEGER NOT NULL,
            passCount INTEGER NOT NULL,
            failCount INTEGER NOT NULL,
            lapseCount INTEGER NOT NULL,
            pos INTEGER NOT NULL,
            lessonId INTEGER,
            seedMod INTEGER NOT NULL,
            notes INTEGER NOT NULL,
            seedDel INTEGER NOT NULL,
            suspended INTEGER NOT NULL,
            isSample INTEGER NOT NULL,
            replacementCardId INTEGER NOT NULL
        );

        -- Card types, including the JSON field-definition blob in `config`.
        CREATE TABLE card_type (
            id INTEGER PRIMARY KEY,
            mod INTEGER NOT NULL,
            serverMod INTEGER NOT NULL,
            del INTEGER NOT NULL,
            lang TEXT NOT NULL,
            name TEXT NOT NULL,
            config TEXT NOT NULL
        );

        -- Decks with their per-deck scheduler tuning columns.
        CREATE TABLE deck (
            id INTEGER PRIMARY KEY,
            mod INTEGER NOT NULL,
            serverMod INTEGER NOT NULL,
            del INTEGER NOT NULL,
            lang TEXT NOT NULL,
            name TEXT NOT NULL,
            icon TEXT NOT NULL,
            lastRecalc INTEGER NOT NULL,
            newBatchMax INTEGER NOT NULL,
            newBatchSize INTEGER NOT NULL,
            newGraduateCount INTEGER NOT NULL,
            factorMon REAL NOT NULL,
            factorTue REAL NOT NULL,
            factorWed REAL NOT NULL,
            factorThu REAL NOT NULL,
            factorFri REAL NOT NULL,
            factorSat REAL NOT NULL,
            factorSun REAL NOT NULL,
            retention10 REAL NOT NULL,
            retention35 REAL NOT NULL,
            retention100 REAL NOT NULL,
            retention350 REAL NOT NULL,
            retention1000 REAL NOT NULL,
            intervalFactor10 REAL NOT NULL,
            intervalFactor35 REAL NOT NULL,
            intervalFactor100 REAL NOT NULL,
            intervalFactor350 REAL NOT NULL,
            intervalFactor1000 REAL NOT NULL,
            learningMaterialId INTEGER NOT NULL,
            seedMod INTEGER NOT NULL,
            seedDel INTEGER NOT NULL,
            courseType TEXT NOT NULL
        );

        -- Card-to-word links. No surrogate id upstream; identity is the
        -- composite key.
        CREATE TABLE CardWordRelation (
            mod INTEGER NOT NULL,
            serverMod INTEGER NOT NULL,
            del INTEGER NOT NULL,
            seedMod INTEGER NOT NULL,
            seedDel INTEGER NOT NULL,
            cardId INTEGER NOT NULL,
            dictForm TEXT NOT NULL,
            secondary TEXT NOT NULL,
            partOfSpeech TEXT NOT NULL,
            language TEXT NOT NULL,
            isTargetWord INTEGER NOT NULL,
            occurrences INTEGER NOT NULL,
            PRIMARY KEY (cardId, dictForm, secondary, partOfSpeech, language)
        );

        -- Per-word knowledge state, keyed by the word's natural key.
        CREATE TABLE WordList (
            dictForm TEXT NOT NULL,
            secondary TEXT NOT NULL,
            partOfSpeech TEXT NOT NULL,
            language TEXT NOT NULL,
            mod INTEGER NOT NULL,
            serverMod INTEGER NOT NULL,
            del INTEGER NOT NULL,
            knownStatus TEXT NOT NULL,
            hasCard INTEGER NOT NULL,
            tracked INTEGER NOT NULL,
            PRIMARY KEY (dictForm, secondary, partOfSpeech, language)
        );

        -- Sync cursor slots. Both rows exist from the start so cursor
        -- updates are plain UPDATEs.
        CREATE TABLE local_data (
            id TEXT PRIMARY KEY,
            last_sync INTEGER NOT NULL
        );
        INSERT OR IGNORE INTO local_data (id, last_sync) VALUES ('pullSync', 0);
        INSERT OR IGNORE INTO local_data (id, last_sync) VALUES ('pushSync', 0);

        CREATE INDEX idx_card_type_lang ON card_type (lang);
        CREATE INDEX idx_deck_lang ON deck (lang);
        CREATE INDEX idx_card_deck ON card (deckId);
        "#,
    )?;
    Ok(())
}

fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as u64
}
