//! SQLite implementation of the Mirror trait.
//!
//! This is the primary storage backend for Membridge. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use membridge_core::{CardId, CardRow, CardTypeId, CardTypeRow, DeckId, DeckRow, SyncCursor};

use crate::error::{MirrorError, Result};
use crate::migration;
use crate::traits::{Mirror, MirrorRecord};

/// SQLite-based mirror implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteMirror {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMirror {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|e| {
                MirrorError::Database(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
                    Some(format!("mutex poisoned: {}", e)),
                ))
            })?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            MirrorError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(format!("spawn_blocking failed: {}", e)),
            ))
        })?
    }
}

// Helper to convert a row to CardRow
fn row_to_card(row: &rusqlite::Row<'_>) -> rusqlite::Result<CardRow> {
    Ok(CardRow {
        id: CardId::new(row.get("id")?),
        modified: row.get("mod")?,
        server_mod: row.get("serverMod")?,
        deleted: row.get("del")?,
        deck_id: DeckId::new(row.get("deckId")?),
        card_type_id: CardTypeId::new(row.get("cardTypeId")?),
        created: row.get("created")?,
        primary_field: row.get("primaryField")?,
        secondary_field: row.get("secondaryField")?,
        fields: row.get("fields")?,
        words: row.get("words")?,
        due: row.get("due")?,
        balanced_due: row.get("balancedDue")?,
        interval: row.get("interval")?,
        factor: row.get("factor")?,
        last_review: row.get("lastReview")?,
        review_count: row.get("reviewCount")?,
        pass_count: row.get("passCount")?,
        fail_count: row.get("failCount")?,
        lapse_count: row.get("lapseCount")?,
        pos: row.get("pos")?,
        lesson_id: row.get("lessonId")?,
        seed_mod: row.get("seedMod")?,
        notes: row.get("notes")?,
        seed_del: row.get("seedDel")?,
        suspended: row.get("suspended")?,
        is_sample: row.get("isSample")?,
        replacement_card_id: row.get("replacementCardId")?,
    })
}

// Helper to convert a row to CardTypeRow
fn row_to_card_type(row: &rusqlite::Row<'_>) -> rusqlite::Result<CardTypeRow> {
    Ok(CardTypeRow {
        id: CardTypeId::new(row.get("id")?),
        modified: row.get("mod")?,
        server_mod: row.get("serverMod")?,
        deleted: row.get("del")?,
        lang: row.get("lang")?,
        name: row.get("name")?,
        config: row.get("config")?,
    })
}

// Helper to convert a row to DeckRow
fn row_to_deck(row: &rusqlite::Row<'_>) -> rusqlite::Result<DeckRow> {
    Ok(DeckRow {
        id: DeckId::new(row.get("id")?),
        modified: row.get("mod")?,
        server_mod: row.get("serverMod")?,
        deleted: row.get("del")?,
        lang: row.get("lang")?,
        name: row.get("name")?,
        icon: row.get("icon")?,
        last_recalc: row.get("lastRecalc")?,
        new_batch_max: row.get("newBatchMax")?,
        new_batch_size: row.get("newBatchSize")?,
        new_graduate_count: row.get("newGraduateCount")?,
        factor_mon: row.get("factorMon")?,
        factor_tue: row.get("factorTue")?,
        factor_wed: row.get("factorWed")?,
        factor_thu: row.get("factorThu")?,
        factor_fri: row.get("factorFri")?,
        factor_sat: row.get("factorSat")?,
        factor_sun: row.get("factorSun")?,
        retention10: row.get("retention10")?,
        retention35: row.get("retention35")?,
        retention100: row.get("retention100")?,
        retention350: row.get("retention350")?,
        retention1000: row.get("retention1000")?,
        interval_factor10: row.get("intervalFactor10")?,
        interval_factor35: row.get("intervalFactor35")?,
        interval_factor100: row.get("intervalFactor100")?,
        interval_factor350: row.get("intervalFactor350")?,
        interval_factor1000: row.get("intervalFactor1000")?,
        learning_material_id: row.get("learningMaterialId")?,
        seed_mod: row.get("seedMod")?,
        seed_del: row.get("seedDel")?,
        course_type: row.get("courseType")?,
    })
}

const CARD_COLUMNS: &str = "id, mod, serverMod, del, deckId, cardTypeId, created, \
     primaryField, secondaryField, fields, words, due, balancedDue, interval, factor, \
     lastReview, reviewCount, passCount, failCount, lapseCount, pos, lessonId, \
     seedMod, notes, seedDel, suspended, isSample, replacementCardId";

const DECK_COLUMNS: &str = "id, mod, serverMod, del, lang, name, icon, lastRecalc, \
     newBatchMax, newBatchSize, newGraduateCount, \
     factorMon, factorTue, factorWed, factorThu, factorFri, factorSat, factorSun, \
     retention10, retention35, retention100, retention350, retention1000, \
     intervalFactor10, intervalFactor35, intervalFactor100, intervalFactor350, \
     intervalFactor1000, learningMaterialId, seedMod, seedDel, courseType";

const CARD_TYPE_COLUMNS: &str = "id, mod, serverMod, del, lang, name, config";

/// Write one record with INSERT OR REPLACE. Works on a plain connection or
/// inside a transaction.
fn upsert_record(conn: &Connection, record: &MirrorRecord) -> Result<()> {
    match record {
        MirrorRecord::Card(card) => {
            conn.execute(
                &format!(
                    "INSERT OR REPLACE INTO card ({CARD_COLUMNS}) VALUES (
                        ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                        ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28
                    )"
                ),
                params![
                    card.id.as_i64(),
                    card.modified,
                    card.server_mod,
                    card.deleted,
                    card.deck_id.as_i64(),
                    card.card_type_id.as_i64(),
                    card.created,
                    card.primary_field,
                    card.secondary_field,
                    card.fields,
                    card.words,
                    card.due,
                    card.balanced_due,
                    card.interval,
                    card.factor,
                    card.last_review,
                    card.review_count,
                    card.pass_count,
                    card.fail_count,
                    card.lapse_count,
                    card.pos,
                    card.lesson_id,
                    card.seed_mod,
                    card.notes,
                    card.seed_del,
                    card.suspended,
                    card.is_sample,
                    card.replacement_card_id,
                ],
            )?;
        }
        MirrorRecord::CardType(card_type) => {
            conn.execute(
                &format!(
                    "INSERT OR REPLACE INTO card_type ({CARD_TYPE_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                ),
                params![
                    card_type.id.as_i64(),
                    card_type.modified,
                    card_type.server_mod,
                    card_type.deleted,
                    card_type.lang,
                    card_type.name,
                    card_type.config,
                ],
            )?;
        }
        MirrorRecord::Deck(deck) => {
            conn.execute(
                &format!(
                    "INSERT OR REPLACE INTO deck ({DECK_COLUMNS}) VALUES (
                        ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                        ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30,
                        ?31, ?32
                    )"
                ),
                params![
                    deck.id.as_i64(),
                    deck.modified,
                    deck.server_mod,
                    deck.deleted,
                    deck.lang,
                    deck.name,
                    deck.icon,
                    deck.last_recalc,
                    deck.new_batch_max,
                    deck.new_batch_size,
                    deck.new_graduate_count,
                    deck.factor_mon,
                    deck.factor_tue,
                    deck.factor_wed,
                    deck.factor_thu,
                    deck.factor_fri,
                    deck.factor_sat,
                    deck.factor_sun,
                    deck.retention10,
                    deck.retention35,
                    deck.retention100,
                    deck.retention350,
                    deck.retention1000,
                    deck.interval_factor10,
                    deck.interval_factor35,
                    deck.interval_factor100,
                    deck.interval_factor350,
                    deck.interval_factor1000,
                    deck.learning_material_id,
                    deck.seed_mod,
                    deck.seed_del,
                    deck.course_type,
                ],
            )?;
        }
        MirrorRecord::CardWordRelation(rel) => {
            conn.execute(
                "INSERT OR REPLACE INTO CardWordRelation (
                    mod, serverMod, del, seedMod, seedDel, cardId,
                    dictForm, secondary, partOfSpeech, language, isTargetWord, occurrences
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    rel.modified,
                    rel.server_mod,
                    rel.deleted,
                    rel.seed_mod,
                    rel.seed_del,
                    rel.card_id.as_i64(),
                    rel.dict_form,
                    rel.secondary,
                    rel.part_of_speech,
                    rel.language,
                    rel.is_target_word,
                    rel.occurrences,
                ],
            )?;
        }
        MirrorRecord::WordStatus(word) => {
            conn.execute(
                "INSERT OR REPLACE INTO WordList (
                    dictForm, secondary, partOfSpeech, language,
                    mod, serverMod, del, knownStatus, hasCard, tracked
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    word.dict_form,
                    word.secondary,
                    word.part_of_speech,
                    word.language,
                    word.modified,
                    word.server_mod,
                    word.deleted,
                    word.known_status,
                    word.has_card,
                    word.tracked,
                ],
            )?;
        }
    }
    Ok(())
}

#[async_trait]
impl Mirror for SqliteMirror {
    async fn upsert(&self, record: &MirrorRecord) -> Result<()> {
        let record = record.clone();
        self.blocking(move |conn| upsert_record(conn, &record)).await
    }

    async fn apply_batch(&self, records: &[MirrorRecord]) -> Result<usize> {
        let records = records.to_vec();
        self.blocking(move |conn| {
            let tx = conn.transaction()?;
            for record in &records {
                upsert_record(&tx, record)?;
            }
            tx.commit()?;
            Ok(records.len())
        })
        .await
    }

    async fn cursor(&self) -> Result<SyncCursor> {
        self.blocking(|conn| {
            let read = |slot: &str| -> Result<Option<i64>> {
                Ok(conn
                    .query_row(
                        "SELECT last_sync FROM local_data WHERE id = ?1",
                        params![slot],
                        |row| row.get(0),
                    )
                    .optional()?)
            };
            match (read("pullSync")?, read("pushSync")?) {
                (Some(last_pull), Some(last_push)) => Ok(SyncCursor {
                    last_pull,
                    last_push,
                }),
                _ => Err(MirrorError::InvalidData(
                    "sync cursor rows missing from local_data".into(),
                )),
            }
        })
        .await
    }

    async fn set_cursor(&self, cursor: SyncCursor) -> Result<()> {
        self.blocking(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "UPDATE local_data SET last_sync = ?1 WHERE id = 'pullSync'",
                params![cursor.last_pull],
            )?;
            tx.execute(
                "UPDATE local_data SET last_sync = ?1 WHERE id = 'pushSync'",
                params![cursor.last_push],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn languages(&self) -> Result<Vec<String>> {
        self.blocking(|conn| {
            let mut stmt = conn.prepare("SELECT lang FROM card_type WHERE del = 0 ORDER BY id")?;
            let langs = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            // First appearance in id order wins; later duplicates drop out.
            let mut seen = Vec::new();
            for lang in langs {
                if !seen.contains(&lang) {
                    seen.push(lang);
                }
            }
            Ok(seen)
        })
        .await
    }

    async fn decks_for_language(&self, lang: &str) -> Result<Vec<DeckRow>> {
        let lang = lang.to_owned();
        self.blocking(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {DECK_COLUMNS} FROM deck WHERE lang = ?1 AND del = 0 ORDER BY id"
            ))?;
            let decks = stmt
                .query_map(params![lang], row_to_deck)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(decks)
        })
        .await
    }

    async fn card_types_for_language(&self, lang: &str) -> Result<Vec<CardTypeRow>> {
        let lang = lang.to_owned();
        self.blocking(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CARD_TYPE_COLUMNS} FROM card_type
                 WHERE lang = ?1 AND del = 0 ORDER BY id"
            ))?;
            let types = stmt
                .query_map(params![lang], row_to_card_type)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(types)
        })
        .await
    }

    async fn deck(&self, id: DeckId) -> Result<DeckRow> {
        self.blocking(move |conn| {
            conn.query_row(
                &format!("SELECT {DECK_COLUMNS} FROM deck WHERE id = ?1"),
                params![id.as_i64()],
                row_to_deck,
            )
            .optional()?
            .ok_or_else(|| MirrorError::not_found("deck", id))
        })
        .await
    }

    async fn card_type(&self, id: CardTypeId) -> Result<CardTypeRow> {
        self.blocking(move |conn| {
            conn.query_row(
                &format!("SELECT {CARD_TYPE_COLUMNS} FROM card_type WHERE id = ?1"),
                params![id.as_i64()],
                row_to_card_type,
            )
            .optional()?
            .ok_or_else(|| MirrorError::not_found("card type", id))
        })
        .await
    }

    async fn card(&self, id: CardId) -> Result<CardRow> {
        self.blocking(move |conn| {
            conn.query_row(
                &format!("SELECT {CARD_COLUMNS} FROM card WHERE id = ?1"),
                params![id.as_i64()],
                row_to_card,
            )
            .optional()?
            .ok_or_else(|| MirrorError::not_found("card", id))
        })
        .await
    }

    async fn cards(&self) -> Result<Vec<CardRow>> {
        self.blocking(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {CARD_COLUMNS} FROM card ORDER BY id"))?;
            let cards = stmt
                .query_map([], row_to_card)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(cards)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use membridge_core::CardWordRelationRow;
    use serde_json::json;

    fn make_test_card(id: i64, deck: i64) -> CardRow {
        CardRow {
            id: CardId::new(id),
            modified: 1000,
            server_mod: 1000,
            deleted: 0,
            deck_id: DeckId::new(deck),
            card_type_id: CardTypeId::new(1),
            created: 1000,
            primary_field: format!("primary {id}"),
            secondary_field: String::new(),
            fields: String::new(),
            words: String::new(),
            due: 0,
            balanced_due: 0,
            interval: 0.0,
            factor: 2.5,
            last_review: 0,
            review_count: 0,
            pass_count: 0,
            fail_count: 0,
            lapse_count: 0,
            pos: 0,
            lesson_id: None,
            seed_mod: 0,
            notes: 0,
            seed_del: 0,
            suspended: 0,
            is_sample: 0,
            replacement_card_id: 0,
        }
    }

    fn make_test_card_type(id: i64, lang: &str) -> CardTypeRow {
        CardTypeRow {
            id: CardTypeId::new(id),
            modified: 1000,
            server_mod: 1000,
            deleted: 0,
            lang: lang.to_owned(),
            name: format!("type {id}"),
            config: json!({"fields": [{"name": "Front", "type": "TEXT"}]}).to_string(),
        }
    }

    fn make_test_deck(id: i64, lang: &str) -> DeckRow {
        DeckRow {
            id: DeckId::new(id),
            modified: 1000,
            server_mod: 1000,
            deleted: 0,
            lang: lang.to_owned(),
            name: format!("deck {id}"),
            icon: String::new(),
            last_recalc: 0,
            new_batch_max: 0,
            new_batch_size: 0,
            new_graduate_count: 0,
            factor_mon: 1.0,
            factor_tue: 1.0,
            factor_wed: 1.0,
            factor_thu: 1.0,
            factor_fri: 1.0,
            factor_sat: 1.0,
            factor_sun: 1.0,
            retention10: 0.0,
            retention35: 0.0,
            retention100: 0.0,
            retention350: 0.0,
            retention1000: 0.0,
            interval_factor10: 1.0,
            interval_factor35: 1.0,
            interval_factor100: 1.0,
            interval_factor350: 1.0,
            interval_factor1000: 1.0,
            learning_material_id: 0,
            seed_mod: 0,
            seed_del: 0,
            course_type: String::new(),
        }
    }

    fn make_test_relation(card: i64, word: &str) -> CardWordRelationRow {
        CardWordRelationRow {
            modified: 1000,
            server_mod: 1000,
            deleted: 0,
            seed_mod: 0,
            seed_del: 0,
            card_id: CardId::new(card),
            dict_form: word.to_owned(),
            secondary: String::new(),
            part_of_speech: "noun".to_owned(),
            language: "ja".to_owned(),
            is_target_word: 1,
            occurrences: 1,
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get_card() {
        let mirror = SqliteMirror::open_memory().unwrap();
        let card = make_test_card(7, 1);

        mirror.upsert(&card.clone().into()).await.unwrap();
        let loaded = mirror.card(CardId::new(7)).await.unwrap();
        assert_eq!(loaded, card);
    }

    #[tokio::test]
    async fn test_upsert_replaces_even_with_older_stamp() {
        let mirror = SqliteMirror::open_memory().unwrap();
        let mut card = make_test_card(7, 1);
        card.modified = 2000;
        mirror.upsert(&card.clone().into()).await.unwrap();

        card.modified = 500;
        card.primary_field = "rewound".to_owned();
        mirror.upsert(&card.clone().into()).await.unwrap();

        let loaded = mirror.card(CardId::new(7)).await.unwrap();
        assert_eq!(loaded.modified, 500);
        assert_eq!(loaded.primary_field, "rewound");
    }

    #[tokio::test]
    async fn test_upsert_stores_tombstone_as_is() {
        let mirror = SqliteMirror::open_memory().unwrap();
        let mut card = make_test_card(7, 1);
        card.deleted = 1;
        mirror.upsert(&card.into()).await.unwrap();

        let loaded = mirror.card(CardId::new(7)).await.unwrap();
        assert!(loaded.is_deleted());
    }

    #[tokio::test]
    async fn test_apply_batch_last_write_wins() {
        let mirror = SqliteMirror::open_memory().unwrap();
        let first = make_test_card(7, 1);
        let mut second = make_test_card(7, 1);
        second.primary_field = "second".to_owned();

        let written = mirror
            .apply_batch(&[first.into(), second.into()])
            .await
            .unwrap();
        assert_eq!(written, 2);

        let loaded = mirror.card(CardId::new(7)).await.unwrap();
        assert_eq!(loaded.primary_field, "second");
        assert_eq!(mirror.cards().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_apply_batch_twice_is_idempotent() {
        let mirror = SqliteMirror::open_memory().unwrap();
        let batch: Vec<MirrorRecord> = vec![
            make_test_card(1, 1).into(),
            make_test_card(2, 1).into(),
            make_test_deck(1, "ja").into(),
        ];

        mirror.apply_batch(&batch).await.unwrap();
        let after_first = mirror.cards().await.unwrap();
        mirror.apply_batch(&batch).await.unwrap();
        let after_second = mirror.cards().await.unwrap();

        assert_eq!(after_first, after_second);
        assert_eq!(after_second.len(), 2);
    }

    #[tokio::test]
    async fn test_cursor_starts_at_zero_and_roundtrips() {
        let mirror = SqliteMirror::open_memory().unwrap();
        assert_eq!(mirror.cursor().await.unwrap(), SyncCursor::ZERO);

        mirror.set_cursor(SyncCursor::both(1234)).await.unwrap();
        let cursor = mirror.cursor().await.unwrap();
        assert_eq!(cursor.last_pull, 1234);
        assert_eq!(cursor.last_push, 1234);
    }

    #[tokio::test]
    async fn test_languages_dedup_in_first_seen_order() {
        let mirror = SqliteMirror::open_memory().unwrap();
        for (id, lang) in [(1, "ja"), (2, "de"), (3, "ja"), (4, "ko")] {
            mirror
                .upsert(&make_test_card_type(id, lang).into())
                .await
                .unwrap();
        }

        assert_eq!(mirror.languages().await.unwrap(), vec!["ja", "de", "ko"]);
    }

    #[tokio::test]
    async fn test_languages_skip_tombstoned_types() {
        let mirror = SqliteMirror::open_memory().unwrap();
        let mut dead = make_test_card_type(1, "ja");
        dead.deleted = 1;
        mirror.upsert(&dead.into()).await.unwrap();
        mirror
            .upsert(&make_test_card_type(2, "de").into())
            .await
            .unwrap();

        assert_eq!(mirror.languages().await.unwrap(), vec!["de"]);
    }

    #[tokio::test]
    async fn test_decks_for_language_filters_and_orders() {
        let mirror = SqliteMirror::open_memory().unwrap();
        mirror.upsert(&make_test_deck(3, "ja").into()).await.unwrap();
        mirror.upsert(&make_test_deck(1, "ja").into()).await.unwrap();
        mirror.upsert(&make_test_deck(2, "de").into()).await.unwrap();
        let mut dead = make_test_deck(4, "ja");
        dead.deleted = 1;
        mirror.upsert(&dead.into()).await.unwrap();

        let decks = mirror.decks_for_language("ja").await.unwrap();
        let ids: Vec<i64> = decks.iter().map(|d| d.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_card_types_for_language() {
        let mirror = SqliteMirror::open_memory().unwrap();
        mirror
            .upsert(&make_test_card_type(2, "ja").into())
            .await
            .unwrap();
        mirror
            .upsert(&make_test_card_type(1, "ja").into())
            .await
            .unwrap();

        let types = mirror.card_types_for_language("ja").await.unwrap();
        let ids: Vec<i64> = types.iter().map(|t| t.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(mirror
            .card_types_for_language("xx")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_missing_deck_is_not_found() {
        let mirror = SqliteMirror::open_memory().unwrap();
        let err = mirror.deck(DeckId::new(99)).await.unwrap_err();
        assert!(matches!(err, MirrorError::NotFound { kind: "deck", .. }));
    }

    #[tokio::test]
    async fn test_relation_identity_is_composite_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.db");
        let mirror = SqliteMirror::open(&path).unwrap();

        let rel = make_test_relation(7, "食べる");
        let mut updated = rel.clone();
        updated.occurrences = 3;
        mirror
            .apply_batch(&[rel.into(), updated.into()])
            .await
            .unwrap();

        let conn = Connection::open(&path).unwrap();
        let (count, occurrences): (i64, i64) = conn
            .query_row(
                "SELECT COUNT(*), MAX(occurrences) FROM CardWordRelation",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(occurrences, 3);
    }

    #[tokio::test]
    async fn test_reopen_preserves_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.db");

        {
            let mirror = SqliteMirror::open(&path).unwrap();
            mirror.upsert(&make_test_card(7, 1).into()).await.unwrap();
            mirror.set_cursor(SyncCursor::both(42)).await.unwrap();
        }

        let reopened = SqliteMirror::open(&path).unwrap();
        assert_eq!(reopened.cursor().await.unwrap(), SyncCursor::both(42));
        assert_eq!(reopened.card(CardId::new(7)).await.unwrap().id.as_i64(), 7);
    }
}
