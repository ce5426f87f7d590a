//! In-memory implementation of the Mirror trait.
//!
//! Useful for testing and for callers that want bridge semantics without a
//! database file. State is lost on drop.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use membridge_core::{
    CardId, CardRow, CardTypeId, CardTypeRow, DeckId, DeckRow, SyncCursor,
};

use crate::error::{MirrorError, Result};
use crate::traits::{Mirror, MirrorRecord};

/// In-memory mirror backed by ordered maps.
///
/// BTreeMaps keyed by row identity keep iteration in id order, matching the
/// ordering the SQLite backend gets from `ORDER BY id`.
pub struct MemoryMirror {
    inner: RwLock<MemoryMirrorInner>,
}

type RelationKey = (i64, String, String, String, String);
type WordKey = (String, String, String, String);

#[derive(Default)]
struct MemoryMirrorInner {
    cards: BTreeMap<i64, CardRow>,
    card_types: BTreeMap<i64, CardTypeRow>,
    decks: BTreeMap<i64, DeckRow>,
    relations: BTreeMap<RelationKey, membridge_core::CardWordRelationRow>,
    word_statuses: BTreeMap<WordKey, membridge_core::WordStatusRow>,
    cursor: SyncCursor,
}

impl MemoryMirrorInner {
    fn store(&mut self, record: &MirrorRecord) {
        match record {
            MirrorRecord::Card(card) => {
                self.cards.insert(card.id.as_i64(), card.clone());
            }
            MirrorRecord::CardType(card_type) => {
                self.card_types.insert(card_type.id.as_i64(), card_type.clone());
            }
            MirrorRecord::Deck(deck) => {
                self.decks.insert(deck.id.as_i64(), deck.clone());
            }
            MirrorRecord::CardWordRelation(rel) => {
                let key = (
                    rel.card_id.as_i64(),
                    rel.dict_form.clone(),
                    rel.secondary.clone(),
                    rel.part_of_speech.clone(),
                    rel.language.clone(),
                );
                self.relations.insert(key, rel.clone());
            }
            MirrorRecord::WordStatus(word) => {
                let key = (
                    word.dict_form.clone(),
                    word.secondary.clone(),
                    word.part_of_speech.clone(),
                    word.language.clone(),
                );
                self.word_statuses.insert(key, word.clone());
            }
        }
    }
}

impl MemoryMirror {
    /// Create an empty in-memory mirror.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryMirrorInner::default()),
        }
    }
}

impl Default for MemoryMirror {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mirror for MemoryMirror {
    async fn upsert(&self, record: &MirrorRecord) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.store(record);
        Ok(())
    }

    async fn apply_batch(&self, records: &[MirrorRecord]) -> Result<usize> {
        let mut inner = self.inner.write().unwrap();
        for record in records {
            inner.store(record);
        }
        Ok(records.len())
    }

    async fn cursor(&self) -> Result<SyncCursor> {
        Ok(self.inner.read().unwrap().cursor)
    }

    async fn set_cursor(&self, cursor: SyncCursor) -> Result<()> {
        self.inner.write().unwrap().cursor = cursor;
        Ok(())
    }

    async fn languages(&self) -> Result<Vec<String>> {
        let inner = self.inner.read().unwrap();
        let mut seen: Vec<String> = Vec::new();
        for card_type in inner.card_types.values() {
            if card_type.is_deleted() {
                continue;
            }
            if !seen.contains(&card_type.lang) {
                seen.push(card_type.lang.clone());
            }
        }
        Ok(seen)
    }

    async fn decks_for_language(&self, lang: &str) -> Result<Vec<DeckRow>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .decks
            .values()
            .filter(|d| d.lang == lang && !d.is_deleted())
            .cloned()
            .collect())
    }

    async fn card_types_for_language(&self, lang: &str) -> Result<Vec<CardTypeRow>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .card_types
            .values()
            .filter(|t| t.lang == lang && !t.is_deleted())
            .cloned()
            .collect())
    }

    async fn deck(&self, id: DeckId) -> Result<DeckRow> {
        let inner = self.inner.read().unwrap();
        inner
            .decks
            .get(&id.as_i64())
            .cloned()
            .ok_or_else(|| MirrorError::not_found("deck", id))
    }

    async fn card_type(&self, id: CardTypeId) -> Result<CardTypeRow> {
        let inner = self.inner.read().unwrap();
        inner
            .card_types
            .get(&id.as_i64())
            .cloned()
            .ok_or_else(|| MirrorError::not_found("card type", id))
    }

    async fn card(&self, id: CardId) -> Result<CardRow> {
        let inner = self.inner.read().unwrap();
        inner
            .cards
            .get(&id.as_i64())
            .cloned()
            .ok_or_else(|| MirrorError::not_found("card", id))
    }

    async fn cards(&self) -> Result<Vec<CardRow>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.cards.values().cloned().collect())
    }
}
