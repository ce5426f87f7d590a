//! Mirror trait definition.
//!
//! The [`Mirror`] trait abstracts over local mirror backends. Two
//! implementations are provided:
//!
//! - [`SqliteMirror`](crate::sqlite::SqliteMirror): durable storage backed by
//!   SQLite, the backend used in production.
//! - [`MemoryMirror`](crate::memory::MemoryMirror): ephemeral in-memory
//!   storage for tests.
//!
//! All methods are async. The SQLite implementation dispatches blocking work
//! to a dedicated thread pool via `spawn_blocking`.

use async_trait::async_trait;
use membridge_core::{
    CardId, CardRow, CardTypeId, CardTypeRow, CardWordRelationRow, DeckId, DeckRow, SyncCursor,
    WordStatusRow,
};

use crate::error::Result;

/// A single mirrored row, tagged with the collection it belongs to.
///
/// Upserts are keyed by each row's identity: numeric server id for cards,
/// card types and decks, and the natural composite key for word relations
/// and word statuses. A later upsert with the same identity replaces the
/// stored row unconditionally, including tombstones and rows whose
/// modification stamp is older than what the mirror already holds. The
/// server is the sole authority on row contents.
#[derive(Debug, Clone, PartialEq)]
pub enum MirrorRecord {
    Card(CardRow),
    CardType(CardTypeRow),
    Deck(DeckRow),
    CardWordRelation(CardWordRelationRow),
    WordStatus(WordStatusRow),
}

impl MirrorRecord {
    /// Human-readable name of the collection this record belongs to.
    pub fn kind(&self) -> &'static str {
        match self {
            MirrorRecord::Card(_) => "card",
            MirrorRecord::CardType(_) => "card type",
            MirrorRecord::Deck(_) => "deck",
            MirrorRecord::CardWordRelation(_) => "card word relation",
            MirrorRecord::WordStatus(_) => "word status",
        }
    }
}

impl From<CardRow> for MirrorRecord {
    fn from(row: CardRow) -> Self {
        MirrorRecord::Card(row)
    }
}

impl From<CardTypeRow> for MirrorRecord {
    fn from(row: CardTypeRow) -> Self {
        MirrorRecord::CardType(row)
    }
}

impl From<DeckRow> for MirrorRecord {
    fn from(row: DeckRow) -> Self {
        MirrorRecord::Deck(row)
    }
}

impl From<CardWordRelationRow> for MirrorRecord {
    fn from(row: CardWordRelationRow) -> Self {
        MirrorRecord::CardWordRelation(row)
    }
}

impl From<WordStatusRow> for MirrorRecord {
    fn from(row: WordStatusRow) -> Self {
        MirrorRecord::WordStatus(row)
    }
}

/// Abstract interface for local mirror backends.
#[async_trait]
pub trait Mirror: Send + Sync {
    // ──────────────────────────────────────────────────────────────────────
    // Record operations
    // ──────────────────────────────────────────────────────────────────────

    /// Insert or replace a single record.
    async fn upsert(&self, record: &MirrorRecord) -> Result<()>;

    /// Insert or replace a batch of records in one transaction.
    ///
    /// Either every record in the batch is persisted or none is. Records
    /// are applied in slice order, so a later record with the same identity
    /// as an earlier one wins. Returns the number of records written.
    async fn apply_batch(&self, records: &[MirrorRecord]) -> Result<usize>;

    // ──────────────────────────────────────────────────────────────────────
    // Cursor operations
    // ──────────────────────────────────────────────────────────────────────

    /// Read the persisted sync cursor.
    ///
    /// A freshly created mirror reports [`SyncCursor::ZERO`], which makes
    /// the first pull a full fetch.
    async fn cursor(&self) -> Result<SyncCursor>;

    /// Persist a new sync cursor, replacing both slots atomically.
    async fn set_cursor(&self, cursor: SyncCursor) -> Result<()>;

    // ──────────────────────────────────────────────────────────────────────
    // Reference lookups
    // ──────────────────────────────────────────────────────────────────────

    /// Distinct languages across live card types, ordered by first
    /// appearance in card type id order.
    async fn languages(&self) -> Result<Vec<String>>;

    /// Live (non-tombstoned) decks for a language, ordered by id.
    async fn decks_for_language(&self, lang: &str) -> Result<Vec<DeckRow>>;

    /// Live (non-tombstoned) card types for a language, ordered by id.
    async fn card_types_for_language(&self, lang: &str) -> Result<Vec<CardTypeRow>>;

    /// Look up a deck by id. Tombstoned rows are returned as stored.
    async fn deck(&self, id: DeckId) -> Result<DeckRow>;

    /// Look up a card type by id. Tombstoned rows are returned as stored.
    async fn card_type(&self, id: CardTypeId) -> Result<CardTypeRow>;

    // ──────────────────────────────────────────────────────────────────────
    // Card access
    // ──────────────────────────────────────────────────────────────────────

    /// Look up a card by id. Tombstoned rows are returned as stored.
    async fn card(&self, id: CardId) -> Result<CardRow>;

    /// Every mirrored card, ordered by id. Includes tombstones; callers
    /// that only want live cards filter on [`CardRow::is_deleted`].
    async fn cards(&self) -> Result<Vec<CardRow>>;
}
