//! # Membridge Core
//!
//! Pure types for the Membridge sync engine: mirrored record rows, changeset
//! payloads and their typed decoded form, field kinds, and the sync cursor.
//!
//! This crate contains no I/O, no storage, no networking. It is the shared
//! vocabulary of the mirror, the applier and the translator.
//!
//! ## Key Types
//!
//! - [`CardRow`] / [`CardTypeRow`] / [`DeckRow`] / [`CardWordRelationRow`] /
//!   [`WordStatusRow`] - One-to-one images of the remote tables
//! - [`Changeset`] - A pull payload decoded into the closed [`ChangeGroup`] set
//! - [`SyncCursor`] - The persisted pull/push high-water mark pair
//! - [`MappingKey`] - The (deck, card type) key import decisions hang off
//! - [`FieldKind`] - The closed set of translatable field kinds

pub mod changeset;
pub mod error;
pub mod ids;
pub mod record;

pub use changeset::{groups, ChangeGroup, Changeset, ChangesetPayload, SyncCursor};
pub use error::ChangesetError;
pub use ids::{CardId, CardTypeId, DeckId, HostDeckId, HostNoteTypeId, MappingKey};
pub use record::{
    CardRow, CardTypeConfig, CardTypeRow, CardWordRelationRow, DeckRow, FieldDef, FieldKind,
    WordStatusRow, FIELD_SEPARATOR,
};
