//! Strong id types for remote and host entities.
//!
//! All identifiers are newtypes to prevent misuse at compile time. Remote ids
//! are assigned by the sync service and appear verbatim in changeset JSON;
//! host ids belong to the importing application and never enter the mirror.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote id of a card row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub i64);

impl CardId {
    /// Create a new CardId from a raw remote id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw id.
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CardId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Remote id of a deck row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckId(pub i64);

impl DeckId {
    /// Create a new DeckId from a raw remote id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw id.
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for DeckId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Remote id of a card-type row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardTypeId(pub i64);

impl CardTypeId {
    /// Create a new CardTypeId from a raw remote id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw id.
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CardTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CardTypeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Host-side deck id, owned by the importing application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostDeckId(pub i64);

impl HostDeckId {
    /// Create a new HostDeckId.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw id.
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for HostDeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host-side note-type id, owned by the importing application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostNoteTypeId(pub i64);

impl HostNoteTypeId {
    /// Create a new HostNoteTypeId.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw id.
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for HostNoteTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The key every mapping decision hangs off: which remote deck a card sits in
/// and which remote card type it uses.
///
/// Mappings and ignore marks are both stored under this key, and a card's
/// eligibility for import is decided by looking it up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappingKey {
    /// Remote deck id.
    pub deck_id: DeckId,
    /// Remote card-type id.
    pub card_type_id: CardTypeId,
}

impl MappingKey {
    /// Create a key from its two components.
    pub const fn new(deck_id: DeckId, card_type_id: CardTypeId) -> Self {
        Self {
            deck_id,
            card_type_id,
        }
    }
}

impl fmt::Display for MappingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "deck {} / card type {}", self.deck_id, self.card_type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_transparent_in_json() {
        let id = CardId::new(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");
        let back: CardId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_mapping_key_equality() {
        let a = MappingKey::new(DeckId::new(1), CardTypeId::new(2));
        let b = MappingKey::new(DeckId::new(1), CardTypeId::new(2));
        let c = MappingKey::new(DeckId::new(1), CardTypeId::new(3));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_mapping_key_display() {
        let key = MappingKey::new(DeckId::new(7), CardTypeId::new(9));
        assert_eq!(format!("{}", key), "deck 7 / card type 9");
    }
}
