//! User-defined mappings from remote (deck, card type) pairs to host targets.
//!
//! The registry holds two independent collections: saved [`MappingConfig`]
//! entries and a set of ignored pairs. A pair that is neither mapped nor
//! ignored blocks translation with `MissingMapping` until the user decides.
//!
//! The registry itself never cross-updates the two collections. A caller
//! that wants "mapped" and "ignored" to stay mutually exclusive must pair
//! the operations (`put` + `remove_ignored`, or `add_ignored` + `delete`);
//! the bridge crate does exactly that.

use std::collections::{HashMap, HashSet};

use membridge_core::{CardTypeId, DeckId, HostDeckId, HostNoteTypeId, MappingKey};
use serde::{Deserialize, Serialize};

/// One saved mapping: which host note type and deck a remote pair lands in,
/// and how its fields line up.
///
/// `mapped_indices` is parallel to `target_field_names`: entry `i` holds the
/// index into `remote_field_names` (and into the card's field values) whose
/// content fills target field `i`, or `-1` to leave that field empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingConfig {
    pub remote_deck_id: DeckId,
    #[serde(rename = "remoteRecordTypeId")]
    pub remote_card_type_id: CardTypeId,
    #[serde(rename = "targetRecordTypeId")]
    pub target_note_type_id: HostNoteTypeId,
    pub target_deck_id: HostDeckId,
    /// Field names of the remote card type at the time the mapping was saved.
    pub remote_field_names: Vec<String>,
    /// Field names of the host note type, in target order.
    pub target_field_names: Vec<String>,
    /// Source index per target field, `-1` for unmapped.
    pub mapped_indices: Vec<i32>,
}

impl MappingConfig {
    /// The remote pair this mapping is keyed under.
    pub fn key(&self) -> MappingKey {
        MappingKey::new(self.remote_deck_id, self.remote_card_type_id)
    }
}

/// A remote pair the user chose not to import, in its persisted shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoredPair {
    #[serde(rename = "remoteDeckId")]
    pub remote_deck_id: DeckId,
    #[serde(rename = "remoteRecordTypeId")]
    pub remote_card_type_id: CardTypeId,
}

impl From<MappingKey> for IgnoredPair {
    fn from(key: MappingKey) -> Self {
        Self {
            remote_deck_id: key.deck_id,
            remote_card_type_id: key.card_type_id,
        }
    }
}

impl From<IgnoredPair> for MappingKey {
    fn from(pair: IgnoredPair) -> Self {
        MappingKey::new(pair.remote_deck_id, pair.remote_card_type_id)
    }
}

/// In-memory registry of mappings and ignored pairs.
#[derive(Debug, Clone, Default)]
pub struct MappingRegistry {
    mappings: HashMap<MappingKey, MappingConfig>,
    ignored: HashSet<MappingKey>,
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the mapping for a remote pair.
    pub fn get(&self, deck: DeckId, card_type: CardTypeId) -> Option<&MappingConfig> {
        self.mappings.get(&MappingKey::new(deck, card_type))
    }

    /// Save a mapping, replacing any existing entry with the same key.
    /// Returns the replaced entry. Does not touch the ignored set.
    pub fn put(&mut self, config: MappingConfig) -> Option<MappingConfig> {
        self.mappings.insert(config.key(), config)
    }

    /// Remove the mapping for a remote pair, returning it if present.
    pub fn delete(&mut self, deck: DeckId, card_type: CardTypeId) -> Option<MappingConfig> {
        self.mappings.remove(&MappingKey::new(deck, card_type))
    }

    /// Whether a remote pair is marked ignored.
    pub fn is_ignored(&self, deck: DeckId, card_type: CardTypeId) -> bool {
        self.ignored.contains(&MappingKey::new(deck, card_type))
    }

    /// Mark a remote pair ignored. Does not delete an existing mapping.
    pub fn add_ignored(&mut self, pair: MappingKey) -> bool {
        self.ignored.insert(pair)
    }

    /// Unmark a remote pair. Returns whether it was ignored.
    pub fn remove_ignored(&mut self, pair: MappingKey) -> bool {
        self.ignored.remove(&pair)
    }

    /// Number of saved mappings.
    pub fn mapping_count(&self) -> usize {
        self.mappings.len()
    }

    /// A serializable copy of the registry, ordered by remote pair so the
    /// persisted form is stable across runs.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let mut mappings: Vec<MappingConfig> = self.mappings.values().cloned().collect();
        mappings.sort_by_key(|m| (m.remote_deck_id, m.remote_card_type_id));
        let mut ignored: Vec<IgnoredPair> = self.ignored.iter().copied().map(Into::into).collect();
        ignored.sort_by_key(|p| (p.remote_deck_id, p.remote_card_type_id));
        RegistrySnapshot { mappings, ignored }
    }

    /// Rebuild a registry from a persisted snapshot. Duplicate keys keep the
    /// last entry, matching `put` semantics.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        let mut registry = Self::new();
        for config in snapshot.mappings {
            registry.put(config);
        }
        for pair in snapshot.ignored {
            registry.add_ignored(pair.into());
        }
        registry
    }
}

/// The persisted shape of a [`MappingRegistry`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub mappings: Vec<MappingConfig>,
    pub ignored: Vec<IgnoredPair>,
}
