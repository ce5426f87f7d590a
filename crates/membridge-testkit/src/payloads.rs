//! Canned changeset payloads in the remote wire shape.
//!
//! [`PayloadBuilder`] assembles a pull response group by group. Typed groups
//! are serialized from fixture rows; [`PayloadBuilder::group`] injects raw
//! JSON for deferred groups, unknown names and malformed rows.

use serde_json::{Map, Value};

use membridge_core::{groups, CardRow, CardWordRelationRow, ChangesetPayload, WordStatusRow};

/// Builder for wire payloads.
#[derive(Debug, Default)]
pub struct PayloadBuilder {
    map: Map<String, Value>,
}

impl PayloadBuilder {
    /// Start an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `cards` group with the given rows.
    pub fn cards(self, cards: &[CardRow]) -> Self {
        self.group(groups::CARDS, to_value(cards))
    }

    /// Add a `cardWordRelations` group with the given rows.
    pub fn relations(self, relations: &[CardWordRelationRow]) -> Self {
        self.group(groups::CARD_WORD_RELATIONS, to_value(relations))
    }

    /// Add a `words` group with the given rows.
    pub fn words(self, words: &[WordStatusRow]) -> Self {
        self.group(groups::WORDS, to_value(words))
    }

    /// Add an arbitrary group verbatim. Accepts any name and any shape, so
    /// tests can model deferred groups and hostile payloads alike.
    pub fn group(mut self, name: &str, value: Value) -> Self {
        self.map.insert(name.to_owned(), value);
        self
    }

    /// Finish into the wire payload type.
    pub fn build(self) -> ChangesetPayload {
        ChangesetPayload(self.map)
    }
}

/// Shortcut for a payload that carries only a `cards` group.
pub fn cards_payload(cards: &[CardRow]) -> ChangesetPayload {
    PayloadBuilder::new().cards(cards).build()
}

/// A payload naming every recognized group, with the persisted groups filled
/// and every deferred group present as an empty array.
pub fn all_groups_payload(
    cards: &[CardRow],
    relations: &[CardWordRelationRow],
    words: &[WordStatusRow],
) -> ChangesetPayload {
    let mut builder = PayloadBuilder::new()
        .cards(cards)
        .relations(relations)
        .words(words);
    for name in groups::ALL {
        if name != groups::CARDS
            && name != groups::CARD_WORD_RELATIONS
            && name != groups::WORDS
        {
            builder = builder.group(name, Value::Array(Vec::new()));
        }
    }
    builder.build()
}

fn to_value<T: serde::Serialize>(rows: &[T]) -> Value {
    serde_json::to_value(rows).expect("fixture rows serialize")
}
