//! Changeset payloads and their decoded, typed form.
//!
//! The remote service answers a pull with a JSON object keyed by group name.
//! That raw shape is [`ChangesetPayload`]; [`Changeset::decode`] turns it into
//! the closed [`ChangeGroup`] set, rejecting any group name outside the
//! recognized list. Groups the bridge persists decode their rows eagerly so a
//! malformed row fails before anything is written; groups that are accepted
//! but discarded keep their payload untyped and tolerate any JSON shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChangesetError;
use crate::record::{CardRow, CardWordRelationRow, WordStatusRow};

/// The group names the remote service is known to send.
pub mod groups {
    /// Persisted: card rows.
    pub const CARDS: &str = "cards";
    /// Persisted: card-to-word links.
    pub const CARD_WORD_RELATIONS: &str = "cardWordRelations";
    /// Persisted: word-knowledge rows.
    pub const WORDS: &str = "words";
    /// Accepted and discarded.
    pub const DECKS: &str = "decks";
    /// Accepted and discarded.
    pub const CARD_TYPES: &str = "cardTypes";
    /// Accepted and discarded.
    pub const VACATIONS: &str = "vacations";
    /// Accepted and discarded.
    pub const REVIEWS: &str = "reviews";
    /// Accepted and discarded.
    pub const REVIEW_HISTORY: &str = "reviewHistory";
    /// Accepted and discarded. May arrive as an object or null.
    pub const CONFIG: &str = "config";
    /// Accepted and discarded.
    pub const KEY_VALUE: &str = "keyValue";
    /// Accepted and discarded.
    pub const LEARNING_MATERIALS: &str = "learningMaterials";
    /// Accepted and discarded.
    pub const LESSONS: &str = "lessons";

    /// Every recognized group name.
    pub const ALL: [&str; 12] = [
        CARDS,
        CARD_WORD_RELATIONS,
        WORDS,
        DECKS,
        CARD_TYPES,
        VACATIONS,
        REVIEWS,
        REVIEW_HISTORY,
        CONFIG,
        KEY_VALUE,
        LEARNING_MATERIALS,
        LESSONS,
    ];
}

/// A raw changeset exactly as pulled off the wire: group name → JSON value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangesetPayload(pub serde_json::Map<String, Value>);

impl ChangesetPayload {
    /// An empty payload (a pull with no changes).
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the payload carries no groups at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<serde_json::Map<String, Value>> for ChangesetPayload {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self(map)
    }
}

/// One recognized group of a decoded changeset.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeGroup {
    /// Card rows, in delivery order.
    Cards(Vec<CardRow>),
    /// Card-to-word links, in delivery order.
    CardWordRelations(Vec<CardWordRelationRow>),
    /// Word-knowledge rows, in delivery order.
    Words(Vec<WordStatusRow>),
    /// A recognized group with no persistence target. The payload is kept
    /// verbatim and never inspected further.
    Deferred {
        name: &'static str,
        payload: Value,
    },
}

impl ChangeGroup {
    /// The wire name of this group.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cards(_) => groups::CARDS,
            Self::CardWordRelations(_) => groups::CARD_WORD_RELATIONS,
            Self::Words(_) => groups::WORDS,
            Self::Deferred { name, .. } => name,
        }
    }
}

/// A fully decoded changeset: every group recognized, persisted rows typed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Changeset {
    /// The decoded groups. Group names are unique within one payload.
    pub groups: Vec<ChangeGroup>,
}

impl Changeset {
    /// Decode a raw payload into typed groups.
    ///
    /// Fails with [`ChangesetError::UnknownGroup`] on any group name outside
    /// [`groups::ALL`], and with [`ChangesetError::Decode`] when a persisted
    /// group's rows do not parse. Either failure means the caller must not
    /// write anything to the mirror.
    pub fn decode(payload: ChangesetPayload) -> Result<Self, ChangesetError> {
        let mut decoded = Vec::with_capacity(payload.0.len());
        for (name, value) in payload.0 {
            let group = match name.as_str() {
                groups::CARDS => ChangeGroup::Cards(decode_rows(groups::CARDS, value)?),
                groups::CARD_WORD_RELATIONS => ChangeGroup::CardWordRelations(decode_rows(
                    groups::CARD_WORD_RELATIONS,
                    value,
                )?),
                groups::WORDS => ChangeGroup::Words(decode_rows(groups::WORDS, value)?),
                groups::DECKS => deferred(groups::DECKS, value),
                groups::CARD_TYPES => deferred(groups::CARD_TYPES, value),
                groups::VACATIONS => deferred(groups::VACATIONS, value),
                groups::REVIEWS => deferred(groups::REVIEWS, value),
                groups::REVIEW_HISTORY => deferred(groups::REVIEW_HISTORY, value),
                groups::CONFIG => deferred(groups::CONFIG, value),
                groups::KEY_VALUE => deferred(groups::KEY_VALUE, value),
                groups::LEARNING_MATERIALS => deferred(groups::LEARNING_MATERIALS, value),
                groups::LESSONS => deferred(groups::LESSONS, value),
                _ => return Err(ChangesetError::UnknownGroup(name)),
            };
            decoded.push(group);
        }
        Ok(Self { groups: decoded })
    }

    /// The card rows of this changeset, in delivery order.
    pub fn cards(&self) -> impl Iterator<Item = &CardRow> + '_ {
        self.groups.iter().flat_map(|group| match group {
            ChangeGroup::Cards(cards) => cards.as_slice(),
            _ => &[],
        })
    }

    /// Names of deferred groups that arrived non-empty.
    pub fn non_empty_deferred(&self) -> Vec<&'static str> {
        self.groups
            .iter()
            .filter_map(|group| match group {
                ChangeGroup::Deferred { name, payload } => match payload {
                    Value::Null => None,
                    Value::Array(items) if items.is_empty() => None,
                    _ => Some(*name),
                },
                _ => None,
            })
            .collect()
    }

    /// Whether the changeset carries nothing at all.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

fn decode_rows<T: serde::de::DeserializeOwned>(
    group: &'static str,
    value: Value,
) -> Result<Vec<T>, ChangesetError> {
    serde_json::from_value(value).map_err(|source| ChangesetError::Decode { group, source })
}

fn deferred(name: &'static str, payload: Value) -> ChangeGroup {
    ChangeGroup::Deferred { name, payload }
}

// ────────────────────────────────────────────────────────────────────────────
// Sync cursor
// ────────────────────────────────────────────────────────────────────────────

/// The persisted two-slot sync high-water mark.
///
/// `last_pull` is the timestamp passed to the next pull; `last_push` tracks
/// the unimplemented push direction and is advanced in lockstep. The pair is
/// always read and written together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncCursor {
    /// Fetch timestamp of the last fully committed changeset (ms).
    pub last_pull: i64,
    /// Mirrors `last_pull` until push sync exists (ms).
    pub last_push: i64,
}

impl SyncCursor {
    /// The cursor of a mirror that has never synced.
    pub const ZERO: Self = Self {
        last_pull: 0,
        last_push: 0,
    };

    /// Both slots at the same timestamp, the shape every advance uses today.
    pub fn both(timestamp_ms: i64) -> Self {
        Self {
            last_pull: timestamp_ms,
            last_push: timestamp_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload_from(value: Value) -> ChangesetPayload {
        serde_json::from_value(value).unwrap()
    }

    fn minimal_card(id: i64) -> Value {
        json!({
            "id": id,
            "mod": 1000,
            "serverMod": 1000,
            "del": 0,
            "deckId": 1,
            "cardTypeId": 2,
            "created": 1000,
            "primaryField": "p",
            "secondaryField": "s",
            "fields": "",
            "words": "",
            "due": 0,
            "balancedDue": 0,
            "interval": 0.0,
            "factor": 2.5,
            "lastReview": 0,
            "reviewCount": 0,
            "passCount": 0,
            "failCount": 0,
            "lapseCount": 0,
            "pos": 0,
            "lessonId": null,
            "seedMod": 0,
            "notes": 0,
            "seedDel": 0,
            "suspended": 0,
            "isSample": 0,
            "replacementCardId": 0
        })
    }

    #[test]
    fn test_decode_typed_and_deferred_groups() {
        let payload = payload_from(json!({
            "cards": [minimal_card(7)],
            "reviews": [{"whatever": true}],
            "config": null
        }));

        let changeset = Changeset::decode(payload).unwrap();
        assert_eq!(changeset.groups.len(), 3);
        assert_eq!(changeset.cards().count(), 1);
        // reviews is non-empty deferred, config (null) is not reported
        assert_eq!(changeset.non_empty_deferred(), vec!["reviews"]);
    }

    #[test]
    fn test_decode_rejects_unknown_group() {
        let payload = payload_from(json!({
            "cards": [],
            "shinyNewGroup": [1, 2, 3]
        }));

        let err = Changeset::decode(payload).unwrap_err();
        match err {
            ChangesetError::UnknownGroup(name) => assert_eq!(name, "shinyNewGroup"),
            other => panic!("expected UnknownGroup, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_unknown_group_even_when_empty() {
        let payload = payload_from(json!({ "shinyNewGroup": [] }));
        assert!(matches!(
            Changeset::decode(payload),
            Err(ChangesetError::UnknownGroup(_))
        ));
    }

    #[test]
    fn test_decode_fails_on_malformed_persisted_row() {
        let payload = payload_from(json!({
            "cards": [{"id": "not-a-number"}]
        }));

        let err = Changeset::decode(payload).unwrap_err();
        match err {
            ChangesetError::Decode { group, .. } => assert_eq!(group, "cards"),
            other => panic!("expected Decode, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_tolerates_any_shape_in_deferred_groups() {
        let payload = payload_from(json!({
            "config": {"nested": {"deep": [1, 2]}},
            "lessons": "free-form",
            "vacations": []
        }));

        let changeset = Changeset::decode(payload).unwrap();
        assert_eq!(changeset.groups.len(), 3);
        assert_eq!(changeset.cards().count(), 0);
    }

    #[test]
    fn test_decode_accepts_every_recognized_group() {
        let mut map = serde_json::Map::new();
        for name in groups::ALL {
            map.insert(name.to_string(), json!([]));
        }
        let changeset = Changeset::decode(ChangesetPayload(map)).unwrap();
        assert_eq!(changeset.groups.len(), groups::ALL.len());
    }

    #[test]
    fn test_empty_payload_decodes_to_empty_changeset() {
        let changeset = Changeset::decode(ChangesetPayload::new()).unwrap();
        assert!(changeset.is_empty());
    }

    #[test]
    fn test_cursor_both_slots() {
        let cursor = SyncCursor::both(1234);
        assert_eq!(cursor.last_pull, 1234);
        assert_eq!(cursor.last_push, 1234);
        assert_eq!(SyncCursor::ZERO.last_pull, 0);
    }
}
