//! Mirrored record rows, exactly as the remote service ships them.
//!
//! Every struct here is a one-to-one image of a remote table row. The wire
//! format is JSON with camelCase keys; `mod` and `del` are renamed to
//! `modified` / `deleted` on the Rust side. Boolean-ish columns stay `i64`
//! because the service encodes them as 0/1 integers.
//!
//! Rows are replaced wholesale on upsert. Nothing in this module interprets
//! review scheduling state; the bridge only reads identity, tombstone,
//! creation and field-content columns.

use serde::{Deserialize, Serialize};

use crate::ids::{CardId, CardTypeId, DeckId, MappingKey};

/// Separator between entries of the packed `fields` column.
pub const FIELD_SEPARATOR: char = '\u{1f}';

/// A card row from the remote `card` table.
///
/// The per-field values handed to a translator are `primary_field`,
/// `secondary_field`, then the entries of `fields` split on
/// [`FIELD_SEPARATOR`], in that order. See [`CardRow::field_values`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRow {
    pub id: CardId,
    #[serde(rename = "mod")]
    pub modified: i64,
    pub server_mod: i64,
    #[serde(rename = "del")]
    pub deleted: i64,
    pub deck_id: DeckId,
    pub card_type_id: CardTypeId,
    pub created: i64,
    pub primary_field: String,
    pub secondary_field: String,
    pub fields: String,
    pub words: String,
    pub due: i64,
    pub balanced_due: i64,
    pub interval: f64,
    pub factor: f64,
    pub last_review: i64,
    pub review_count: i64,
    pub pass_count: i64,
    pub fail_count: i64,
    pub lapse_count: i64,
    pub pos: i64,
    /// Non-null when the card belongs to a guided lesson.
    pub lesson_id: Option<i64>,
    pub seed_mod: i64,
    pub notes: i64,
    pub seed_del: i64,
    pub suspended: i64,
    pub is_sample: i64,
    pub replacement_card_id: i64,
}

impl CardRow {
    /// Check the tombstone flag.
    pub fn is_deleted(&self) -> bool {
        self.deleted != 0
    }

    /// True when the card has never been edited since creation
    /// (`mod == created`). Only such cards are eligible for import.
    pub fn is_creation(&self) -> bool {
        self.modified == self.created
    }

    /// True when the card belongs to a lesson.
    pub fn is_lesson_card(&self) -> bool {
        self.lesson_id.is_some()
    }

    /// The (deck, card type) key this card resolves mappings under.
    pub fn mapping_key(&self) -> MappingKey {
        MappingKey::new(self.deck_id, self.card_type_id)
    }

    /// The ordered per-field values of this card: primary, secondary, then
    /// the packed `fields` column split on the unit separator.
    pub fn field_values(&self) -> Vec<String> {
        let mut values = vec![self.primary_field.clone(), self.secondary_field.clone()];
        values.extend(self.fields.split(FIELD_SEPARATOR).map(str::to_owned));
        values
    }
}

/// A card-type row from the remote `card_type` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTypeRow {
    pub id: CardTypeId,
    #[serde(rename = "mod")]
    pub modified: i64,
    pub server_mod: i64,
    #[serde(rename = "del")]
    pub deleted: i64,
    pub lang: String,
    pub name: String,
    /// JSON blob describing the type's fields; see [`CardTypeConfig`].
    pub config: String,
}

impl CardTypeRow {
    /// Check the tombstone flag.
    pub fn is_deleted(&self) -> bool {
        self.deleted != 0
    }

    /// Parse the embedded config JSON.
    pub fn parsed_config(&self) -> Result<CardTypeConfig, serde_json::Error> {
        serde_json::from_str(&self.config)
    }
}

/// The parsed shape of [`CardTypeRow::config`]. Only the field list is
/// consumed here; the blob carries other presentation keys that are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTypeConfig {
    pub fields: Vec<FieldDef>,
}

impl CardTypeConfig {
    /// Look up a field definition by its display name.
    pub fn field_named(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One field definition inside a card-type config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    /// The remote kind string, e.g. `"TEXT"` or `"AUDIO_LONG"`. Parse with
    /// [`FieldKind::parse`]; unrecognized kinds must fail translation.
    #[serde(rename = "type")]
    pub kind: String,
}

/// The closed set of field kinds the translator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Plain text, copied verbatim.
    Text,
    /// Text with bracketed reading/pitch markup, optionally stripped.
    Syntax,
    /// Media reference resolved to an image embed.
    Image,
    /// Media reference resolved to an audio embed.
    Audio,
    /// Long-form audio; handled identically to [`FieldKind::Audio`].
    AudioLong,
}

impl FieldKind {
    /// Try to parse a remote kind string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "TEXT" => Some(Self::Text),
            "SYNTAX" => Some(Self::Syntax),
            "IMAGE" => Some(Self::Image),
            "AUDIO" => Some(Self::Audio),
            "AUDIO_LONG" => Some(Self::AudioLong),
            _ => None,
        }
    }

    /// The remote kind string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Syntax => "SYNTAX",
            Self::Image => "IMAGE",
            Self::Audio => "AUDIO",
            Self::AudioLong => "AUDIO_LONG",
        }
    }

    /// Whether values of this kind are media references that need fetching.
    pub fn is_media(self) -> bool {
        matches!(self, Self::Image | Self::Audio | Self::AudioLong)
    }
}

/// A deck row from the remote `deck` table.
///
/// The scheduling tuning columns ride along untouched; the bridge reads only
/// `id`, `lang`, `name` and the tombstone flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckRow {
    pub id: DeckId,
    #[serde(rename = "mod")]
    pub modified: i64,
    pub server_mod: i64,
    #[serde(rename = "del")]
    pub deleted: i64,
    pub lang: String,
    pub name: String,
    pub icon: String,
    pub last_recalc: i64,
    pub new_batch_max: i64,
    pub new_batch_size: i64,
    pub new_graduate_count: i64,
    pub factor_mon: f64,
    pub factor_tue: f64,
    pub factor_wed: f64,
    pub factor_thu: f64,
    pub factor_fri: f64,
    pub factor_sat: f64,
    pub factor_sun: f64,
    pub retention10: f64,
    pub retention35: f64,
    pub retention100: f64,
    pub retention350: f64,
    pub retention1000: f64,
    pub interval_factor10: f64,
    pub interval_factor35: f64,
    pub interval_factor100: f64,
    pub interval_factor350: f64,
    pub interval_factor1000: f64,
    pub learning_material_id: i64,
    pub seed_mod: i64,
    pub seed_del: i64,
    pub course_type: String,
}

impl DeckRow {
    /// Check the tombstone flag.
    pub fn is_deleted(&self) -> bool {
        self.deleted != 0
    }
}

/// A card-to-word link from the remote `CardWordRelation` table.
///
/// Identity is the composite (cardId, dictForm, secondary, partOfSpeech,
/// language); the table has no surrogate id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardWordRelationRow {
    #[serde(rename = "mod")]
    pub modified: i64,
    pub server_mod: i64,
    #[serde(rename = "del")]
    pub deleted: i64,
    pub seed_mod: i64,
    pub seed_del: i64,
    pub card_id: CardId,
    pub dict_form: String,
    pub secondary: String,
    pub part_of_speech: String,
    pub language: String,
    pub is_target_word: i64,
    pub occurrences: i64,
}

impl CardWordRelationRow {
    /// The composite identity key of this relation.
    pub fn identity(&self) -> (CardId, &str, &str, &str, &str) {
        (
            self.card_id,
            &self.dict_form,
            &self.secondary,
            &self.part_of_speech,
            &self.language,
        )
    }
}

/// A word-knowledge row from the remote `WordList` table.
///
/// Identity is the natural key (dictForm, secondary, partOfSpeech, language).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordStatusRow {
    pub dict_form: String,
    pub secondary: String,
    pub part_of_speech: String,
    pub language: String,
    #[serde(rename = "mod")]
    pub modified: i64,
    pub server_mod: i64,
    #[serde(rename = "del")]
    pub deleted: i64,
    pub known_status: String,
    pub has_card: i64,
    pub tracked: i64,
}

impl WordStatusRow {
    /// The natural identity key of this word status.
    pub fn identity(&self) -> (&str, &str, &str, &str) {
        (
            &self.dict_form,
            &self.secondary,
            &self.part_of_speech,
            &self.language,
        )
    }
}
