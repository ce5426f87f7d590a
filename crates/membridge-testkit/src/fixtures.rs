//! Test fixtures and helpers.
//!
//! Canned rows in the remote wire shape. Every `make_*` function returns a
//! freshly created, live row (`mod == created`, no tombstone); tests mutate
//! the public fields to get edited, deleted or lesson variants.

use membridge_core::{
    CardId, CardRow, CardTypeId, CardTypeRow, CardWordRelationRow, DeckId, DeckRow, WordStatusRow,
};
use membridge_mirror::{MemoryMirror, Mirror, MirrorRecord};

/// Default stamp used by all fixture rows.
pub const STAMP: i64 = 1000;

/// A test fixture with an in-memory mirror.
///
/// Translator tests share one setup: a mirror that already holds the deck
/// and card type their cards point at. The fixture owns that mirror and
/// seeds it from the `make_*` rows.
pub struct TestFixture {
    pub mirror: MemoryMirror,
}

impl TestFixture {
    /// Create a fixture with an empty mirror.
    pub fn new() -> Self {
        Self {
            mirror: MemoryMirror::new(),
        }
    }

    /// Create a fixture whose mirror holds deck `deck` and card type
    /// `card_type` for `lang`, the card type declaring the given
    /// `(name, kind)` fields.
    pub async fn with_references(
        deck: i64,
        card_type: i64,
        lang: &str,
        fields: &[(&str, &str)],
    ) -> Self {
        let fixture = Self::new();
        fixture.seed_references(deck, card_type, lang, fields).await;
        fixture
    }

    /// Upsert a deck and a card type lookups can resolve.
    pub async fn seed_references(
        &self,
        deck: i64,
        card_type: i64,
        lang: &str,
        fields: &[(&str, &str)],
    ) {
        self.put(make_deck(deck, lang).into()).await;
        self.put(make_card_type(card_type, lang, fields).into()).await;
    }

    async fn put(&self, record: MirrorRecord) {
        self.mirror
            .upsert(&record)
            .await
            .expect("memory mirror accepts upserts");
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A live card in deck `deck` with type `card_type`, never edited.
pub fn make_card(id: i64, deck: i64, card_type: i64) -> CardRow {
    CardRow {
        id: CardId::new(id),
        modified: STAMP,
        server_mod: STAMP,
        deleted: 0,
        deck_id: DeckId::new(deck),
        card_type_id: CardTypeId::new(card_type),
        created: STAMP,
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

/// A card type whose config declares the given `(name, kind)` fields.
pub fn make_card_type(id: i64, lang: &str, fields: &[(&str, &str)]) -> CardTypeRow {
    CardTypeRow {
        id: CardTypeId::new(id),
        modified: STAMP,
        server_mod: STAMP,
        deleted: 0,
        lang: lang.to_owned(),
        name: format!("type {id}"),
        config: config_json(fields),
    }
}

/// A card-type config blob for the given `(name, kind)` fields.
pub fn config_json(fields: &[(&str, &str)]) -> String {
    let fields: Vec<serde_json::Value> = fields
        .iter()
        .map(|(name, kind)| serde_json::json!({"name": name, "type": kind}))
        .collect();
    serde_json::json!({ "fields": fields }).to_string()
}

/// A live deck in the given language.
pub fn make_deck(id: i64, lang: &str) -> DeckRow {
    DeckRow {
        id: DeckId::new(id),
        modified: STAMP,
        server_mod: STAMP,
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

/// A card-to-word link for `word` on card `card`.
pub fn make_relation(card: i64, word: &str) -> CardWordRelationRow {
    CardWordRelationRow {
        modified: STAMP,
        server_mod: STAMP,
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

/// A word-knowledge row for `word`.
pub fn make_word_status(word: &str, status: &str) -> WordStatusRow {
    WordStatusRow {
        dict_form: word.to_owned(),
        secondary: String::new(),
        part_of_speech: "noun".to_owned(),
        language: "ja".to_owned(),
        modified: STAMP,
        server_mod: STAMP,
        deleted: 0,
        known_status: status.to_owned(),
        has_card: 1,
        tracked: 1,
    }
}
