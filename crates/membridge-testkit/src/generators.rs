//! Proptest generators for property-based testing.

use proptest::prelude::*;

use membridge_core::CardRow;

use crate::fixtures;

/// Generate a card id in a small range so collisions actually happen.
pub fn card_id() -> impl Strategy<Value = i64> {
    1i64..=200
}

/// Generate a reasonable millisecond timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=1_700_000_000_000
}

/// Generate a two-letter language code.
pub fn lang() -> impl Strategy<Value = String> {
    "[a-z]{2}".prop_map(String::from)
}

/// Generate printable field text.
pub fn field_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,24}".prop_map(String::from)
}

/// Parameters for generating a card row.
#[derive(Debug, Clone)]
pub struct CardParams {
    pub id: i64,
    pub deck_id: i64,
    pub card_type_id: i64,
    pub created: i64,
    /// When true, `mod` is bumped past `created`.
    pub edited: bool,
    pub deleted: bool,
    pub lesson: bool,
    pub primary_field: String,
}

impl Arbitrary for CardParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            card_id(),
            1i64..=5,  // deck_id
            1i64..=5,  // card_type_id
            timestamp(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            field_text(),
        )
            .prop_map(
                |(id, deck_id, card_type_id, created, edited, deleted, lesson, primary_field)| {
                    CardParams {
                        id,
                        deck_id,
                        card_type_id,
                        created,
                        edited,
                        deleted,
                        lesson,
                        primary_field,
                    }
                },
            )
            .boxed()
    }
}

/// Build a card row from parameters.
pub fn card_from_params(params: &CardParams) -> CardRow {
    let mut card = fixtures::make_card(params.id, params.deck_id, params.card_type_id);
    card.created = params.created;
    card.modified = if params.edited {
        params.created + 1
    } else {
        params.created
    };
    card.server_mod = card.modified;
    card.deleted = i64::from(params.deleted);
    card.lesson_id = params.lesson.then_some(1);
    card.primary_field = params.primary_field.clone();
    card
}

/// Generate a batch of card rows, duplicates included.
pub fn card_batch(max: usize) -> impl Strategy<Value = Vec<CardRow>> {
    prop::collection::vec(any::<CardParams>(), 1..=max)
        .prop_map(|params| params.iter().map(card_from_params).collect())
}
