//! # Membridge Testkit
//!
//! Testing utilities for Membridge.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: canned rows in the remote wire shape, plus a seeded
//!   in-memory mirror
//! - **Payloads**: a builder for pull responses, hostile ones included
//! - **Generators**: proptest strategies for property-based testing
//!
//! ## Payload building
//!
//! ```rust
//! use membridge_testkit::fixtures::make_card;
//! use membridge_testkit::payloads::PayloadBuilder;
//!
//! let payload = PayloadBuilder::new()
//!     .cards(&[make_card(1, 1, 2)])
//!     .group("reviews", serde_json::json!([]))
//!     .build();
//! ```
//!
//! ## Property testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use membridge_testkit::generators::{card_from_params, CardParams};
//!
//! proptest! {
//!     #[test]
//!     fn cards_roundtrip(params: CardParams) {
//!         let card = card_from_params(&params);
//!         prop_assert_eq!(card.id.as_i64(), params.id);
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod payloads;

pub use fixtures::{
    config_json, make_card, make_card_type, make_deck, make_relation, make_word_status,
    TestFixture, STAMP,
};
pub use generators::{card_batch, card_from_params, CardParams};
pub use payloads::{all_groups_payload, cards_payload, PayloadBuilder};
