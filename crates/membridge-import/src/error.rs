//! Error types for the import crate.

use membridge_core::{CardTypeId, MappingKey};
use thiserror::Error;

/// Errors that can occur while translating mirrored cards into note drafts.
#[derive(Debug, Error)]
pub enum ImportError {
    /// A card's (deck, card type) pair has no mapping and is not ignored.
    /// Translation halts; no drafts from the batch are returned.
    #[error(
        "no mapping for card type \"{card_type_name}\" in deck \"{deck_name}\" ({lang}); \
         map the pair or mark it ignored, then import again"
    )]
    MissingMapping {
        deck_name: String,
        card_type_name: String,
        lang: String,
    },

    /// A field declared a kind the translator does not know how to render.
    #[error("unsupported field kind \"{0}\"")]
    UnsupportedFieldKind(String),

    /// A stored mapping no longer lines up with the live card type config.
    #[error("stale mapping for {key}: {detail}")]
    StaleMapping { key: MappingKey, detail: String },

    /// A card type row carried config JSON that does not parse.
    #[error("invalid config for card type {card_type}: {source}")]
    InvalidCardTypeConfig {
        card_type: CardTypeId,
        #[source]
        source: serde_json::Error,
    },

    /// Mirror lookup failed.
    #[error("mirror error: {0}")]
    Mirror(#[from] membridge_mirror::MirrorError),

    /// Media fetch failed at the transport level.
    #[error("sync error: {0}")]
    Sync(#[from] membridge_sync::SyncError),

    /// Media sink I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;
