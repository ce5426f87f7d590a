//! Error types for Membridge core.

use thiserror::Error;

/// Errors raised while decoding a changeset payload.
///
/// Both variants are fatal to an apply: the mirror must not be touched and
/// the cursor must not advance when decoding fails.
#[derive(Debug, Error)]
pub enum ChangesetError {
    /// The payload carried a group name outside the recognized set.
    #[error("unknown change group: {0}")]
    UnknownGroup(String),

    /// A persisted group's rows did not parse into their typed form.
    #[error("malformed rows in change group {group}: {source}")]
    Decode {
        group: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
