//! Error types for the sync crate.

use thiserror::Error;

/// Errors that can occur while pulling or applying changesets.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The payload named an unknown group or carried a malformed row.
    /// Nothing was written; the cursor must not advance.
    #[error("changeset rejected: {0}")]
    Changeset(#[from] membridge_core::ChangesetError),

    /// Mirror operation failed.
    #[error("mirror error: {0}")]
    Mirror(#[from] membridge_mirror::MirrorError),

    /// HTTP request failed before a response arrived.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The sync endpoint answered with a non-success status.
    #[error("server returned status {status} for {url}")]
    Status { status: u16, url: String },

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
