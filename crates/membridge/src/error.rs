//! Error types for the bridge facade.

use thiserror::Error;

/// Errors that can occur during bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Mirror read or write failed.
    #[error("mirror error: {0}")]
    Mirror(#[from] membridge_mirror::MirrorError),

    /// Pull or changeset apply failed. The cursor was not advanced; the
    /// cycle is safe to retry as a whole.
    #[error("sync error: {0}")]
    Sync(#[from] membridge_sync::SyncError),

    /// Translation failed after the changeset was committed. The mirror and
    /// cursor keep the pull; fix the mapping and translate again.
    #[error("import error: {0}")]
    Import(#[from] membridge_import::ImportError),
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
