use thiserror::Error;

/// Errors that can occur during mirror operations.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Underlying SQLite error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A row lookup found nothing.
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// The mirror contains data that violates its own invariants.
    #[error("invalid mirror data: {0}")]
    InvalidData(String),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(String),
}

impl MirrorError {
    /// Construct a `NotFound` error for the given record kind and key.
    pub fn not_found(kind: &'static str, key: impl ToString) -> Self {
        MirrorError::NotFound {
            kind,
            key: key.to_string(),
        }
    }
}

/// Result type for mirror operations.
pub type Result<T> = std::result::Result<T, MirrorError>;
