//! Local mirror storage for Membridge.
//!
//! The mirror is a faithful local copy of the remote collections plus the
//! sync cursor that tracks how far it has caught up. This crate provides:
//!
//! - [`Mirror`]: the storage trait the rest of the bridge programs against.
//! - [`SqliteMirror`]: the durable SQLite backend used in production.
//! - [`MemoryMirror`]: an ephemeral backend for tests.
//!
//! # Usage
//!
//! ```no_run
//! use membridge_mirror::{Mirror, SqliteMirror};
//!
//! # async fn demo() -> membridge_mirror::Result<()> {
//! let mirror = SqliteMirror::open("mirror.db")?;
//! let cursor = mirror.cursor().await?;
//! println!("last pull at {}", cursor.last_pull);
//! # Ok(())
//! # }
//! ```
//!
//! # Design notes
//!
//! Rows are stored exactly as the remote ships them; the mirror never
//! interprets or rewrites row contents. Batch writes are transactional so a
//! half-applied changeset can never become visible.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{MirrorError, Result};
pub use memory::MemoryMirror;
pub use sqlite::SqliteMirror;
pub use traits::{Mirror, MirrorRecord};
