//! # Membridge Sync
//!
//! Pulling changesets from the remote service and applying them to the
//! local mirror.
//!
//! ## Overview
//!
//! Sync is pull-only. The remote is the source of truth; the mirror follows
//! it by asking for everything changed since the last committed pull and
//! replaying the answer row by row:
//!
//! ```text
//! RemoteClient::pull(since_ms)
//!        |
//!        v
//!  ChangesetPayload ---decode---> Changeset
//!        |                           |
//!        | cards, relations, words   | deferred groups
//!        v                           v
//!  Mirror::apply_batch (one tx)   logged and skipped
//! ```
//!
//! ## Key properties
//!
//! - **All or nothing**: decode failures reject the payload before any write
//! - **Idempotent**: replaying a committed changeset changes nothing
//! - **Closed world**: a group name this crate does not know is an error,
//!   never a silent skip
//!
//! ## Usage
//!
//! ```rust,no_run
//! use membridge_mirror::SqliteMirror;
//! use membridge_sync::{apply_changeset, HttpRemote, RemoteClient, RemoteConfig};
//!
//! # async fn demo() -> membridge_sync::Result<()> {
//! let mirror = SqliteMirror::open("mirror.db")?;
//! let remote = HttpRemote::new(RemoteConfig::new(
//!     "https://sync.example.com",
//!     "https://media.example.com",
//!     "bearer-token",
//! ))?;
//!
//! let payload = remote.pull(0).await?;
//! let applied = apply_changeset(&mirror, payload).await?;
//! println!("wrote {} rows", applied.report.persisted());
//! # Ok(())
//! # }
//! ```

pub mod apply;
pub mod client;
pub mod error;
pub mod http;

pub use apply::{apply_changeset, AppliedChangeset, ApplyReport};
pub use client::{memory::MemoryRemote, RemoteClient};
pub use error::{Result, SyncError};
pub use http::{HttpRemote, RemoteConfig};
