//! # Membridge
//!
//! The unified API for the membridge system - a one-way bridge that mirrors
//! a remote spaced-repetition service locally and feeds newly created cards
//! into a host collection.
//!
//! ## Overview
//!
//! Membridge provides a library for:
//!
//! - **Mirror**: a local SQLite cache of remote-owned records with a
//!   two-slot sync cursor
//! - **Sync**: incremental pull of changesets and their all-or-nothing
//!   application to the mirror
//! - **Import**: user-configured mappings that translate mirrored cards
//!   into host note drafts, media included
//!
//! ## Key concepts
//!
//! - **Changeset**: everything the remote changed since a timestamp, keyed
//!   by group name. Unknown groups reject the whole payload.
//! - **Cursor**: advances to the pre-pull timestamp only after the
//!   changeset fully committed; the mirror is never staler than the cursor
//!   claims.
//! - **Mapping**: per (deck, card type) pair, where cards land in the host
//!   and how fields line up. A pair is mapped, ignored, or blocks import.
//! - **Draft**: a translated note the host persists. Dropping drafts vetoes
//!   an import without disturbing the mirror.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use membridge::{Bridge, BridgeConfig};
//! use membridge::import::FsMediaSink;
//! use membridge::mirror::SqliteMirror;
//! use membridge::sync::{HttpRemote, RemoteConfig};
//!
//! async fn example() -> membridge::Result<()> {
//!     let mirror = SqliteMirror::open("mirror.db")?;
//!     let remote = HttpRemote::new(RemoteConfig::new(
//!         "https://sync.example.com",
//!         "https://media.example.com",
//!         "bearer-token",
//!     ))?;
//!     let media = FsMediaSink::new("collection.media");
//!
//!     let bridge = Bridge::new(mirror, remote, media, BridgeConfig::default());
//!
//!     let outcome = bridge.sync_cycle().await?;
//!     for draft in outcome.drafts {
//!         // hand the draft to the host collection
//!         let _ = draft;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `membridge::core` - record, changeset and id types
//! - `membridge::mirror` - the local mirror store
//! - `membridge::sync` - remote client and changeset applier
//! - `membridge::import` - mapping registry and translator

pub mod bridge;
pub mod error;

// Re-export component crates
pub use membridge_core as core;
pub use membridge_import as import;
pub use membridge_mirror as mirror;
pub use membridge_sync as sync;

// Re-export main types for convenience
pub use bridge::{Bridge, BridgeConfig, SyncOutcome};
pub use error::{BridgeError, Result};

// Re-export commonly used component types
pub use membridge_core::{
    CardId, CardRow, CardTypeId, CardTypeRow, DeckId, DeckRow, HostDeckId, HostNoteTypeId,
    MappingKey, SyncCursor,
};
pub use membridge_import::{ImportOptions, MappingConfig, NoteDraft, RegistrySnapshot};
pub use membridge_sync::ApplyReport;
