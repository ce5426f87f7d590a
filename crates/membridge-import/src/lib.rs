//! # Membridge Import
//!
//! Translating mirrored cards into host note drafts.
//!
//! ## Overview
//!
//! After a pull lands in the mirror, the card rows it delivered are offered
//! to the host collection. Which cards go where is user configuration: a
//! [`MappingRegistry`] keyed by remote (deck, card type) pair decides the
//! target note type, target deck and per-field assignment, or marks the pair
//! ignored. The [`Translator`] walks a batch, resolves each card's mapping
//! and renders its fields:
//!
//! ```text
//! cards ---prefilter---> surviving creations
//!                             |
//!                   MappingRegistry lookup
//!                    |                  |
//!                mapped              missing
//!                    |                  |
//!            per-field render     MissingMapping
//!            (TEXT / SYNTAX /     (batch rejected,
//!             media fetch)         zero drafts)
//!                    |
//!                    v
//!              Vec<NoteDraft>
//! ```
//!
//! ## Key properties
//!
//! - **Drafts only**: the translator never writes to the host; the caller
//!   persists drafts after the whole batch succeeded
//! - **Creation-only**: a card edited after creation is never re-imported
//! - **Media degrades, transport does not**: an absent media object becomes
//!   an empty field, a failed request rejects the batch
//!
//! ## Usage
//!
//! ```rust,no_run
//! use membridge_import::{FsMediaSink, ImportOptions, MappingRegistry, Translator};
//! use membridge_mirror::SqliteMirror;
//! use membridge_sync::{HttpRemote, RemoteConfig};
//!
//! # async fn demo() -> membridge_import::Result<()> {
//! let mirror = SqliteMirror::open("mirror.db")?;
//! let remote = HttpRemote::new(RemoteConfig::new(
//!     "https://sync.example.com",
//!     "https://media.example.com",
//!     "bearer-token",
//! ))?;
//! let sink = FsMediaSink::new("collection.media");
//! let registry = MappingRegistry::new();
//!
//! let translator = Translator::new(&mirror, &remote, &sink, ImportOptions::default());
//! let drafts = translator.translate_all(&registry).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod media;
pub mod registry;
pub mod translate;

pub use error::{ImportError, Result};
pub use media::{memory::MemoryMediaSink, FsMediaSink, MediaSink};
pub use registry::{IgnoredPair, MappingConfig, MappingRegistry, RegistrySnapshot};
pub use translate::{ImportOptions, NoteDraft, Translator, DEFAULT_TAG};
