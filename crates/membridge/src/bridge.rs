//! The Bridge: unified API for the membridge system.
//!
//! The bridge brings together the remote client, the local mirror and the
//! import translator into one serialized sync cycle, and owns the mapping
//! registry with the paired updates that keep "mapped" and "ignored"
//! mutually exclusive.

use std::sync::RwLock;

use membridge_core::{CardRow, CardTypeRow, DeckRow, MappingKey, SyncCursor};
use membridge_import::{
    ImportOptions, MappingConfig, MappingRegistry, MediaSink, NoteDraft, RegistrySnapshot,
    Translator,
};
use membridge_mirror::Mirror;
use membridge_sync::{apply_changeset, ApplyReport, RemoteClient};
use tokio::sync::Mutex;

use crate::error::Result;

/// Configuration for the bridge.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    /// Options handed to the translator each cycle.
    pub import: ImportOptions,
}

/// What one sync cycle produced.
///
/// The drafts are not persisted anywhere yet. Handing them to the host is
/// the caller's move; dropping them vetoes the import while the mirror and
/// cursor keep the already committed changeset.
#[derive(Debug)]
pub struct SyncOutcome {
    /// Row counts the changeset wrote into the mirror.
    pub report: ApplyReport,
    /// The cursor committed for this cycle.
    pub cursor: SyncCursor,
    /// Translated notes for the host to persist.
    pub drafts: Vec<NoteDraft>,
}

/// The main bridge struct.
///
/// Provides a unified API for:
/// - Running the serialized pull-apply-translate cycle
/// - Managing mappings and ignored pairs with paired updates
/// - Reference lookups for a mapping UI
pub struct Bridge<M, R, S> {
    mirror: M,
    remote: R,
    media: S,
    registry: RwLock<MappingRegistry>,
    /// Held around the whole pull-apply-translate sequence; cycles queue
    /// behind each other instead of interleaving.
    cycle: Mutex<()>,
    config: BridgeConfig,
}

impl<M, R, S> Bridge<M, R, S>
where
    M: Mirror,
    R: RemoteClient,
    S: MediaSink,
{
    /// Create a new bridge instance with an empty mapping registry.
    pub fn new(mirror: M, remote: R, media: S, config: BridgeConfig) -> Self {
        Self {
            mirror,
            remote,
            media,
            registry: RwLock::new(MappingRegistry::new()),
            cycle: Mutex::new(()),
            config,
        }
    }

    /// Get the mirror reference.
    pub fn mirror(&self) -> &M {
        &self.mirror
    }

    /// Get the remote client reference.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Get the media sink reference.
    pub fn media(&self) -> &S {
        &self.media
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sync operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Run one sync cycle: pull everything changed since the committed
    /// cursor, apply it to the mirror, advance the cursor, and translate the
    /// delivered cards into drafts.
    ///
    /// The cursor is stamped with a timestamp taken before the pull, so
    /// changes arriving while the request is in flight are fetched again by
    /// the next cycle; apply is idempotent, so the overlap is harmless.
    ///
    /// The mirror commit and cursor advance stand even when translation
    /// fails or the caller discards the drafts. Only host persistence is
    /// pending at that point; [`Bridge::translate_cards`] re-derives the
    /// drafts once the registry is fixed.
    pub async fn sync_cycle(&self) -> Result<SyncOutcome> {
        let _cycle = self.cycle.lock().await;

        let since = self.mirror.cursor().await?.last_pull;
        let pulled_at = now_millis();
        let payload = self.remote.pull(since).await?;
        let applied = apply_changeset(&self.mirror, payload).await?;

        let cursor = SyncCursor::both(pulled_at);
        self.mirror.set_cursor(cursor).await?;
        tracing::info!(
            since,
            cursor = cursor.last_pull,
            cards = applied.report.cards,
            relations = applied.report.card_word_relations,
            words = applied.report.words,
            "changeset committed"
        );

        let cards: Vec<CardRow> = applied.changeset.cards().cloned().collect();
        let drafts = self.translate_batch(&cards).await?;

        Ok(SyncOutcome {
            report: applied.report,
            cursor,
            drafts,
        })
    }

    /// Translate every eligible card in the mirror, regardless of when it
    /// arrived. This is the recovery path after a cycle failed on a missing
    /// mapping: save the mapping, then import from here without waiting for
    /// the next pull.
    pub async fn translate_cards(&self) -> Result<Vec<NoteDraft>> {
        let _cycle = self.cycle.lock().await;
        let registry = self.registry_view();
        let translator = self.translator();
        Ok(translator.translate_all(&registry).await?)
    }

    async fn translate_batch(&self, cards: &[CardRow]) -> Result<Vec<NoteDraft>> {
        let registry = self.registry_view();
        let translator = self.translator();
        Ok(translator.translate_batch(&registry, cards).await?)
    }

    fn translator(&self) -> Translator<'_, M, R, S> {
        Translator::new(
            &self.mirror,
            &self.remote,
            &self.media,
            self.config.import.clone(),
        )
    }

    /// The registry as this cycle sees it. Cloning under the read lock keeps
    /// the batch on one consistent view while writers stay unblocked.
    fn registry_view(&self) -> MappingRegistry {
        self.registry.read().unwrap().clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mapping operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Save a mapping and clear any ignore mark on its pair.
    ///
    /// The registry itself never cross-updates its two collections; mapped
    /// and ignored stay mutually exclusive because every caller goes through
    /// this pairing (and [`Bridge::ignore_pair`]'s).
    pub fn save_mapping(&self, config: MappingConfig) {
        let mut registry = self.registry.write().unwrap();
        let key = config.key();
        registry.put(config);
        registry.remove_ignored(key);
    }

    /// Mark a pair ignored and drop any mapping saved for it.
    pub fn ignore_pair(&self, pair: MappingKey) {
        let mut registry = self.registry.write().unwrap();
        registry.add_ignored(pair);
        registry.delete(pair.deck_id, pair.card_type_id);
    }

    /// Unmark an ignored pair, leaving it unmapped. Returns whether it was
    /// ignored.
    pub fn unignore_pair(&self, pair: MappingKey) -> bool {
        self.registry.write().unwrap().remove_ignored(pair)
    }

    /// The mapping saved for a pair, if any.
    pub fn mapping_for(&self, pair: MappingKey) -> Option<MappingConfig> {
        self.registry
            .read()
            .unwrap()
            .get(pair.deck_id, pair.card_type_id)
            .cloned()
    }

    /// Whether a pair is marked ignored.
    pub fn is_ignored(&self, pair: MappingKey) -> bool {
        self.registry
            .read()
            .unwrap()
            .is_ignored(pair.deck_id, pair.card_type_id)
    }

    /// A serializable copy of the registry for the host to persist.
    pub fn mapping_snapshot(&self) -> RegistrySnapshot {
        self.registry.read().unwrap().snapshot()
    }

    /// Replace the registry with a previously persisted snapshot.
    pub fn restore_mappings(&self, snapshot: RegistrySnapshot) {
        *self.registry.write().unwrap() = MappingRegistry::from_snapshot(snapshot);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reference lookups
    // ─────────────────────────────────────────────────────────────────────────

    /// Languages with live rows in the mirror, for scoping a mapping UI.
    pub async fn languages(&self) -> Result<Vec<String>> {
        Ok(self.mirror.languages().await?)
    }

    /// Live decks in a language, ordered by id.
    pub async fn decks_for_language(&self, lang: &str) -> Result<Vec<DeckRow>> {
        Ok(self.mirror.decks_for_language(lang).await?)
    }

    /// Live card types in a language, ordered by id.
    pub async fn card_types_for_language(&self, lang: &str) -> Result<Vec<CardTypeRow>> {
        Ok(self.mirror.card_types_for_language(lang).await?)
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
