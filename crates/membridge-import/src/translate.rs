//! Card-to-note translation.
//!
//! The translator turns freshly mirrored cards into host note drafts. It is
//! read-only on the host side: drafts are returned to the caller, and the
//! caller persists them only once the whole batch translated cleanly. A
//! missing mapping or an unsupported field kind therefore rejects the batch
//! with zero drafts instead of importing a prefix of it.
//!
//! Batch shaping before translation:
//! 1. lesson cards are dropped,
//! 2. of several rows sharing one card id, only the last in delivery order
//!    survives (a tombstone suppresses the id entirely),
//! 3. ignored pairs are skipped,
//! 4. only never-edited cards (`mod == created`) are translated.

use membridge_core::{
    CardId, CardRow, CardTypeRow, FieldKind, HostDeckId, HostNoteTypeId, MappingKey,
};
use membridge_mirror::Mirror;
use membridge_sync::RemoteClient;
use regex::Regex;

use crate::error::{ImportError, Result};
use crate::media::MediaSink;
use crate::registry::{MappingConfig, MappingRegistry};

/// Tag attached to drafts when [`ImportOptions::tag`] is left alone.
pub const DEFAULT_TAG: &str = "membridge";

/// Width of the scheme prefix on media field values; the remainder is the
/// object path on the media store.
const MEDIA_SCHEME_LEN: usize = 5;

/// Knobs for a translation run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Strip bracketed reading markup and brace characters from SYNTAX
    /// fields instead of copying them verbatim.
    pub strip_syntax: bool,
    /// Tag attached to every draft so imported notes can be found later.
    pub tag: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            strip_syntax: false,
            tag: DEFAULT_TAG.to_string(),
        }
    }
}

/// A translated note, ready for the host to persist.
///
/// Storage identity is the host's to assign; the draft only names the target
/// deck and note type from the mapping that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteDraft {
    pub deck: HostDeckId,
    pub note_type: HostNoteTypeId,
    /// The mirrored card this draft was translated from.
    pub source_card: CardId,
    /// `(field name, rendered value)` in target field order.
    pub fields: Vec<(String, String)>,
    pub tags: Vec<String>,
}

/// Translates mirrored cards into [`NoteDraft`]s.
pub struct Translator<'a, M, R, S> {
    mirror: &'a M,
    remote: &'a R,
    media: &'a S,
    options: ImportOptions,
    syntax_re: Regex,
}

impl<'a, M, R, S> Translator<'a, M, R, S>
where
    M: Mirror,
    R: RemoteClient,
    S: MediaSink,
{
    pub fn new(mirror: &'a M, remote: &'a R, media: &'a S, options: ImportOptions) -> Self {
        Self {
            mirror,
            remote,
            media,
            options,
            syntax_re: Regex::new(r"\[.*?\]").expect("syntax pattern is valid"),
        }
    }

    /// Translate one batch of cards, usually the card rows of the changeset
    /// that was just applied.
    ///
    /// Fails with [`ImportError::MissingMapping`] on the first surviving card
    /// whose pair is neither mapped nor ignored; no drafts are returned in
    /// that case.
    pub async fn translate_batch(
        &self,
        registry: &MappingRegistry,
        cards: &[CardRow],
    ) -> Result<Vec<NoteDraft>> {
        let batch = prefilter(cards);
        let mut drafts = Vec::new();
        for card in &batch {
            if registry.is_ignored(card.deck_id, card.card_type_id) {
                continue;
            }
            if !card.is_creation() {
                continue;
            }
            let card_type = self.mirror.card_type(card.card_type_id).await?;
            let deck = self.mirror.deck(card.deck_id).await?;
            let mapping = match registry.get(card.deck_id, card.card_type_id) {
                Some(mapping) => mapping,
                None => {
                    return Err(ImportError::MissingMapping {
                        deck_name: deck.name,
                        card_type_name: card_type.name,
                        lang: card_type.lang,
                    })
                }
            };
            drafts.push(self.translate_card(card, &card_type, mapping).await?);
        }
        tracing::debug!(
            incoming = cards.len(),
            translated = drafts.len(),
            "translated card batch"
        );
        Ok(drafts)
    }

    /// Translate every card currently in the mirror. Used to recover after
    /// the user fixes a missing mapping without waiting for the next pull.
    pub async fn translate_all(&self, registry: &MappingRegistry) -> Result<Vec<NoteDraft>> {
        let cards = self.mirror.cards().await?;
        self.translate_batch(registry, &cards).await
    }

    async fn translate_card(
        &self,
        card: &CardRow,
        card_type: &CardTypeRow,
        mapping: &MappingConfig,
    ) -> Result<NoteDraft> {
        let config = card_type
            .parsed_config()
            .map_err(|source| ImportError::InvalidCardTypeConfig {
                card_type: card_type.id,
                source,
            })?;
        let values = card.field_values();
        let key = mapping.key();

        let mut fields = Vec::with_capacity(mapping.mapped_indices.len());
        for (i, &mapped) in mapping.mapped_indices.iter().enumerate() {
            let target_name = mapping
                .target_field_names
                .get(i)
                .ok_or_else(|| stale(key, format!("no target field name at position {i}")))?;
            if mapped < 0 {
                fields.push((target_name.clone(), String::new()));
                continue;
            }
            let idx = mapped as usize;
            let source_name = mapping
                .remote_field_names
                .get(idx)
                .ok_or_else(|| stale(key, format!("no remote field name at index {idx}")))?;
            let def = config.field_named(source_name).ok_or_else(|| {
                stale(key, format!("card type has no field named \"{source_name}\""))
            })?;
            let kind = FieldKind::parse(&def.kind)
                .ok_or_else(|| ImportError::UnsupportedFieldKind(def.kind.clone()))?;
            let value = values
                .get(idx)
                .cloned()
                .ok_or_else(|| stale(key, format!("card has no field value at index {idx}")))?;
            let rendered = match kind {
                FieldKind::Text => value,
                FieldKind::Syntax => self.render_syntax(value),
                FieldKind::Image | FieldKind::Audio | FieldKind::AudioLong => {
                    self.render_media(kind, &value).await?
                }
            };
            fields.push((target_name.clone(), rendered));
        }

        Ok(NoteDraft {
            deck: mapping.target_deck_id,
            note_type: mapping.target_note_type_id,
            source_card: card.id,
            fields,
            tags: vec![self.options.tag.clone()],
        })
    }

    fn render_syntax(&self, value: String) -> String {
        if !self.options.strip_syntax {
            return value;
        }
        self.syntax_re
            .replace_all(&value, "")
            .replace('{', "")
            .replace('}', "")
    }

    /// Fetch a media value's blob and hand it to the sink. An absent object
    /// degrades to an empty field; only transport failures reject the batch.
    async fn render_media(&self, kind: FieldKind, value: &str) -> Result<String> {
        let path: String = value.chars().skip(MEDIA_SCHEME_LEN).collect();
        if path.is_empty() {
            return Ok(String::new());
        }
        let bytes = match self.remote.fetch_media(&path).await? {
            Some(bytes) => bytes,
            None => {
                tracing::warn!(%path, "media object not found, leaving field empty");
                return Ok(String::new());
            }
        };
        let filename = path.rsplit('/').next().unwrap_or(&path);
        let stored = self.media.store(filename, bytes).await?;
        Ok(match kind {
            FieldKind::Image => format!("<img src=\"{stored}\">"),
            _ => format!("[sound:{stored}]"),
        })
    }
}

fn stale(key: MappingKey, detail: String) -> ImportError {
    ImportError::StaleMapping { key, detail }
}

/// Drop lesson cards, collapse repeated ids to the last delivered row, and
/// drop tombstones. A tombstone also suppresses an earlier live row for the
/// same id within the batch.
fn prefilter(cards: &[CardRow]) -> Vec<CardRow> {
    let mut batch: Vec<CardRow> = Vec::new();
    for card in cards {
        if card.is_lesson_card() {
            continue;
        }
        batch.retain(|kept| kept.id != card.id);
        if !card.is_deleted() {
            batch.push(card.clone());
        }
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use membridge_core::{CardTypeId, DeckId, FIELD_SEPARATOR};
    use membridge_mirror::{MemoryMirror, MirrorRecord};
    use membridge_sync::MemoryRemote;
    use membridge_testkit::{make_card, make_card_type, TestFixture, STAMP};

    use crate::media::memory::MemoryMediaSink;

    /// Deck 1 ("ja") and card type 10 with the four kinds the translator
    /// understands. Field values index as primary = Front, secondary =
    /// Reading, packed fields = Picture then Sound.
    async fn seeded_mirror() -> MemoryMirror {
        TestFixture::with_references(
            1,
            10,
            "ja",
            &[
                ("Front", "TEXT"),
                ("Reading", "SYNTAX"),
                ("Picture", "IMAGE"),
                ("Sound", "AUDIO"),
            ],
        )
        .await
        .mirror
    }

    fn mapping_for(targets: &[(&str, i32)]) -> MappingConfig {
        MappingConfig {
            remote_deck_id: DeckId::new(1),
            remote_card_type_id: CardTypeId::new(10),
            target_note_type_id: HostNoteTypeId::new(77),
            target_deck_id: HostDeckId::new(88),
            remote_field_names: vec![
                "Front".into(),
                "Reading".into(),
                "Picture".into(),
                "Sound".into(),
            ],
            target_field_names: targets.iter().map(|(name, _)| (*name).to_string()).collect(),
            mapped_indices: targets.iter().map(|(_, idx)| *idx).collect(),
        }
    }

    fn registry_with(mapping: MappingConfig) -> MappingRegistry {
        let mut registry = MappingRegistry::new();
        registry.put(mapping);
        registry
    }

    #[tokio::test]
    async fn test_translates_text_field_verbatim() {
        let mirror = seeded_mirror().await;
        let remote = MemoryRemote::new();
        let sink = MemoryMediaSink::new();
        let translator = Translator::new(&mirror, &remote, &sink, ImportOptions::default());
        let registry = registry_with(mapping_for(&[("Expression", 0)]));

        let drafts = translator
            .translate_batch(&registry, &[make_card(7, 1, 10)])
            .await
            .unwrap();

        assert_eq!(drafts.len(), 1);
        let draft = &drafts[0];
        assert_eq!(draft.deck, HostDeckId::new(88));
        assert_eq!(draft.note_type, HostNoteTypeId::new(77));
        assert_eq!(draft.source_card, CardId::new(7));
        assert_eq!(draft.fields, vec![("Expression".into(), "primary 7".into())]);
        assert_eq!(draft.tags, vec![DEFAULT_TAG.to_string()]);
    }

    #[tokio::test]
    async fn test_last_occurrence_wins_in_one_batch() {
        let mirror = seeded_mirror().await;
        let remote = MemoryRemote::new();
        let sink = MemoryMediaSink::new();
        let translator = Translator::new(&mirror, &remote, &sink, ImportOptions::default());
        let registry = registry_with(mapping_for(&[("Expression", 0)]));

        let mut first = make_card(7, 1, 10);
        first.primary_field = "version A".into();
        let mut second = make_card(7, 1, 10);
        second.primary_field = "version B".into();

        let drafts = translator
            .translate_batch(&registry, &[first, second])
            .await
            .unwrap();

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].fields[0].1, "version B");
    }

    #[tokio::test]
    async fn test_tombstone_suppresses_earlier_occurrence() {
        let mirror = seeded_mirror().await;
        let remote = MemoryRemote::new();
        let sink = MemoryMediaSink::new();
        let translator = Translator::new(&mirror, &remote, &sink, ImportOptions::default());
        let registry = registry_with(mapping_for(&[("Expression", 0)]));

        let live = make_card(7, 1, 10);
        let mut tombstone = make_card(7, 1, 10);
        tombstone.deleted = 1;

        let drafts = translator
            .translate_batch(&registry, &[live, tombstone])
            .await
            .unwrap();
        assert!(drafts.is_empty());
    }

    #[tokio::test]
    async fn test_lesson_cards_are_skipped() {
        let mirror = seeded_mirror().await;
        let remote = MemoryRemote::new();
        let sink = MemoryMediaSink::new();
        let translator = Translator::new(&mirror, &remote, &sink, ImportOptions::default());
        let registry = registry_with(mapping_for(&[("Expression", 0)]));

        let mut card = make_card(7, 1, 10);
        card.lesson_id = Some(5);

        let drafts = translator.translate_batch(&registry, &[card]).await.unwrap();
        assert!(drafts.is_empty());
    }

    #[tokio::test]
    async fn test_edited_cards_are_not_reimported() {
        let mirror = seeded_mirror().await;
        let remote = MemoryRemote::new();
        let sink = MemoryMediaSink::new();
        let translator = Translator::new(&mirror, &remote, &sink, ImportOptions::default());
        let registry = registry_with(mapping_for(&[("Expression", 0)]));

        let mut card = make_card(7, 1, 10);
        card.modified = STAMP + 1;

        let drafts = translator.translate_batch(&registry, &[card]).await.unwrap();
        assert!(drafts.is_empty());
    }

    #[tokio::test]
    async fn test_ignored_pair_is_skipped_without_mapping() {
        let mirror = seeded_mirror().await;
        let remote = MemoryRemote::new();
        let sink = MemoryMediaSink::new();
        let translator = Translator::new(&mirror, &remote, &sink, ImportOptions::default());

        let mut registry = MappingRegistry::new();
        registry.add_ignored(MappingKey::new(DeckId::new(1), CardTypeId::new(10)));

        let drafts = translator
            .translate_batch(&registry, &[make_card(7, 1, 10)])
            .await
            .unwrap();
        assert!(drafts.is_empty());
    }

    #[tokio::test]
    async fn test_missing_mapping_halts_batch() {
        let mirror = seeded_mirror().await;
        mirror
            .upsert(&MirrorRecord::CardType(make_card_type(
                42,
                "ja",
                &[("Front", "TEXT")],
            )))
            .await
            .unwrap();
        let remote = MemoryRemote::new();
        let sink = MemoryMediaSink::new();
        let translator = Translator::new(&mirror, &remote, &sink, ImportOptions::default());
        let registry = registry_with(mapping_for(&[("Expression", 0)]));

        let err = translator
            .translate_batch(&registry, &[make_card(1, 1, 10), make_card(2, 1, 42)])
            .await
            .unwrap_err();

        match err {
            ImportError::MissingMapping {
                deck_name,
                card_type_name,
                lang,
            } => {
                assert_eq!(deck_name, "deck 1");
                assert_eq!(card_type_name, "type 42");
                assert_eq!(lang, "ja");
            }
            other => panic!("expected MissingMapping, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unmapped_position_yields_empty_field() {
        let mirror = seeded_mirror().await;
        let remote = MemoryRemote::new();
        let sink = MemoryMediaSink::new();
        let translator = Translator::new(&mirror, &remote, &sink, ImportOptions::default());
        let registry = registry_with(mapping_for(&[("Expression", 0), ("Meaning", -1)]));

        let drafts = translator
            .translate_batch(&registry, &[make_card(7, 1, 10)])
            .await
            .unwrap();

        assert_eq!(
            drafts[0].fields,
            vec![
                ("Expression".into(), "primary 7".into()),
                ("Meaning".into(), String::new()),
            ]
        );
    }

    #[tokio::test]
    async fn test_syntax_field_is_copied_verbatim_by_default() {
        let mirror = seeded_mirror().await;
        let remote = MemoryRemote::new();
        let sink = MemoryMediaSink::new();
        let translator = Translator::new(&mirror, &remote, &sink, ImportOptions::default());
        let registry = registry_with(mapping_for(&[("Reading", 1)]));

        let mut card = make_card(7, 1, 10);
        card.secondary_field = "[ab]{cd}ef".into();

        let drafts = translator.translate_batch(&registry, &[card]).await.unwrap();
        assert_eq!(drafts[0].fields[0].1, "[ab]{cd}ef");
    }

    #[tokio::test]
    async fn test_syntax_stripping_removes_brackets_and_braces() {
        let mirror = seeded_mirror().await;
        let remote = MemoryRemote::new();
        let sink = MemoryMediaSink::new();
        let options = ImportOptions {
            strip_syntax: true,
            ..Default::default()
        };
        let translator = Translator::new(&mirror, &remote, &sink, options);
        let registry = registry_with(mapping_for(&[("Reading", 1)]));

        let mut card = make_card(7, 1, 10);
        card.secondary_field = "[ab]{cd}ef".into();

        let drafts = translator.translate_batch(&registry, &[card]).await.unwrap();
        assert_eq!(drafts[0].fields[0].1, "cdef");
    }

    #[tokio::test]
    async fn test_image_field_fetches_stores_and_embeds() {
        let mirror = seeded_mirror().await;
        let remote = MemoryRemote::new();
        remote.put_media("media/pic.jpg", Bytes::from_static(b"jpeg"));
        let sink = MemoryMediaSink::new();
        let translator = Translator::new(&mirror, &remote, &sink, ImportOptions::default());
        let registry = registry_with(mapping_for(&[("Image", 2)]));

        let mut card = make_card(7, 1, 10);
        card.fields = "file:media/pic.jpg".into();

        let drafts = translator.translate_batch(&registry, &[card]).await.unwrap();
        assert_eq!(drafts[0].fields[0].1, "<img src=\"pic.jpg\">");
        assert_eq!(sink.get("pic.jpg").unwrap(), Bytes::from_static(b"jpeg"));
    }

    #[tokio::test]
    async fn test_audio_field_embeds_sound_tag() {
        let mirror = seeded_mirror().await;
        let remote = MemoryRemote::new();
        remote.put_media("media/clip.mp3", Bytes::from_static(b"mp3"));
        let sink = MemoryMediaSink::new();
        let translator = Translator::new(&mirror, &remote, &sink, ImportOptions::default());
        let registry = registry_with(mapping_for(&[("Audio", 3)]));

        let mut card = make_card(7, 1, 10);
        card.fields = format!("x{FIELD_SEPARATOR}file:media/clip.mp3");

        let drafts = translator.translate_batch(&registry, &[card]).await.unwrap();
        assert_eq!(drafts[0].fields[0].1, "[sound:clip.mp3]");
    }

    #[tokio::test]
    async fn test_missing_media_leaves_field_empty() {
        let mirror = seeded_mirror().await;
        let remote = MemoryRemote::new();
        let sink = MemoryMediaSink::new();
        let translator = Translator::new(&mirror, &remote, &sink, ImportOptions::default());
        let registry = registry_with(mapping_for(&[("Expression", 0), ("Image", 2)]));

        let mut card = make_card(7, 1, 10);
        card.fields = "file:media/gone.jpg".into();

        let drafts = translator.translate_batch(&registry, &[card]).await.unwrap();
        assert_eq!(
            drafts[0].fields,
            vec![
                ("Expression".into(), "primary 7".into()),
                ("Image".into(), String::new()),
            ]
        );
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_media_transport_failure_is_fatal() {
        let mirror = seeded_mirror().await;
        let remote = MemoryRemote::new();
        remote.fail_next_media("connection reset");
        let sink = MemoryMediaSink::new();
        let translator = Translator::new(&mirror, &remote, &sink, ImportOptions::default());
        let registry = registry_with(mapping_for(&[("Image", 2)]));

        let mut card = make_card(7, 1, 10);
        card.fields = "file:media/pic.jpg".into();

        let err = translator.translate_batch(&registry, &[card]).await.unwrap_err();
        assert!(matches!(err, ImportError::Sync(_)));
    }

    #[tokio::test]
    async fn test_empty_media_reference_skips_the_fetch() {
        let mirror = seeded_mirror().await;
        let remote = MemoryRemote::new();
        // Armed failure would reject the batch if a fetch happened.
        remote.fail_next_media("should not be called");
        let sink = MemoryMediaSink::new();
        let translator = Translator::new(&mirror, &remote, &sink, ImportOptions::default());
        let registry = registry_with(mapping_for(&[("Image", 2)]));

        let mut card = make_card(7, 1, 10);
        card.fields = "file:".into();

        let drafts = translator.translate_batch(&registry, &[card]).await.unwrap();
        assert_eq!(drafts[0].fields[0].1, "");
    }

    #[tokio::test]
    async fn test_unsupported_field_kind_is_fatal() {
        let mirror = seeded_mirror().await;
        mirror
            .upsert(&MirrorRecord::CardType(make_card_type(
                11,
                "ja",
                &[("Clip", "VIDEO")],
            )))
            .await
            .unwrap();
        let remote = MemoryRemote::new();
        let sink = MemoryMediaSink::new();
        let translator = Translator::new(&mirror, &remote, &sink, ImportOptions::default());

        let mut mapping = mapping_for(&[("Clip", 0)]);
        mapping.remote_card_type_id = CardTypeId::new(11);
        mapping.remote_field_names = vec!["Clip".into()];
        let registry = registry_with(mapping);

        let err = translator
            .translate_batch(&registry, &[make_card(9, 1, 11)])
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFieldKind(kind) if kind == "VIDEO"));
    }

    #[tokio::test]
    async fn test_stale_mapping_reports_renamed_field() {
        let mirror = seeded_mirror().await;
        let remote = MemoryRemote::new();
        let sink = MemoryMediaSink::new();
        let translator = Translator::new(&mirror, &remote, &sink, ImportOptions::default());

        let mut mapping = mapping_for(&[("Expression", 0)]);
        mapping.remote_field_names = vec!["Gone".into()];
        let registry = registry_with(mapping);

        let err = translator
            .translate_batch(&registry, &[make_card(7, 1, 10)])
            .await
            .unwrap_err();
        match err {
            ImportError::StaleMapping { detail, .. } => assert!(detail.contains("Gone")),
            other => panic!("expected StaleMapping, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_custom_tag_applies_to_drafts() {
        let mirror = seeded_mirror().await;
        let remote = MemoryRemote::new();
        let sink = MemoryMediaSink::new();
        let options = ImportOptions {
            tag: "bridge-import".into(),
            ..Default::default()
        };
        let translator = Translator::new(&mirror, &remote, &sink, options);
        let registry = registry_with(mapping_for(&[("Expression", 0)]));

        let drafts = translator
            .translate_batch(&registry, &[make_card(7, 1, 10)])
            .await
            .unwrap();
        assert_eq!(drafts[0].tags, vec!["bridge-import".to_string()]);
    }

    #[tokio::test]
    async fn test_translate_all_scans_the_mirror() {
        let mirror = seeded_mirror().await;
        mirror
            .upsert(&MirrorRecord::Card(make_card(3, 1, 10)))
            .await
            .unwrap();
        mirror
            .upsert(&MirrorRecord::Card(make_card(4, 1, 10)))
            .await
            .unwrap();
        let mut tombstone = make_card(5, 1, 10);
        tombstone.deleted = 1;
        mirror
            .upsert(&MirrorRecord::Card(tombstone))
            .await
            .unwrap();
        let remote = MemoryRemote::new();
        let sink = MemoryMediaSink::new();
        let translator = Translator::new(&mirror, &remote, &sink, ImportOptions::default());
        let registry = registry_with(mapping_for(&[("Expression", 0)]));

        let drafts = translator.translate_all(&registry).await.unwrap();
        let ids: Vec<CardId> = drafts.iter().map(|d| d.source_card).collect();
        assert_eq!(ids, vec![CardId::new(3), CardId::new(4)]);
    }

    #[test]
    fn test_prefilter_keeps_only_last_occurrence() {
        let mut early = make_card(7, 1, 10);
        early.primary_field = "A".into();
        let other = make_card(8, 1, 10);
        let mut late = make_card(7, 1, 10);
        late.primary_field = "B".into();

        let batch = prefilter(&[early, other, late]);
        let ids: Vec<i64> = batch.iter().map(|c| c.id.as_i64()).collect();
        assert_eq!(ids, vec![8, 7]);
        assert_eq!(batch[1].primary_field, "B");
    }
}
