//! Changeset application.
//!
//! A pulled payload is decoded in full before anything touches the mirror,
//! then every persisted row goes in through one transactional batch. The
//! all-or-nothing split point is decode: an unknown group name or a single
//! malformed row rejects the whole payload with the mirror untouched.

use membridge_core::{ChangeGroup, Changeset, ChangesetPayload};
use membridge_mirror::{Mirror, MirrorRecord};

use crate::error::Result;

/// What applying one changeset wrote.
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Card rows written.
    pub cards: usize,
    /// Card-to-word links written.
    pub card_word_relations: usize,
    /// Word-knowledge rows written.
    pub words: usize,
    /// Recognized groups that arrived non-empty but have no local handling.
    pub deferred: Vec<&'static str>,
}

impl ApplyReport {
    /// Total rows written to the mirror.
    pub fn persisted(&self) -> usize {
        self.cards + self.card_word_relations + self.words
    }
}

/// A decoded changeset together with what applying it wrote.
#[derive(Debug)]
pub struct AppliedChangeset {
    /// The typed changeset, kept for callers that feed it onward.
    pub changeset: Changeset,
    /// Row counts and skipped groups.
    pub report: ApplyReport,
}

/// Decode `payload` and commit all persisted groups in one transaction.
///
/// Rows are written in delivery order, so a row delivered later wins over an
/// earlier row with the same identity. An empty payload is a successful
/// no-op; advancing the cursor afterwards is the caller's job either way.
pub async fn apply_changeset<M: Mirror>(
    mirror: &M,
    payload: ChangesetPayload,
) -> Result<AppliedChangeset> {
    let changeset = Changeset::decode(payload)?;

    let mut report = ApplyReport::default();
    let mut records: Vec<MirrorRecord> = Vec::new();
    for group in &changeset.groups {
        match group {
            ChangeGroup::Cards(cards) => {
                report.cards += cards.len();
                records.extend(cards.iter().cloned().map(MirrorRecord::from));
            }
            ChangeGroup::CardWordRelations(relations) => {
                report.card_word_relations += relations.len();
                records.extend(relations.iter().cloned().map(MirrorRecord::from));
            }
            ChangeGroup::Words(words) => {
                report.words += words.len();
                records.extend(words.iter().cloned().map(MirrorRecord::from));
            }
            ChangeGroup::Deferred { .. } => {}
        }
    }

    report.deferred = changeset.non_empty_deferred();
    if !report.deferred.is_empty() {
        tracing::warn!(groups = ?report.deferred, "skipping groups with no local handling");
    }

    if !records.is_empty() {
        mirror.apply_batch(&records).await?;
    }

    Ok(AppliedChangeset { changeset, report })
}
