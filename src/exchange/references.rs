//! Extension point for materializing attachment and relation references
//! carried by an imported memo.

use super::format::{AttachmentRef, RelationRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceResult {
    Imported(u32),
    /// Nothing was imported; the message is surfaced as a warning.
    NotImported(String),
}

/// Materializes references after the owning memo has been written.
///
/// Relation targets must be resolved against already-persisted memos; a
/// target that appears later in the same snapshot may not exist yet.
pub trait ReferenceImporter {
    fn import_attachments(&self, memo_uid: &str, refs: &[AttachmentRef]) -> ReferenceResult;

    fn import_relations(&self, memo_uid: &str, refs: &[RelationRef]) -> ReferenceResult;
}

/// Default importer: binary transfer and relation resolution are not
/// available, so every non-empty reference list becomes a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeferredReferences;

impl ReferenceImporter for DeferredReferences {
    fn import_attachments(&self, memo_uid: &str, _refs: &[AttachmentRef]) -> ReferenceResult {
        ReferenceResult::NotImported(format!(
            "Attachments for memo {} were skipped (attachment import not yet implemented)",
            memo_uid
        ))
    }

    fn import_relations(&self, memo_uid: &str, _refs: &[RelationRef]) -> ReferenceResult {
        ReferenceResult::NotImported(format!(
            "Relations for memo {} were skipped (relation import not yet implemented)",
            memo_uid
        ))
    }
}
