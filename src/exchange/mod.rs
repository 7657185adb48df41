pub mod export;
pub mod format;
pub mod import;
pub mod references;
pub mod request;
pub mod summary;

pub use export::{build_snapshot, export_filename, export_memos};
pub use format::{AttachmentRef, RelationRef, SNAPSHOT_VERSION, Snapshot, SnapshotMemo, decode, encode};
pub use import::{import_memos, import_memos_with, reconcile_memo};
pub use references::{DeferredReferences, ReferenceImporter, ReferenceResult};
pub use request::{
    ExportRequest, ExportResponse, FORMAT_JSON, ImportOptions, ImportRequest, ImportResponse,
    ImportSummaryView,
};
pub use summary::{Disposition, ImportOutcome, ImportSummary, Outcome, aggregate};
