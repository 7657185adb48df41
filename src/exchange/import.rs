use std::time::Instant;

use chrono::Utc;

use crate::error::{MemoportError, Result};
use crate::model::{Memo, MemoPayload, RowStatus, UpdateMemo, UserId, Visibility};
use crate::payload::rebuild_payload;
use crate::store::{CurrentUser, FindMemo, MemoStore};

use super::format::{SnapshotMemo, decode};
use super::references::{DeferredReferences, ReferenceImporter, ReferenceResult};
use super::request::{ImportOptions, ImportRequest, ImportResponse, resolve_format};
use super::summary::{Disposition, ImportOutcome, Outcome, aggregate};

/// Import a snapshot for the current user, deferring attachment and
/// relation references.
pub fn import_memos<S: MemoStore>(
    store: &S,
    identity: &impl CurrentUser,
    request: &ImportRequest,
) -> Result<ImportResponse> {
    import_memos_with(store, identity, request, &DeferredReferences)
}

/// Import a snapshot, materializing references through `references`.
///
/// Batch-level problems (identity, format, malformed bytes, version) fail the
/// whole call. Everything else is decided per memo and reported in the
/// response; memos already written stay written.
pub fn import_memos_with<S: MemoStore, R: ReferenceImporter>(
    store: &S,
    identity: &impl CurrentUser,
    request: &ImportRequest,
    references: &R,
) -> Result<ImportResponse> {
    let started = Instant::now();

    let user = identity.current_user()?;
    resolve_format(&request.format)?;

    let snapshot = decode(&request.data)?;
    snapshot.check_version()?;

    let options = request.options;
    let now = Utc::now().timestamp();

    let outcomes: Vec<_> = snapshot
        .records
        .iter()
        .map(|record| reconcile_memo(store, user.id, record, &options, references, now))
        .collect();

    let summary = aggregate(outcomes, options.validate_only, started.elapsed());

    tracing::info!(
        user = %user.username,
        total = summary.total_memos,
        imported = summary.imported_count,
        skipped = summary.skipped_count,
        created = summary.created_count,
        updated = summary.updated_count,
        validate_only = options.validate_only,
        duration_ms = summary.duration_ms,
        "imported memos"
    );

    Ok(summary.into())
}

/// Decide and apply create/update/skip/reject for one snapshot memo.
///
/// `now` (unix seconds) stamps both timestamps when they are not preserved.
pub fn reconcile_memo<S: MemoStore, R: ReferenceImporter>(
    store: &S,
    owner: UserId,
    record: &SnapshotMemo,
    options: &ImportOptions,
    references: &R,
    now: i64,
) -> Outcome<ImportOutcome> {
    match try_reconcile(store, owner, record, options, references, now) {
        Ok((outcome, warnings)) => Outcome::with_warnings(outcome, warnings),
        Err(e) => {
            tracing::warn!(uid = %record.uid, error = %e, "failed to import memo");
            Outcome::Reject(format!("Failed to import memo {}: {}", record.uid, e))
        }
    }
}

fn try_reconcile<S: MemoStore, R: ReferenceImporter>(
    store: &S,
    owner: UserId,
    record: &SnapshotMemo,
    options: &ImportOptions,
    references: &R,
    now: i64,
) -> Result<(ImportOutcome, Vec<String>)> {
    let mut warnings = Vec::new();

    // UIDs are global, so existence is checked across all owners.
    let existing = store
        .get_memo(&FindMemo::by_uid(&record.uid))
        .map_err(|e| MemoportError::Import(format!("failed to check for existing memo: {}", e)))?;

    if existing.is_some() && !options.overwrite_existing {
        return Err(MemoportError::MemoAlreadyExists {
            uid: record.uid.clone(),
        });
    }

    let limit = store
        .content_length_limit()
        .map_err(|e| MemoportError::Import(format!("failed to get content length limit: {}", e)))?;
    if record.content.len() > limit {
        return Err(MemoportError::ContentTooLong { max: limit });
    }

    let visibility = match record.visibility.parse::<Visibility>() {
        Ok(v) => v,
        Err(unknown) => {
            warnings.push(format!(
                "Unknown visibility {} for memo {}, defaulting to PRIVATE",
                unknown, record.uid
            ));
            Visibility::Private
        }
    };

    let (created_ts, updated_ts) = if options.preserve_timestamps {
        (record.created_at.timestamp(), record.updated_at.timestamp())
    } else {
        (now, now)
    };

    if options.validate_only {
        return Ok((ImportOutcome::new(Disposition::Validated), warnings));
    }

    let display_ts = record.display_time.map(|t| t.timestamp());

    let mut outcome = match existing {
        Some(existing) => {
            let derived = rebuild_payload(&record.content, record.location.clone());
            let payload = MemoPayload {
                tags: record.tags.clone(),
                ..derived
            };

            let mut update = UpdateMemo {
                id: existing.id,
                content: Some(record.content.clone()),
                visibility: Some(visibility),
                pinned: Some(record.pinned),
                payload: Some(payload),
                display_ts,
                ..Default::default()
            };
            if options.preserve_timestamps {
                update.created_ts = Some(created_ts);
                update.updated_ts = Some(updated_ts);
            }

            store.update_memo(&update).map_err(|e| {
                MemoportError::Import(format!("failed to update existing memo: {}", e))
            })?;
            ImportOutcome::new(Disposition::Updated)
        }
        None => {
            let memo = Memo {
                id: 0,
                uid: record.uid.clone(),
                creator_id: owner,
                row_status: RowStatus::Normal,
                content: record.content.clone(),
                visibility,
                pinned: record.pinned,
                payload: rebuild_payload(&record.content, record.location.clone()),
                created_ts,
                updated_ts,
                display_ts,
            };

            store
                .create_memo(&memo)
                .map_err(|e| MemoportError::Import(format!("failed to create memo: {}", e)))?;
            ImportOutcome::new(Disposition::Created)
        }
    };

    if !options.skip_attachments && !record.attachments.is_empty() {
        match references.import_attachments(&record.uid, &record.attachments) {
            ReferenceResult::Imported(n) => outcome.attachments_imported += n,
            ReferenceResult::NotImported(message) => warnings.push(message),
        }
    }

    if !options.skip_relations && !record.relations.is_empty() {
        match references.import_relations(&record.uid, &record.relations) {
            ReferenceResult::Imported(n) => outcome.relations_imported += n,
            ReferenceResult::NotImported(message) => warnings.push(message),
        }
    }

    Ok((outcome, warnings))
}
