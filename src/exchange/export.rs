use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::{Memo, RowStatus, User};
use crate::store::{CurrentUser, FindMemo, MemoStore};

use super::format::{AttachmentRef, RelationRef, Snapshot, SnapshotMemo, encode};
use super::request::{ExportRequest, ExportResponse, resolve_format};
use super::summary::Outcome;

/// Export filename for a snapshot taken at `at`.
pub fn export_filename(at: DateTime<Utc>) -> String {
    format!("memos_export_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Export the caller's memos as an encoded snapshot.
pub fn export_memos<S: MemoStore>(
    store: &S,
    identity: &impl CurrentUser,
    request: &ExportRequest,
) -> Result<ExportResponse> {
    let user = identity.current_user()?;
    let format = resolve_format(&request.format)?;

    let exported_at = Utc::now();
    let snapshot = build_snapshot(store, &user, request, exported_at)?;
    let data = encode(&snapshot)?;

    tracing::info!(
        user = %user.username,
        memos = snapshot.records.len(),
        bytes = data.len(),
        "exported memos"
    );

    Ok(ExportResponse {
        memo_count: u32::try_from(snapshot.records.len()).unwrap_or(u32::MAX),
        size_bytes: data.len() as u64,
        data,
        format: format.to_string(),
        filename: export_filename(exported_at),
    })
}

/// Collect `user`'s memos into a snapshot.
///
/// Ownership scoping is applied regardless of the filter. A memo whose
/// sub-entities cannot be loaded is left out with a logged warning rather
/// than failing the export.
pub fn build_snapshot<S: MemoStore>(
    store: &S,
    user: &User,
    request: &ExportRequest,
    exported_at: DateTime<Utc>,
) -> Result<Snapshot> {
    let find = FindMemo {
        creator_id: Some(user.id),
        row_status: request.exclude_archived.then_some(RowStatus::Normal),
        filter: request.filter.clone().filter(|f| !f.trim().is_empty()),
        exclude_comments: true,
        ..Default::default()
    };

    let memos = store.list_memos(&find)?;

    let mut records = Vec::with_capacity(memos.len());
    for memo in &memos {
        match convert_memo(
            store,
            memo,
            request.include_attachments,
            request.include_relations,
        ) {
            Outcome::Success(record) | Outcome::Warning(record, _) => records.push(record),
            Outcome::Reject(reason) => {
                tracing::warn!(memo_id = memo.id, error = %reason, "failed to convert memo to export format");
            }
        }
    }

    Ok(Snapshot::new(exported_at, records))
}

fn convert_memo<S: MemoStore>(
    store: &S,
    memo: &Memo,
    include_attachments: bool,
    include_relations: bool,
) -> Outcome<SnapshotMemo> {
    match try_convert_memo(store, memo, include_attachments, include_relations) {
        Ok(record) => Outcome::Success(record),
        Err(e) => Outcome::Reject(e.to_string()),
    }
}

fn try_convert_memo<S: MemoStore>(
    store: &S,
    memo: &Memo,
    include_attachments: bool,
    include_relations: bool,
) -> Result<SnapshotMemo> {
    let mut record = SnapshotMemo::from_memo(memo);

    if include_attachments {
        record.attachments = store
            .list_attachments(memo.id)?
            .iter()
            .map(AttachmentRef::from_attachment)
            .collect();
    }

    if include_relations {
        for relation in store.list_memo_relations(memo.id)? {
            // Dangling targets are dropped; only the portable UID is written.
            let Some(related) = store.get_memo(&FindMemo::by_id(relation.related_memo_id))? else {
                continue;
            };
            record.relations.push(RelationRef {
                related_uid: related.uid,
                relation_type: relation.relation_type.to_string(),
            });
        }
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_export_filename_pattern() {
        let at = Utc.with_ymd_and_hms(2024, 7, 9, 5, 4, 3).unwrap();
        assert_eq!(export_filename(at), "memos_export_20240709_050403.json");
    }
}
