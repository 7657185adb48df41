use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MemoportError, Result};
use crate::model::{Attachment, Location, Memo};

/// The only snapshot version this build reads or writes.
pub const SNAPSHOT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    #[serde(default, alias = "memos")]
    pub records: Vec<SnapshotMemo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMemo {
    pub uid: String,
    pub content: String,
    /// Kept as text so an unknown value survives decoding and can be
    /// degraded during import.
    #[serde(default)]
    pub visibility: String,
    #[serde(default)]
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<RelationRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub uid: String,
    pub filename: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: i64,
}

/// Points at another memo by its portable UID, never by local id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRef {
    #[serde(alias = "related_memo_uid")]
    pub related_uid: String,
    #[serde(rename = "type")]
    pub relation_type: String,
}

impl Snapshot {
    pub fn new(exported_at: DateTime<Utc>, records: Vec<SnapshotMemo>) -> Self {
        Snapshot {
            version: SNAPSHOT_VERSION.to_string(),
            exported_at,
            records,
        }
    }

    /// Reject snapshots written by an unsupported version.
    pub fn check_version(&self) -> Result<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(MemoportError::UnsupportedVersion(self.version.clone()));
        }
        Ok(())
    }
}

impl SnapshotMemo {
    /// Build the portable form of a stored memo. Attachments and relations
    /// are filled in by the caller according to the export flags.
    pub fn from_memo(memo: &Memo) -> Self {
        SnapshotMemo {
            uid: memo.uid.clone(),
            content: memo.content.clone(),
            visibility: memo.visibility.as_str().to_string(),
            pinned: memo.pinned,
            created_at: from_unix(memo.created_ts),
            updated_at: from_unix(memo.updated_ts),
            display_time: memo.display_ts.map(from_unix),
            tags: memo.payload.tags.clone(),
            location: memo.payload.location.clone(),
            attachments: Vec::new(),
            relations: Vec::new(),
        }
    }
}

impl AttachmentRef {
    pub fn from_attachment(attachment: &Attachment) -> Self {
        AttachmentRef {
            uid: attachment.uid.clone(),
            filename: attachment.filename.clone(),
            mime_type: attachment.mime_type.clone(),
            size: attachment.size,
        }
    }
}

/// Seconds since the epoch to UTC; out-of-range values clamp to the epoch.
pub fn from_unix(ts: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(ts, 0).single().unwrap_or_default()
}

/// Pretty-printed JSON bytes.
pub fn encode(snapshot: &Snapshot) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(snapshot)?)
}

/// Parse snapshot bytes. The version is not checked here; see
/// [`Snapshot::check_version`].
pub fn decode(bytes: &[u8]) -> Result<Snapshot> {
    serde_json::from_slice(bytes).map_err(|e| MemoportError::MalformedSnapshot(e.to_string()))
}
