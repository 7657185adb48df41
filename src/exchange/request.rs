//! Request and response envelopes for the export/import calls.
//!
//! Raw snapshot bytes travel as base64 when an envelope is rendered as JSON.

use serde::{Deserialize, Serialize};

use crate::error::{MemoportError, Result};

use super::summary::ImportSummary;

pub const FORMAT_JSON: &str = "json";

/// Validate a requested format. Empty means JSON.
pub fn resolve_format(format: &str) -> Result<&'static str> {
    match format {
        "" | FORMAT_JSON => Ok(FORMAT_JSON),
        other => Err(MemoportError::UnsupportedFormat(other.to_string())),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportRequest {
    pub format: String,
    pub filter: Option<String>,
    pub exclude_archived: bool,
    pub include_attachments: bool,
    pub include_relations: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResponse {
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    pub format: String,
    pub filename: String,
    pub memo_count: u32,
    pub size_bytes: u64,
}

/// Per-call import switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub overwrite_existing: bool,
    pub validate_only: bool,
    pub preserve_timestamps: bool,
    pub skip_attachments: bool,
    pub skip_relations: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            overwrite_existing: false,
            validate_only: false,
            preserve_timestamps: true,
            skip_attachments: false,
            skip_relations: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRequest {
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    #[serde(default)]
    pub format: String,
    #[serde(flatten)]
    pub options: ImportOptions,
}

impl ImportRequest {
    pub fn new(data: Vec<u8>) -> Self {
        ImportRequest {
            data,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummaryView {
    pub total_memos: u32,
    pub created_count: u32,
    pub updated_count: u32,
    pub attachments_imported: u32,
    pub relations_imported: u32,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResponse {
    pub imported_count: u32,
    pub skipped_count: u32,
    pub validation_errors: u32,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub summary: ImportSummaryView,
}

impl From<ImportSummary> for ImportResponse {
    fn from(s: ImportSummary) -> Self {
        ImportResponse {
            imported_count: s.imported_count,
            skipped_count: s.skipped_count,
            validation_errors: s.validation_errors,
            errors: s.errors,
            warnings: s.warnings,
            summary: ImportSummaryView {
                total_memos: s.total_memos,
                created_count: s.created_count,
                updated_count: s.updated_count,
                attachments_imported: s.attachments_imported,
                relations_imported: s.relations_imported,
                duration_ms: s.duration_ms,
            },
        }
    }
}

mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64.decode(encoded.as_bytes()).map_err(D::Error::custom)
    }
}
