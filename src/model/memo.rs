use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub type MemoId = i64;
pub type UserId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Visibility {
    #[default]
    Private,
    Protected,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "PRIVATE",
            Visibility::Protected => "PROTECTED",
            Visibility::Public => "PUBLIC",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    /// Exact, case-sensitive match on the wire spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRIVATE" => Ok(Visibility::Private),
            "PROTECTED" => Ok(Visibility::Protected),
            "PUBLIC" => Ok(Visibility::Public),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowStatus {
    #[default]
    Normal,
    Archived,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Normal => "NORMAL",
            RowStatus::Archived => "ARCHIVED",
        }
    }
}

impl FromStr for RowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NORMAL" => Ok(RowStatus::Normal),
            "ARCHIVED" => Ok(RowStatus::Archived),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

/// Flags derived from memo content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoProperty {
    #[serde(default)]
    pub has_link: bool,
    #[serde(default)]
    pub has_task_list: bool,
    #[serde(default)]
    pub has_code: bool,
    #[serde(default)]
    pub has_incomplete_tasks: bool,
}

/// Structured metadata stored alongside memo content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemoPayload {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub property: MemoProperty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// A stored memo. `id` is local to one database; `uid` is the portable key.
#[derive(Debug, Clone, PartialEq)]
pub struct Memo {
    pub id: MemoId,
    pub uid: String,
    pub creator_id: UserId,
    pub row_status: RowStatus,
    pub content: String,
    pub visibility: Visibility,
    pub pinned: bool,
    pub payload: MemoPayload,
    pub created_ts: i64,
    pub updated_ts: i64,
    pub display_ts: Option<i64>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateMemo {
    pub id: MemoId,
    pub content: Option<String>,
    pub visibility: Option<Visibility>,
    pub pinned: Option<bool>,
    pub row_status: Option<RowStatus>,
    pub payload: Option<MemoPayload>,
    pub created_ts: Option<i64>,
    pub updated_ts: Option<i64>,
    pub display_ts: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_parse_is_exact() {
        assert_eq!("PUBLIC".parse::<Visibility>(), Ok(Visibility::Public));
        assert_eq!("PROTECTED".parse::<Visibility>(), Ok(Visibility::Protected));
        assert_eq!("PRIVATE".parse::<Visibility>(), Ok(Visibility::Private));
        assert_eq!("public".parse::<Visibility>(), Err("public".to_string()));
        assert_eq!("BOGUS".parse::<Visibility>(), Err("BOGUS".to_string()));
    }

    #[test]
    fn test_visibility_default_is_private() {
        assert_eq!(Visibility::default(), Visibility::Private);
        assert_eq!(Visibility::default().to_string(), "PRIVATE");
    }

    #[test]
    fn test_payload_json_tolerates_missing_fields() {
        let payload: MemoPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.tags.is_empty());
        assert!(payload.location.is_none());
        assert!(!payload.property.has_link);
    }
}
