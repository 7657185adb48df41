use std::fmt;

use super::memo::{MemoId, UserId};

/// Descriptive attachment row. Binary content lives outside this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: i64,
    pub uid: String,
    pub memo_id: Option<MemoId>,
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationType {
    Reference,
    Comment,
    Other(String),
}

impl RelationType {
    pub fn as_str(&self) -> &str {
        match self {
            RelationType::Reference => "REFERENCE",
            RelationType::Comment => "COMMENT",
            RelationType::Other(kind) => kind.as_str(),
        }
    }

    pub fn parse(s: &str) -> RelationType {
        match s {
            "REFERENCE" => RelationType::Reference,
            "COMMENT" => RelationType::Comment,
            other => RelationType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed edge between two memos, keyed by local ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoRelation {
    pub memo_id: MemoId,
    pub related_memo_id: MemoId,
    pub relation_type: RelationType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
}
