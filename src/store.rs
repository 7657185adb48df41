//! Seams between the exchange pipelines and their host.
//!
//! The pipelines never touch SQL directly: they read and write through
//! [`MemoStore`] and learn who is calling through [`CurrentUser`].

use crate::error::Result;
use crate::model::{Attachment, Memo, MemoId, MemoRelation, RowStatus, UpdateMemo, User, UserId};

/// Default content-length limit in bytes when the host has not set one.
pub const DEFAULT_CONTENT_LENGTH_LIMIT: usize = 8 * 1024;

/// Query for memos. Every set field narrows the result.
#[derive(Debug, Clone, Default)]
pub struct FindMemo {
    pub id: Option<MemoId>,
    pub uid: Option<String>,
    pub creator_id: Option<UserId>,
    pub row_status: Option<RowStatus>,
    /// Opaque filter expression interpreted by the store.
    pub filter: Option<String>,
    /// Skip memos that are comments on another memo.
    pub exclude_comments: bool,
}

impl FindMemo {
    pub fn by_id(id: MemoId) -> Self {
        FindMemo {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn by_uid(uid: &str) -> Self {
        FindMemo {
            uid: Some(uid.to_string()),
            ..Default::default()
        }
    }
}

/// Record store consumed by export and import.
pub trait MemoStore {
    fn list_memos(&self, find: &FindMemo) -> Result<Vec<Memo>>;

    fn get_memo(&self, find: &FindMemo) -> Result<Option<Memo>>;

    /// Insert `memo` (its `id` is ignored) and return the stored row.
    fn create_memo(&self, memo: &Memo) -> Result<Memo>;

    fn update_memo(&self, update: &UpdateMemo) -> Result<()>;

    fn list_attachments(&self, memo_id: MemoId) -> Result<Vec<Attachment>>;

    fn list_memo_relations(&self, memo_id: MemoId) -> Result<Vec<MemoRelation>>;

    /// Current host limit on memo content length, in bytes.
    fn content_length_limit(&self) -> Result<usize>;
}

/// Resolves the identity a call is made on behalf of.
pub trait CurrentUser {
    fn current_user(&self) -> Result<User>;
}

impl CurrentUser for User {
    fn current_user(&self) -> Result<User> {
        Ok(self.clone())
    }
}
