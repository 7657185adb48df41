use chrono::Utc;
use rusqlite::Connection;

use crate::config::StorageConfig;
use crate::db::repository::user_memo_query;
use crate::db::{Repository, run_migrations};
use crate::error::{MemoportError, Result};
use crate::exchange::{
    ExportRequest, ExportResponse, ImportRequest, ImportResponse, export_memos, import_memos,
};
use crate::model::{Memo, RowStatus, UpdateMemo, User, Visibility};
use crate::payload::rebuild_payload;
use crate::store::{CurrentUser, FindMemo, MemoStore};

/// Identity resolved by username against the local database.
pub struct LocalSession<'a> {
    repo: Repository<'a>,
    username: String,
}

impl CurrentUser for LocalSession<'_> {
    fn current_user(&self) -> Result<User> {
        self.repo
            .get_user_by_username(&self.username)
            .map_err(|e| MemoportError::Identity(e.to_string()))?
            .ok_or_else(|| MemoportError::Identity(format!("unknown user {}", self.username)))
    }
}

pub struct StorageManager {
    conn: Connection,
}

impl StorageManager {
    pub fn open(config: StorageConfig) -> Result<Self> {
        config.ensure_dirs_exist()?;

        let mut conn = Connection::open(&config.db_path)?;
        run_migrations(&mut conn)?;

        Ok(StorageManager { conn })
    }

    /// Open a throwaway database, mainly for tests.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        run_migrations(&mut conn)?;

        Ok(StorageManager { conn })
    }

    pub fn repository(&self) -> Repository<'_> {
        Repository::new(&self.conn)
    }

    pub fn session(&self, username: &str) -> LocalSession<'_> {
        LocalSession {
            repo: self.repository(),
            username: username.to_string(),
        }
    }

    /// Look up `username`, creating the account on first use.
    pub fn ensure_user(&self, username: &str) -> Result<User> {
        self.repository().get_or_create_user(username)
    }

    /// Author a memo the same way an import would create one.
    pub fn add_memo(
        &self,
        user: &User,
        content: &str,
        visibility: Visibility,
        pinned: bool,
    ) -> Result<Memo> {
        let repo = self.repository();

        let limit = repo.content_length_limit()?;
        if content.len() > limit {
            return Err(MemoportError::ContentTooLong { max: limit });
        }

        let now = Utc::now().timestamp();
        let memo = Memo {
            id: 0,
            uid: uuid::Uuid::new_v4().simple().to_string(),
            creator_id: user.id,
            row_status: RowStatus::Normal,
            content: content.to_string(),
            visibility,
            pinned,
            payload: rebuild_payload(content, None),
            created_ts: now,
            updated_ts: now,
            display_ts: None,
        };

        repo.create_memo(&memo)
    }

    pub fn list_memos(&self, user: &User) -> Result<Vec<Memo>> {
        self.repository().list_memos(&user_memo_query(user.id))
    }

    /// Archive one of `user`'s memos by UID.
    pub fn archive_memo(&self, user: &User, uid: &str) -> Result<()> {
        let repo = self.repository();
        let memo = self.owned_memo(&repo, user, uid)?;

        repo.update_memo(&UpdateMemo {
            id: memo.id,
            row_status: Some(RowStatus::Archived),
            ..Default::default()
        })
    }

    /// Permanently remove one of `user`'s memos and its relations.
    pub fn delete_memo(&self, user: &User, uid: &str) -> Result<()> {
        let repo = self.repository();
        let memo = self.owned_memo(&repo, user, uid)?;
        repo.delete_memo(memo.id)
    }

    pub fn export(&self, username: &str, request: &ExportRequest) -> Result<ExportResponse> {
        export_memos(&self.repository(), &self.session(username), request)
    }

    pub fn import(&self, username: &str, request: &ImportRequest) -> Result<ImportResponse> {
        import_memos(&self.repository(), &self.session(username), request)
    }

    fn owned_memo(&self, repo: &Repository<'_>, user: &User, uid: &str) -> Result<Memo> {
        repo.get_memo(&FindMemo {
            uid: Some(uid.to_string()),
            creator_id: Some(user.id),
            ..Default::default()
        })?
        .ok_or_else(|| MemoportError::MemoNotFound(uid.to_string()))
    }

    pub fn content_length_limit(&self) -> Result<usize> {
        self.repository().content_length_limit()
    }

    pub fn set_content_length_limit(&self, limit: usize) -> Result<()> {
        self.repository().set_content_length_limit(limit)
    }
}
