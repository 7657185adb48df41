use rusqlite::types::Value;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params, params_from_iter};

use crate::db::filter::parse_filter;
use crate::error::{MemoportError, Result};
use crate::model::{
    Attachment, Memo, MemoId, MemoPayload, MemoRelation, RelationType, RowStatus, UpdateMemo,
    User, UserId,
};
use crate::store::{DEFAULT_CONTENT_LENGTH_LIMIT, FindMemo, MemoStore};

/// Settings key holding the content-length limit in bytes.
pub const CONTENT_LENGTH_LIMIT_KEY: &str = "memo_content_length_limit";

const MEMO_COLUMNS: &str = "memos.id, memos.uid, memos.creator_id, memos.row_status, memos.content, memos.visibility, memos.pinned, memos.payload, memos.created_ts, memos.updated_ts, memos.display_ts";

/// Map a database row to Memo. Expects columns in `MEMO_COLUMNS` order.
fn map_row_to_memo(row: &Row) -> rusqlite::Result<Memo> {
    let row_status: String = row.get(3)?;
    let visibility: String = row.get(5)?;

    // Payload is a JSON document; a corrupt column reads as empty.
    let payload_json: Option<String> = row.get(7)?;
    let payload: MemoPayload = payload_json
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default();

    Ok(Memo {
        id: row.get(0)?,
        uid: row.get(1)?,
        creator_id: row.get(2)?,
        row_status: row_status.parse().unwrap_or_default(),
        content: row.get(4)?,
        visibility: visibility.parse().unwrap_or_default(),
        pinned: row.get(6)?,
        payload,
        created_ts: row.get(8)?,
        updated_ts: row.get(9)?,
        display_ts: row.get(10)?,
    })
}

fn map_row_to_attachment(row: &Row) -> rusqlite::Result<Attachment> {
    Ok(Attachment {
        id: row.get(0)?,
        uid: row.get(1)?,
        memo_id: row.get(2)?,
        filename: row.get(3)?,
        mime_type: row.get(4)?,
        size: row.get(5)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

pub struct Repository<'a> {
    conn: &'a Connection,
}

impl<'a> Repository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Repository { conn }
    }

    pub fn create_user(&self, username: &str) -> Result<User> {
        self.conn.execute(
            "INSERT INTO users (username) VALUES (?1)",
            params![username],
        )?;

        Ok(User {
            id: self.conn.last_insert_rowid(),
            username: username.to_string(),
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let result = self
            .conn
            .query_row(
                "SELECT id, username FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(result)
    }

    pub fn get_or_create_user(&self, username: &str) -> Result<User> {
        match self.get_user_by_username(username)? {
            Some(user) => Ok(user),
            None => self.create_user(username),
        }
    }

    pub fn create_attachment(
        &self,
        uid: &str,
        memo_id: Option<MemoId>,
        filename: &str,
        mime_type: &str,
        size: i64,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO attachments (uid, memo_id, filename, type, size)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![uid, memo_id, filename, mime_type, size],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn create_memo_relation(&self, relation: &MemoRelation) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO memo_relations (memo_id, related_memo_id, type)
             VALUES (?1, ?2, ?3)",
            params![
                relation.memo_id,
                relation.related_memo_id,
                relation.relation_type.as_str()
            ],
        )?;

        Ok(())
    }

    /// Hard-delete a memo and its relations; attachments are detached.
    pub fn delete_memo(&self, memo_id: MemoId) -> Result<()> {
        self.conn.execute(
            "DELETE FROM memo_relations WHERE memo_id = ?1 OR related_memo_id = ?1",
            params![memo_id],
        )?;
        self.conn.execute(
            "UPDATE attachments SET memo_id = NULL WHERE memo_id = ?1",
            params![memo_id],
        )?;
        self.conn
            .execute("DELETE FROM memos WHERE id = ?1", params![memo_id])?;

        Ok(())
    }

    pub fn count_memos(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM memos", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn get_setting(&self, name: &str) -> Result<Option<String>> {
        let result = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        Ok(result)
    }

    pub fn set_setting(&self, name: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings (name, value) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET value = excluded.value",
            params![name, value],
        )?;

        Ok(())
    }

    pub fn set_content_length_limit(&self, limit: usize) -> Result<()> {
        self.set_setting(CONTENT_LENGTH_LIMIT_KEY, &limit.to_string())
    }

    fn select_memos(&self, find: &FindMemo, limit: Option<u32>) -> Result<Vec<Memo>> {
        let mut sql = format!("SELECT {MEMO_COLUMNS} FROM memos WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(id) = find.id {
            sql.push_str(" AND memos.id = ?");
            bind_values.push(Value::Integer(id));
        }
        if let Some(uid) = &find.uid {
            sql.push_str(" AND memos.uid = ?");
            bind_values.push(Value::Text(uid.clone()));
        }
        if let Some(creator_id) = find.creator_id {
            sql.push_str(" AND memos.creator_id = ?");
            bind_values.push(Value::Integer(creator_id));
        }
        if let Some(status) = find.row_status {
            sql.push_str(" AND memos.row_status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        if find.exclude_comments {
            sql.push_str(
                " AND NOT EXISTS (SELECT 1 FROM memo_relations r WHERE r.memo_id = memos.id AND r.type = 'COMMENT')",
            );
        }
        if let Some(filter) = &find.filter {
            for term in parse_filter(filter)? {
                let (predicate, value) = term.to_sql();
                sql.push_str(" AND ");
                sql.push_str(predicate);
                bind_values.push(value);
            }
        }

        sql.push_str(" ORDER BY memos.created_ts ASC, memos.id ASC");
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bind_values), map_row_to_memo)?;

        let mut memos = Vec::new();
        for row in rows {
            memos.push(row?);
        }
        Ok(memos)
    }
}

impl MemoStore for Repository<'_> {
    fn list_memos(&self, find: &FindMemo) -> Result<Vec<Memo>> {
        self.select_memos(find, None)
    }

    fn get_memo(&self, find: &FindMemo) -> Result<Option<Memo>> {
        Ok(self.select_memos(find, Some(1))?.into_iter().next())
    }

    fn create_memo(&self, memo: &Memo) -> Result<Memo> {
        let payload_json = serde_json::to_string(&memo.payload)?;

        let inserted = self.conn.execute(
            "INSERT INTO memos (uid, creator_id, row_status, content, visibility, pinned, payload, created_ts, updated_ts, display_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                &memo.uid,
                memo.creator_id,
                memo.row_status.as_str(),
                &memo.content,
                memo.visibility.as_str(),
                memo.pinned,
                &payload_json,
                memo.created_ts,
                memo.updated_ts,
                memo.display_ts,
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(MemoportError::MemoAlreadyExists {
                    uid: memo.uid.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        let id = self.conn.last_insert_rowid();
        self.get_memo(&FindMemo::by_id(id))?
            .ok_or_else(|| MemoportError::MemoNotFound(memo.uid.clone()))
    }

    fn update_memo(&self, update: &UpdateMemo) -> Result<()> {
        let mut sets: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(content) = &update.content {
            sets.push("content = ?");
            bind_values.push(Value::Text(content.clone()));
        }
        if let Some(visibility) = update.visibility {
            sets.push("visibility = ?");
            bind_values.push(Value::Text(visibility.as_str().to_string()));
        }
        if let Some(pinned) = update.pinned {
            sets.push("pinned = ?");
            bind_values.push(Value::Integer(i64::from(pinned)));
        }
        if let Some(status) = update.row_status {
            sets.push("row_status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(payload) = &update.payload {
            sets.push("payload = ?");
            bind_values.push(Value::Text(serde_json::to_string(payload)?));
        }
        if let Some(ts) = update.created_ts {
            sets.push("created_ts = ?");
            bind_values.push(Value::Integer(ts));
        }
        if let Some(ts) = update.updated_ts {
            sets.push("updated_ts = ?");
            bind_values.push(Value::Integer(ts));
        }
        if let Some(ts) = update.display_ts {
            sets.push("display_ts = ?");
            bind_values.push(Value::Integer(ts));
        }

        if sets.is_empty() {
            return Ok(());
        }

        let sql = format!("UPDATE memos SET {} WHERE id = ?", sets.join(", "));
        bind_values.push(Value::Integer(update.id));

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(MemoportError::MemoNotFound(format!("id {}", update.id)));
        }

        Ok(())
    }

    fn list_attachments(&self, memo_id: MemoId) -> Result<Vec<Attachment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, uid, memo_id, filename, type, size
             FROM attachments WHERE memo_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![memo_id], map_row_to_attachment)?;

        let mut attachments = Vec::new();
        for row in rows {
            attachments.push(row?);
        }
        Ok(attachments)
    }

    fn list_memo_relations(&self, memo_id: MemoId) -> Result<Vec<MemoRelation>> {
        let mut stmt = self.conn.prepare(
            "SELECT memo_id, related_memo_id, type
             FROM memo_relations WHERE memo_id = ?1 ORDER BY rowid",
        )?;

        let rows = stmt.query_map(params![memo_id], |row| {
            let kind: String = row.get(2)?;
            Ok(MemoRelation {
                memo_id: row.get(0)?,
                related_memo_id: row.get(1)?,
                relation_type: RelationType::parse(&kind),
            })
        })?;

        let mut relations = Vec::new();
        for row in rows {
            relations.push(row?);
        }
        Ok(relations)
    }

    fn content_length_limit(&self) -> Result<usize> {
        match self.get_setting(CONTENT_LENGTH_LIMIT_KEY)? {
            Some(value) => value.parse().map_err(|_| MemoportError::InvalidSetting {
                name: CONTENT_LENGTH_LIMIT_KEY.to_string(),
                value,
            }),
            None => Ok(DEFAULT_CONTENT_LENGTH_LIMIT),
        }
    }
}

/// Convenience for callers that only know a user id.
pub fn user_memo_query(creator_id: UserId) -> FindMemo {
    FindMemo {
        creator_id: Some(creator_id),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::run_migrations;
    use crate::model::{Location, Visibility};

    fn setup_test_db() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        conn
    }

    fn make_memo(uid: &str, creator_id: UserId, content: &str) -> Memo {
        Memo {
            id: 0,
            uid: uid.to_string(),
            creator_id,
            row_status: RowStatus::Normal,
            content: content.to_string(),
            visibility: Visibility::Private,
            pinned: false,
            payload: MemoPayload::default(),
            created_ts: 1_700_000_000,
            updated_ts: 1_700_000_000,
            display_ts: None,
        }
    }

    #[test]
    fn test_create_and_get_memo() {
        let conn = setup_test_db();
        let repo = Repository::new(&conn);
        let user = repo.create_user("alice").unwrap();

        let mut memo = make_memo("m1", user.id, "hello #world");
        memo.payload.tags = vec!["world".to_string()];
        memo.payload.location = Some(Location {
            placeholder: "Home".to_string(),
            latitude: 1.5,
            longitude: -2.5,
        });
        memo.display_ts = Some(1_700_000_500);

        let created = repo.create_memo(&memo).unwrap();
        assert!(created.id > 0);

        let fetched = repo
            .get_memo(&FindMemo::by_uid("m1"))
            .unwrap()
            .expect("Memo should exist");
        assert_eq!(fetched, created);
        assert_eq!(fetched.payload.tags, vec!["world"]);
        assert_eq!(fetched.display_ts, Some(1_700_000_500));
    }

    #[test]
    fn test_create_duplicate_uid() {
        let conn = setup_test_db();
        let repo = Repository::new(&conn);
        let user = repo.create_user("alice").unwrap();

        repo.create_memo(&make_memo("dup", user.id, "one")).unwrap();
        let result = repo.create_memo(&make_memo("dup", user.id, "two"));
        match result.unwrap_err() {
            MemoportError::MemoAlreadyExists { uid } => assert_eq!(uid, "dup"),
            e => panic!("Expected MemoAlreadyExists, got {:?}", e),
        }
    }

    #[test]
    fn test_other_constraint_failures_are_not_duplicates() {
        let conn = setup_test_db();
        conn.execute_batch("PRAGMA foreign_keys = ON").unwrap();
        let repo = Repository::new(&conn);

        // No user 999, so the creator foreign key fails.
        let result = repo.create_memo(&make_memo("orphan", 999, "x"));
        match result.unwrap_err() {
            MemoportError::Database(_) => {}
            e => panic!("Expected Database error, got {:?}", e),
        }
    }

    #[test]
    fn test_payload_coordinates_survive_storage() {
        let conn = setup_test_db();
        let repo = Repository::new(&conn);
        let user = repo.create_user("alice").unwrap();

        let mut memo = make_memo("geo", user.id, "somewhere");
        memo.payload.location = Some(Location {
            placeholder: "Pier".to_string(),
            latitude: 10.938711676632721,
            longitude: -73.98765432109876,
        });
        repo.create_memo(&memo).unwrap();

        let fetched = repo.get_memo(&FindMemo::by_uid("geo")).unwrap().unwrap();
        assert_eq!(fetched.payload.location, memo.payload.location);
    }

    #[test]
    fn test_get_memo_not_found() {
        let conn = setup_test_db();
        let repo = Repository::new(&conn);

        assert!(repo.get_memo(&FindMemo::by_uid("missing")).unwrap().is_none());
        assert!(repo.get_memo(&FindMemo::by_id(42)).unwrap().is_none());
    }

    #[test]
    fn test_update_memo_partial() {
        let conn = setup_test_db();
        let repo = Repository::new(&conn);
        let user = repo.create_user("alice").unwrap();
        let created = repo.create_memo(&make_memo("m1", user.id, "before")).unwrap();

        repo.update_memo(&UpdateMemo {
            id: created.id,
            content: Some("after".to_string()),
            visibility: Some(Visibility::Public),
            ..Default::default()
        })
        .unwrap();

        let fetched = repo.get_memo(&FindMemo::by_id(created.id)).unwrap().unwrap();
        assert_eq!(fetched.content, "after");
        assert_eq!(fetched.visibility, Visibility::Public);
        assert_eq!(fetched.created_ts, created.created_ts);
        assert_eq!(fetched.updated_ts, created.updated_ts);
    }

    #[test]
    fn test_update_missing_memo() {
        let conn = setup_test_db();
        let repo = Repository::new(&conn);

        let result = repo.update_memo(&UpdateMemo {
            id: 99,
            pinned: Some(true),
            ..Default::default()
        });
        assert!(matches!(result, Err(MemoportError::MemoNotFound(_))));
    }

    #[test]
    fn test_list_memos_scoping() {
        let conn = setup_test_db();
        let repo = Repository::new(&conn);
        let alice = repo.create_user("alice").unwrap();
        let bob = repo.create_user("bob").unwrap();

        repo.create_memo(&make_memo("a1", alice.id, "alice one")).unwrap();
        let archived = repo.create_memo(&make_memo("a2", alice.id, "alice two")).unwrap();
        repo.create_memo(&make_memo("b1", bob.id, "bob one")).unwrap();
        repo.update_memo(&UpdateMemo {
            id: archived.id,
            row_status: Some(RowStatus::Archived),
            ..Default::default()
        })
        .unwrap();

        let all = repo.list_memos(&user_memo_query(alice.id)).unwrap();
        assert_eq!(all.len(), 2);

        let normal = repo
            .list_memos(&FindMemo {
                creator_id: Some(alice.id),
                row_status: Some(RowStatus::Normal),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(normal.len(), 1);
        assert_eq!(normal[0].uid, "a1");
    }

    #[test]
    fn test_list_memos_excludes_comments() {
        let conn = setup_test_db();
        let repo = Repository::new(&conn);
        let user = repo.create_user("alice").unwrap();

        let parent = repo.create_memo(&make_memo("p", user.id, "parent")).unwrap();
        let comment = repo.create_memo(&make_memo("c", user.id, "comment")).unwrap();
        repo.create_memo_relation(&MemoRelation {
            memo_id: comment.id,
            related_memo_id: parent.id,
            relation_type: RelationType::Comment,
        })
        .unwrap();

        let memos = repo
            .list_memos(&FindMemo {
                creator_id: Some(user.id),
                exclude_comments: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(memos.len(), 1);
        assert_eq!(memos[0].uid, "p");
    }

    #[test]
    fn test_list_memos_with_filter() {
        let conn = setup_test_db();
        let repo = Repository::new(&conn);
        let user = repo.create_user("alice").unwrap();

        let mut tagged = make_memo("t", user.id, "Rust notes");
        tagged.payload.tags = vec!["rust".to_string()];
        tagged.pinned = true;
        repo.create_memo(&tagged).unwrap();
        repo.create_memo(&make_memo("u", user.id, "Grocery list")).unwrap();

        let find = |filter: &str| FindMemo {
            creator_id: Some(user.id),
            filter: Some(filter.to_string()),
            ..Default::default()
        };

        assert_eq!(repo.list_memos(&find("tag:rust")).unwrap().len(), 1);
        assert_eq!(repo.list_memos(&find("pinned:false")).unwrap()[0].uid, "u");
        assert_eq!(repo.list_memos(&find("grocery")).unwrap()[0].uid, "u");
        assert_eq!(repo.list_memos(&find("tag:rust grocery")).unwrap().len(), 0);
        assert!(matches!(
            repo.list_memos(&find("bogus:key")),
            Err(MemoportError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_attachments_and_relations() {
        let conn = setup_test_db();
        let repo = Repository::new(&conn);
        let user = repo.create_user("alice").unwrap();
        let a = repo.create_memo(&make_memo("a", user.id, "a")).unwrap();
        let b = repo.create_memo(&make_memo("b", user.id, "b")).unwrap();

        repo.create_attachment("att1", Some(a.id), "photo.png", "image/png", 2048)
            .unwrap();
        repo.create_memo_relation(&MemoRelation {
            memo_id: a.id,
            related_memo_id: b.id,
            relation_type: RelationType::Reference,
        })
        .unwrap();

        let attachments = repo.list_attachments(a.id).unwrap();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].filename, "photo.png");
        assert_eq!(attachments[0].mime_type, "image/png");

        let relations = repo.list_memo_relations(a.id).unwrap();
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].related_memo_id, b.id);
        assert_eq!(relations[0].relation_type, RelationType::Reference);

        repo.delete_memo(b.id).unwrap();
        assert!(repo.list_memo_relations(a.id).unwrap().is_empty());
    }

    #[test]
    fn test_content_length_limit_setting() {
        let conn = setup_test_db();
        let repo = Repository::new(&conn);

        assert_eq!(repo.content_length_limit().unwrap(), DEFAULT_CONTENT_LENGTH_LIMIT);

        repo.set_content_length_limit(10).unwrap();
        assert_eq!(repo.content_length_limit().unwrap(), 10);

        repo.set_setting(CONTENT_LENGTH_LIMIT_KEY, "lots").unwrap();
        assert!(matches!(
            repo.content_length_limit(),
            Err(MemoportError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn test_get_or_create_user() {
        let conn = setup_test_db();
        let repo = Repository::new(&conn);

        let first = repo.get_or_create_user("alice").unwrap();
        let second = repo.get_or_create_user("alice").unwrap();
        assert_eq!(first, second);
        assert!(repo.get_user_by_username("bob").unwrap().is_none());
    }
}
