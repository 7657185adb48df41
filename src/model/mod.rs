pub mod memo;
pub mod resource;

pub use memo::{
    Location, Memo, MemoId, MemoPayload, MemoProperty, RowStatus, UpdateMemo, UserId, Visibility,
};
pub use resource::{Attachment, MemoRelation, RelationType, User};
