pub mod manager;

pub use manager::{LocalSession, StorageManager};
