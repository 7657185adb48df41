pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod exchange;
pub mod logging;
pub mod model;
pub mod payload;
pub mod storage;
pub mod store;

pub use error::{MemoportError, Result};
