pub mod filter;
pub mod repository;
pub mod schema;

pub use repository::Repository;
pub use schema::run_migrations;
