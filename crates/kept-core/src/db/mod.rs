//! Database layer for Kept

mod connection;
mod kv_repository;
mod memo_repository;
mod migrations;

pub use connection::Database;
pub use kv_repository::{KeyValueRepository, LibSqlKeyValueRepository};
pub use memo_repository::{LibSqlMemoRepository, MemoRepository};
