pub mod add;
pub mod common;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod flags;
pub mod list;
pub mod purge;
pub mod restore;
pub mod search;
pub mod shell;
pub mod trash;
