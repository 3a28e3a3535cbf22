//! SQLite Persistence - SQLite 数据库持久化实现

mod contact_repo;
mod content_repo;
mod database;
mod visit_repo;

#[cfg(test)]
pub(crate) use content_repo::fixtures;

pub use contact_repo::*;
pub use content_repo::*;
pub use database::*;
pub use visit_repo::*;
