//! SQLite Persistence - SQLite 数据库持久化实现

mod catalog_repo;
mod database;

pub use catalog_repo::*;
pub use database::*;
