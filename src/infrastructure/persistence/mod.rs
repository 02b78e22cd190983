//! Persistence Layer - 数据持久化
//!
//! SQLite 音色目录实现

pub mod sqlite;

pub use self::sqlite::SqliteCatalog;
