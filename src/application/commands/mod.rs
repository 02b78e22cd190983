//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：实验、导入、合成、导出

mod catalog_commands;
mod lab_commands;

pub mod handlers;

pub use catalog_commands::*;
pub use lab_commands::*;
