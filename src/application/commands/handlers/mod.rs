//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod catalog_handlers;
mod lab_handlers;
mod output;

pub use catalog_handlers::*;
pub use lab_handlers::*;
