//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Voice Context: 音色目录记录
//! - Lab Context: 音色向量代数（归约、差向量、外推）
//!
//! 以及两者共用的结构化查询谓词

pub mod lab;
pub mod predicate;
pub mod voice;
