//! Voice Context - 音色目录限界上下文
//!
//! 职责:
//! - 音色记录（元数据 + 风格向量）
//! - 字段级校验（性别、质量评分、名称、向量）

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::{NewVoice, VoiceRecord};
pub use errors::VoiceError;
pub use value_objects::{Gender, Quality, StyleVector, VoiceName};
