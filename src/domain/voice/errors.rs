//! Voice Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("无效的音色名称: {0}")]
    InvalidName(String),

    #[error("无效的性别: {0}（仅允许 M / F / X）")]
    InvalidGender(String),

    #[error("无效的质量评分: {0}（必须在 0 到 100 之间）")]
    InvalidQuality(i64),

    #[error("无效的风格向量: {0}")]
    InvalidStyleVector(String),

    #[error("风格向量维度不匹配: 期望 {expected}, 实际 {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
