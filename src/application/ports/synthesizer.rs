//! Synthesizer Port - 语音合成引擎抽象
//!
//! 输入风格向量与文本，输出音频样本。神经网络推理在外部服务中完成。

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::voice::StyleVector;

/// 合成错误
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Invalid text: {0}")]
    InvalidText(String),

    #[error("Incompatible embedding: expected dimension {expected}, got {actual}")]
    IncompatibleEmbedding { expected: usize, actual: usize },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl SynthesisError {
    /// 是否属于可重试的瞬时错误
    pub fn is_transient(&self) -> bool {
        matches!(self, SynthesisError::NetworkError(_) | SynthesisError::Timeout)
    }
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub style_vector: StyleVector,
    pub text: String,
    /// 语速，默认 1.0
    pub speed: f32,
    /// 语言代码，如 en-us
    pub lang: String,
}

/// 合成结果（单声道 f32 样本）
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl SynthesizedAudio {
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / self.sample_rate as u64
    }
}

/// Synthesizer Port
#[async_trait]
pub trait SynthesizerPort: Send + Sync {
    /// 执行合成
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesizedAudio, SynthesisError>;

    /// 检查合成服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
