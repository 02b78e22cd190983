//! Audio Sink Port - 出站端口
//!
//! 合成音频的输出位置（默认实现写 WAV 文件）

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::SynthesizedAudio;

/// 音频输出错误
#[derive(Debug, Error)]
pub enum AudioSinkError {
    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Audio Sink Port
#[async_trait]
pub trait AudioSinkPort: Send + Sync {
    /// 写入音频
    ///
    /// `relative` 相对于输出根目录，不允许绝对路径或 `..`
    async fn write(&self, relative: &Path, audio: &SynthesizedAudio) -> Result<PathBuf, AudioSinkError>;
}
