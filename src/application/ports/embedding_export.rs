//! Embedding Export Port - 向量导出
//!
//! 把单个音色或整个目录的风格向量序列化为外部格式

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::voice::VoiceRecord;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export")]
    Empty,

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Embedding Export Port
#[async_trait]
pub trait EmbeddingExportPort: Send + Sync {
    /// 导出单个音色
    async fn export_voice(&self, voice: &VoiceRecord) -> Result<PathBuf, ExportError>;

    /// 导出全部音色到单个归档
    async fn export_catalog(&self, voices: &[VoiceRecord]) -> Result<PathBuf, ExportError>;
}
