//! Style Bank Port - 预训练音色向量来源
//!
//! 目录初始化时按音色名称读取风格向量（如 Kokoro 的 voices 归档）

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StyleBankError {
    #[error("Failed to read style bank: {0}")]
    ReadError(String),

    #[error("Style bank format error: {0}")]
    FormatError(String),
}

/// 已加载的音色向量（名称 → 展平后的向量）
#[derive(Debug, Clone, Default)]
pub struct StyleBank {
    styles: HashMap<String, Vec<f32>>,
}

impl StyleBank {
    pub fn new(styles: HashMap<String, Vec<f32>>) -> Self {
        Self { styles }
    }

    pub fn get(&self, name: &str) -> Option<&[f32]> {
        self.styles.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// Style Bank Port
#[async_trait]
pub trait StyleBankPort: Send + Sync {
    async fn load(&self, path: &Path) -> Result<StyleBank, StyleBankError>;
}
