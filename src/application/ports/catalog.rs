//! Catalog Port - 出站端口
//!
//! 音色目录的持久化抽象，具体实现在 infrastructure 层（如 SQLite）
//!
//! 约定:
//! - 目录只追加：没有更新和删除操作
//! - 风格向量维度是目录级元数据，写入与查询时都要校验

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::predicate::VoicePredicate;
use crate::domain::voice::VoiceRecord;

/// 目录错误
#[derive(Debug, Error)]
pub enum CatalogError {
    /// 谓词不合法，或查询结果维度与目录不一致
    #[error("Query error: {0}")]
    Query(String),

    #[error("Duplicate voice name: {0}")]
    DuplicateName(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Embedding dimension mismatch: catalog {expected}, record {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// 目录概况
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogInfo {
    pub total: usize,
    pub synthetic: usize,
    pub embedding_dim: Option<usize>,
}

/// Catalog Port
#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// 按谓词查询；无匹配时返回空列表而不是错误
    async fn query(&self, predicate: &VoicePredicate) -> Result<Vec<VoiceRecord>, CatalogError>;

    /// 追加新记录
    ///
    /// - 名称已存在 → `DuplicateName`
    /// - 字段越界 → `Validation`
    /// - 向量维度与目录不一致 → `DimensionMismatch`
    async fn insert(&self, voice: &VoiceRecord) -> Result<(), CatalogError>;

    /// 目录概况
    async fn info(&self) -> Result<CatalogInfo, CatalogError>;

    /// 按名称查找
    async fn find_by_name(&self, name: &str) -> Result<Option<VoiceRecord>, CatalogError> {
        // 默认实现：名称为主键，最多一条
        let mut voices = self.query(&VoicePredicate::name_eq(name)).await?;
        Ok(voices.pop())
    }

    /// 记录总数
    async fn count(&self) -> Result<usize, CatalogError> {
        Ok(self.info().await?.total)
    }
}
