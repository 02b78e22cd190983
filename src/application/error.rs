//! 应用层错误定义
//!
//! 统一的命令/查询错误类型。所有错误都原样上抛，应用层不做重试。

use thiserror::Error;

use crate::application::ports::{
    AudioSinkError, CatalogError, ExportError, StyleBankError, SynthesisError,
};
use crate::domain::lab::{GroupRole, LabError};
use crate::domain::predicate::PredicateError;
use crate::domain::voice::VoiceError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 分组查询没有匹配任何音色
    #[error("{role} group is empty: no voices matched {predicate}")]
    EmptyGroup { role: GroupRole, predicate: String },

    /// 向量维度不一致
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 名称冲突
    #[error("Duplicate voice name: {0}")]
    DuplicateName(String),

    /// 查询谓词不合法
    #[error("Query error: {0}")]
    QueryError(String),

    /// 合成失败
    #[error(
        "Synthesis failed{}: {message}",
        .scale.map(|s| format!(" at scale {}", s)).unwrap_or_default()
    )]
    SynthesisError { scale: Option<f32>, message: String },

    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建合成错误（带缩放系数上下文）
    pub fn synthesis(scale: Option<f32>, err: SynthesisError) -> Self {
        Self::SynthesisError {
            scale,
            message: err.to_string(),
        }
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<CatalogError> for ApplicationError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Query(msg) => Self::QueryError(msg),
            CatalogError::DuplicateName(name) => Self::DuplicateName(name),
            CatalogError::Validation(msg) => Self::ValidationError(msg),
            CatalogError::DimensionMismatch { .. } => Self::DimensionMismatch(err.to_string()),
            CatalogError::Database(_) | CatalogError::Serialization(_) => {
                Self::RepositoryError(err.to_string())
            }
        }
    }
}

impl From<VoiceError> for ApplicationError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::DimensionMismatch { .. } => Self::DimensionMismatch(err.to_string()),
            other => Self::ValidationError(other.to_string()),
        }
    }
}

impl From<PredicateError> for ApplicationError {
    fn from(err: PredicateError) -> Self {
        Self::QueryError(err.to_string())
    }
}

impl From<LabError> for ApplicationError {
    fn from(err: LabError) -> Self {
        match err {
            LabError::EmptyGroup { role } => Self::EmptyGroup {
                role,
                predicate: String::new(),
            },
            LabError::Reduce { .. } | LabError::DirectionDimensionMismatch { .. } => {
                Self::DimensionMismatch(err.to_string())
            }
            LabError::NonFinite { .. } | LabError::NonFiniteDirection { .. } => {
                Self::ValidationError(err.to_string())
            }
            LabError::Provenance(msg) => Self::InternalError(msg),
        }
    }
}

impl From<AudioSinkError> for ApplicationError {
    fn from(err: AudioSinkError) -> Self {
        match err {
            AudioSinkError::InvalidPath(msg) => Self::ValidationError(msg),
            other => Self::StorageError(other.to_string()),
        }
    }
}

impl From<ExportError> for ApplicationError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Empty => Self::not_found("Voice", "<catalog>"),
            other => Self::StorageError(other.to_string()),
        }
    }
}

impl From<StyleBankError> for ApplicationError {
    fn from(err: StyleBankError) -> Self {
        Self::StorageError(err.to_string())
    }
}
