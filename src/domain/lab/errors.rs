//! Lab Context - Errors

use serde::Serialize;
use thiserror::Error;

/// 参与运算的分组角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Source,
    Target,
}

impl std::fmt::Display for GroupRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupRole::Source => f.write_str("source"),
            GroupRole::Target => f.write_str("target"),
        }
    }
}

/// 分组归约错误
#[derive(Debug, Error, PartialEq)]
pub enum ReduceError {
    #[error("分组为空，无法求平均")]
    Empty,

    #[error("第 {index} 个成员维度不匹配: 期望 {expected}, 实际 {actual}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("归约结果包含非有限值")]
    NonFinite,
}

#[derive(Debug, Error, PartialEq)]
pub enum LabError {
    #[error("{role} 分组为空")]
    EmptyGroup { role: GroupRole },

    #[error("{role} 分组归约失败: {source}")]
    Reduce {
        role: GroupRole,
        #[source]
        source: ReduceError,
    },

    #[error("source/target 代表向量维度不一致: {source_dim} vs {target_dim}")]
    DirectionDimensionMismatch { source_dim: usize, target_dim: usize },

    #[error("缩放系数 {scale} 产生了非有限向量")]
    NonFinite { scale: f32 },

    #[error("source/target 代表向量之差超出 f32 范围（第 {index} 维）")]
    NonFiniteDirection { index: usize },

    #[error("来源信息无法序列化: {0}")]
    Provenance(String),
}

impl LabError {
    pub(crate) fn from_reduce(role: GroupRole, err: ReduceError) -> Self {
        match err {
            ReduceError::Empty => LabError::EmptyGroup { role },
            other => LabError::Reduce {
                role,
                source: other,
            },
        }
    }
}
