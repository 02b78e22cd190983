//! Data Transfer Objects

use serde::Serialize;

use crate::application::{LabGroupSummary, VoiceResponse};
use crate::domain::lab::{GroupRole, Provenance};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Voice DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct VoiceDto {
    pub name: String,
    pub gender: String,
    pub language: String,
    pub quality: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_duration: Option<f64>,
    pub is_synthetic: bool,
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    pub embedding_dim: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_vector: Option<Vec<f32>>,
    pub created_at: String,
}

impl From<VoiceResponse> for VoiceDto {
    fn from(v: VoiceResponse) -> Self {
        Self {
            name: v.name,
            gender: v.gender,
            language: v.language,
            quality: v.quality,
            training_duration: v.training_duration,
            is_synthetic: v.is_synthetic,
            notes: v.notes,
            provenance: v.provenance,
            embedding_dim: v.embedding_dim,
            style_vector: v.style_vector,
            created_at: v.created_at,
        }
    }
}

// ============================================================================
// Lab DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GroupDto {
    pub role: GroupRole,
    pub predicate: String,
    pub members: Vec<String>,
}

impl From<LabGroupSummary> for GroupDto {
    fn from(g: LabGroupSummary) -> Self {
        Self {
            role: g.role,
            predicate: g.predicate,
            members: g.members,
        }
    }
}
