//! Lab HTTP Handlers - 预览 / 入库

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{
    LabMode, LabOutcome, LabVoiceMetadata, PreviewSample, RunLab,
};
use crate::domain::predicate::VoicePredicate;
use crate::infrastructure::http::dto::{ApiResponse, GroupDto};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LabPreviewRequest {
    pub source: VoicePredicate,
    pub target: VoicePredicate,
    pub text: Option<String>,
    pub speed: Option<f32>,
    pub lang: Option<String>,
    pub scales: Option<Vec<f32>>,
    pub output_subdir: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LabInsertRequest {
    pub source: VoicePredicate,
    pub target: VoicePredicate,
    pub scale: f32,
    pub name: String,
    pub gender: String,
    pub quality: i64,
    pub notes: Option<String>,
    pub text: Option<String>,
    pub speed: Option<f32>,
    pub lang: Option<String>,
    #[serde(default = "default_render_sample")]
    pub render_sample: bool,
    pub output_subdir: Option<String>,
}

fn default_render_sample() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct PreviewSampleDto {
    pub index: usize,
    pub scale: f32,
    pub file: Option<String>,
    pub duration_ms: Option<u64>,
    pub error: Option<String>,
}

impl From<PreviewSample> for PreviewSampleDto {
    fn from(s: PreviewSample) -> Self {
        Self {
            index: s.index,
            scale: s.scale,
            file: s.file.map(|f| f.display().to_string()),
            duration_ms: s.duration_ms,
            error: s.error,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LabPreviewResponseDto {
    pub run_id: Uuid,
    pub source: GroupDto,
    pub target: GroupDto,
    pub samples: Vec<PreviewSampleDto>,
}

#[derive(Debug, Serialize)]
pub struct LabInsertResponseDto {
    pub run_id: Uuid,
    pub source: GroupDto,
    pub target: GroupDto,
    pub name: String,
    pub scale: f32,
    pub notes: Option<String>,
    pub sample_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_error: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// 按多个缩放系数生成试听音频，不写入目录
pub async fn lab_preview(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LabPreviewRequest>,
) -> Result<Json<ApiResponse<LabPreviewResponseDto>>, ApiError> {
    let defaults = &state.lab_defaults;
    let command = RunLab {
        source: req.source,
        target: req.target,
        text: req.text.unwrap_or_else(|| defaults.default_text.clone()),
        speed: req.speed.unwrap_or(defaults.default_speed),
        lang: req.lang.unwrap_or_else(|| defaults.default_lang.clone()),
        output_subdir: req.output_subdir,
        mode: LabMode::Preview {
            scales: req
                .scales
                .unwrap_or_else(|| defaults.default_scales.clone()),
        },
    };

    match state.run_lab_handler.handle(command).await? {
        LabOutcome::Preview(response) => Ok(Json(ApiResponse::success(LabPreviewResponseDto {
            run_id: response.run_id,
            source: response.source.into(),
            target: response.target.into(),
            samples: response.samples.into_iter().map(Into::into).collect(),
        }))),
        LabOutcome::Insert(_) => Err(ApiError::Internal(
            "preview run produced an insert outcome".to_string(),
        )),
    }
}

/// 生成合成音色并写入目录
pub async fn lab_insert(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LabInsertRequest>,
) -> Result<Json<ApiResponse<LabInsertResponseDto>>, ApiError> {
    let defaults = &state.lab_defaults;
    let command = RunLab {
        source: req.source,
        target: req.target,
        text: req.text.unwrap_or_else(|| defaults.default_text.clone()),
        speed: req.speed.unwrap_or(defaults.default_speed),
        lang: req.lang.unwrap_or_else(|| defaults.default_lang.clone()),
        output_subdir: req.output_subdir,
        mode: LabMode::Insert {
            scale: req.scale,
            voice: LabVoiceMetadata {
                name: req.name,
                gender: req.gender,
                quality: req.quality,
                notes: req.notes,
            },
            render_sample: req.render_sample,
        },
    };

    match state.run_lab_handler.handle(command).await? {
        LabOutcome::Insert(response) => Ok(Json(ApiResponse::success(LabInsertResponseDto {
            run_id: response.run_id,
            source: response.source.into(),
            target: response.target.into(),
            name: response.name,
            scale: response.scale,
            notes: response.notes,
            sample_file: response.sample_file.map(|f| f.display().to_string()),
            sample_error: response.sample_error,
        }))),
        LabOutcome::Preview(_) => Err(ApiError::Internal(
            "insert run produced a preview outcome".to_string(),
        )),
    }
}
