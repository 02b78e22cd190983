//! Catalog HTTP Handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::{GetCatalogInfo, ImportCatalog};
use crate::infrastructure::http::dto::{ApiResponse, VoiceDto};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CatalogInfoDto {
    pub total: usize,
    pub synthetic: usize,
    pub embedding_dim: Option<usize>,
}

/// 路径省略时使用配置中的默认值
#[derive(Debug, Default, Deserialize)]
pub struct ImportCatalogRequest {
    pub metadata_path: Option<PathBuf>,
    pub bank_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct ImportCatalogResponseDto {
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total: usize,
    pub top_voices: Vec<VoiceDto>,
}

// ============================================================================
// Handlers
// ============================================================================

/// 目录概况
pub async fn catalog_info(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<CatalogInfoDto>>, ApiError> {
    let info = state.catalog_info_handler.handle(GetCatalogInfo).await?;
    Ok(Json(ApiResponse::success(CatalogInfoDto {
        total: info.total,
        synthetic: info.synthetic,
        embedding_dim: info.embedding_dim,
    })))
}

/// 批量导入
pub async fn import_catalog(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ImportCatalogRequest>,
) -> Result<Json<ApiResponse<ImportCatalogResponseDto>>, ApiError> {
    let defaults = &state.catalog_defaults;
    let response = state
        .import_catalog_handler
        .handle(ImportCatalog {
            metadata_path: req
                .metadata_path
                .unwrap_or_else(|| defaults.voice_data_path.clone()),
            bank_path: req
                .bank_path
                .unwrap_or_else(|| defaults.voice_bank_path.clone()),
        })
        .await?;

    Ok(Json(ApiResponse::success(ImportCatalogResponseDto {
        imported: response.imported,
        skipped: response.skipped,
        failed: response.failed,
        total: response.total,
        top_voices: response.top_voices.into_iter().map(VoiceDto::from).collect(),
    })))
}
