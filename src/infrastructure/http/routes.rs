//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping               GET   健康检查
//! - /api/voice/list         GET   列出所有音色
//! - /api/voice/get          POST  获取音色详情
//! - /api/voice/query        POST  按谓词查询音色
//! - /api/voice/synthesize   POST  用单个音色合成文本
//! - /api/voice/export       POST  导出风格向量（单个 .npy 或全部 .npz）
//! - /api/catalog/info       GET   目录概况
//! - /api/catalog/import     POST  从元数据 JSON + 向量归档批量导入
//! - /api/lab/preview        POST  按多个缩放系数生成试听音频
//! - /api/lab/insert         POST  生成合成音色并写入目录

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/voice", voice_routes())
        .nest("/catalog", catalog_routes())
        .nest("/lab", lab_routes())
}

/// Voice 路由
fn voice_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/list", get(handlers::list_voices))
        .route("/get", post(handlers::get_voice))
        .route("/query", post(handlers::query_voices))
        .route("/synthesize", post(handlers::synthesize_voice))
        .route("/export", post(handlers::export_voices))
}

/// Catalog 路由
fn catalog_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/info", get(handlers::catalog_info))
        .route("/import", post(handlers::import_catalog))
}

/// Lab 路由
fn lab_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/preview", post(handlers::lab_preview))
        .route("/insert", post(handlers::lab_insert))
}
