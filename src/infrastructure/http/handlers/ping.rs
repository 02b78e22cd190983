//! Ping Handler - 健康检查

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::state::AppState;

#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// 目录不可读时为 None
    pub voices: Option<usize>,
}

/// 服务存活即返回 ok；目录计数失败只记录告警
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<ApiResponse<PingResponse>> {
    let voices = match state.catalog.count().await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(error = %e, "Catalog unavailable during ping");
            None
        }
    };

    Json(ApiResponse::success(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        voices,
    }))
}
