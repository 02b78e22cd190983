//! Voice HTTP Handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{ExportVoices, GetVoice, ListVoices, QueryVoices, SynthesizeVoice};
use crate::domain::predicate::VoicePredicate;
use crate::infrastructure::http::dto::{ApiResponse, VoiceDto};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GetVoiceRequest {
    pub name: String,
    #[serde(default)]
    pub include_vector: bool,
}

#[derive(Debug, Deserialize)]
pub struct QueryVoicesRequest {
    pub predicate: VoicePredicate,
    #[serde(default)]
    pub include_vector: bool,
}

#[derive(Debug, Deserialize)]
pub struct SynthesizeVoiceRequest {
    pub name: String,
    pub text: Option<String>,
    pub speed: Option<f32>,
    pub lang: Option<String>,
    pub output_subdir: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SynthesizeVoiceResponseDto {
    pub name: String,
    pub file: String,
    pub duration_ms: u64,
    pub sample_rate: u32,
}

#[derive(Debug, Deserialize)]
pub struct ExportVoicesRequest {
    /// 省略时导出全部音色
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExportVoicesResponseDto {
    pub file: String,
    pub voices: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// 列出所有音色（不含向量）
pub async fn list_voices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<VoiceDto>>>, ApiError> {
    let voices = state.list_voices_handler.handle(ListVoices).await?;
    Ok(Json(ApiResponse::success(
        voices.into_iter().map(VoiceDto::from).collect(),
    )))
}

/// 获取音色详情
pub async fn get_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetVoiceRequest>,
) -> Result<Json<ApiResponse<VoiceDto>>, ApiError> {
    let voice = state
        .get_voice_handler
        .handle(GetVoice {
            name: req.name,
            include_vector: req.include_vector,
        })
        .await?;
    Ok(Json(ApiResponse::success(voice.into())))
}

/// 按谓词查询音色
pub async fn query_voices(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryVoicesRequest>,
) -> Result<Json<ApiResponse<Vec<VoiceDto>>>, ApiError> {
    let voices = state
        .query_voices_handler
        .handle(QueryVoices {
            predicate: req.predicate,
            include_vector: req.include_vector,
        })
        .await?;
    Ok(Json(ApiResponse::success(
        voices.into_iter().map(VoiceDto::from).collect(),
    )))
}

/// 用单个音色合成文本
pub async fn synthesize_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SynthesizeVoiceRequest>,
) -> Result<Json<ApiResponse<SynthesizeVoiceResponseDto>>, ApiError> {
    let defaults = &state.lab_defaults;
    let response = state
        .synthesize_voice_handler
        .handle(SynthesizeVoice {
            name: req.name,
            text: req.text.unwrap_or_else(|| defaults.default_text.clone()),
            speed: req.speed.unwrap_or(defaults.default_speed),
            lang: req.lang.unwrap_or_else(|| defaults.default_lang.clone()),
            output_subdir: req.output_subdir,
        })
        .await?;

    Ok(Json(ApiResponse::success(SynthesizeVoiceResponseDto {
        name: response.name,
        file: response.file.display().to_string(),
        duration_ms: response.duration_ms,
        sample_rate: response.sample_rate,
    })))
}

/// 导出风格向量
pub async fn export_voices(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExportVoicesRequest>,
) -> Result<Json<ApiResponse<ExportVoicesResponseDto>>, ApiError> {
    let response = state
        .export_voices_handler
        .handle(ExportVoices { name: req.name })
        .await?;

    Ok(Json(ApiResponse::success(ExportVoicesResponseDto {
        file: response.file.display().to_string(),
        voices: response.voices,
    })))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{get_json, post_json, test_app};
    use serde_json::json;

    #[tokio::test]
    async fn test_list_voices_sorted_without_vectors() {
        let app = test_app().await;
        let body = get_json(&app.router, "/api/voice/list").await;

        assert_eq!(body["errno"], 0);
        let voices = body["data"].as_array().unwrap();
        let names: Vec<&str> = voices.iter().map(|v| v["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["A", "A2", "B"]);
        assert!(voices[0].get("style_vector").is_none());
        assert_eq!(voices[0]["embedding_dim"], 2);
    }

    #[tokio::test]
    async fn test_get_voice_with_vector() {
        let app = test_app().await;
        let body = post_json(
            &app.router,
            "/api/voice/get",
            json!({"name": "A2", "include_vector": true}),
        )
        .await;

        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["style_vector"], json!([2.0, 0.0]));
    }

    #[tokio::test]
    async fn test_get_missing_voice_is_not_found() {
        let app = test_app().await;
        let body = post_json(&app.router, "/api/voice/get", json!({"name": "nobody"})).await;
        assert_eq!(body["errno"], 404);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_query_voices_by_gender() {
        let app = test_app().await;
        let body = post_json(
            &app.router,
            "/api/voice/query",
            json!({"predicate": {"cond": {"field": "gender", "op": "eq", "value": "M"}}}),
        )
        .await;

        let names: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["A", "A2"]);
    }

    #[tokio::test]
    async fn test_query_voices_rejects_invalid_operator() {
        let app = test_app().await;
        let body = post_json(
            &app.router,
            "/api/voice/query",
            json!({"predicate": {"cond": {"field": "quality", "op": "like", "value": "9%"}}}),
        )
        .await;
        assert_eq!(body["errno"], 400);
    }

    #[tokio::test]
    async fn test_synthesize_voice_writes_file() {
        let app = test_app().await;
        let body = post_json(
            &app.router,
            "/api/voice/synthesize",
            json!({"name": "B", "text": "hello there"}),
        )
        .await;

        assert_eq!(body["errno"], 0);
        let file = body["data"]["file"].as_str().unwrap();
        assert!(std::path::Path::new(file).starts_with(app.output.path()));
        assert!(std::path::Path::new(file).exists());
    }

    #[tokio::test]
    async fn test_export_all_voices() {
        let app = test_app().await;
        let body = post_json(&app.router, "/api/voice/export", json!({})).await;

        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["voices"], json!(["A", "A2", "B"]));
        assert!(app.export.path().join("voices.npz").exists());
    }
}
