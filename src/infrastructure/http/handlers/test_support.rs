//! 路由测试用的应用状态与请求工具

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

use crate::application::CatalogPort;
use crate::config::{CatalogConfig, LabConfig};
use crate::domain::voice::{Gender, NewVoice, Quality, StyleVector, VoiceName, VoiceRecord};
use crate::infrastructure::adapters::{
    FakeSynthesizer, FakeSynthesizerConfig, NpzExporter, NpzStyleBank, WavFileSink,
};
use crate::infrastructure::http::routes::create_routes;
use crate::infrastructure::http::state::{AppPorts, AppState};
use crate::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteCatalog,
};

pub struct TestApp {
    pub router: Router,
    pub catalog: Arc<SqliteCatalog>,
    pub output: TempDir,
    pub export: TempDir,
}

pub fn voice(name: &str, gender: Gender, values: &[f32]) -> VoiceRecord {
    VoiceRecord::new(NewVoice {
        name: VoiceName::new(name).unwrap(),
        gender,
        language: "en-us".to_string(),
        quality: Quality::new(80).unwrap(),
        training_duration: None,
        style_vector: StyleVector::new(values.to_vec()).unwrap(),
        is_synthetic: false,
        notes: None,
    })
}

/// 预置 A[0,0] M、A2[2,0] M、B[2,0] F
pub async fn test_app() -> TestApp {
    let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
    run_migrations(&pool).await.unwrap();
    let catalog = Arc::new(SqliteCatalog::new(pool));

    catalog.insert(&voice("A", Gender::M, &[0.0, 0.0])).await.unwrap();
    catalog.insert(&voice("A2", Gender::M, &[2.0, 0.0])).await.unwrap();
    catalog.insert(&voice("B", Gender::F, &[2.0, 0.0])).await.unwrap();

    let output = TempDir::new().unwrap();
    let export = TempDir::new().unwrap();

    let ports = AppPorts {
        catalog: catalog.clone(),
        synthesizer: Arc::new(FakeSynthesizer::new(FakeSynthesizerConfig {
            fail_above: Some(3.0),
            ..Default::default()
        })),
        sink: Arc::new(WavFileSink::new(output.path()).await.unwrap()),
        exporter: Arc::new(NpzExporter::new(export.path()).await.unwrap()),
        style_bank: Arc::new(NpzStyleBank),
    };
    let state = AppState::new(ports, LabConfig::default(), CatalogConfig::default());
    let router = create_routes().with_state(Arc::new(state));

    TestApp {
        router,
        catalog,
        output,
        export,
    }
}

async fn send(router: &Router, request: Request<Body>) -> Value {
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get_json(router: &Router, uri: &str) -> Value {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

pub async fn post_json(router: &Router, uri: &str, body: Value) -> Value {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}
