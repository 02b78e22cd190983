//! HTTP Server

use std::sync::Arc;

use axum::middleware;
use axum::Router;
use http::header::CONTENT_TYPE;
use http::Method;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::request_logging_middleware;
use super::routes::create_routes;
use super::state::AppState;
use crate::config::ServerConfig;

/// HTTP 服务器
pub struct HttpServer {
    addr: String,
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(config: &ServerConfig, state: AppState) -> Self {
        Self {
            addr: config.addr(),
            state: Arc::new(state),
        }
    }

    /// 完整路由：API + 日志 + CORS
    ///
    /// 接口只收发 JSON，CORS 仅放行 GET / POST
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600));

        create_routes()
            .layer(middleware::from_fn(request_logging_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// 启动服务器，收到 `shutdown_signal` 后停止接收新请求
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        let listener = TcpListener::bind(&self.addr).await?;

        tracing::info!(addr = %self.addr, "VoiceLab API listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }
}
