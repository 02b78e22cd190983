//! HTTP Middleware
//!
//! 每个请求分配 `x-request-id`，并按状态码分级记录耗时

use std::time::Instant;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 请求日志中间件
///
/// 业务错误（errno != 0）的 HTTP 状态仍是 200，由 ApiError::into_response() 记录；
/// 这里只处理路由层面的 4xx / 5xx（未知路径、JSON 解析失败等）
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let mut response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        tracing::error!(%request_id, %method, %path, status, elapsed_ms, "Request failed");
    } else if response.status().is_client_error() {
        tracing::warn!(%request_id, %method, %path, status, elapsed_ms, "Request rejected");
    } else {
        tracing::debug!(%request_id, %method, %path, status, elapsed_ms, "Request served");
    }

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
