//! Cross-cutting request middleware
//!
//! Applied to every route, outermost first:
//! 1. request id (`x-request-id`, generated when absent, echoed back)
//! 2. per-request tracing span carrying the request id
//! 3. client IP extraction ([`real_ip`])
//! 4. access log ([`access_log`]), which also sees recovered panics
//! 5. panic recovery ([`panic_response`])

use std::any::Any;
use std::net::{IpAddr, SocketAddr};
use std::time::Instant;

use axum::{
    body::{Body, HttpBody},
    extract::{ConnectInfo, Request},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, Span};

use super::{ErrorResponse, Status};

/// Header carrying the request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Client address resolved by [`real_ip`], stored in request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

/// Resolve the client address from proxy headers, falling back to the peer address
///
/// Header priority: `True-Client-IP`, `X-Real-IP`, first entry of `X-Forwarded-For`.
pub async fn real_ip(mut request: Request, next: Next) -> Response {
    let ip = ip_from_headers(request.headers()).or_else(|| {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    });
    request.extensions_mut().insert(ClientIp(ip));
    next.run(request).await
}

fn ip_from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    let header_ip = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    header_ip("true-client-ip")
        .or_else(|| header_ip("x-real-ip"))
        .or_else(|| {
            headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .and_then(|v| v.trim().parse::<IpAddr>().ok())
        })
}

/// Log one line per completed request
pub async fn access_log(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let remote_addr = request
        .extensions()
        .get::<ClientIp>()
        .and_then(|ClientIp(ip)| *ip)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "-".to_string());
    let user_agent = header_str(request.headers(), header::USER_AGENT.as_str());
    let request_id = header_str(request.headers(), REQUEST_ID_HEADER);

    let started = Instant::now();
    let response = next.run(request).await;
    let bytes_written = response.body().size_hint().exact().unwrap_or(0);

    info!(
        method = %method,
        path = %path,
        remote_addr = %remote_addr,
        user_agent = %user_agent,
        request_id = %request_id,
        status = response.status().as_u16(),
        bytes_written,
        duration = ?started.elapsed(),
        "request completed"
    );

    response
}

fn header_str(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string()
}

/// Span wrapping everything a request logs
pub fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    )
}

/// Turn a handler panic into a 500 error envelope
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!(panic = %detail, "Request handler panicked");

    let body = Json(ErrorResponse {
        status: Status::Error,
        error: "internal server error".to_string(),
        fields: Vec::new(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}
