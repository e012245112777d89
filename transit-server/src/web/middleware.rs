//! Per-client rate limiting for HTTP requests.

use std::net::SocketAddr;
use std::time::SystemTime;

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use crate::ratelimit::RateLimitDecision;

use super::state::AppState;

const LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Extensions that are never rate limited.
const ASSET_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "ico", "svg", "css", "js", "woff", "woff2",
];

/// Key used when no client address is known.
const UNKNOWN_CLIENT: &str = "127.0.0.1";

/// Count the request against its client and refuse it once over the limit.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if is_asset(request.uri().path()) {
        return next.run(request).await;
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_key(request.headers(), peer, state.limiter.trusts_forwarded_for());

    let now = SystemTime::now();
    let decision = state.limiter.check_at(&client, now);

    if !decision.allowed {
        warn!(
            client = %client,
            path = %request.uri().path(),
            tracked_clients = state.limiter.tracked_clients(),
            "rate limit exceeded"
        );

        let body = Json(json!({
            "error": "Too Many Requests",
            "message": "Please try again later.",
        }));
        let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
        set_limit_headers(response.headers_mut(), &decision);
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(decision.retry_after_secs(now)));
        return response;
    }

    let mut response = next.run(request).await;
    set_limit_headers(response.headers_mut(), &decision);
    response
}

fn set_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(LIMIT, HeaderValue::from(decision.limit));
    headers.insert(REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(RESET, HeaderValue::from(decision.reset_epoch_ms() as u64));
}

/// Whether `path` is a static asset.
fn is_asset(path: &str) -> bool {
    if path.starts_with("/static") || path.starts_with("/assets") {
        return true;
    }

    path.rsplit_once('.')
        .is_some_and(|(_, ext)| ASSET_EXTENSIONS.contains(&ext))
}

/// Identify the client by its peer address.
///
/// The first `X-Forwarded-For` entry is used instead only when
/// `trust_forwarded_for` is set; otherwise any client could pick its own key.
fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded_for: bool) -> String {
    let forwarded = || {
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    trust_forwarded_for
        .then(forwarded)
        .flatten()
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
