//! Request middleware: visitor tracking and the access guard

use axum::{
    extract::{ConnectInfo, Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use std::net::SocketAddr;

use crate::database::{self, AppState};
use crate::error::ApiError;
use crate::model::AdminClaims;

/// Tracks the client IP of every inbound request.
///
/// Performs an idempotent upsert into the visitor collection keyed on
/// the IP. When no IP can be derived (no `X-Forwarded-For` header and no
/// connection info), tracking is a no-op; the request pipeline is never
/// blocked, and a failing store write only logs a warning.
pub async fn track_visitor(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(ip) = client_ip(&request) {
        if let Err(err) = database::upsert_visitor(&state.db, &ip) {
            tracing::warn!(error = %err, ip = %ip, "visitor tracking failed");
        }
    }

    next.run(request).await
}

/// Derives the client IP: first `X-Forwarded-For` hop when present,
/// otherwise the peer address of the connection.
pub fn client_ip(request: &Request) -> Option<String> {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty());

    forwarded.or_else(|| {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip().to_string())
    })
}

/// Access guard for protected admin operations.
///
/// Expects `Authorization: Bearer <token>` and verifies the token's
/// signature against the shared secret. Missing header, malformed
/// header, absent secret, and failed verification all yield the same
/// 401 so a caller cannot tell which case occurred. Decoded claims are
/// attached to the request extensions for downstream handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = header.strip_prefix("Bearer ").ok_or(ApiError::Unauthorized)?;

    let secret = state
        .config
        .jwt_secret
        .as_deref()
        .ok_or(ApiError::Unauthorized)?;

    let claims = decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized)?
    .claims;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
