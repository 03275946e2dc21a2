use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower::{Layer, ServiceExt};
use tower_http::cors::CorsLayer;
use tracing::{Instrument, info_span};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::{AppState, run_blocking};

/// Identity bound to a request once its bearer token checks out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

/// Validate the bearer token and bind the caller to the request.
///
/// OPTIONS requests skip every check so that CORS negotiation never needs a
/// token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let token = bearer_token(req.headers())?.to_string();
    let user = run_blocking(&state, move |s| s.tokens.resolve(&token, &s.db)).await?;

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
    });
    Ok(next.run(req).await)
}

/// Splits `Authorization: <type> <credential>` and returns the credential
/// of a bearer header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::MissingToken)?;

    let (token_type, credential) = match value.split_once(char::is_whitespace) {
        Some((token_type, credential)) => (token_type, credential.trim()),
        None => (value, ""),
    };

    if !token_type.eq_ignore_ascii_case("bearer") {
        return Err(ApiError::BadTokenType);
    }
    if credential.is_empty() {
        return Err(ApiError::MissingToken);
    }
    Ok(credential)
}

/// Tag each request with an id, in the logs and in `x-request-id`.
pub async fn request_id(req: Request, next: Next) -> Response {
    let id = Uuid::new_v4().to_string();
    let span = info_span!("request", id = %id, method = %req.method(), path = %req.uri().path());

    let mut resp = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        resp.headers_mut().insert("x-request-id", value);
    }
    resp
}

/// CORS for cross-origin callers. Only an OPTIONS carrying both `Origin`
/// and `Access-Control-Request-Method` is answered as a browser preflight;
/// a bare OPTIONS goes on to the routes and gets their `Allow` answer.
pub async fn cors(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS && !is_cors_preflight(req.headers()) {
        return next.run(req).await;
    }

    match CorsLayer::permissive().layer(next).oneshot(req).await {
        Ok(resp) => resp,
        Err(never) => match never {},
    }
}

fn is_cors_preflight(headers: &HeaderMap) -> bool {
    headers.contains_key(header::ORIGIN) && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

/// Answer for OPTIONS on protected paths.
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::ALLOW, "GET, POST, PUT, PATCH, DELETE, OPTIONS")],
    )
}
