//! Bearer-token check for data entry routes.
//!
//! A missing `Authorization` header is rejected with 401. A header whose
//! token does not match the configured session token is rejected with 403.
//! When no session token is configured every token is rejected.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::AppState;

/// Auth error response
#[derive(Serialize)]
struct AuthError {
    error: &'static str,
    message: &'static str,
}

fn reject(status: StatusCode, error: &'static str, message: &'static str) -> Response {
    (status, Json(AuthError { error, message })).into_response()
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) => h.strip_prefix("Bearer ").unwrap_or(h),
        None => {
            return reject(
                StatusCode::UNAUTHORIZED,
                "missing_auth",
                "Missing Authorization Header",
            );
        }
    };

    let authorized = state.session_token.as_deref() == Some(token);

    if authorized {
        next.run(request).await
    } else {
        tracing::debug!("Rejected request with invalid session token");
        reject(StatusCode::FORBIDDEN, "invalid_token", "Token is invalid")
    }
}
