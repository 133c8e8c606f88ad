//! HTTP front end for the data entry service.
//!
//! # Endpoints
//!
//! - `GET /heartbeat`: liveness check (no auth required)
//! - `GET /index`: all stored keys (no auth required)
//! - `POST /new`: create a document from the JSON body
//! - `GET /{code}/{value}`: read the document for anchor `/{code}/{value}`
//! - `PUT /{code}/{value}`: replace a document with the JSON body
//! - `DELETE /{code}/{value}`: delete the document for the anchor
//!
//! Every data route answers with the operation's envelope as JSON, using the
//! envelope status as the HTTP status.

mod auth;

pub use auth::auth_middleware;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::anchor::anchor_from_segments;
use crate::documents::DocumentService;
use crate::envelope::Envelope;
use crate::error::DataEntryError;
use crate::store::{Document, SharedStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<DocumentService<SharedStore>>,
    pub session_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(store: SharedStore, session_token: Option<String>) -> Self {
        Self {
            documents: Arc::new(DocumentService::new(store)),
            session_token: session_token.map(Arc::from),
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Builds the router with public and token-protected routes.
pub fn router(state: AppState) -> Router {
    // Public routes (no auth)
    let public_routes = Router::new()
        .route("/heartbeat", get(heartbeat))
        .route("/index", get(read_index));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/new", post(create_document))
        .route(
            "/{code}/{value}",
            get(read_document)
                .put(update_document)
                .delete(delete_document),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Handlers
// ============================================================================

/// Heartbeat response
#[derive(Serialize)]
struct HeartbeatResponse {
    response_message: &'static str,
    version: &'static str,
}

async fn heartbeat() -> Json<HeartbeatResponse> {
    Json(HeartbeatResponse {
        response_message: "Server is running!",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn read_index(State(state): State<AppState>) -> Envelope {
    state.documents.read_index().await
}

async fn create_document(
    State(state): State<AppState>,
    payload: Result<Json<Document>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(document)) => state.documents.create(document).await.into_response(),
        Err(rejection) => reject_payload(rejection),
    }
}

async fn read_document(
    State(state): State<AppState>,
    Path((code, value)): Path<(String, String)>,
) -> Envelope {
    state
        .documents
        .read(&anchor_from_segments(&code, &value))
        .await
}

async fn update_document(
    State(state): State<AppState>,
    Path((code, value)): Path<(String, String)>,
    payload: Result<Json<Document>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(document)) => {
            tracing::debug!("Update via /{}/{}", code, value);
            state.documents.update(document).await.into_response()
        }
        Err(rejection) => reject_payload(rejection),
    }
}

async fn delete_document(
    State(state): State<AppState>,
    Path((code, value)): Path<(String, String)>,
) -> Envelope {
    state
        .documents
        .delete(&anchor_from_segments(&code, &value))
        .await
}

/// Maps a body rejection to 415 for non-JSON content, 400 otherwise.
fn reject_payload(rejection: JsonRejection) -> Response {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Request must be in JSON format",
        )
            .into_response(),
        other => Envelope::from(DataEntryError::Validation(format!(
            "invalid document: {}",
            other.body_text()
        )))
        .into_response(),
    }
}
