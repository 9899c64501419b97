use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::Value;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::error;
use uuid::Uuid;

use crate::monitoring::HealthService;
use crate::unroll::document;
use crate::unroll::resolver::ContentResolver;
use crate::unroll::types::{UnrollEvent, UnrollResult, ID};

use super::errors::ApiError;

const TRANSACTION_ID_HEADER: &str = "X-Request-Id";

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<ContentResolver>,
    pub preview_resolver: Arc<ContentResolver>,
    pub health: Arc<HealthService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        // Unroll endpoints, published and preview flavors
        .route("/content", post(content_handler))
        .route("/internal-content", post(internal_content_handler))
        .route("/content-preview", post(content_preview_handler))
        .route(
            "/internal-content-preview",
            post(internal_content_preview_handler),
        )
        // Health endpoints
        .route("/__health", get(health_handler))
        .route("/__gtg", get(gtg_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn content_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let resolver = state.resolver.clone();
    unroll_images(resolver, headers, body).await
}

async fn content_preview_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let resolver = state.preview_resolver.clone();
    unroll_images(resolver, headers, body).await
}

async fn internal_content_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let resolver = state.resolver.clone();
    unroll_internal(resolver, headers, body).await
}

async fn internal_content_preview_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let resolver = state.preview_resolver.clone();
    unroll_internal(resolver, headers, body).await
}

async fn unroll_images(resolver: Arc<ContentResolver>, headers: HeaderMap, body: Value) -> Response {
    let tid = transaction_id(&headers);
    let event = match validate_event(body, tid.clone()) {
        Ok(event) => event,
        Err(err) => return ApiErrorResponse(err, Some(tid)).into_response(),
    };

    let result = resolver.unroll_images(event).await;
    respond(result, tid)
}

async fn unroll_internal(
    resolver: Arc<ContentResolver>,
    headers: HeaderMap,
    body: Value,
) -> Response {
    let tid = transaction_id(&headers);
    let event = match validate_event(body, tid.clone()) {
        Ok(event) => event,
        Err(err) => return ApiErrorResponse(err, Some(tid)).into_response(),
    };

    let result = resolver.unroll_internal_content(event).await;
    respond(result, tid)
}

fn respond(result: UnrollResult, tid: String) -> Response {
    match result.error {
        None => Json(Value::Object(result.content)).into_response(),
        Some(err) => {
            error!("tid={} {}", tid, err);
            ApiErrorResponse(ApiError::UnrollFailed(err.to_string()), Some(tid)).into_response()
        }
    }
}

/// Build an UnrollEvent from a request body
///
/// The body must be a JSON object whose `id` field yields a valid identity;
/// everything else about its shape is the resolution engine's concern.
fn validate_event(body: Value, tid: String) -> Result<UnrollEvent, ApiError> {
    let Value::Object(content) = body else {
        return Err(ApiError::InvalidRequest(
            "request body must be a JSON object".to_string(),
        ));
    };

    let Some(uuid) = document::identity_of(&content) else {
        return Err(ApiError::ValidationError {
            field: ID.to_string(),
            message: "must carry a valid identity".to_string(),
        });
    };

    Ok(UnrollEvent { content, tid, uuid })
}

fn transaction_id(headers: &HeaderMap) -> String {
    headers
        .get(TRANSACTION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("tid_{}", Uuid::new_v4().simple()))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.health.check_all().await)
}

async fn gtg_handler(State(state): State<AppState>) -> Response {
    match state.health.good_to_go().await {
        Ok(()) => (StatusCode::OK, "OK").into_response(),
        Err(message) => (StatusCode::SERVICE_UNAVAILABLE, message).into_response(),
    }
}

// Error response wrapper
struct ApiErrorResponse(ApiError, Option<String>);

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let error_response = self.0.to_response(self.1);

        (status, Json(error_response)).into_response()
    }
}
