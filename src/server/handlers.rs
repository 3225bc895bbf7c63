use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::{json, Value};

use crate::server::{ApiError, AppState};
use crate::RenderRequest;

/// `POST /generate-image`: render a card and return it as `image/png`.
pub async fn generate_image(
    State(state): State<AppState>,
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;

    let image = state.pipeline.generate(&request).await.map_err(|e| {
        error!("render for category {:?} failed: {}", request.category_name, e);
        ApiError::from(e)
    })?;

    Ok(([(header::CONTENT_TYPE, "image/png")], image.bytes).into_response())
}

/// `GET /`
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Image Generator API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoint": "/generate-image",
        "method": "POST",
    }))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
