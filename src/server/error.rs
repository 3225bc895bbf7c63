//! HTTP-facing errors. Every variant renders as `{"detail": "<message>"}`.

use axum::extract::rejection::JsonRejection;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Body could not be read or does not match the request schema
    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },

    #[error("Invalid or missing API key")]
    Unauthorized,

    #[error("Rate limit exceeded: at most {limit} requests per {scope}")]
    RateLimited {
        limit: u32,
        scope: &'static str,
        retry_after_secs: u64,
    },

    /// Anything that went wrong inside the pipeline
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Rejected { status, .. } => *status,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        // A non-JSON content type is a malformed body, same as a syntax error
        let status = match &rejection {
            JsonRejection::MissingJsonContentType(_) => StatusCode::BAD_REQUEST,
            _ => rejection.status(),
        };
        ApiError::Rejected {
            status,
            detail: rejection.body_text(),
        }
    }
}

impl From<crate::Error> for ApiError {
    fn from(err: crate::Error) -> Self {
        ApiError::Internal(format!("Failed to generate image: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retry_after = match &self {
            ApiError::RateLimited { retry_after_secs, .. } => Some(*retry_after_secs),
            _ => None,
        };

        let mut res = (status, Json(json!({ "detail": self.to_string() }))).into_response();
        if let Some(secs) = retry_after {
            res.headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs.max(1)));
        }
        res
    }
}
