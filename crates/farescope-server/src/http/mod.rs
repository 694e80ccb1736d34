mod routes;

pub use routes::create_router;

use crate::config::Credentials;
use crate::pipeline::Pipeline;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use farescope_core::FarescopeError;
use serde::Serialize;

/// Shared application state. Immutable once built.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub credentials: Credentials,
    pub start_time: std::time::Instant,
}

/// JSON response wrapper
#[derive(Serialize)]
pub struct JsonResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

impl<T: Serialize> JsonResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            kind: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> JsonResponse<()> {
        JsonResponse {
            success: false,
            data: None,
            error: Some(msg.into()),
            kind: None,
        }
    }
}

impl JsonResponse<()> {
    pub fn with_kind(mut self, kind: &'static str) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// Custom error type for HTTP handlers. Validation and chart-type errors
/// become 400s; everything else is a 500.
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.0.downcast_ref::<FarescopeError>() {
            Some(e) if e.is_client_error() => (
                StatusCode::BAD_REQUEST,
                Json(JsonResponse::<()>::err(e.to_string()).with_kind(e.kind())),
            )
                .into_response(),
            Some(e) => {
                tracing::error!("{}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(JsonResponse::<()>::err(e.to_string()).with_kind(e.kind())),
                )
                    .into_response()
            }
            None => {
                tracing::error!("{:#}", self.0);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(JsonResponse::<()>::err(self.0.to_string())),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
