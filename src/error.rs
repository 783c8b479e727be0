use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Closed outcome taxonomy for every resource operation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid parameters")]
    InvalidParams,

    #[error("Authentication error")]
    Auth,

    #[error("Forbidden")]
    Forbidden,

    #[error("Resource not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Json parsing error")]
    Json,

    #[error("Memory error")]
    Memory,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidParams => (StatusCode::BAD_REQUEST, "Invalid parameters"),
            Self::Auth => (StatusCode::UNAUTHORIZED, "Authentication error"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Forbidden"),
            Self::NotFound => (StatusCode::NOT_FOUND, "Resource not found"),
            Self::Database(e) => {
                tracing::error!("Database error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
            }
            Self::Json => (StatusCode::INTERNAL_SERVER_ERROR, "Json parsing error"),
            Self::Memory => (StatusCode::INTERNAL_SERVER_ERROR, "Memory error"),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
