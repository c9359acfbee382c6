use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{db::todos::TodoStoreError, response::ApiResponse};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] TodoStoreError),
    #[error("Supported types: status, priority, assignee")]
    InvalidChartType,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Export(#[from] rust_xlsxwriter::XlsxError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, message) = match &self {
            ApiError::Store(TodoStoreError::NotFound) => {
                (StatusCode::NOT_FOUND, "Todo list not found")
            }
            ApiError::Store(TodoStoreError::NothingDeleted) => {
                (StatusCode::NOT_FOUND, "No todo lists found to delete")
            }
            ApiError::Store(TodoStoreError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "Validation failed")
            }
            ApiError::Store(TodoStoreError::Database(_)) | ApiError::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
            }
            ApiError::InvalidChartType => (StatusCode::BAD_REQUEST, "Invalid chart type"),
            ApiError::Export(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred while generating the report",
            ),
        };

        let response = ApiResponse::error(message, self.to_string());
        (status_code, Json(response)).into_response()
    }
}
