use axum::{
    Json, Router,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde::Serialize;

use crate::{
    AppState,
    db::filter::ReportFilter,
    error::ApiError,
    reports::{RenderedRow, ReportRepository, build_workbook, total_time_tracked},
    response::ApiResponse,
};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Serialize)]
pub struct PreviewSummary {
    pub total_records: usize,
    pub total_time_tracked: i64,
}

#[derive(Debug, Serialize)]
pub struct PreviewData {
    pub todos: Vec<RenderedRow>,
    pub summary: PreviewSummary,
    pub filters_applied: ReportFilter,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports/todo-lists/export", get(export_todos))
        .route("/reports/todo-lists/preview", get(preview_todos))
}

async fn export_todos(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> Result<Response, ApiError> {
    let rows = ReportRepository::new(state.pool()).fetch_rows(&filter).await?;
    let buffer = build_workbook(&rows)?;

    let filename = format!(
        "todolist_report_{}.xlsx",
        Utc::now().format("%Y-%m-%d_%H_%M_%S")
    );

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        buffer,
    )
        .into_response())
}

async fn preview_todos(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> Result<Json<ApiResponse<PreviewData>>, ApiError> {
    let rows = ReportRepository::new(state.pool()).fetch_rows(&filter).await?;
    let todos: Vec<RenderedRow> = rows.iter().map(RenderedRow::from).collect();
    let total_time_tracked = total_time_tracked(&rows);

    Ok(Json(ApiResponse::success(
        "Preview data retrieved successfully",
        PreviewData {
            summary: PreviewSummary {
                total_records: todos.len(),
                total_time_tracked,
            },
            todos,
            filters_applied: filter,
        },
    )))
}
