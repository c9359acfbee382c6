use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    db::charts::{AssigneeStats, ChartRepository, PrioritySummary, StatusSummary},
    error::ApiError,
    response::ApiResponse,
};

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    #[serde(rename = "type")]
    pub chart_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChartType {
    Status,
    Priority,
    Assignee,
}

fn parse_chart_type(raw: Option<&str>) -> Result<ChartType, ApiError> {
    match raw {
        Some("status") => Ok(ChartType::Status),
        Some("priority") => Ok(ChartType::Priority),
        Some("assignee") => Ok(ChartType::Assignee),
        _ => Err(ApiError::InvalidChartType),
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ChartData {
    Status {
        status_summary: StatusSummary,
    },
    Priority {
        priority_summary: PrioritySummary,
    },
    Assignee {
        assignee_summary: Vec<HashMap<String, AssigneeStats>>,
    },
}

pub fn router() -> Router<AppState> {
    Router::new().route("/chart", get(get_chart))
}

async fn get_chart(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ApiResponse<ChartData>>, ApiError> {
    let chart_type = parse_chart_type(query.chart_type.as_deref())?;
    let repository = ChartRepository::new(state.pool());

    let (message, data) = match chart_type {
        ChartType::Status => (
            "Status summary retrieved successfully",
            ChartData::Status {
                status_summary: repository.status_summary().await?,
            },
        ),
        ChartType::Priority => (
            "Priority summary retrieved successfully",
            ChartData::Priority {
                priority_summary: repository.priority_summary().await?,
            },
        ),
        ChartType::Assignee => (
            "Assignee summary retrieved successfully",
            ChartData::Assignee {
                assignee_summary: repository.assignee_summary().await?,
            },
        ),
    };

    Ok(Json(ApiResponse::success(message, data)))
}
