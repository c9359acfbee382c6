use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::Local;
use serde::Deserialize;

use crate::{
    AppState,
    db::todos::{
        CreateTodo, FieldViolation, ListParams, Todo, TodoListItem, TodoStore, TodoStoreError,
        UpdateTodo,
    },
    error::ApiError,
    response::{ApiResponse, BulkDeletedResponse, DeletedResponse, ListResponse},
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub order_direction: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<i64>,
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route("/", post(create_todo).get(list_todos))
        .route("/bulk-delete", post(bulk_delete_todos))
        .route(
            "/{id}",
            get(get_todo)
                .patch(update_todo)
                .put(update_todo)
                .delete(delete_todo),
        );

    Router::new().nest("/todo-lists", inner)
}

async fn create_todo(
    State(state): State<AppState>,
    Json(payload): Json<CreateTodo>,
) -> Result<Json<ApiResponse<Todo>>, ApiError> {
    let todo = TodoStore::new(state.pool(), state.relay())
        .create(payload, Local::now().date_naive())
        .await?;

    Ok(Json(ApiResponse::success(
        "Todo list created successfully",
        todo,
    )))
}

async fn list_todos(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<TodoListItem>>, ApiError> {
    let params = ListParams::parse(
        query.search,
        query.sort_by.as_deref(),
        query.order_direction.as_deref(),
    )
    .map_err(TodoStoreError::Validation)?;

    let todos = TodoStore::new(state.pool(), state.relay())
        .list(&params)
        .await?;
    let data: Vec<TodoListItem> = todos.into_iter().map(TodoListItem::from).collect();

    Ok(Json(ListResponse {
        success: true,
        message: "Todo lists retrieved successfully".to_string(),
        total_count: data.len(),
        search: params.search,
        data,
    }))
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Todo>>, ApiError> {
    let todo = TodoStore::new(state.pool(), state.relay()).get(id).await?;

    Ok(Json(ApiResponse::success(
        "Todo list retrieved successfully",
        todo,
    )))
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTodo>,
) -> Result<Json<ApiResponse<Todo>>, ApiError> {
    let todo = TodoStore::new(state.pool(), state.relay())
        .update(id, payload, Local::now().date_naive())
        .await?;

    Ok(Json(ApiResponse::success(
        "Todo list updated successfully",
        todo,
    )))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let deleted_id = TodoStore::new(state.pool(), state.relay()).delete(id).await?;

    Ok(Json(DeletedResponse {
        success: true,
        message: "Todo list deleted successfully".to_string(),
        deleted_id,
    }))
}

async fn bulk_delete_todos(
    State(state): State<AppState>,
    Json(payload): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeletedResponse>, ApiError> {
    if payload.ids.is_empty() {
        return Err(TodoStoreError::Validation(vec![FieldViolation {
            field: "ids",
            message: "must contain at least 1 element".to_string(),
        }])
        .into());
    }

    let deleted_count = TodoStore::new(state.pool(), state.relay())
        .bulk_delete(&payload.ids)
        .await?;

    Ok(Json(BulkDeletedResponse {
        success: true,
        message: format!("Successfully deleted {deleted_count} todo list(s)"),
        deleted_count,
        deleted_ids: payload.ids,
    }))
}
