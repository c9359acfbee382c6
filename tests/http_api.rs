use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Days, Local};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use taskcast::{AppState, ServerConfig, events::EventRelay, routes, ws::rooms::Rooms};
use tower::ServiceExt;

fn test_router(pool: SqlitePool) -> Router {
    let state = AppState::new(
        pool,
        EventRelay::default(),
        Rooms::default(),
        ServerConfig::from_env(),
    );
    routes::router(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[sqlx::test]
async fn health_endpoint_responds(pool: SqlitePool) {
    let response = test_router(pool).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test]
async fn create_and_list_roundtrip(pool: SqlitePool) {
    let router = test_router(pool);
    let tomorrow = Local::now()
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap();

    let response = router
        .clone()
        .oneshot(post_json(
            "/todo-lists",
            json!({
                "task": "Ship v1",
                "developer": "Ana, Ben",
                "due_date": tomorrow.to_string(),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Todo list created successfully");
    assert_eq!(body["data"]["title"], "Ship v1");

    let response = router.oneshot(get("/todo-lists")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["search"], Value::Null);
    assert_eq!(body["data"][0]["task"], "Ship v1");
    assert_eq!(body["data"][0]["developer"], json!(["Ana", "Ben"]));
    assert_eq!(body["data"][0]["status_raw"], "pending");
}

#[sqlx::test]
async fn past_due_date_yields_validation_envelope(pool: SqlitePool) {
    let yesterday = Local::now()
        .date_naive()
        .pred_opt()
        .unwrap();

    let response = test_router(pool)
        .oneshot(post_json(
            "/todo-lists",
            json!({ "due_date": yesterday.to_string() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Validation failed");
    assert!(body["error"].as_str().unwrap().contains("due_date"));
}

#[sqlx::test]
async fn missing_todo_yields_not_found_envelope(pool: SqlitePool) {
    let response = test_router(pool)
        .oneshot(get("/todo-lists/999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Todo list not found");
}

#[sqlx::test]
async fn invalid_sort_field_is_rejected(pool: SqlitePool) {
    let response = test_router(pool)
        .oneshot(get("/todo-lists?sort_by=created_at"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("sort_by"));
}

#[sqlx::test]
async fn bulk_delete_of_unknown_ids_is_not_found(pool: SqlitePool) {
    let response = test_router(pool)
        .oneshot(post_json("/todo-lists/bulk-delete", json!({ "ids": [1, 2] })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["message"], "No todo lists found to delete");
}

#[sqlx::test]
async fn invalid_chart_type_yields_bad_request_envelope(pool: SqlitePool) {
    let router = test_router(pool);

    for uri in ["/chart?type=bogus", "/chart"] {
        let response = router.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid chart type");
        assert_eq!(body["error"], "Supported types: status, priority, assignee");
    }
}

#[sqlx::test]
async fn chart_status_summary_has_five_buckets(pool: SqlitePool) {
    let response = test_router(pool)
        .oneshot(get("/chart?type=status"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let summary = body["data"]["status_summary"].as_object().unwrap();
    assert_eq!(summary.len(), 5);
    assert_eq!(summary["pending"], 0);
}

#[sqlx::test]
async fn export_responds_with_spreadsheet_headers(pool: SqlitePool) {
    let response = test_router(pool)
        .oneshot(get("/reports/todo-lists/export"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(
        content_type,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );

    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.starts_with("attachment; filename=\"todolist_report_"));
    assert!(disposition.ends_with(".xlsx\""));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[sqlx::test]
async fn preview_echoes_filters_and_summarizes(pool: SqlitePool) {
    let router = test_router(pool);
    let tomorrow = Local::now()
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap();

    let response = router
        .clone()
        .oneshot(post_json(
            "/todo-lists",
            json!({
                "task": "Ship v1",
                "developer": "Ana",
                "due_date": tomorrow.to_string(),
                "time_tracked": 45,
                "priority": "high",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(get("/reports/todo-lists/preview?assigne=Ana&status=pending"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Preview data retrieved successfully");

    let data = &body["data"];
    assert_eq!(data["summary"]["total_records"], 1);
    assert_eq!(data["summary"]["total_time_tracked"], 45);
    assert_eq!(data["filters_applied"]["assigne"], "Ana");
    assert_eq!(data["filters_applied"]["status"], "pending");
    assert_eq!(data["todos"][0]["title"], "Ship v1");
    assert_eq!(data["todos"][0]["status"], "Pending");
    assert_eq!(data["todos"][0]["priority"], "High");
}
