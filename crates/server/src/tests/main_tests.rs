use super::*;
use axum::{
    body::{self, Body},
    http::{header, Request},
};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn test_app() -> Router {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    build_router(Arc::new(AppState {
        api: ApiContext { storage },
    }))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request")
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let app = test_app().await;
    let (status, body) = send(&app, get_request("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".into()));
}

#[tokio::test]
async fn group_resource_supports_full_crud_cycle() {
    let app = test_app().await;

    let (status, created) = send(
        &app,
        json_request("POST", "/api/groups", json!({ "name": "Design" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().expect("id");

    let (status, listed) = send(&app, get_request("/api/groups")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let (status, updated) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/groups/{id}"),
            json!({ "description": "visual work" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Design");
    assert_eq!(updated["description"], "visual work");

    let request = Request::delete(format!("/api/groups/{id}"))
        .body(Body::empty())
        .expect("request");
    let (status, deleted) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Deleted");

    let (status, missing) = send(&app, get_request(&format!("/api/groups/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["code"], "not_found");
}

#[tokio::test]
async fn tasks_filter_by_column_and_order_by_position() {
    let app = test_app().await;
    let (_, board) = send(
        &app,
        json_request("POST", "/api/boards", json!({ "name": "Launch" })),
    )
    .await;
    let board_id = board["id"].as_i64().expect("board id");

    let mut column_ids = Vec::new();
    for (name, position) in [("To Do", 0.0), ("Done", 1.0)] {
        let (status, column) = send(
            &app,
            json_request(
                "POST",
                "/api/columns",
                json!({ "name": name, "board_id": board_id, "position": position }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        column_ids.push(column["id"].as_i64().expect("column id"));
    }

    for (name, position) in [("second", 2.0), ("first", 1.0)] {
        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/tasks",
                json!({ "name": name, "column_id": column_ids[0], "position": position }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    send(
        &app,
        json_request(
            "POST",
            "/api/tasks",
            json!({ "name": "elsewhere", "column_id": column_ids[1] }),
        ),
    )
    .await;

    let (status, tasks) = send(
        &app,
        get_request(&format!("/api/tasks?column_id={}", column_ids[0])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = tasks
        .as_array()
        .expect("array")
        .iter()
        .map(|t| t["name"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, ["first", "second"]);
}

#[tokio::test]
async fn store_with_missing_parent_is_rejected() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/comments",
            json!({ "task_id": 77, "author": "ana", "body": "hello" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
}

#[tokio::test]
async fn update_of_missing_record_is_not_found() {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        json_request("PATCH", "/api/states/9", json!({ "name": "blocked" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_body_returns_validation_error() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        json_request("POST", "/api/groups", json!({ "nome": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
    assert!(body["message"].as_str().unwrap_or_default().contains("name"));
}

#[tokio::test]
async fn non_numeric_id_returns_validation_error() {
    let app = test_app().await;
    for request in [
        get_request("/api/groups/abc"),
        json_request("PATCH", "/api/groups/abc", json!({ "name": "x" })),
    ] {
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation");
    }
}
