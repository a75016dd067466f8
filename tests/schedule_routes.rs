use std::collections::BTreeMap;

use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode},
};
use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
use serde_json::json;
use tower::ServiceExt;

use schedule_diary::{
    auth::{
        Claims,
        jwt::{JwtKeys, encode_token, now_unix},
    },
    db::entities::schedule_item,
    routes::API_PREFIX,
    test_helpers::{bearer_for, test_router},
};

const SECRET: &[u8] = b"schedule-routes-secret";
const OWNER: i32 = 1;

fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, 0, 0))
        .expect("timestamp should be valid")
}

fn item(id: i32, priority_level: i32, is_completed: bool) -> schedule_item::Model {
    schedule_item::Model {
        id,
        owner_id: OWNER,
        due_at: at(2024, 3, 5, 9),
        created_at: at(2024, 3, 1, 8),
        title: format!("item {id}"),
        content: "notes".to_string(),
        priority_level,
        category: "work".to_string(),
        is_completed,
    }
}

fn windowed(model: &schedule_item::Model, total: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([
        ("id", Value::from(model.id)),
        ("owner_id", Value::from(model.owner_id)),
        ("due_at", Value::from(model.due_at)),
        ("created_at", Value::from(model.created_at)),
        ("title", Value::from(model.title.clone())),
        ("content", Value::from(model.content.clone())),
        ("priority_level", Value::from(model.priority_level)),
        ("category", Value::from(model.category.clone())),
        ("is_completed", Value::from(model.is_completed)),
        ("total_count", Value::from(total)),
    ])
}

fn rows_affected(n: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: n,
    }
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn get(path: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(api_path(path))
        .header("authorization", bearer_for(SECRET, OWNER))
        .body(Body::empty())
        .unwrap()
}

fn send(method: &str, path: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(api_path(path))
        .header("authorization", bearer_for(SECRET, OWNER));
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_response(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("request should succeed");
    let status = response.status();
    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("body should be json");
    (status, json)
}

#[tokio::test]
async fn health_is_public() {
    let (status, json) = json_response(
        test_router(SECRET, empty_db()),
        Request::builder()
            .uri(api_path("/health"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["ok"], true);
}

#[tokio::test]
async fn schedule_requires_bearer_token() {
    let (status, json) = json_response(
        test_router(SECRET, empty_db()),
        Request::builder()
            .uri(api_path("/schedule/all"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Missing/invalid Authorization header");
}

#[tokio::test]
async fn token_subject_must_be_owner_id() {
    let now = now_unix();
    let claims = Claims {
        sub: "alice@example.com".to_string(),
        iat: now,
        exp: now + 600,
    };
    let token = encode_token(&JwtKeys::from_secret(SECRET), &claims).expect("encode token");

    let (status, json) = json_response(
        test_router(SECRET, empty_db()),
        Request::builder()
            .uri(api_path("/schedule/all"))
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Token subject is not an owner id");
}

#[tokio::test]
async fn rejects_token_signed_with_other_secret() {
    let (status, _) = json_response(
        test_router(SECRET, empty_db()),
        Request::builder()
            .uri(api_path("/schedule/all"))
            .header("authorization", bearer_for(b"someone-else", OWNER))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_sort_direction_is_bad_request() {
    let (status, json) = json_response(
        test_router(SECRET, empty_db()),
        get("/schedule?date=2024-03-05&sortByPriority=sideways"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert!(json["message"].as_str().unwrap_or_default().contains("sideways"));
}

#[tokio::test]
async fn zero_page_is_rejected_without_touching_db() {
    let (status, json) =
        json_response(test_router(SECRET, empty_db()), get("/schedule/all?page=0")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid pagination: page=0 page_size=10");
}

#[tokio::test]
async fn page_beyond_sql_offset_range_is_bad_request() {
    let (status, json) = json_response(
        test_router(SECRET, empty_db()),
        get("/schedule/all?page=1000000000000000000&pageSize=10"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["message"],
        "Invalid pagination: page=1000000000000000000 page_size=10"
    );
}

#[tokio::test]
async fn day_view_pages_with_total_and_clamped_size() {
    let a = item(1, 1, false);
    let b = item(2, 2, false);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![windowed(&b, 2), windowed(&a, 2)]])
        .into_connection();

    let (status, json) = json_response(
        test_router(SECRET, db),
        get("/schedule?date=2024-03-05&sortByPriority=DESC&pageSize=500"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["pageSize"], 100);
    assert_eq!(json["data"]["totalCount"], 2);
    assert_eq!(json["data"]["hasNext"], false);
    assert_eq!(json["data"]["data"][0]["id"], 2);
    assert_eq!(json["data"]["data"][1]["priorityLevel"], 1);
}

#[tokio::test]
async fn create_returns_created_item() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[item(11, 3, false)]])
        .into_connection();

    let (status, json) = json_response(
        test_router(SECRET, db),
        send(
            "POST",
            "/schedule",
            Some(json!({
                "dueAt": "2024-03-05T09:00:00",
                "title": "item 11",
                "content": "notes",
                "priorityLevel": 3,
                "category": "work"
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["message"], "created");
    assert_eq!(json["data"]["id"], 11);
    assert_eq!(json["data"]["dueAt"], "2024-03-05T09:00:00");
    assert_eq!(json["data"]["isCompleted"], false);
}

#[tokio::test]
async fn create_with_blank_title_is_bad_request() {
    let (status, json) = json_response(
        test_router(SECRET, empty_db()),
        send(
            "POST",
            "/schedule",
            Some(json!({ "dueAt": "2024-03-05T09:00:00", "title": "   " })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Title required");
}

#[tokio::test]
async fn get_missing_item_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<schedule_item::Model>::new()])
        .into_connection();

    let (status, json) = json_response(test_router(SECRET, db), get("/schedule/42")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Schedule item not found (id=42)");
}

#[tokio::test]
async fn completing_twice_conflicts() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([rows_affected(1), rows_affected(0)])
        .append_query_results([[item(5, 1, true)]])
        .into_connection();
    let app = test_router(SECRET, db);

    let (status, json) =
        json_response(app.clone(), send("PUT", "/schedule/5/complete", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "completed");

    let (status, json) = json_response(app, send("PUT", "/schedule/5/complete", None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["message"], "Schedule item is already completed (id=5)");
}

#[tokio::test]
async fn uncomplete_on_missing_item_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([rows_affected(0)])
        .append_query_results([Vec::<schedule_item::Model>::new()])
        .into_connection();

    let (status, _) = json_response(
        test_router(SECRET, db),
        send("PUT", "/schedule/9/uncomplete", None),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_foreign_item_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([rows_affected(0)])
        .into_connection();

    let (status, _) =
        json_response(test_router(SECRET, db), send("DELETE", "/schedule/5", None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_keeps_fields_not_sent() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[item(5, 2, false)]])
        .append_exec_results([rows_affected(1)])
        .into_connection();

    let (status, json) = json_response(
        test_router(SECRET, db),
        send("PUT", "/schedule/5", Some(json!({ "title": "renamed" }))),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["title"], "renamed");
    assert_eq!(json["data"]["priorityLevel"], 2);
    assert_eq!(json["data"]["content"], "notes");
}

#[tokio::test]
async fn search_excluding_completed_filters_on_completion() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![windowed(&item(1, 1, false), 1)]])
        .into_connection();

    let (status, json) = json_response(
        test_router(SECRET, db.clone()),
        get("/schedule/search?keyword=item&includeCompleted=false&searchType=title"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["totalCount"], 1);

    let log = format!("{:?}", db.into_transaction_log());
    assert!(log.contains("is_completed"), "unexpected sql: {log}");
    assert!(log.contains("LIKE"), "unexpected sql: {log}");
}

#[tokio::test]
async fn daily_stats_reports_status_string() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![BTreeMap::from([
            ("completed_count", Value::from(1i64)),
            ("total_count", Value::from(2i64)),
        ])]])
        .into_connection();

    let (status, json) = json_response(
        test_router(SECRET, db),
        get("/schedule/daily-stats?date=2024-03-05"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["date"], "2024-03-05");
    assert_eq!(json["data"]["completed"], 1);
    assert_eq!(json["data"]["total"], 2);
    assert_eq!(json["data"]["status"], "1/2");
}

#[tokio::test]
async fn monthly_stats_rejects_month_thirteen() {
    let (status, _) = json_response(
        test_router(SECRET, empty_db()),
        get("/schedule/monthly-stats?year=2024&month=13"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn inverted_range_is_bad_request() {
    let (status, _) = json_response(
        test_router(SECRET, empty_db()),
        get("/schedule/range?start=2024-03-09T00:00:00&end=2024-03-01T00:00:00"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
