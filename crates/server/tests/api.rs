//! End-to-end tests driving the API router against an in-memory database.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use deadpool_sqlite::{Config, Runtime};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use server::{db, routes, AppState};
use tower::ServiceExt;

/// Router backed by a single-connection in-memory database so all requests
/// in a test share one schema
async fn test_app() -> Router {
    let pool = Config::new(":memory:")
        .builder(Runtime::Tokio1)
        .unwrap()
        .max_size(1)
        .build()
        .unwrap();

    let conn = pool.get().await.unwrap();
    conn.interact(|conn| {
        db::run_pragmas(conn)?;
        db::migrate_to_latest(conn)
    })
    .await
    .unwrap()
    .unwrap();
    drop(conn);

    routes::router(AppState { pool })
}

async fn post_form(app: &Router, path: &str, body: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_path(app: &Router, path: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn as_json(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}

/// Registers a user and returns their generated id
async fn register(app: &Router, username: &str) -> String {
    let (status, body) =
        post_form(app, "/api/exercise/new-user", &format!("username={username}")).await;
    assert_eq!(status, StatusCode::OK);
    as_json(&body)["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn create_user_returns_username_and_generated_id() {
    let app = test_app().await;

    let (status, body) = post_form(&app, "/api/exercise/new-user", "username=alice").await;
    assert_eq!(status, StatusCode::OK);

    let user = as_json(&body);
    assert_eq!(user["username"], "alice");

    let id = user["id"].as_str().unwrap();
    assert_eq!(id.len(), 8);
    assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
}

#[tokio::test]
async fn create_user_requires_username() {
    let app = test_app().await;

    let (status, body) = post_form(&app, "/api/exercise/new-user", "username=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Username is required.");

    let (_, body) = get_path(&app, "/api/exercise/users").await;
    assert_eq!(as_json(&body), json!([]));
}

#[tokio::test]
async fn create_user_rejects_duplicates() {
    let app = test_app().await;
    register(&app, "alice").await;

    let (status, body) = post_form(&app, "/api/exercise/new-user", "username=alice").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "alice already exists in database.");

    // The losing registration must not have created a second row
    let (_, body) = get_path(&app, "/api/exercise/users").await;
    assert_eq!(as_json(&body).as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn list_users_returns_registered_pairs() {
    let app = test_app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let (status, body) = get_path(&app, "/api/exercise/users").await;
    assert_eq!(status, StatusCode::OK);

    let users = as_json(&body);
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.contains(&json!({"id": alice, "username": "alice"})));
    assert!(users.contains(&json!({"id": bob, "username": "bob"})));
}

#[tokio::test]
async fn add_exercise_rejects_unknown_user() {
    let app = test_app().await;

    let (status, body) = post_form(
        &app,
        "/api/exercise/add",
        "userId=nobody99&description=run&duration=30",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid userId.");
}

#[tokio::test]
async fn add_exercise_validates_fields_in_order() {
    let app = test_app().await;
    let id = register(&app, "alice").await;

    let (status, body) =
        post_form(&app, "/api/exercise/add", &format!("userId={id}&duration=30")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Description required.");

    let (status, body) =
        post_form(&app, "/api/exercise/add", &format!("userId={id}&description=run")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Duration required.");

    let (status, body) = post_form(
        &app,
        "/api/exercise/add",
        &format!("userId={id}&description=run&duration=0"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Duration must be greater than 0.");

    let (status, body) = post_form(
        &app,
        "/api/exercise/add",
        &format!("userId={id}&description=run&duration=-5"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Duration must be greater than 0.");
}

#[tokio::test]
async fn add_exercise_returns_normalized_date() {
    let app = test_app().await;
    let id = register(&app, "alice").await;

    let (status, body) = post_form(
        &app,
        "/api/exercise/add",
        &format!("userId={id}&description=swim&duration=45&date=2023-05-01"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let exercise = as_json(&body);
    assert_eq!(exercise["username"], "alice");
    assert_eq!(exercise["description"], "swim");
    assert_eq!(exercise["duration"], json!(45.0));
    assert_eq!(exercise["date"], "2023-05-01");
    assert!(exercise["id"].is_i64());
}

#[tokio::test]
async fn add_exercise_defaults_to_today() {
    let app = test_app().await;
    let id = register(&app, "alice").await;
    let today = Utc::now().date_naive().to_string();

    let (status, body) = post_form(
        &app,
        "/api/exercise/add",
        &format!("userId={id}&description=run&duration=30"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&body)["date"], today);

    // A date that doesn't even look like yyyy-mm-dd also falls back to today
    let (status, body) = post_form(
        &app,
        "/api/exercise/add",
        &format!("userId={id}&description=run&duration=30&date=yesterday"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&body)["date"], today);
}

#[tokio::test]
async fn add_exercise_rejects_calendar_invalid_date() {
    let app = test_app().await;
    let id = register(&app, "alice").await;

    let (status, body) = post_form(
        &app,
        "/api/exercise/add",
        &format!("userId={id}&description=run&duration=30&date=2023-02-31"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid date.");
}

#[tokio::test]
async fn log_rejects_unknown_user() {
    let app = test_app().await;

    let (status, body) = get_path(&app, "/api/exercise/log?userId=nobody99").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid userId.");
}

#[tokio::test]
async fn log_filters_by_date_range() {
    let app = test_app().await;
    let id = register(&app, "alice").await;

    for date in ["2022-12-31", "2023-06-01"] {
        let (status, _) = post_form(
            &app,
            "/api/exercise/add",
            &format!("userId={id}&description=run&duration=30&date={date}"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = get_path(
        &app,
        &format!("/api/exercise/log?userId={id}&from=2023-01-01&to=2023-12-31"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let log = as_json(&body);
    assert_eq!(log["username"], "alice");
    assert_eq!(log["id"], id.as_str());
    assert_eq!(log["from"], "2023-01-01");
    assert_eq!(log["to"], "2023-12-31");
    assert_eq!(log["count"], 1);
    assert_eq!(
        log["log"],
        json!([{"description": "run", "duration": 30.0, "date": "2023-06-01"}])
    );
}

#[tokio::test]
async fn log_limit_truncates_entries() {
    let app = test_app().await;
    let id = register(&app, "alice").await;

    for day in 1..=4 {
        post_form(
            &app,
            "/api/exercise/add",
            &format!("userId={id}&description=reps&duration=10&date=2023-05-0{day}"),
        )
        .await;
    }

    let (status, body) = get_path(&app, &format!("/api/exercise/log?userId={id}&limit=2")).await;
    assert_eq!(status, StatusCode::OK);

    let log = as_json(&body);
    assert_eq!(log["limit"], 2);
    assert_eq!(log["count"], 2);
    assert_eq!(log["log"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn log_omits_absent_filters() {
    let app = test_app().await;
    let id = register(&app, "alice").await;

    let (status, body) = get_path(&app, &format!("/api/exercise/log?userId={id}")).await;
    assert_eq!(status, StatusCode::OK);

    let log = as_json(&body);
    assert!(log.get("from").is_none());
    assert!(log.get("to").is_none());
    assert!(log.get("limit").is_none());
    assert_eq!(log["count"], 0);
    assert_eq!(log["log"], json!([]));
}

#[tokio::test]
async fn log_ignores_unparseable_bounds() {
    let app = test_app().await;
    let id = register(&app, "alice").await;
    post_form(
        &app,
        "/api/exercise/add",
        &format!("userId={id}&description=run&duration=30&date=2023-06-01"),
    )
    .await;

    let (status, body) =
        get_path(&app, &format!("/api/exercise/log?userId={id}&from=lastweek")).await;
    assert_eq!(status, StatusCode::OK);

    let log = as_json(&body);
    assert!(log.get("from").is_none());
    assert_eq!(log["count"], 1);
}

#[tokio::test]
async fn reads_are_idempotent() {
    let app = test_app().await;
    let id = register(&app, "alice").await;
    post_form(
        &app,
        "/api/exercise/add",
        &format!("userId={id}&description=run&duration=30&date=2023-06-01"),
    )
    .await;

    let (_, users_a) = get_path(&app, "/api/exercise/users").await;
    let (_, users_b) = get_path(&app, "/api/exercise/users").await;
    assert_eq!(as_json(&users_a), as_json(&users_b));

    let log_path = format!("/api/exercise/log?userId={id}");
    let (_, log_a) = get_path(&app, &log_path).await;
    let (_, log_b) = get_path(&app, &log_path).await;
    assert_eq!(as_json(&log_a), as_json(&log_b));
}

#[tokio::test]
async fn supplied_dates_are_format_stable() {
    let app = test_app().await;
    let id = register(&app, "alice").await;

    let (_, body) = post_form(
        &app,
        "/api/exercise/add",
        &format!("userId={id}&description=row&duration=20&date=2023-05-01"),
    )
    .await;
    assert_eq!(as_json(&body)["date"], "2023-05-01");

    let (_, body) = get_path(&app, &format!("/api/exercise/log?userId={id}")).await;
    assert_eq!(as_json(&body)["log"][0]["date"], "2023-05-01");
}
