#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use rollcall::router::init_router;
use rollcall::state::AppState;
use rollcall_config::{CorsConfig, Environment, JwtConfig, ServerConfig};
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "secret1";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        access_token_expiry: 3600,
    }
}

pub fn setup_test_app(pool: PgPool) -> Router {
    let state = AppState {
        db: pool,
        jwt_config: test_jwt_config(),
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
        server_config: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: Environment::Development,
        },
    };
    init_router(state)
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

/// Sends one request and returns the status with the JSON body (`Null` when empty).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

pub async fn register(app: &Router, email: &str, role: &str) -> TestUser {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": email, "password": TEST_PASSWORD, "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

    TestUser {
        id: body["user"]["id"].as_str().unwrap().to_string(),
        email: body["user"]["email"].as_str().unwrap().to_string(),
        token: body["token"].as_str().unwrap().to_string(),
    }
}

pub async fn register_admin(app: &Router) -> TestUser {
    register(app, &generate_unique_email(), "admin").await
}

pub async fn register_student(app: &Router) -> TestUser {
    register(app, &generate_unique_email(), "student").await
}

/// Returns the created classroom body.
pub async fn create_classroom(app: &Router, admin: &TestUser, name: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/classrooms",
        Some(&admin.token),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create classroom failed: {}", body);
    body
}

pub async fn join_classroom(app: &Router, user: &TestUser, join_code: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/classrooms/join",
        Some(&user.token),
        Some(json!({ "join_code": join_code })),
    )
    .await
}

/// Creates a classroom owned by `admin` with `student` enrolled; returns its id.
pub async fn classroom_with_student(app: &Router, admin: &TestUser, student: &TestUser) -> String {
    let classroom = create_classroom(app, admin, "Math").await;
    let (status, _) =
        join_classroom(app, student, classroom["join_code"].as_str().unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    classroom["id"].as_str().unwrap().to_string()
}
