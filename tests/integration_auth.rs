mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{TEST_PASSWORD, generate_unique_email, register, send, setup_test_app};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "./migrations")]
async fn test_register_student_returns_token(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "  S@X.com ",
            "password": TEST_PASSWORD,
            "role": "student",
            "studentId": "S-42"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["email"], "s@x.com");
    assert_eq!(body["user"]["role"], "student");
    assert_eq!(body["user"]["student_id"], "S-42");
    assert!(body["user"].get("password").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_duplicate_email(pool: PgPool) {
    let app = setup_test_app(pool);
    let email = generate_unique_email();
    register(&app, &email, "student").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": email, "password": TEST_PASSWORD, "role": "admin" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already registered");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_validation_errors(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": "not-an-email", "password": TEST_PASSWORD, "role": "student" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": generate_unique_email(), "password": "123", "role": "student" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": generate_unique_email(), "password": TEST_PASSWORD, "role": "teacher" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_rejects_overlong_student_id(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": generate_unique_email(),
            "password": TEST_PASSWORD,
            "role": "student",
            "studentId": "A".repeat(65)
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Student id must be at most 64 characters");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_success(pool: PgPool) {
    let app = setup_test_app(pool);
    let email = generate_unique_email();
    register(&app, &email, "admin").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": TEST_PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["email"], email);
    assert_eq!(body["user"]["role"], "admin");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_failures_do_not_reveal_email(pool: PgPool) {
    let app = setup_test_app(pool);
    let email = generate_unique_email();
    register(&app, &email, "student").await;

    let (wrong_password_status, wrong_password) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "wrongpassword" })),
    )
    .await;

    let (unknown_status, unknown) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@test.com", "password": TEST_PASSWORD })),
    )
    .await;

    assert_eq!(wrong_password_status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_password["message"], "Invalid email or password");
    assert_eq!(unknown_status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown, wrong_password);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_missing_password(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "test@test.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "password is required");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_without_content_type(pool: PgPool) {
    let app = setup_test_app(pool);

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .body(Body::from(r#"{"email":"a@b.com","password":"secret1"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_requires_token(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, body) = send(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication required");

    let (status, body) = send(&app, "GET", "/api/auth/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_returns_current_user(pool: PgPool) {
    let app = setup_test_app(pool);
    let user = register(&app, &generate_unique_email(), "student").await;

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&user.token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user.id.as_str());
    assert_eq!(body["email"], user.email.as_str());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_health(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, body) = send(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
