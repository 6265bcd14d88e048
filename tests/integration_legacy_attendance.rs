mod common;

use axum::http::StatusCode;
use common::{classroom_with_student, register_admin, register_student, send, setup_test_app};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_legacy_marks_are_listed_newest_first(pool: PgPool) {
    let app = setup_test_app(pool);
    let admin = register_admin(&app).await;
    let student = register_student(&app).await;
    let classroom_id = classroom_with_student(&app, &admin, &student).await;
    let mark_uri = format!("/api/attendance/classroom/{}/mark", classroom_id);

    let (status, first) = send(
        &app,
        "POST",
        &mark_uri,
        Some(&student.token),
        Some(json!({ "status": "absent" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["status"], "absent");
    assert_eq!(first["email"], student.email.as_str());

    let (status, _) = send(
        &app,
        "POST",
        &mark_uri,
        Some(&student.token),
        Some(json!({ "status": "present" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, marks) = send(
        &app,
        "GET",
        &format!("/api/attendance/classroom/{}", classroom_id),
        Some(&admin.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let marks = marks.as_array().unwrap();
    assert_eq!(marks.len(), 2);
    assert_eq!(marks[0]["status"], "present");
    assert_eq!(marks[1]["status"], "absent");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_legacy_requires_membership(pool: PgPool) {
    let app = setup_test_app(pool);
    let admin = register_admin(&app).await;
    let student = register_student(&app).await;
    let outsider = register_student(&app).await;
    let classroom_id = classroom_with_student(&app, &admin, &student).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/attendance/classroom/{}/mark", classroom_id),
        Some(&outsider.token),
        Some(json!({ "status": "present" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/attendance/classroom/{}", classroom_id),
        Some(&outsider.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_legacy_rejects_unknown_status(pool: PgPool) {
    let app = setup_test_app(pool);
    let admin = register_admin(&app).await;
    let student = register_student(&app).await;
    let classroom_id = classroom_with_student(&app, &admin, &student).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/attendance/classroom/{}/mark", classroom_id),
        Some(&student.token),
        Some(json!({ "status": "excused" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid value in request");
}
