mod common;

use axum::http::StatusCode;
use common::{error_code, TestApp};
use serde_json::{json, Value};

#[tokio::test]
async fn create_and_get_student() {
    let app = TestApp::new();

    let (status, created) = app
        .post("/api/v1/students/", json!({ "name": "Ada", "birth_date": "2004-05-06" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["birth_date"], "2004-05-06");

    let (status, fetched) = app.get(&format!("/api/v1/students/{}/", created["id"])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn list_and_filter_students() {
    let app = TestApp::new();
    let students = app.student_factory(4).await;

    let (status, all) = app.get("/api/v1/students/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 4);

    let (_, one) = app.get(&format!("/api/v1/students/?name={}", students[1].name)).await;
    assert_eq!(one.as_array().unwrap().len(), 1);
    assert_eq!(one[0]["id"], students[1].id);
}

#[tokio::test]
async fn invalid_birth_date_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/v1/students/", json!({ "name": "Ada", "birth_date": "06/05/2004" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "validation_error");
}

#[tokio::test]
async fn patch_clears_birth_date_and_keeps_name() {
    let app = TestApp::new();
    let (_, created) = app
        .post("/api/v1/students/", json!({ "name": "Ada", "birth_date": "2004-05-06" }))
        .await;
    let uri = format!("/api/v1/students/{}/", created["id"]);

    let (status, patched) = app.patch(&uri, json!({ "birth_date": null })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["name"], "Ada");
    assert_eq!(patched["birth_date"], Value::Null);
}

#[tokio::test]
async fn put_keeps_omitted_birth_date() {
    let app = TestApp::new();
    let (_, created) = app
        .post("/api/v1/students/", json!({ "name": "Ada", "birth_date": "2004-05-06" }))
        .await;
    let uri = format!("/api/v1/students/{}/", created["id"]);

    let (status, updated) = app.put(&uri, json!({ "name": "Ada L." })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Ada L.");
    assert_eq!(updated["birth_date"], "2004-05-06");
}

#[tokio::test]
async fn deleting_student_removes_enrollment() {
    let app = TestApp::new();
    let students = app.student_factory(2).await;
    let (_, course) = app
        .post(
            "/api/v1/courses/",
            json!({ "name": "History", "students": [students[0].id, students[1].id] }),
        )
        .await;

    let (status, _) = app.delete(&format!("/api/v1/students/{}/", students[0].id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, course) = app.get(&format!("/api/v1/courses/{}/", course["id"])).await;
    assert_eq!(course["students"], json!([students[1].id]));

    let (status, _) = app.get(&format!("/api/v1/students/{}/", students[0].id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_course_keeps_students() {
    let app = TestApp::new();
    let students = app.student_factory(1).await;
    let (_, course) = app
        .post("/api/v1/courses/", json!({ "name": "Art", "students": [students[0].id] }))
        .await;

    app.delete(&format!("/api/v1/courses/{}/", course["id"])).await;

    let (status, _) = app.get(&format!("/api/v1/students/{}/", students[0].id)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn student_id_collision_conflicts() {
    let app = TestApp::new();
    let students = app.student_factory(1).await;

    let (status, _) = app
        .post("/api/v1/students/", json!({ "id": students[0].id, "name": "Twin" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn health_version_and_ready() {
    let app = TestApp::new();

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (status, body) = app.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "ok");

    let (status, body) = app.get("/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "course-api");
}

#[tokio::test]
async fn student_id_above_range_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/v1/students/", json!({ "id": i64::MAX, "name": "Max" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "validation_error");
}
