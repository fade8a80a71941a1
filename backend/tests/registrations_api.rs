mod common;

use axum::http::StatusCode;
use common::{TestApp, event_body};
use serde_json::json;

async fn setup() -> (TestApp, i64, i64) {
    let app = TestApp::new().await;
    let (user_id, _) = app.register_and_login("student@example.com").await;
    let event = app
        .create_event(event_body("Freshers Night", "2025-08-20T18:00:00Z"))
        .await;
    let event_id = event["id"].as_i64().unwrap();
    (app, user_id, event_id)
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let (app, user_id, event_id) = setup().await;
    let body = json!({ "user_id": user_id, "event_id": event_id });

    let (first, created) = app.post("/api/registrations", body.clone(), None).await;
    let (second, conflict) = app.post("/api/registrations", body, None).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(created["status"], json!("registered"));
    assert_eq!(created["event_title"], json!("Freshers Night"));
    assert_eq!(created["user_email"], json!("student@example.com"));
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(conflict["code"], json!("already_exists"));
}

#[tokio::test]
async fn test_registration_for_missing_event_is_rejected() {
    let (app, user_id, _) = setup().await;

    let (status, body) = app
        .post(
            "/api/registrations",
            json!({ "user_id": user_id, "event_id": 4242 }),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("validation_error"));
}

#[tokio::test]
async fn test_list_filters_by_user_and_event() {
    let (app, user_id, event_id) = setup().await;
    let (other_user, _) = app.register_and_login("other@example.com").await;
    let other_event = app
        .create_event(event_body("Sports Day", "2025-09-10T08:00:00Z"))
        .await["id"]
        .as_i64()
        .unwrap();

    for (user, event) in [
        (user_id, event_id),
        (user_id, other_event),
        (other_user, event_id),
    ] {
        let (status, _) = app
            .post(
                "/api/registrations",
                json!({ "user_id": user, "event_id": event, "status": "interested" }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, all) = app.get("/api/registrations", None).await;
    assert_eq!(all["total"], json!(3));

    let (_, mine) = app
        .get(&format!("/api/registrations?user={user_id}"), None)
        .await;
    assert_eq!(mine["total"], json!(2));

    let (_, pair) = app
        .get(
            &format!("/api/registrations?user={user_id}&event={other_event}"),
            None,
        )
        .await;
    assert_eq!(pair["total"], json!(1));
    assert_eq!(pair["items"][0]["event_title"], json!("Sports Day"));
    assert_eq!(pair["items"][0]["status"], json!("interested"));

    let (_, paged) = app.get("/api/registrations?limit=2&page=2", None).await;
    assert_eq!(paged["items"].as_array().unwrap().len(), 1);
    assert_eq!(paged["pages"], json!(2));

    let (status, _) = app.get("/api/registrations?user=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_status_update_and_delete() {
    let (app, user_id, event_id) = setup().await;
    let (_, created) = app
        .post(
            "/api/registrations",
            json!({ "user_id": user_id, "event_id": event_id }),
            None,
        )
        .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = app
        .put(
            &format!("/api/registrations/{id}"),
            json!({ "status": "checked-in" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], json!("checked-in"));

    let (status, _) = app
        .put(
            &format!("/api/registrations/{id}"),
            json!({ "status": "teleported" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .put(
            "/api/registrations/999",
            json!({ "status": "interested" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("/api/registrations/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/registrations/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("/api/registrations/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_user_removes_their_registrations() {
    let (app, user_id, event_id) = setup().await;
    let (_, admin) = app.admin("admin@example.com").await;
    app.post(
        "/api/registrations",
        json!({ "user_id": user_id, "event_id": event_id }),
        None,
    )
    .await;

    let (status, _) = app
        .delete(&format!("/api/users/{user_id}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let remaining = app
        .count("SELECT COUNT(*) FROM registrations WHERE user_id = ?", user_id)
        .await;
    assert_eq!(remaining, 0);
}
