//! End-to-end checks of the HTTP surface against a real SQLite file.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use db::test_utils::create_test_db;
use serde_json::{Value, json};
use server::{AppState, ServerConfig, routes};
use tempfile::TempDir;
use tower::ServiceExt;

async fn test_app() -> (Router, TempDir) {
    let (db, temp_dir) = create_test_db().await;
    let secret = STANDARD.encode([3u8; 32]);
    let config = ServerConfig::from_source(|key| match key {
        "TASKBOARD_JWT_SECRET" => Some(secret.clone()),
        "TASKBOARD_DATABASE_URL" => Some("sqlite::memory:".to_string()),
        _ => None,
    })
    .expect("test config");

    (routes::router(AppState::new(db, config)), temp_dir)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": email, "name": "Tester", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["token"].as_str().unwrap().to_string()
}

async fn create(app: &Router, token: &str, uri: &str, body: Value) -> Value {
    let (status, body) = send(app, Method::POST, uri, Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

fn titles(items: &Value) -> Vec<(String, i64)> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| {
            (
                item["title"].as_str().unwrap().to_string(),
                item["position"].as_i64().unwrap(),
            )
        })
        .collect()
}

fn expected(pairs: &[(&str, i64)]) -> Vec<(String, i64)> {
    pairs.iter().map(|(t, p)| (t.to_string(), *p)).collect()
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _temp_dir) = test_app().await;

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["databaseReady"], true);
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (app, _temp_dir) = test_app().await;

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_protected_routes_require_a_valid_token() {
    let (app, _temp_dir) = test_app().await;

    let (status, body) = send(&app, Method::GET, "/boards", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = send(&app, Method::GET, "/boards", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_login_and_me() {
    let (app, _temp_dir) = test_app().await;
    let token = register(&app, "ada@example.com").await;

    let (status, me) = send(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "ada@example.com");
    assert!(me.get("passwordHash").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "ADA@example.com", "name": "Ada", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, session) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["user"]["id"], me["id"]);
    assert!(session["expiresAt"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_ordering_over_http() {
    let (app, _temp_dir) = test_app().await;
    let token = register(&app, "owner@example.com").await;

    let board = create(&app, &token, "/boards", json!({ "title": "Roadmap" })).await;
    let board_id = board["id"].as_i64().unwrap();

    for title in ["A", "B", "C"] {
        create(&app, &token, "/lists", json!({ "title": title, "boardId": board_id })).await;
    }
    let inserted = create(
        &app,
        &token,
        "/lists",
        json!({ "title": "D", "boardId": board_id, "position": 1 }),
    )
    .await;
    assert_eq!(inserted["position"], 1);
    assert_eq!(inserted["boardId"], board_id);

    let (status, lists) = send(
        &app,
        Method::GET,
        &format!("/boards/{board_id}/lists"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        titles(&lists),
        expected(&[("A", 0), ("D", 1), ("B", 2), ("C", 3)])
    );

    let a_id = lists[0]["id"].as_i64().unwrap();
    let (status, moved) = send(
        &app,
        Method::PUT,
        &format!("/lists/{a_id}"),
        Some(&token),
        Some(json!({ "position": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["position"], 2);

    let b_id = lists[2]["id"].as_i64().unwrap();
    let (status, deleted) = send(
        &app,
        Method::DELETE,
        &format!("/lists/{b_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({ "id": b_id, "deleted": true }));

    let (_, lists) = send(
        &app,
        Method::GET,
        &format!("/boards/{board_id}/lists"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(titles(&lists), expected(&[("D", 0), ("A", 1), ("C", 2)]));
}

#[tokio::test]
async fn test_card_move_across_lists_and_board_detail() {
    let (app, _temp_dir) = test_app().await;
    let token = register(&app, "owner@example.com").await;

    let board = create(&app, &token, "/boards", json!({ "title": "Roadmap" })).await;
    let board_id = board["id"].as_i64().unwrap();
    let source = create(&app, &token, "/lists", json!({ "title": "Source", "boardId": board_id })).await;
    let dest = create(&app, &token, "/lists", json!({ "title": "Dest", "boardId": board_id })).await;
    let source_id = source["id"].as_i64().unwrap();
    let dest_id = dest["id"].as_i64().unwrap();

    let a = create(&app, &token, "/cards", json!({ "title": "A", "listId": source_id, "description": "first" })).await;
    create(&app, &token, "/cards", json!({ "title": "B", "listId": source_id })).await;
    create(&app, &token, "/cards", json!({ "title": "X", "listId": dest_id })).await;
    create(&app, &token, "/cards", json!({ "title": "Y", "listId": dest_id })).await;
    assert_eq!(a["description"], "first");

    let a_id = a["id"].as_i64().unwrap();
    let (status, moved) = send(
        &app,
        Method::PUT,
        &format!("/cards/{a_id}"),
        Some(&token),
        Some(json!({ "listId": dest_id, "position": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{moved}");
    assert_eq!(moved["listId"], dest_id);
    assert_eq!(moved["position"], 1);

    let (status, detail) = send(
        &app,
        Method::GET,
        &format!("/boards/{board_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["title"], "Roadmap");
    assert_eq!(titles(&detail["lists"][0]["cards"]), expected(&[("B", 0)]));
    assert_eq!(
        titles(&detail["lists"][1]["cards"]),
        expected(&[("X", 0), ("A", 1), ("Y", 2)])
    );

    let (status, cleared) = send(
        &app,
        Method::PUT,
        &format!("/cards/{a_id}"),
        Some(&token),
        Some(json!({ "description": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cleared["description"].is_null());

    let (status, activity) = send(
        &app,
        Method::GET,
        &format!("/boards/{board_id}/activity?limit=2"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let activity = activity.as_array().unwrap();
    assert_eq!(activity.len(), 2);
    assert_eq!(activity[0]["action"], "card_updated");
    assert_eq!(activity[1]["action"], "card_moved");
}

#[tokio::test]
async fn test_foreign_and_missing_resources() {
    let (app, _temp_dir) = test_app().await;
    let owner = register(&app, "owner@example.com").await;
    let intruder = register(&app, "intruder@example.com").await;

    let board = create(&app, &owner, "/boards", json!({ "title": "Private" })).await;
    let board_id = board["id"].as_i64().unwrap();
    let list = create(&app, &owner, "/lists", json!({ "title": "Todo", "boardId": board_id })).await;
    let list_id = list["id"].as_i64().unwrap();
    let card = create(&app, &owner, "/cards", json!({ "title": "Secret", "listId": list_id })).await;
    let card_id = card["id"].as_i64().unwrap();

    for uri in [
        format!("/boards/{board_id}"),
        format!("/lists/{list_id}"),
        format!("/cards/{card_id}"),
        format!("/lists/{list_id}/cards"),
    ] {
        let (status, body) = send(&app, Method::GET, &uri, Some(&intruder), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["error"], "forbidden");
    }

    let (status, _) = send(
        &app,
        Method::POST,
        "/cards",
        Some(&intruder),
        Some(json!({ "title": "Sneaky", "listId": list_id, "position": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, cards) = send(
        &app,
        Method::GET,
        &format!("/lists/{list_id}/cards"),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(titles(&cards), expected(&[("Secret", 0)]));

    let (status, body) = send(&app, Method::GET, "/cards/9999", Some(&owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "card not found");
}

#[tokio::test]
async fn test_bad_input_is_rejected_with_400() {
    let (app, _temp_dir) = test_app().await;
    let token = register(&app, "owner@example.com").await;
    let board = create(&app, &token, "/boards", json!({ "title": "Roadmap" })).await;
    let board_id = board["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/lists",
        Some(&token),
        Some(json!({ "title": "", "boardId": board_id, "position": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation failed");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["title", "position"]);

    let request = Request::post("/boards")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/boards",
        Some(&token),
        Some(json!({ "name": "missing title" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/boards/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, lists) = send(
        &app,
        Method::GET,
        &format!("/boards/{board_id}/lists"),
        Some(&token),
        None,
    )
    .await;
    assert!(lists.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_board_crud() {
    let (app, _temp_dir) = test_app().await;
    let token = register(&app, "owner@example.com").await;

    let board = create(&app, &token, "/boards", json!({ "title": "Draft" })).await;
    let board_id = board["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/boards/{board_id}"),
        Some(&token),
        Some(json!({ "title": "Final" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Final");

    let (status, boards) = send(&app, Method::GET, "/boards", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(boards.as_array().unwrap().len(), 1);

    let (status, deleted) = send(
        &app,
        Method::DELETE,
        &format!("/boards/{board_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted"], true);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/boards/{board_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
