//! Web API Comments Tests
//!
//! Covers adding, listing and deleting comments, including the content
//! filter outcomes.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use newsgate::filter::{ContentFilter, WordListFilter};
use newsgate::news::{NewItem, NewsRepository};
use newsgate::web::{create_router, AppState};
use newsgate::{Database, NewsError, Result};

/// Filter whose backend is always unreachable.
struct UnreachableFilter;

#[async_trait]
impl ContentFilter for UnreachableFilter {
    async fn is_allowed(&self, _text: &str) -> Result<bool> {
        Err(NewsError::Filter("connection refused".to_string()))
    }
}

async fn seeded_db() -> Database {
    let db = Database::open_in_memory().await.unwrap();
    let repo = NewsRepository::new(db.pool());
    for i in 1..=2 {
        repo.insert(&NewItem::new(format!("Story {i}"), format!("https://example.com/{i}")))
            .await
            .unwrap();
    }
    db
}

fn server_with_filter(db: &Database, filter: Arc<dyn ContentFilter>) -> TestServer {
    let state = AppState::new(db.pool().clone(), filter, 50);
    let router = create_router(Arc::new(state), &[]);
    TestServer::new(router).expect("Failed to create test server")
}

async fn create_test_server() -> (TestServer, Database) {
    let db = seeded_db().await;
    let server = server_with_filter(&db, Arc::new(WordListFilter::new(["qwerty", "zxvbnm"])));
    (server, db)
}

async fn add(server: &TestServer, body: Value) -> axum_test::TestResponse {
    server.post("/comments/add").json(&body).await
}

// ============================================================================
// POST /comments/add
// ============================================================================

#[tokio::test]
async fn test_add_comment() {
    let (server, _db) = create_test_server().await;

    let response = add(&server, json!({"newsID": 1, "content": "  Great read  "})).await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["ID"], 1);
    assert_eq!(body["newsID"], 1);
    assert_eq!(body["content"], "Great read");
    assert!(body["pubTime"].as_i64().unwrap() > 0);
    assert!(body.get("parentID").is_none());
}

#[tokio::test]
async fn test_add_reply() {
    let (server, _db) = create_test_server().await;

    add(&server, json!({"newsID": 1, "content": "first"}))
        .await
        .assert_status(StatusCode::CREATED);

    let response = add(&server, json!({"newsID": 1, "content": "reply", "parentID": 1})).await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["parentID"], 1);
}

#[tokio::test]
async fn test_add_reply_to_other_news_rejected() {
    let (server, _db) = create_test_server().await;

    add(&server, json!({"newsID": 1, "content": "first"}))
        .await
        .assert_status(StatusCode::CREATED);

    let response = add(&server, json!({"newsID": 2, "content": "reply", "parentID": 1})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_add_reply_to_missing_parent() {
    let (server, _db) = create_test_server().await;

    let response = add(&server, json!({"newsID": 1, "content": "reply", "parentID": 77})).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_comment_forbidden_words() {
    let (server, _db) = create_test_server().await;

    let response = add(&server, json!({"newsID": 1, "content": "well QWERTY then"})).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "CONTENT_REJECTED");
    assert_eq!(body["error"]["message"], "Comment contains forbidden words");

    let comments: Value = server
        .get("/comments")
        .add_query_param("news_id", 1)
        .await
        .json();
    assert!(comments.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_add_comment_filter_unavailable() {
    let db = seeded_db().await;
    let server = server_with_filter(&db, Arc::new(UnreachableFilter));

    let response = add(&server, json!({"newsID": 1, "content": "harmless"})).await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    assert_eq!(response.json::<Value>()["error"]["code"], "BAD_GATEWAY");

    // Nothing is stored when the filter cannot answer
    let comments: Value = server
        .get("/comments")
        .add_query_param("news_id", 1)
        .await
        .json();
    assert!(comments.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_add_comment_unknown_news() {
    let (server, _db) = create_test_server().await;

    let response = add(&server, json!({"newsID": 42, "content": "hello"})).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_comment_invalid_body() {
    let (server, _db) = create_test_server().await;

    let response = add(&server, json!({"newsID": 0, "content": ""})).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["news_id"].is_array());
    assert!(body["error"]["details"]["content"].is_array());

    let response = server
        .post("/comments/add")
        .text("not json")
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_comment_too_long() {
    let (server, _db) = create_test_server().await;

    let response = add(&server, json!({"newsID": 1, "content": "x".repeat(51)})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_add_comment_whitespace_only() {
    let (server, _db) = create_test_server().await;

    let response = add(&server, json!({"newsID": 1, "content": "   "})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// GET /comments and /news/detailed
// ============================================================================

#[tokio::test]
async fn test_list_comments_oldest_first() {
    let (server, _db) = create_test_server().await;

    for text in ["one", "two", "three"] {
        add(&server, json!({"newsID": 1, "content": text}))
            .await
            .assert_status(StatusCode::CREATED);
    }
    add(&server, json!({"newsID": 2, "content": "elsewhere"}))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.get("/comments").add_query_param("news_id", 1).await;
    response.assert_status_ok();

    let body: Value = response.json();
    let contents: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn test_list_comments_bad_news_id() {
    let (server, _db) = create_test_server().await;

    server
        .get("/comments")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/comments")
        .add_query_param("news_id", "x")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_detail_includes_comments() {
    let (server, _db) = create_test_server().await;

    add(&server, json!({"newsID": 2, "content": "on two"}))
        .await
        .assert_status(StatusCode::CREATED);

    let body: Value = server
        .get("/news/detailed")
        .add_query_param("id", 2)
        .await
        .json();
    assert_eq!(body["news"]["Title"], "Story 2");
    assert_eq!(body["comments"][0]["content"], "on two");
}

// ============================================================================
// DELETE /comments/del
// ============================================================================

#[tokio::test]
async fn test_delete_comment_cascades_to_replies() {
    let (server, _db) = create_test_server().await;

    add(&server, json!({"newsID": 1, "content": "parent"}))
        .await
        .assert_status(StatusCode::CREATED);
    add(&server, json!({"newsID": 1, "content": "child", "parentID": 1}))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.delete("/comments/del").json(&json!({"ID": 1})).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["ID"], 1);
    assert_eq!(body["deleted"], true);

    let comments: Value = server
        .get("/comments")
        .add_query_param("news_id", 1)
        .await
        .json();
    assert!(comments.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_missing_comment() {
    let (server, _db) = create_test_server().await;

    let response = server.delete("/comments/del").json(&json!({"ID": 9})).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_invalid_id() {
    let (server, _db) = create_test_server().await;

    let response = server.delete("/comments/del").json(&json!({"ID": 0})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
