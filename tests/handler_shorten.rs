mod common;

use axum::http::{HeaderValue, StatusCode, header};
use chrono::Duration;
use serde_json::{Value, json};
use uuid::Uuid;

use common::{BASE_URL, spawn_app};

fn code_of(link: &str) -> &str {
    link.strip_prefix(BASE_URL)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap()
}

#[tokio::test]
async fn test_shorten_created() {
    let app = spawn_app();
    let token = app.login_new_user("a@example.com").await;

    let response = app.shorten(&token, "https://example.com/x").await;

    response.assert_status(StatusCode::CREATED);
    let link = response.json::<Value>()["link"].as_str().unwrap().to_string();
    let code = code_of(&link);
    assert_eq!(code.len(), 8);
    assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(app.links.count(), 1);
}

#[tokio::test]
async fn test_shorten_same_url_returns_same_link() {
    let app = spawn_app();
    let token = app.login_new_user("a@example.com").await;

    let first = app.shorten(&token, "https://example.com/x").await;
    let second = app.shorten(&token, "https://example.com/x").await;

    first.assert_status(StatusCode::CREATED);
    second.assert_status(StatusCode::CREATED);
    assert_eq!(first.json::<Value>()["link"], second.json::<Value>()["link"]);
    assert_eq!(app.links.count(), 1);
}

#[tokio::test]
async fn test_shorten_same_url_different_users_get_different_links() {
    let app = spawn_app();
    let alice = app.login_new_user("alice@example.com").await;
    let bob = app.login_new_user("bob@example.com").await;

    let a = app.shorten(&alice, "https://example.com/x").await;
    let b = app.shorten(&bob, "https://example.com/x").await;

    assert_ne!(a.json::<Value>()["link"], b.json::<Value>()["link"]);
    assert_eq!(app.links.count(), 2);
}

#[tokio::test]
async fn test_shorten_concurrent_distinct_urls_get_distinct_codes() {
    let app = spawn_app();
    let token = app.login_new_user("a@example.com").await;

    let (r1, r2, r3, r4) = tokio::join!(
        app.shorten(&token, "https://example.com/1"),
        app.shorten(&token, "https://example.com/2"),
        app.shorten(&token, "https://example.com/3"),
        app.shorten(&token, "https://example.com/4"),
    );

    let mut links: Vec<String> = [r1, r2, r3, r4]
        .iter()
        .map(|r| {
            r.assert_status(StatusCode::CREATED);
            r.json::<Value>()["link"].as_str().unwrap().to_string()
        })
        .collect();
    links.sort();
    links.dedup();

    assert_eq!(links.len(), 4);
}

#[tokio::test]
async fn test_shorten_concurrent_same_url_single_link() {
    let app = spawn_app();
    let token = app.login_new_user("a@example.com").await;

    let (r1, r2, r3) = tokio::join!(
        app.shorten(&token, "https://example.com/x"),
        app.shorten(&token, "https://example.com/x"),
        app.shorten(&token, "https://example.com/x"),
    );

    let l1 = r1.json::<Value>()["link"].clone();
    assert_eq!(l1, r2.json::<Value>()["link"]);
    assert_eq!(l1, r3.json::<Value>()["link"]);
    assert_eq!(app.links.count(), 1);
}

#[tokio::test]
async fn test_shorten_invalid_url_unprocessable() {
    let app = spawn_app();
    let token = app.login_new_user("a@example.com").await;

    for url in ["", "not a url", "ftp://example.com/file", "javascript:alert(1)"] {
        app.shorten(&token, url)
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    assert_eq!(app.links.count(), 0);
}

#[tokio::test]
async fn test_shorten_url_with_control_character_unprocessable() {
    let app = spawn_app();
    let token = app.login_new_user("a@example.com").await;

    let response = app.shorten(&token, "https://example.com/a\u{1}b").await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        response.json::<Value>()["error"]
            .as_str()
            .unwrap()
            .contains("control characters")
    );
    assert_eq!(app.links.count(), 0);
}

#[tokio::test]
async fn test_shorten_without_token_unauthorized() {
    let app = spawn_app();

    let response = app
        .server
        .post("/url/shorten")
        .json(&json!({ "url": "https://example.com/x" }))
        .await;

    response.assert_status_unauthorized();
    assert_eq!(
        response.header(header::WWW_AUTHENTICATE),
        HeaderValue::from_static("Bearer")
    );
}

#[tokio::test]
async fn test_shorten_malformed_header_unauthorized() {
    let app = spawn_app();

    for value in ["Basic abc", "Bearer", "Bearer "] {
        app.server
            .post("/url/shorten")
            .add_header(header::AUTHORIZATION, HeaderValue::from_static(value))
            .json(&json!({ "url": "https://example.com/x" }))
            .await
            .assert_status_unauthorized();
    }
}

#[tokio::test]
async fn test_shorten_garbage_token_unauthorized() {
    let app = spawn_app();

    app.shorten("not.a.jwt", "https://example.com/x")
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_shorten_expired_token_unauthorized() {
    let app = spawn_app();
    let token = app.login_new_user("a@example.com").await;

    app.clock.advance(Duration::minutes(16));

    let response = app.shorten(&token, "https://example.com/x").await;

    response.assert_status_unauthorized();
    response.assert_json(&json!({
        "status": "Unauthorized",
        "error": "invalid or expired login token"
    }));
}

#[tokio::test]
async fn test_shorten_token_for_missing_user_is_internal() {
    let app = spawn_app();
    let token = app.state.token_service.encode(Uuid::new_v4()).unwrap();

    app.shorten(&token, "https://example.com/x")
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}
