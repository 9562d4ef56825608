// ABOUTME: Integration tests for the WHOOP client's 401 refresh-and-retry behavior
// ABOUTME: Uses a mock HTTP server to verify token lifecycle and error classification
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use mockito::{Matcher, Server};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use whoop_mcp_server::config::{WhoopApiConfig, WhoopCredentialsConfig};
use whoop_mcp_server::errors::AppError;
use whoop_mcp_server::oauth::TokenManager;
use whoop_mcp_server::providers::{QueryWindow, WhoopClient};

const OLD_TOKEN: &str = "old-access-token";
const NEW_TOKEN: &str = "new-access-token";
const REFRESH_TOKEN: &str = "long-lived-refresh-token";

fn credentials() -> WhoopCredentialsConfig {
    WhoopCredentialsConfig {
        client_id: Some("client-id".into()),
        client_secret: Some("client-secret".into()),
        access_token: OLD_TOKEN.into(),
        refresh_token: Some(REFRESH_TOKEN.into()),
    }
}

fn client_for(server: &Server, credentials: WhoopCredentialsConfig) -> (WhoopClient, Arc<TokenManager>) {
    let api = WhoopApiConfig {
        base_url: server.url(),
        auth_url: format!("{}/oauth2/auth", server.url()),
        token_url: format!("{}/oauth2/token", server.url()),
    };
    let tokens = Arc::new(TokenManager::new(
        credentials,
        api.token_url.clone(),
        reqwest::Client::new(),
    ));
    (WhoopClient::new(&api, tokens.clone()), tokens)
}

fn window() -> QueryWindow {
    QueryWindow::from_range(
        "2024-01-01T00:00:00.000Z",
        "2024-01-31T00:00:00.000Z",
        Some(10),
    )
    .unwrap()
}

fn bearer(token: &str) -> Matcher {
    Matcher::Exact(format!("Bearer {token}"))
}

#[tokio::test]
async fn test_401_triggers_refresh_and_single_retry() {
    let mut server = Server::new_async().await;
    let (client, tokens) = client_for(&server, credentials());

    let rejected = server
        .mock("GET", "/cycle")
        .match_query(Matcher::Any)
        .match_header("authorization", bearer(OLD_TOKEN))
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/oauth2/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            Matcher::UrlEncoded("refresh_token".into(), REFRESH_TOKEN.into()),
            Matcher::UrlEncoded("client_id".into(), "client-id".into()),
        ]))
        .with_status(200)
        .with_body(format!(
            r#"{{"access_token":"{NEW_TOKEN}","expires_in":3600}}"#
        ))
        .expect(1)
        .create_async()
        .await;
    let retried = server
        .mock("GET", "/cycle")
        .match_query(Matcher::Any)
        .match_header("authorization", bearer(NEW_TOKEN))
        .with_status(200)
        .with_body(r#"{"records":[{"id":42}]}"#)
        .expect(1)
        .create_async()
        .await;

    let payload = client.get_cycles(&window()).await.unwrap();
    assert_eq!(payload["records"][0]["id"], 42);

    // Store updated in place; refresh token survives a response that omits it.
    assert_eq!(tokens.access_token().await, NEW_TOKEN);
    assert!(tokens.has_refresh_token().await);

    rejected.assert_async().await;
    refresh.assert_async().await;
    retried.assert_async().await;
}

#[tokio::test]
async fn test_retained_refresh_token_is_reused_on_next_refresh() {
    let mut server = Server::new_async().await;
    let (_client, tokens) = client_for(&server, credentials());

    // Every response omits refresh_token, so each exchange must present
    // the original long-lived refresh token again.
    let calls = Arc::new(AtomicUsize::new(0));
    let refresh = server
        .mock("POST", "/oauth2/token")
        .match_body(Matcher::UrlEncoded(
            "refresh_token".into(),
            REFRESH_TOKEN.into(),
        ))
        .with_status(200)
        .with_body_from_request({
            let calls = calls.clone();
            move |_| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                format!(r#"{{"access_token":"token-{n}"}}"#).into_bytes()
            }
        })
        .expect(2)
        .create_async()
        .await;

    let first = tokens.refresh_access_token(OLD_TOKEN).await.unwrap();
    assert_eq!(first, "token-0");
    assert!(tokens.has_refresh_token().await);

    let second = tokens.refresh_access_token(&first).await.unwrap();
    assert_eq!(second, "token-1");

    refresh.assert_async().await;
}

#[tokio::test]
async fn test_second_401_after_refresh_is_terminal() {
    let mut server = Server::new_async().await;
    let (client, _tokens) = client_for(&server, credentials());

    // Both the original call and the retry are rejected.
    let rejected = server
        .mock("GET", "/cycle")
        .match_query(Matcher::Any)
        .with_status(401)
        .expect(2)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/oauth2/token")
        .with_status(200)
        .with_body(format!(r#"{{"access_token":"{NEW_TOKEN}"}}"#))
        .expect(1)
        .create_async()
        .await;

    let err = client.get_cycles(&window()).await.unwrap_err();
    assert_eq!(err.code(), "AUTHENTICATION_ERROR");
    assert!(err.to_string().contains("whoop-auth-setup"));

    // Exactly one refresh, exactly one retry. No loop.
    rejected.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn test_failed_refresh_surfaces_authentication_error_without_retry() {
    let mut server = Server::new_async().await;
    let (client, tokens) = client_for(&server, credentials());

    let rejected = server
        .mock("GET", "/activity/workout")
        .match_query(Matcher::Any)
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/oauth2/token")
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = client.get_workouts(&window()).await.unwrap_err();
    assert_eq!(err.code(), "AUTHENTICATION_ERROR");
    assert!(err.to_string().contains("whoop-auth-setup"));

    // A failed refresh leaves the stored credentials untouched.
    assert_eq!(tokens.access_token().await, OLD_TOKEN);

    rejected.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn test_refresh_without_refresh_token_fails_before_token_endpoint() {
    let mut server = Server::new_async().await;
    let (client, _tokens) = client_for(
        &server,
        WhoopCredentialsConfig {
            refresh_token: None,
            ..credentials()
        },
    );

    server
        .mock("GET", "/cycle")
        .match_query(Matcher::Any)
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/oauth2/token")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let err = client.get_cycles(&window()).await.unwrap_err();
    assert_eq!(err.code(), "AUTHENTICATION_ERROR");

    refresh.assert_async().await;
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let mut server = Server::new_async().await;
    let (client, tokens) = client_for(&server, credentials());
    let client = Arc::new(client);

    // Timing dependent: a caller may read the stale token and hit 401, or
    // arrive after the winner refreshed and succeed directly.
    server
        .mock("GET", "/cycle")
        .match_query(Matcher::Any)
        .match_header("authorization", bearer(OLD_TOKEN))
        .with_status(401)
        .expect_at_least(1)
        .expect_at_most(2)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/oauth2/token")
        .with_status(200)
        .with_body(format!(r#"{{"access_token":"{NEW_TOKEN}"}}"#))
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/cycle")
        .match_query(Matcher::Any)
        .match_header("authorization", bearer(NEW_TOKEN))
        .with_status(200)
        .with_body(r#"{"records":[]}"#)
        .expect(2)
        .create_async()
        .await;

    let first = {
        let client = client.clone();
        tokio::spawn(async move { client.get_cycles(&window()).await })
    };
    let second = {
        let client = client.clone();
        tokio::spawn(async move { client.get_cycles(&window()).await })
    };

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    assert_eq!(tokens.access_token().await, NEW_TOKEN);
    // The loser of the refresh race reuses the winner's token instead of
    // exchanging the refresh token a second time.
    refresh.assert_async().await;
}

#[tokio::test]
async fn test_429_preserves_retry_after_and_is_not_retried() {
    let mut server = Server::new_async().await;
    let (client, _tokens) = client_for(&server, credentials());

    let limited = server
        .mock("GET", "/recovery")
        .match_query(Matcher::Any)
        .with_status(429)
        .with_header("Retry-After", "120")
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/oauth2/token")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let err = client.get_recovery(&window()).await.unwrap_err();
    match err {
        AppError::RateLimit { retry_after_secs } => {
            assert_eq!(retry_after_secs, Some(120));
        }
        other => panic!("expected RateLimit, got {other:?}"),
    }

    limited.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn test_upstream_error_carries_status_and_body() {
    let mut server = Server::new_async().await;
    let (client, _tokens) = client_for(&server, credentials());

    server
        .mock("GET", "/user/profile/basic")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("upstream maintenance")
        .create_async()
        .await;

    let err = client.get_user_profile().await.unwrap_err();
    match err {
        AppError::Upstream { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "upstream maintenance");
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_api_is_a_network_error() {
    let api = WhoopApiConfig {
        base_url: "http://127.0.0.1:1".into(),
        auth_url: "http://127.0.0.1:1/auth".into(),
        token_url: "http://127.0.0.1:1/token".into(),
    };
    let tokens = Arc::new(TokenManager::new(
        credentials(),
        api.token_url.clone(),
        reqwest::Client::new(),
    ));
    let client = WhoopClient::new(&api, tokens);

    let err = client.get_body_measurements().await.unwrap_err();
    assert_eq!(err.code(), "NETWORK_ERROR");
}
