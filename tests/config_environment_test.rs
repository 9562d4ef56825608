// ABOUTME: Integration tests for environment-based server configuration
// ABOUTME: Verifies fail-fast validation, endpoint overrides, and the startup summary
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use serial_test::serial;
use std::env;
use whoop_mcp_server::config::ServerConfig;

const ALL_VARS: &[&str] = &[
    "WHOOP_CLIENT_ID",
    "WHOOP_CLIENT_SECRET",
    "WHOOP_ACCESS_TOKEN",
    "WHOOP_REFRESH_TOKEN",
    "WHOOP_API_BASE_URL",
    "WHOOP_TOKEN_URL",
];

fn clear_env() {
    for var in ALL_VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_missing_access_token_fails_startup() {
    clear_env();

    let err = ServerConfig::from_env().unwrap_err();
    assert_eq!(err.code(), "CONFIGURATION_ERROR");
    assert!(err.to_string().contains("WHOOP_ACCESS_TOKEN"));
    assert!(err.to_string().contains("whoop-auth-setup"));
}

#[test]
#[serial]
fn test_empty_access_token_is_treated_as_unset() {
    clear_env();
    env::set_var("WHOOP_ACCESS_TOKEN", "   ");

    assert!(ServerConfig::from_env().is_err());
}

#[test]
#[serial]
fn test_access_token_alone_is_sufficient() {
    clear_env();
    env::set_var("WHOOP_ACCESS_TOKEN", "token");

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.credentials.access_token, "token");
    assert!(config.credentials.client_id.is_none());
    assert!(config.credentials.refresh_token.is_none());
    assert_eq!(
        config.api.base_url,
        "https://api.prod.whoop.com/developer/v2"
    );
}

#[test]
#[serial]
fn test_full_credential_set_is_loaded() {
    clear_env();
    env::set_var("WHOOP_CLIENT_ID", "id");
    env::set_var("WHOOP_CLIENT_SECRET", "secret");
    env::set_var("WHOOP_ACCESS_TOKEN", "access");
    env::set_var("WHOOP_REFRESH_TOKEN", "refresh");

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.credentials.client_id.as_deref(), Some("id"));
    assert_eq!(config.credentials.client_secret.as_deref(), Some("secret"));
    assert_eq!(config.credentials.refresh_token.as_deref(), Some("refresh"));
}

#[test]
#[serial]
fn test_endpoint_overrides_apply() {
    clear_env();
    env::set_var("WHOOP_ACCESS_TOKEN", "token");
    env::set_var("WHOOP_API_BASE_URL", "http://localhost:9000");
    env::set_var("WHOOP_TOKEN_URL", "http://localhost:9000/token");

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.api.base_url, "http://localhost:9000");
    assert_eq!(config.api.token_url, "http://localhost:9000/token");
}

#[test]
#[serial]
fn test_summary_contains_no_token_material() {
    clear_env();
    env::set_var("WHOOP_CLIENT_ID", "client-abc");
    env::set_var("WHOOP_ACCESS_TOKEN", "secret-access-token");
    env::set_var("WHOOP_REFRESH_TOKEN", "secret-refresh-token");

    let summary = ServerConfig::from_env().unwrap().summary();
    assert!(summary.contains("client-abc"));
    assert!(summary.contains("refresh_token=present"));
    assert!(!summary.contains("secret-access-token"));
    assert!(!summary.contains("secret-refresh-token"));
}
