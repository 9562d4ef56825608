// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles WHOOP credential variables, endpoint overrides, and fail-fast validation
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Environment-based configuration management
//!
//! Configuration is environment-only: tokens come out of the bootstrap
//! flow as `WHOOP_*` variables and are never persisted by this server.
//! A missing access token is a startup-time configuration error, not a
//! runtime fault — the server refuses to start serving tool calls.

use crate::constants::{env_vars, whoop_api};
use crate::errors::{AppError, AppResult};
use std::env;

/// WHOOP API endpoint configuration
#[derive(Debug, Clone)]
pub struct WhoopApiConfig {
    /// Base URL for developer API requests
    pub base_url: String,
    /// OAuth2 authorization endpoint
    pub auth_url: String,
    /// OAuth2 token endpoint
    pub token_url: String,
}

impl Default for WhoopApiConfig {
    fn default() -> Self {
        Self {
            base_url: whoop_api::API_BASE_URL.into(),
            auth_url: whoop_api::AUTH_URL.into(),
            token_url: whoop_api::TOKEN_URL.into(),
        }
    }
}

/// OAuth2 credential configuration supplied by the environment
///
/// `client_id`/`client_secret` are immutable for the process lifetime.
/// Only the access token is load-bearing at startup; a missing refresh
/// token or client credential surfaces later as an authentication error
/// with re-auth remediation, matching the bootstrap-helper contract.
#[derive(Debug, Clone)]
pub struct WhoopCredentialsConfig {
    /// OAuth2 client ID
    pub client_id: Option<String>,
    /// OAuth2 client secret
    pub client_secret: Option<String>,
    /// Short-lived bearer token (required)
    pub access_token: String,
    /// Long-lived refresh token
    pub refresh_token: Option<String>,
}

/// Complete server configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// WHOOP API endpoints
    pub api: WhoopApiConfig,
    /// OAuth2 credentials
    pub credentials: WhoopCredentialsConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] when `WHOOP_ACCESS_TOKEN` is
    /// absent or empty. There is no anonymous mode.
    pub fn from_env() -> AppResult<Self> {
        let access_token = env_string(env_vars::ACCESS_TOKEN).ok_or_else(|| {
            AppError::config(format!(
                "{} environment variable is not set. \
                 Run whoop-auth-setup to obtain tokens",
                env_vars::ACCESS_TOKEN
            ))
        })?;

        let api = WhoopApiConfig {
            base_url: env_string(env_vars::API_BASE_URL)
                .unwrap_or_else(|| whoop_api::API_BASE_URL.into()),
            auth_url: whoop_api::AUTH_URL.into(),
            token_url: env_string(env_vars::TOKEN_URL)
                .unwrap_or_else(|| whoop_api::TOKEN_URL.into()),
        };

        Ok(Self {
            api,
            credentials: WhoopCredentialsConfig {
                client_id: env_string(env_vars::CLIENT_ID),
                client_secret: env_string(env_vars::CLIENT_SECRET),
                access_token,
                refresh_token: env_string(env_vars::REFRESH_TOKEN),
            },
        })
    }

    /// One-line startup summary, with no token material
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "api_base={} client_id={} refresh_token={}",
            self.api.base_url,
            self.credentials.client_id.as_deref().unwrap_or("<unset>"),
            if self.credentials.refresh_token.is_some() {
                "present"
            } else {
                "absent"
            }
        )
    }
}

/// Read an environment variable, treating empty values as unset
fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
