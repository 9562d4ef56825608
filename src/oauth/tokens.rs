// ABOUTME: In-memory OAuth2 credential store with reactive token refresh
// ABOUTME: Serializes refreshes behind a single-flight gate shared by concurrent tool calls
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Credential Store and Refresh Protocol
//!
//! [`TokenManager`] owns the process-lifetime WHOOP credentials. The client
//! id and secret are immutable; the access token is replaced whenever a
//! refresh succeeds, and the refresh token only when the token endpoint
//! returns a new one (WHOOP refresh tokens are long-lived and reusable).
//!
//! Refresh is purely reactive: nothing here inspects `expires_in` or
//! renews proactively. The executor calls [`TokenManager::refresh_access_token`]
//! after observing a 401, and concurrent observers serialize behind a
//! single gate — the loser of the race finds the stored token already
//! replaced and reuses it without a second token-endpoint call.

use crate::config::WhoopCredentialsConfig;
use crate::errors::{AppError, AppResult};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Token endpoint response
///
/// `expires_in` is informational only; refresh happens on 401, never on a
/// clock.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// New short-lived access token
    pub access_token: String,
    /// Replacement refresh token; the old one is retained when omitted
    pub refresh_token: Option<String>,
    /// Advertised access token lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Mutable token state guarded by the store's lock
#[derive(Debug, Clone)]
struct TokenState {
    access_token: String,
    refresh_token: Option<String>,
}

/// In-memory credential store for a single WHOOP account
pub struct TokenManager {
    client_id: Option<String>,
    client_secret: Option<String>,
    token_url: String,
    tokens: RwLock<TokenState>,
    // Refresh-in-progress exclusion. Guards the refresh+update pair, not
    // token reads.
    refresh_gate: Mutex<()>,
    http: reqwest::Client,
}

impl TokenManager {
    /// Create a store from startup configuration
    #[must_use]
    pub fn new(
        credentials: WhoopCredentialsConfig,
        token_url: String,
        http: reqwest::Client,
    ) -> Self {
        Self {
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            token_url,
            tokens: RwLock::new(TokenState {
                access_token: credentials.access_token,
                refresh_token: credentials.refresh_token,
            }),
            refresh_gate: Mutex::new(()),
            http,
        }
    }

    /// Current access token
    pub async fn access_token(&self) -> String {
        self.tokens.read().await.access_token.clone()
    }

    /// Whether a refresh token is available for recovery from a 401
    pub async fn has_refresh_token(&self) -> bool {
        self.tokens.read().await.refresh_token.is_some()
    }

    /// Replace the stored tokens. The refresh token is retained unchanged
    /// when `new_refresh` is `None`.
    pub async fn update_tokens(&self, new_access: String, new_refresh: Option<String>) {
        let mut state = self.tokens.write().await;
        state.access_token = new_access;
        if let Some(refresh) = new_refresh {
            state.refresh_token = Some(refresh);
        }
    }

    /// Exchange the refresh token for a new access token
    ///
    /// `stale_token` is the access token the caller saw rejected with a
    /// 401. If the stored token already differs when the refresh gate is
    /// acquired, another call completed the exchange first and its result
    /// is returned without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Authentication`] when no refresh token or client
    /// credentials are configured, when the token endpoint answers with a
    /// non-success status, or when the response lacks an access token.
    /// Transport failures surface as [`AppError::Network`].
    pub async fn refresh_access_token(&self, stale_token: &str) -> AppResult<String> {
        let _guard = self.refresh_gate.lock().await;

        // Another caller may have refreshed while we waited on the gate.
        let (current, refresh_token) = {
            let state = self.tokens.read().await;
            (state.access_token.clone(), state.refresh_token.clone())
        };
        if current != stale_token {
            debug!("Access token already refreshed by a concurrent call");
            return Ok(current);
        }

        let refresh_token = refresh_token
            .ok_or_else(|| AppError::auth("no refresh token available"))?;
        let client_id = self
            .client_id
            .as_deref()
            .ok_or_else(|| AppError::auth("client ID is not configured"))?;
        let client_secret = self
            .client_secret
            .as_deref()
            .ok_or_else(|| AppError::auth("client secret is not configured"))?;

        info!("Refreshing WHOOP access token");

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::network(format!("token refresh request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!("WHOOP token refresh rejected with status {status}");
            return Err(AppError::auth(format!(
                "token refresh failed with status {status}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::auth(format!("malformed token refresh response: {e}")))?;

        if let Some(expires_in) = token_response.expires_in {
            debug!("New access token advertised lifetime: {expires_in}s");
        }

        self.update_tokens(
            token_response.access_token.clone(),
            token_response.refresh_token,
        )
        .await;

        info!("WHOOP access token refreshed");
        Ok(token_response.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(access: &str, refresh: Option<&str>) -> TokenManager {
        TokenManager::new(
            WhoopCredentialsConfig {
                client_id: Some("id".into()),
                client_secret: Some("secret".into()),
                access_token: access.into(),
                refresh_token: refresh.map(Into::into),
            },
            "http://localhost:1/token".into(),
            reqwest::Client::new(),
        )
    }

    #[tokio::test]
    async fn test_update_tokens_retains_refresh_token_when_none() {
        let store = manager("old-access", Some("keep-me"));

        store.update_tokens("new-access".into(), None).await;

        assert_eq!(store.access_token().await, "new-access");
        assert!(store.has_refresh_token().await);
        let state = store.tokens.read().await;
        assert_eq!(state.refresh_token.as_deref(), Some("keep-me"));
    }

    #[tokio::test]
    async fn test_update_tokens_replaces_refresh_token_when_present() {
        let store = manager("old-access", Some("old-refresh"));

        store
            .update_tokens("new-access".into(), Some("new-refresh".into()))
            .await;

        let state = store.tokens.read().await;
        assert_eq!(state.refresh_token.as_deref(), Some("new-refresh"));
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_is_authentication_error() {
        let store = manager("access", None);

        let err = store.refresh_access_token("access").await.unwrap_err();
        assert_eq!(err.code(), "AUTHENTICATION_ERROR");
    }

    #[tokio::test]
    async fn test_refresh_skips_network_when_token_already_replaced() {
        // token_url points at a closed port, so any network attempt fails.
        let store = manager("fresh-token", Some("refresh"));

        let result = store.refresh_access_token("stale-token").await;
        assert_eq!(result.unwrap(), "fresh-token");
    }
}
