// ABOUTME: WHOOP API client with authenticated request execution and 401 recovery
// ABOUTME: Wraps every outbound GET with refresh-and-retry-once token handling
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Authenticated Request Executor
//!
//! [`WhoopClient`] performs authorized GETs against the WHOOP developer
//! API and guarantees the caller sees either the JSON payload or a
//! classified [`AppError`] — never a raw transport error.
//!
//! Per call: build the request with the current bearer token; on 401,
//! run exactly one refresh cycle through the [`TokenManager`] and retry
//! once with the new token. A 401 on the retried request is terminal —
//! the retry path never refreshes again, so a consistently rejected
//! credential produces one token-endpoint call, not a loop. 429 and other
//! non-2xx statuses are surfaced without any retry.

use super::shared_client;
use crate::config::WhoopApiConfig;
use crate::constants::limits;
use crate::errors::{AppError, AppResult};
use crate::oauth::TokenManager;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// ISO 8601 format the WHOOP API expects for `start`/`end` parameters
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Validated date range and page size for date-filtered endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryWindow {
    /// ISO 8601 range start
    pub start: String,
    /// ISO 8601 range end
    pub end: String,
    /// Page size, within `[1, 50]`
    pub limit: u32,
}

impl QueryWindow {
    /// Build a window covering the last `days` days, ending now
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidInput`] when `days` is outside
    /// `[1, 180]`.
    pub fn from_days(days: Option<i64>) -> AppResult<Self> {
        let days = days.unwrap_or(limits::DEFAULT_DAYS);
        if !(1..=limits::MAX_DAYS).contains(&days) {
            return Err(AppError::invalid_input(format!(
                "days must be between 1 and {}, got {days}",
                limits::MAX_DAYS
            )));
        }

        let end = Utc::now();
        let start = end - Duration::days(days);
        Ok(Self {
            start: start.format(DATE_FORMAT).to_string(),
            end: end.format(DATE_FORMAT).to_string(),
            limit: limits::DEFAULT_LIMIT,
        })
    }

    /// Build a window from explicit ISO 8601 bounds
    ///
    /// The date strings are passed through to the API unchanged; they are
    /// parsed here only to reject malformed input before any network call.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidInput`] when either bound is not valid
    /// ISO 8601, the range is inverted, or `limit` falls outside
    /// `[1, 50]`.
    pub fn from_range(start: &str, end: &str, limit: Option<u32>) -> AppResult<Self> {
        let start_dt = parse_iso8601(start, "start_date")?;
        let end_dt = parse_iso8601(end, "end_date")?;
        if end_dt < start_dt {
            return Err(AppError::invalid_input(
                "end_date must not be earlier than start_date",
            ));
        }

        let limit = limit.unwrap_or(limits::DEFAULT_LIMIT);
        if !(limits::MIN_LIMIT..=limits::MAX_LIMIT).contains(&limit) {
            return Err(AppError::invalid_input(format!(
                "limit must be between {} and {}, got {limit}",
                limits::MIN_LIMIT,
                limits::MAX_LIMIT
            )));
        }

        Ok(Self {
            start: start.to_owned(),
            end: end.to_owned(),
            limit,
        })
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("start", self.start.clone()),
            ("end", self.end.clone()),
            ("limit", self.limit.to_string()),
        ]
    }
}

fn parse_iso8601(value: &str, field: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::invalid_input(format!("{field} is not valid ISO 8601: {e}")))
}

/// Client for the WHOOP developer API v2
pub struct WhoopClient {
    api_base_url: String,
    tokens: Arc<TokenManager>,
    client: Client,
}

impl WhoopClient {
    /// Create a client sharing the process-wide HTTP connection pool
    #[must_use]
    pub fn new(api: &WhoopApiConfig, tokens: Arc<TokenManager>) -> Self {
        Self {
            api_base_url: api.base_url.clone(),
            tokens,
            client: shared_client().clone(),
        }
    }

    /// Get the authenticated user's basic profile
    ///
    /// # Errors
    ///
    /// See [`WhoopClient`] error classification.
    pub async fn get_user_profile(&self) -> AppResult<Value> {
        self.api_request("user/profile/basic", &[]).await
    }

    /// Get the authenticated user's body measurements
    ///
    /// # Errors
    ///
    /// See [`WhoopClient`] error classification.
    pub async fn get_body_measurements(&self) -> AppResult<Value> {
        self.api_request("user/measurement/body", &[]).await
    }

    /// Get physiological cycles within a window
    ///
    /// # Errors
    ///
    /// See [`WhoopClient`] error classification.
    pub async fn get_cycles(&self, window: &QueryWindow) -> AppResult<Value> {
        self.api_request("cycle", &window.query()).await
    }

    /// Get recovery scores within a window
    ///
    /// # Errors
    ///
    /// See [`WhoopClient`] error classification.
    pub async fn get_recovery(&self, window: &QueryWindow) -> AppResult<Value> {
        self.api_request("recovery", &window.query()).await
    }

    /// Get sleep activities within a window
    ///
    /// # Errors
    ///
    /// See [`WhoopClient`] error classification.
    pub async fn get_sleep(&self, window: &QueryWindow) -> AppResult<Value> {
        self.api_request("activity/sleep", &window.query()).await
    }

    /// Get workouts within a window
    ///
    /// # Errors
    ///
    /// See [`WhoopClient`] error classification.
    pub async fn get_workouts(&self, window: &QueryWindow) -> AppResult<Value> {
        self.api_request("activity/workout", &window.query()).await
    }

    /// Make an authenticated API request with refresh-and-retry-once on 401
    async fn api_request(
        &self,
        endpoint: &str,
        query: &[(&'static str, String)],
    ) -> AppResult<Value> {
        let access_token = self.tokens.access_token().await;
        let url = format!(
            "{}/{}",
            self.api_base_url,
            endpoint.trim_start_matches('/')
        );

        match self.execute(&url, query, &access_token).await {
            Err(AppError::Authentication { .. }) => {
                debug!("Access token rejected for {endpoint}, attempting refresh");
                let fresh_token = self.tokens.refresh_access_token(&access_token).await?;
                // Single retry. A second 401 propagates as a terminal
                // authentication error without another refresh.
                self.execute(&url, query, &fresh_token).await
            }
            result => result,
        }
    }

    /// Execute one GET and classify the outcome
    async fn execute(
        &self,
        url: &str,
        query: &[(&'static str, String)],
        access_token: &str,
    ) -> AppResult<Value> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header("Authorization", format!("Bearer {access_token}"))
            .send()
            .await
            .map_err(|e| AppError::network(format!("failed to send request: {e}")))?;

        let status = response.status();
        debug!("WHOOP API response status: {status}");

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| AppError::Upstream {
                    status: status.as_u16(),
                    body: format!("failed to parse API response: {e}"),
                });
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::auth("access token expired or invalid"));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            warn!("WHOOP API rate limit hit, Retry-After: {retry_after_secs:?}");
            return Err(AppError::RateLimit { retry_after_secs });
        }

        let body = response.text().await.unwrap_or_default();
        warn!("WHOOP API request failed - status: {status}, body_length: {} bytes", body.len());
        Err(AppError::Upstream {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_days_derives_range_ending_now() {
        let window = QueryWindow::from_days(Some(7)).unwrap();

        let end = DateTime::parse_from_rfc3339(&window.end).unwrap();
        let start = DateTime::parse_from_rfc3339(&window.start).unwrap();
        assert_eq!((end - start).num_days(), 7);

        let drift = Utc::now() - end.with_timezone(&Utc);
        assert!(drift.num_seconds().abs() < 5);
        assert_eq!(window.limit, limits::DEFAULT_LIMIT);
    }

    #[test]
    fn test_from_days_defaults_to_seven() {
        let window = QueryWindow::from_days(None).unwrap();
        let end = DateTime::parse_from_rfc3339(&window.end).unwrap();
        let start = DateTime::parse_from_rfc3339(&window.start).unwrap();
        assert_eq!((end - start).num_days(), 7);
    }

    #[test]
    fn test_from_days_rejects_out_of_range() {
        assert!(QueryWindow::from_days(Some(0)).is_err());
        assert!(QueryWindow::from_days(Some(-3)).is_err());
        assert!(QueryWindow::from_days(Some(181)).is_err());
    }

    #[test]
    fn test_from_range_rejects_limit_outside_bounds() {
        let start = "2024-01-01T00:00:00.000Z";
        let end = "2024-01-31T00:00:00.000Z";

        let err = QueryWindow::from_range(start, end, Some(51)).unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
        assert!(QueryWindow::from_range(start, end, Some(0)).is_err());
        assert!(QueryWindow::from_range(start, end, Some(50)).is_ok());
        assert!(QueryWindow::from_range(start, end, Some(1)).is_ok());
    }

    #[test]
    fn test_from_range_defaults_limit() {
        let window = QueryWindow::from_range(
            "2024-01-01T00:00:00.000Z",
            "2024-01-31T00:00:00.000Z",
            None,
        )
        .unwrap();
        assert_eq!(window.limit, 25);
    }

    #[test]
    fn test_from_range_rejects_malformed_dates_and_inverted_ranges() {
        assert!(QueryWindow::from_range("yesterday", "2024-01-31T00:00:00.000Z", None).is_err());
        assert!(QueryWindow::from_range(
            "2024-02-01T00:00:00.000Z",
            "2024-01-01T00:00:00.000Z",
            None
        )
        .is_err());
    }

    #[test]
    fn test_from_range_passes_dates_through_unchanged() {
        let start = "2024-01-01T00:00:00+02:00";
        let end = "2024-01-31T00:00:00+02:00";
        let window = QueryWindow::from_range(start, end, None).unwrap();
        assert_eq!(window.start, start);
        assert_eq!(window.end, end);
    }
}
