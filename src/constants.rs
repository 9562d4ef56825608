// ABOUTME: System-wide constants and configuration values for the WHOOP MCP server
// ABOUTME: Contains endpoint URLs, environment variable names, protocol and limit defaults
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Centralized constants so endpoint URLs and tunables are never hardcoded
//! at call sites.

/// WHOOP API endpoint defaults
pub mod whoop_api {
    /// Base URL for WHOOP developer API v2
    pub const API_BASE_URL: &str = "https://api.prod.whoop.com/developer/v2";

    /// OAuth2 authorization endpoint
    pub const AUTH_URL: &str = "https://api.prod.whoop.com/oauth/oauth2/auth";

    /// OAuth2 token endpoint
    pub const TOKEN_URL: &str = "https://api.prod.whoop.com/oauth/oauth2/token";

    /// Scopes requested during the bootstrap flow
    pub const DEFAULT_SCOPES: &str =
        "read:profile read:body_measurement read:cycles read:recovery read:sleep read:workout offline";
}

/// Environment variable names for credential configuration
pub mod env_vars {
    /// OAuth2 client ID issued by the WHOOP developer dashboard
    pub const CLIENT_ID: &str = "WHOOP_CLIENT_ID";

    /// OAuth2 client secret
    pub const CLIENT_SECRET: &str = "WHOOP_CLIENT_SECRET";

    /// Current access token (required at startup)
    pub const ACCESS_TOKEN: &str = "WHOOP_ACCESS_TOKEN";

    /// Long-lived refresh token
    pub const REFRESH_TOKEN: &str = "WHOOP_REFRESH_TOKEN";

    /// Override for the API base URL (used by tests)
    pub const API_BASE_URL: &str = "WHOOP_API_BASE_URL";

    /// Override for the token endpoint URL (used by tests)
    pub const TOKEN_URL: &str = "WHOOP_TOKEN_URL";
}

/// Request parameter limits and defaults
pub mod limits {
    /// Default number of records returned by date-range tools
    pub const DEFAULT_LIMIT: u32 = 25;

    /// Smallest accepted `limit` value
    pub const MIN_LIMIT: u32 = 1;

    /// Largest `limit` the WHOOP API serves per page
    pub const MAX_LIMIT: u32 = 50;

    /// Default lookback window for the `get_recent_*` tools
    pub const DEFAULT_DAYS: i64 = 7;

    /// Largest accepted lookback window in days
    pub const MAX_DAYS: i64 = 180;

    /// Outbound HTTP request timeout in seconds
    pub const HTTP_TIMEOUT_SECS: u64 = 30;
}

/// MCP protocol constants
pub mod protocol {
    /// MCP protocol version implemented by this server
    pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

    /// Server name reported during initialization
    pub const SERVER_NAME: &str = "whoop-mcp-server";

    /// Server version reported during initialization
    pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// JSON-RPC error codes used in MCP responses
pub mod errors {
    /// Method not found
    pub const ERROR_METHOD_NOT_FOUND: i32 = -32601;

    /// Invalid parameters
    pub const ERROR_INVALID_PARAMS: i32 = -32602;

    /// Internal error
    pub const ERROR_INTERNAL: i32 = -32603;
}
