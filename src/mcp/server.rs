// ABOUTME: Stdio transport and request dispatch for the MCP server
// ABOUTME: Reads JSON-RPC requests line by line from stdin and writes responses to stdout
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # MCP Server
//!
//! Stdio transport (MCP specification compliant): one JSON-RPC message
//! per line on stdin, one response per line on stdout. All logging goes
//! to stderr so the protocol stream stays clean.

use crate::config::ServerConfig;
use crate::constants::errors::ERROR_METHOD_NOT_FOUND;
use crate::mcp::protocol::{default_request_id, McpRequest, McpResponse, ProtocolHandler};
use crate::mcp::tool_handlers::ToolHandlers;
use crate::oauth::TokenManager;
use crate::providers::{shared_client, WhoopClient};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

/// Shared resources for request handling
pub struct ServerResources {
    /// WHOOP API client (owns the token manager)
    pub client: WhoopClient,
}

impl ServerResources {
    /// Build resources from validated startup configuration
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        let tokens = Arc::new(TokenManager::new(
            config.credentials.clone(),
            config.api.token_url.clone(),
            shared_client().clone(),
        ));
        Self {
            client: WhoopClient::new(&config.api, tokens),
        }
    }
}

/// MCP server over stdio
pub struct McpServer {
    resources: Arc<ServerResources>,
}

impl McpServer {
    /// Create a server with shared resources
    #[must_use]
    pub fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Run the stdio transport until stdin closes
    ///
    /// # Errors
    ///
    /// Returns an error when stdout becomes unwritable.
    pub async fn run(self) -> anyhow::Result<()> {
        info!("MCP stdio transport ready - listening on stdin/stdout");

        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(stdin).lines();

        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let request: McpRequest = match serde_json::from_str(trimmed) {
                Ok(request) => request,
                Err(e) => {
                    warn!("Ignoring malformed request: {e}");
                    continue;
                }
            };

            let Some(response) = Self::handle_request(request, &self.resources).await else {
                continue;
            };

            match serde_json::to_string(&response) {
                Ok(serialized) => {
                    stdout.write_all(serialized.as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                    stdout.flush().await?;
                }
                Err(e) => error!("Failed to serialize response: {e}"),
            }
        }

        info!("MCP stdio transport ended");
        Ok(())
    }

    /// Dispatch a single request; notifications produce no response
    pub async fn handle_request(
        request: McpRequest,
        resources: &Arc<ServerResources>,
    ) -> Option<McpResponse> {
        if request.method.starts_with("notifications/") {
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => ProtocolHandler::handle_initialize(&request),
            "ping" => ProtocolHandler::handle_ping(&request),
            "tools/list" => ProtocolHandler::handle_tools_list(&request),
            "tools/call" => ToolHandlers::handle_tools_call(request, resources).await,
            "prompts/list" => ProtocolHandler::handle_prompts_list(&request),
            "resources/list" => ProtocolHandler::handle_resources_list(&request),
            method => {
                let id = request.id.clone().unwrap_or_else(default_request_id);
                McpResponse::error(
                    id,
                    ERROR_METHOD_NOT_FOUND,
                    format!("Method not found: {method}"),
                )
            }
        };

        Some(response)
    }
}
