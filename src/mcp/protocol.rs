// ABOUTME: MCP protocol message handlers for core protocol operations
// ABOUTME: Handles initialize, ping, and listing protocol messages
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # MCP Protocol Handlers
//!
//! Core MCP protocol message handling for initialization and tools listing.
//! Tool execution lives in [`super::tool_handlers`].

use crate::constants::protocol::{MCP_PROTOCOL_VERSION, SERVER_NAME, SERVER_VERSION};
use crate::mcp::schema::{get_tools, InitializeResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 version string
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP request received over the transport
#[derive(Debug, Deserialize)]
pub struct McpRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Method name to invoke
    pub method: String,
    /// Optional parameters for the method
    pub params: Option<Value>,
    /// Optional ID - notifications don't have IDs, only regular requests do
    pub id: Option<Value>,
}

/// MCP response
#[derive(Debug, Serialize)]
pub struct McpResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Result of the method call (mutually exclusive with error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error information (mutually exclusive with result)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
    /// Request identifier for correlation
    pub id: Value,
}

/// MCP error object
#[derive(Debug, Serialize)]
pub struct McpError {
    /// JSON-RPC error code
    pub code: i32,
    /// Human-readable error message
    pub message: String,
    /// Additional error information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl McpResponse {
    /// Create a successful MCP response
    #[must_use]
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error MCP response
    #[must_use]
    pub fn error(id: Value, code: i32, message: String) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            result: None,
            error: Some(McpError {
                code,
                message,
                data: None,
            }),
            id,
        }
    }

    /// Create an error MCP response with data
    #[must_use]
    pub fn error_with_data(id: Value, code: i32, message: String, data: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            result: None,
            error: Some(McpError {
                code,
                message,
                data: Some(data),
            }),
            id,
        }
    }
}

/// Default ID for responses to requests that carried none
pub(crate) fn default_request_id() -> Value {
    Value::Number(serde_json::Number::from(0))
}

/// MCP protocol handlers
pub struct ProtocolHandler;

impl ProtocolHandler {
    /// Handle initialize request
    #[must_use]
    pub fn handle_initialize(request: &McpRequest) -> McpResponse {
        let init_response = InitializeResponse::new(
            MCP_PROTOCOL_VERSION.to_owned(),
            SERVER_NAME.to_owned(),
            SERVER_VERSION.to_owned(),
        );

        let request_id = request.id.clone().unwrap_or_else(default_request_id);
        match serde_json::to_value(&init_response) {
            Ok(result) => McpResponse::success(request_id, result),
            Err(_) => McpResponse::error(request_id, -32603, "Internal error".to_owned()),
        }
    }

    /// Handle ping request
    #[must_use]
    pub fn handle_ping(request: &McpRequest) -> McpResponse {
        let request_id = request.id.clone().unwrap_or_else(default_request_id);
        McpResponse::success(request_id, serde_json::json!({}))
    }

    /// Handle tools list request
    #[must_use]
    pub fn handle_tools_list(request: &McpRequest) -> McpResponse {
        let tools = get_tools();
        let request_id = request.id.clone().unwrap_or_else(default_request_id);
        McpResponse::success(request_id, serde_json::json!({ "tools": tools }))
    }

    /// Handle prompts list request
    #[must_use]
    pub fn handle_prompts_list(request: &McpRequest) -> McpResponse {
        let request_id = request.id.clone().unwrap_or_else(default_request_id);
        McpResponse::success(request_id, serde_json::json!({ "prompts": [] }))
    }

    /// Handle resources list request
    #[must_use]
    pub fn handle_resources_list(request: &McpRequest) -> McpResponse {
        let request_id = request.id.clone().unwrap_or_else(default_request_id);
        McpResponse::success(request_id, serde_json::json!({ "resources": [] }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: &str, id: Option<Value>) -> McpRequest {
        McpRequest {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            method: method.to_owned(),
            params: None,
            id,
        }
    }

    #[test]
    fn test_initialize_reports_tool_capability() {
        let response =
            ProtocolHandler::handle_initialize(&request("initialize", Some(Value::from(1))));
        let result = response.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], "whoop-mcp-server");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[test]
    fn test_tools_list_returns_all_tools() {
        let response =
            ProtocolHandler::handle_tools_list(&request("tools/list", Some(Value::from(2))));
        let result = response.result.unwrap();
        assert_eq!(result["tools"].as_array().unwrap().len(), 10);
    }

    #[test]
    fn test_missing_id_defaults_to_zero() {
        let response = ProtocolHandler::handle_ping(&request("ping", None));
        assert_eq!(response.id, Value::from(0));
    }
}
