// ABOUTME: Tool execution handlers for MCP tool calls
// ABOUTME: Parses tool arguments, validates them, and dispatches to the WHOOP client
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Tool Call Handlers
//!
//! Every `tools/call` is parsed and validated here before any network
//! call happens, then dispatched to the [`WhoopClient`]. Failures come
//! back as structured tool errors (`isError: true` with a machine-readable
//! code), never as a raw error crossing the protocol boundary.

use crate::constants::errors::{ERROR_INVALID_PARAMS, ERROR_METHOD_NOT_FOUND};
use crate::errors::{AppError, AppResult};
use crate::mcp::protocol::{default_request_id, McpRequest, McpResponse};
use crate::mcp::schema::{Content, ToolResponse};
use crate::mcp::server::ServerResources;
use crate::providers::QueryWindow;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Tool call handlers
pub struct ToolHandlers;

impl ToolHandlers {
    /// Handle a `tools/call` request
    pub async fn handle_tools_call(
        request: McpRequest,
        resources: &Arc<ServerResources>,
    ) -> McpResponse {
        let request_id = request.id.clone().unwrap_or_else(default_request_id);

        let Some(params) = request.params.as_ref() else {
            return McpResponse::error(
                request_id,
                ERROR_INVALID_PARAMS,
                "Missing params for tools/call".to_owned(),
            );
        };

        let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
            return McpResponse::error(
                request_id,
                ERROR_INVALID_PARAMS,
                "Missing tool name".to_owned(),
            );
        };

        let empty_args = Value::Object(serde_json::Map::new());
        let args = params.get("arguments").unwrap_or(&empty_args);

        debug!("Executing tool: {tool_name}");

        let result = match Self::execute_tool(tool_name, args, resources).await {
            Some(result) => result,
            None => {
                return McpResponse::error(
                    request_id,
                    ERROR_METHOD_NOT_FOUND,
                    format!("Unknown tool: {tool_name}"),
                );
            }
        };

        let tool_response = match result {
            Ok(payload) => success_response(&payload),
            Err(err) => {
                warn!("Tool {tool_name} failed: {err}");
                error_response(&err)
            }
        };

        match serde_json::to_value(&tool_response) {
            Ok(value) => McpResponse::success(request_id, value),
            Err(e) => McpResponse::error(
                request_id,
                crate::constants::errors::ERROR_INTERNAL,
                format!("Failed to serialize tool response: {e}"),
            ),
        }
    }

    /// Dispatch a tool by name; `None` means the tool does not exist
    async fn execute_tool(
        tool_name: &str,
        args: &Value,
        resources: &Arc<ServerResources>,
    ) -> Option<AppResult<Value>> {
        let client = &resources.client;

        let result = match tool_name {
            "get_user_profile" => client.get_user_profile().await,
            "get_body_measurements" => client.get_body_measurements().await,
            "get_recent_cycles" => match recent_window(args) {
                Ok(window) => client.get_cycles(&window).await,
                Err(e) => Err(e),
            },
            "get_recent_recovery" => match recent_window(args) {
                Ok(window) => client.get_recovery(&window).await,
                Err(e) => Err(e),
            },
            "get_recent_sleep" => match recent_window(args) {
                Ok(window) => client.get_sleep(&window).await,
                Err(e) => Err(e),
            },
            "get_recent_workouts" => match recent_window(args) {
                Ok(window) => client.get_workouts(&window).await,
                Err(e) => Err(e),
            },
            "get_cycles_for_date_range" => match range_window(args) {
                Ok(window) => client.get_cycles(&window).await,
                Err(e) => Err(e),
            },
            "get_recovery_for_date_range" => match range_window(args) {
                Ok(window) => client.get_recovery(&window).await,
                Err(e) => Err(e),
            },
            "get_sleep_for_date_range" => match range_window(args) {
                Ok(window) => client.get_sleep(&window).await,
                Err(e) => Err(e),
            },
            "get_workouts_for_date_range" => match range_window(args) {
                Ok(window) => client.get_workouts(&window).await,
                Err(e) => Err(e),
            },
            _ => return None,
        };

        Some(result)
    }
}

/// Derive the window for a `get_recent_*` tool
fn recent_window(args: &Value) -> AppResult<QueryWindow> {
    QueryWindow::from_days(optional_i64(args, "days")?)
}

/// Derive the window for a `*_for_date_range` tool
fn range_window(args: &Value) -> AppResult<QueryWindow> {
    let start = required_str(args, "start_date")?;
    let end = required_str(args, "end_date")?;
    let limit = optional_u32(args, "limit")?;
    QueryWindow::from_range(start, end, limit)
}

fn required_str<'a>(args: &'a Value, key: &str) -> AppResult<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::invalid_input(format!("{key} is required and must be a string")))
}

fn optional_i64(args: &Value, key: &str) -> AppResult<Option<i64>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or_else(|| AppError::invalid_input(format!("{key} must be an integer"))),
    }
}

fn optional_u32(args: &Value, key: &str) -> AppResult<Option<u32>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| {
                AppError::invalid_input(format!("{key} must be a non-negative integer"))
            }),
    }
}

/// Wrap an API payload as MCP tool content, unchanged in shape
fn success_response(payload: &Value) -> ToolResponse {
    let text = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
    ToolResponse {
        content: vec![Content::Text { text }],
        is_error: false,
        structured_content: Some(payload.clone()),
    }
}

/// Convert a classified error into a structured tool error
fn error_response(err: &AppError) -> ToolResponse {
    ToolResponse {
        content: vec![Content::Text {
            text: err.to_string(),
        }],
        is_error: true,
        structured_content: Some(err.to_details()),
    }
}
