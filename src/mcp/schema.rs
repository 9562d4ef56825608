// ABOUTME: MCP protocol schema definitions and message structures
// ABOUTME: Defines tool schemas and initialization payloads for the WHOOP tool surface
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! MCP Protocol Schema Definitions
//!
//! Type-safe definitions for MCP protocol messages, capabilities, and the
//! WHOOP tool schemas, so the schema can evolve without hardcoded JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Server Information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server name
    pub name: String,
    /// Server version
    pub version: String,
}

/// MCP Tool Schema Definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name used in `tools/call`
    pub name: String,
    /// Human-readable description shown to the assistant
    pub description: String,
    /// JSON schema for the tool parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonSchema,
}

/// JSON Schema Definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSchema {
    /// Schema type (always "object" for tool inputs)
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Named parameter schemas
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, PropertySchema>>,
    /// Required parameter names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

/// JSON Schema Property Definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySchema {
    /// Property type
    #[serde(rename = "type")]
    pub property_type: String,
    /// Property description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Content types for MCP messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Content {
    /// Plain text content
    #[serde(rename = "text")]
    Text {
        /// Text payload
        text: String,
    },
}

/// Tool Response after execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Response content blocks
    pub content: Vec<Content>,
    /// Whether the call failed
    #[serde(rename = "isError")]
    pub is_error: bool,
    /// Machine-readable payload mirroring the content
    #[serde(rename = "structuredContent", skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<serde_json::Value>,
}

/// MCP Server Capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// Tool capability advertisement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

/// Tools capability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsCapability {
    /// Whether the tool list can change during a session
    #[serde(rename = "listChanged", skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Complete MCP Initialize Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResponse {
    /// Negotiated protocol version
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Server identity
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
    /// Advertised capabilities
    pub capabilities: ServerCapabilities,
    /// Usage instructions for the connecting assistant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl InitializeResponse {
    /// Create a new initialize response with current server configuration
    #[must_use]
    pub fn new(protocol_version: String, server_name: String, server_version: String) -> Self {
        Self {
            protocol_version,
            server_info: ServerInfo {
                name: server_name,
                version: server_version,
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            instructions: Some(
                "This server provides read access to WHOOP recovery, sleep, cycle, and \
                 workout data. Use the `get_recent_*` tools for a lookback window in days, \
                 or the `*_for_date_range` tools with ISO 8601 start/end dates."
                    .into(),
            ),
        }
    }
}

/// Get all available tools
#[must_use]
pub fn get_tools() -> Vec<ToolSchema> {
    vec![
        create_get_user_profile_tool(),
        create_get_body_measurements_tool(),
        create_recent_tool(
            "get_recent_cycles",
            "Get recent physiological cycles with strain and recovery scores",
        ),
        create_recent_tool(
            "get_recent_recovery",
            "Get recent recovery data including HRV, resting heart rate, and recovery percentage",
        ),
        create_recent_tool(
            "get_recent_sleep",
            "Get recent sleep data including sleep stages, efficiency, and performance scores",
        ),
        create_recent_tool(
            "get_recent_workouts",
            "Get recent workouts including sport type, strain, duration, and heart rate zones",
        ),
        create_date_range_tool(
            "get_cycles_for_date_range",
            "Get physiological cycles for a specific date range",
        ),
        create_date_range_tool(
            "get_recovery_for_date_range",
            "Get recovery data for a specific date range",
        ),
        create_date_range_tool(
            "get_sleep_for_date_range",
            "Get sleep data for a specific date range",
        ),
        create_date_range_tool(
            "get_workouts_for_date_range",
            "Get workout data for a specific date range",
        ),
    ]
}

/// Create the `get_user_profile` tool schema
fn create_get_user_profile_tool() -> ToolSchema {
    ToolSchema {
        name: "get_user_profile".into(),
        description: "Get the authenticated WHOOP user's basic profile information".into(),
        input_schema: JsonSchema {
            schema_type: "object".into(),
            properties: None,
            required: None,
        },
    }
}

/// Create the `get_body_measurements` tool schema
fn create_get_body_measurements_tool() -> ToolSchema {
    ToolSchema {
        name: "get_body_measurements".into(),
        description: "Get the authenticated user's body measurements (height, weight, max HR)"
            .into(),
        input_schema: JsonSchema {
            schema_type: "object".into(),
            properties: None,
            required: None,
        },
    }
}

/// Create a `get_recent_*` tool schema with an optional `days` parameter
fn create_recent_tool(name: &str, description: &str) -> ToolSchema {
    let mut properties = HashMap::new();

    properties.insert(
        "days".to_owned(),
        PropertySchema {
            property_type: "number".into(),
            description: Some("Number of days to look back (default 7, max 180)".into()),
        },
    );

    ToolSchema {
        name: name.to_owned(),
        description: description.to_owned(),
        input_schema: JsonSchema {
            schema_type: "object".into(),
            properties: Some(properties),
            required: None,
        },
    }
}

/// Create a `*_for_date_range` tool schema
fn create_date_range_tool(name: &str, description: &str) -> ToolSchema {
    let mut properties = HashMap::new();

    properties.insert(
        "start_date".to_owned(),
        PropertySchema {
            property_type: "string".into(),
            description: Some(
                "Start date in ISO 8601 format (e.g., \"2024-01-01T00:00:00.000Z\")".into(),
            ),
        },
    );

    properties.insert(
        "end_date".to_owned(),
        PropertySchema {
            property_type: "string".into(),
            description: Some("End date in ISO 8601 format".into()),
        },
    );

    properties.insert(
        "limit".to_owned(),
        PropertySchema {
            property_type: "number".into(),
            description: Some("Maximum number of records to return (1-50, default 25)".into()),
        },
    );

    ToolSchema {
        name: name.to_owned(),
        description: description.to_owned(),
        input_schema: JsonSchema {
            schema_type: "object".into(),
            properties: Some(properties),
            required: Some(vec!["start_date".to_owned(), "end_date".to_owned()]),
        },
    }
}
