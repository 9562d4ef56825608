// ABOUTME: Model Context Protocol (MCP) implementation for AI assistant integration
// ABOUTME: Stdio JSON-RPC server exposing WHOOP data tools to MCP clients
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

/// Core protocol message handlers and request/response types
pub mod protocol;

/// Protocol schema definitions and tool schemas
pub mod schema;

/// Stdio transport and server resources
pub mod server;

/// Tool call parsing and execution
pub mod tool_handlers;
