// ABOUTME: Server binary exposing WHOOP API data over the MCP stdio transport
// ABOUTME: Loads environment credentials, fails fast on missing tokens, then serves tool calls
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # WHOOP MCP Server Binary
//!
//! Starts the stdio MCP server. Credentials come from `WHOOP_*`
//! environment variables; a missing access token aborts startup before
//! any tool call is accepted.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use whoop_mcp_server::{
    config::ServerConfig,
    logging,
    mcp::server::{McpServer, ServerResources},
};

#[derive(Parser)]
#[command(name = "whoop-mcp-server")]
#[command(about = "WHOOP MCP Server - WHOOP API v2 data for LLMs")]
#[command(version)]
struct Args {}

#[tokio::main]
async fn main() -> Result<()> {
    let _args = Args::parse();

    logging::init_from_env()?;

    // Fail fast: no access token, no server.
    let config = ServerConfig::from_env()?;

    info!("Starting WHOOP MCP Server");
    info!("{}", config.summary());

    let resources = Arc::new(ServerResources::from_config(&config));
    McpServer::new(resources).run().await
}
