// ABOUTME: Main library entry point for the WHOOP MCP server
// ABOUTME: Exposes WHOOP API v2 read endpoints as MCP tools with OAuth2 token refresh
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#![deny(unsafe_code)]

//! # WHOOP MCP Server
//!
//! A Model Context Protocol (MCP) server exposing WHOOP API v2 data —
//! physiological cycles, recovery, sleep, and workouts — as tools for
//! Claude and other AI assistants.
//!
//! The load-bearing piece is the token lifecycle: WHOOP access tokens are
//! short-lived, so every API call goes through an executor that detects a
//! 401, exchanges the refresh token for a new access token exactly once,
//! updates the in-memory credential store, and retries the original
//! request with the fresh credential.
//!
//! ## Quick Start
//!
//! 1. Run `whoop-auth-setup` to complete the OAuth2 flow and obtain tokens
//! 2. Export the printed `WHOOP_*` environment variables
//! 3. Start `whoop-mcp-server` and connect from an MCP client over stdio
//!
//! ## Architecture
//!
//! - **oauth**: credential store and single-flight token refresh
//! - **providers**: WHOOP API client with the 401-refresh-retry executor
//! - **mcp**: MCP protocol schema, handlers, and stdio transport
//! - **config**: environment-based configuration with fail-fast checks

/// Environment-based configuration management
pub mod config;

/// Application constants: endpoints, environment variables, limits
pub mod constants;

/// Unified error handling with a structured failure taxonomy
pub mod errors;

/// Logging configuration and structured logging setup
pub mod logging;

/// Model Context Protocol (MCP) implementation over stdio
pub mod mcp;

/// OAuth2 credential store and token refresh protocol
pub mod oauth;

/// WHOOP API client and authenticated request execution
pub mod providers;
