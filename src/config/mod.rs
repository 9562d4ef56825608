// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Handles environment-based credential and endpoint configuration
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

/// Environment-based configuration management
pub mod environment;

pub use environment::{ServerConfig, WhoopApiConfig, WhoopCredentialsConfig};
