// ABOUTME: OAuth module for WHOOP credential management
// ABOUTME: Centralizes the credential store and the token refresh protocol
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

/// In-memory credential store with single-flight token refresh
pub mod tokens;

pub use tokens::{TokenManager, TokenResponse};
