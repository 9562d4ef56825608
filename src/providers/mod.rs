// ABOUTME: WHOOP data provider integration
// ABOUTME: Hosts the API client, query parameter validation, and the shared HTTP client
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::constants::limits;
use reqwest::{Client, ClientBuilder};
use std::sync::OnceLock;
use std::time::Duration;

/// WHOOP API client with authenticated request execution
pub mod whoop;

pub use whoop::{QueryWindow, WhoopClient};

/// Global shared HTTP client with connection pooling
static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Get or create the shared HTTP client
///
/// Timeouts bound every outbound call; expiry surfaces as a network error.
pub fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| {
        ClientBuilder::new()
            .timeout(Duration::from_secs(limits::HTTP_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}
