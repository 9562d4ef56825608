// ABOUTME: OAuth2 bootstrap helper for the WHOOP MCP server
// ABOUTME: Completes the authorization-code flow and prints the server environment configuration
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # WHOOP Auth Setup
//!
//! Walks through the OAuth 2.0 authorization-code flow: prints the
//! authorization URL, listens for the callback on localhost, verifies the
//! `state` parameter, exchanges the code for tokens, and prints the
//! `WHOOP_*` environment variables plus a ready-to-paste MCP client
//! configuration block.
//!
//! The redirect URI (`http://localhost:<port>/callback`) must be
//! registered in the WHOOP Developer Dashboard.

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::{timeout, Duration};
use tracing::{info, warn};
use url::Url;
use whoop_mcp_server::constants::whoop_api;

#[derive(Parser)]
#[command(name = "whoop-auth-setup")]
#[command(about = "Set up OAuth2 authentication for the WHOOP API")]
struct Cli {
    /// OAuth2 client ID (falls back to WHOOP_CLIENT_ID)
    #[arg(long)]
    client_id: Option<String>,

    /// OAuth2 client secret (falls back to WHOOP_CLIENT_SECRET)
    #[arg(long)]
    client_secret: Option<String>,

    /// Callback port; the redirect URI must match the dashboard entry
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Seconds to wait for the browser callback
    #[arg(long, default_value_t = 300)]
    timeout_secs: u64,
}

/// Token endpoint response for the authorization-code exchange
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let client_id = resolve(cli.client_id, "WHOOP_CLIENT_ID")?;
    let client_secret = resolve(cli.client_secret, "WHOOP_CLIENT_SECRET")?;

    let redirect_uri = format!("http://localhost:{}/callback", cli.port);
    let state = uuid::Uuid::new_v4().to_string();

    let auth_url = format!(
        "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}",
        whoop_api::AUTH_URL,
        urlencoding::encode(&client_id),
        urlencoding::encode(&redirect_uri),
        urlencoding::encode(whoop_api::DEFAULT_SCOPES),
        urlencoding::encode(&state),
    );

    println!("\nPlease visit this URL to authorize the application:");
    println!("{auth_url}\n");

    let code = wait_for_callback(cli.port, &state, cli.timeout_secs).await?;

    info!("Received authorization code, exchanging for tokens...");
    let tokens = exchange_code(&client_id, &client_secret, &code, &redirect_uri).await?;

    print_configuration(&client_id, &client_secret, &tokens);
    Ok(())
}

/// Take the CLI value or fall back to the environment variable
fn resolve(arg: Option<String>, var: &str) -> Result<String> {
    arg.or_else(|| env::var(var).ok().filter(|v| !v.trim().is_empty()))
        .ok_or_else(|| anyhow!("{var} is not set; pass --{} or export it", var.to_lowercase().replace('_', "-")))
}

/// Listen for the OAuth callback and return the authorization code
async fn wait_for_callback(port: u16, expected_state: &str, timeout_secs: u64) -> Result<String> {
    let listener = TcpListener::bind(format!("127.0.0.1:{port}"))
        .await
        .with_context(|| format!("failed to bind callback listener on port {port}"))?;
    info!("Listening for OAuth callback on port {port}");

    let (tx, rx) = oneshot::channel();
    let expected_state = expected_state.to_owned();

    let server = tokio::spawn(async move {
        let mut tx = Some(tx);
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            let (reader, mut writer) = socket.into_split();
            let mut line = String::new();

            if BufReader::new(reader).read_line(&mut line).await.unwrap_or(0) == 0 {
                continue;
            }

            // Request line: GET /callback?code=...&state=... HTTP/1.1
            let Some(path) = line.split_whitespace().nth(1) else {
                continue;
            };
            let Ok(url) = Url::parse(&format!("http://localhost{path}")) else {
                continue;
            };
            if url.path() != "/callback" {
                respond(&mut writer, 404, "Not found").await;
                continue;
            }

            let params: HashMap<_, _> = url.query_pairs().into_owned().collect();
            let outcome = callback_outcome(&params, &expected_state);

            match &outcome {
                Ok(_) => {
                    respond(
                        &mut writer,
                        200,
                        "<h1>Authorization successful!</h1>\
                         <p>You can close this window and return to the terminal.</p>",
                    )
                    .await;
                }
                Err(e) => {
                    respond(
                        &mut writer,
                        400,
                        &format!("<h1>Authorization failed</h1><p>{e}</p>"),
                    )
                    .await;
                }
            }

            if let Some(tx) = tx.take() {
                let _ = tx.send(outcome);
            }
            break;
        }
    });

    let result = timeout(Duration::from_secs(timeout_secs), rx).await;
    server.abort();

    match result {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(_)) => bail!("callback listener stopped unexpectedly"),
        Err(_) => bail!("no authorization code received within {timeout_secs}s"),
    }
}

/// Validate the callback parameters and extract the code
fn callback_outcome(params: &HashMap<String, String>, expected_state: &str) -> Result<String> {
    if let Some(error) = params.get("error") {
        let description = params
            .get("error_description")
            .map_or("unknown error", String::as_str);
        bail!("{error}: {description}");
    }

    // CSRF protection
    if params.get("state").map(String::as_str) != Some(expected_state) {
        bail!("invalid state parameter");
    }

    params
        .get("code")
        .cloned()
        .ok_or_else(|| anyhow!("no authorization code in callback"))
}

/// Write a minimal HTML response to the callback socket
async fn respond(writer: &mut (impl AsyncWriteExt + Unpin), status: u16, body: &str) {
    let reason = if status == 200 { "OK" } else { "Bad Request" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: text/html\r\n\r\n\
         <html><body>{body}</body></html>"
    );
    if let Err(e) = writer.write_all(response.as_bytes()).await {
        warn!("Failed to write callback response: {e}");
    }
}

/// Exchange the authorization code for tokens
async fn exchange_code(
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenResponse> {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("redirect_uri", redirect_uri),
    ];

    let response = reqwest::Client::new()
        .post(whoop_api::TOKEN_URL)
        .form(&params)
        .send()
        .await
        .context("token exchange request failed")?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("token exchange failed with status {status}: {body}");
    }

    response
        .json()
        .await
        .context("failed to parse token response")
}

/// Print the environment configuration and an MCP client config block
fn print_configuration(client_id: &str, client_secret: &str, tokens: &TokenResponse) {
    println!("\nAuthorization successful!\n");
    if let Some(expires_in) = tokens.expires_in {
        println!("Access token expires in {expires_in}s (refreshed automatically on 401).\n");
    }

    println!("Export these variables for whoop-mcp-server:\n");
    println!("export WHOOP_CLIENT_ID=\"{client_id}\"");
    println!("export WHOOP_CLIENT_SECRET=\"{client_secret}\"");
    println!("export WHOOP_ACCESS_TOKEN=\"{}\"", tokens.access_token);
    if let Some(refresh_token) = &tokens.refresh_token {
        println!("export WHOOP_REFRESH_TOKEN=\"{refresh_token}\"");
    }

    let config = serde_json::json!({
        "mcpServers": {
            "whoop": {
                "command": "whoop-mcp-server",
                "env": {
                    "WHOOP_CLIENT_ID": client_id,
                    "WHOOP_CLIENT_SECRET": client_secret,
                    "WHOOP_ACCESS_TOKEN": tokens.access_token,
                    "WHOOP_REFRESH_TOKEN": tokens.refresh_token,
                }
            }
        }
    });

    println!("\nOr add this to your MCP client configuration:\n");
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_default()
    );
}
