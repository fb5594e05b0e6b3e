//! Retrying JSON fetches over a pluggable [`HttpClient`].

mod basic;
mod client;
mod retry;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use retry::{DEFAULT_BACKOFF, DEFAULT_DELAY, DEFAULT_MAX_ATTEMPTS, RetryPolicy};

use reqwest::{Method, Request, Url};
use serde_json::Value;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// GETs `url` through `client` and decodes the body as JSON, retrying
/// connection errors, timeouts, non-2xx statuses, and undecodable bodies
/// according to `policy`.
///
/// Errors never carry the full URL: credential wrappers may have appended a
/// key to the query string.
pub async fn fetch_json<C: HttpClient>(
    client: &C,
    policy: &RetryPolicy,
    url: &Url,
) -> Result<Value> {
    let label = display_url(url);
    let label = label.as_str();

    policy.run(label, || fetch_once(client, url, label)).await
}

async fn fetch_once<C: HttpClient>(client: &C, url: &Url, label: &str) -> Result<Value> {
    let req = Request::new(Method::GET, url.clone());
    let resp = client
        .execute(req)
        .await
        .map_err(|e| PipelineError::Network {
            url: label.to_string(),
            source: e.without_url(),
        })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(PipelineError::HttpStatus {
            url: label.to_string(),
            status,
        });
    }

    let body = resp
        .json::<Value>()
        .await
        .map_err(|e| PipelineError::Network {
            url: label.to_string(),
            source: e.without_url(),
        })?;
    debug!(url = label, "Response decoded");
    Ok(body)
}

/// Scheme, host and path only.
fn display_url(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}
