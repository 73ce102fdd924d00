//! Blocking HTTP access for remote definition documents.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::{LoaderError, Result};

const USER_AGENT: &str = concat!("wiring-loader/", env!("CARGO_PKG_VERSION"));

/// Attempts per document, including the first one.
const MAX_ATTEMPTS: u32 = 3;

/// Delay before the second attempt; doubled for each further attempt.
const RETRY_BASE_DELAY_MS: u64 = 250;

/// Outcome of one GET.
enum Attempt {
    Body(String),
    /// Transient failure worth another try.
    Transient(String),
}

/// Build the client shared by every remote resource of a loader.
pub fn create_client() -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?)
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(RETRY_BASE_DELAY_MS << attempt.saturating_sub(1))
}

fn fetch_once(client: &Client, url: &str) -> Result<Attempt> {
    let response = match client.get(url).send() {
        Ok(response) => response,
        Err(e) if e.is_connect() || e.is_timeout() => return Ok(Attempt::Transient(e.to_string())),
        Err(e) => return Err(LoaderError::Http(e)),
    };
    let status = response.status();
    if status.is_server_error() {
        return Ok(Attempt::Transient(format!("Server error: {status}")));
    }
    Ok(Attempt::Body(response.error_for_status()?.text()?))
}

/// Fetch a document as text.
///
/// Connection failures, timeouts and 5xx responses are retried with
/// exponential backoff; any other failure is returned at once.
pub fn download_text(client: &Client, url: &str) -> Result<String> {
    let mut last_failure = String::from("no attempt made");

    for attempt in 0..MAX_ATTEMPTS {
        if attempt > 0 {
            let delay = backoff(attempt);
            tracing::debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                url = %url,
                "Retrying download"
            );
            thread::sleep(delay);
        }

        match fetch_once(client, url)? {
            Attempt::Body(text) => return Ok(text),
            Attempt::Transient(reason) => {
                tracing::warn!(
                    url = %url,
                    attempt = attempt + 1,
                    max_attempts = MAX_ATTEMPTS,
                    reason = %reason,
                    "Transient download failure"
                );
                last_failure = reason;
            }
        }
    }

    Err(LoaderError::RetriesExhausted {
        attempts: MAX_ATTEMPTS,
        message: last_failure,
    })
}

/// Check with a HEAD request whether a URL answers with a success status.
///
/// Transport errors count as absent.
pub fn head_succeeds(client: &Client, url: &str) -> bool {
    match client.head(url).send() {
        Ok(response) => response.status().is_success(),
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "HEAD request failed");
            false
        }
    }
}
