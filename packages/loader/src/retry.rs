//! HTTP retry helper for transient errors.
//!
//! [`send_text`] retries connection failures, timeouts, HTTP 429 and HTTP
//! 5xx with exponential backoff. Any other 4xx is permanent: a missing
//! subdistrict file is not going to appear on the next attempt.

use std::time::Duration;

use crate::LoaderError;

/// Delay before the first retry; doubles on each further attempt.
const BASE_DELAY: Duration = Duration::from_millis(250);

/// Backoff before retry number `attempt` (1-based).
#[must_use]
pub fn backoff(attempt: u32) -> Duration {
    BASE_DELAY.saturating_mul(1u32 << attempt.saturating_sub(1).min(16))
}

/// Sum of every backoff delay taken by `max_retries` retries.
#[must_use]
pub fn total_backoff(max_retries: u32) -> Duration {
    (1..=max_retries).map(backoff).sum()
}

/// Sends the request built by `build_request` and returns the body text.
///
/// The closure is called once per attempt since request builders are
/// consumed by `.send()`.
///
/// # Errors
///
/// Returns [`LoaderError::Status`] for a non-retryable status or when
/// retries are exhausted on 429/5xx, and [`LoaderError::Http`] for a
/// permanent or exhausted transport error.
#[allow(clippy::future_not_send)]
pub async fn send_text<F>(path: &str, build_request: F, max_retries: u32) -> Result<String, LoaderError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(path, &build_request, max_retries).await?;
    Ok(response.text().await?)
}

#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    path: &str,
    build_request: &F,
    max_retries: u32,
) -> Result<reqwest::Response, LoaderError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;
    loop {
        if attempt > 0 {
            let delay = backoff(attempt);
            log::debug!("  retry {attempt}/{max_retries} for {path} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error for {path}: {e}");
                    attempt += 1;
                    continue;
                }
                return Err(LoaderError::Http(e));
            }
            Ok(response) => {
                let status = response.status();
                let retryable =
                    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error();

                if retryable && attempt < max_retries {
                    log::warn!("  HTTP {status} for {path}");
                    attempt += 1;
                    continue;
                }
                if !status.is_success() {
                    return Err(LoaderError::Status {
                        path: path.to_string(),
                        status: status.as_u16(),
                    });
                }
                return Ok(response);
            }
        }
    }
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}
