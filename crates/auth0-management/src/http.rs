//! HTTP client wrapper with rate-limit retries and Management API error mapping

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use auth0_core::{Auth0Error, Result};

/// Error body returned by the Management API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, rename = "errorCode")]
    error_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl HttpClient {
    pub fn new(timeout_secs: u64, max_retries: u32, retry_delay_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("auth0-provider/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Auth0Error::internal_error(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_retries,
            retry_delay_ms,
        })
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Execute a request, retrying only when the API rate-limits us.
    ///
    /// Transport failures and every other error status are returned at once.
    pub async fn execute_with_retry(&self, request_builder: RequestBuilder) -> Result<Response> {
        let mut attempt = 0;

        loop {
            let rb = request_builder.try_clone().ok_or_else(|| {
                Auth0Error::internal_error("Request cannot be cloned for retry")
            })?;

            let response = rb
                .send()
                .await
                .map_err(|e| Auth0Error::transport(e.to_string()))?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS || attempt >= self.max_retries {
                return Ok(response);
            }

            let delay = retry_after(&response)
                .unwrap_or_else(|| Duration::from_millis(backoff_ms(self.retry_delay_ms, attempt)));
            attempt += 1;
            warn!(
                "Rate limited by the Management API, retrying in {:?} (attempt {}/{})",
                delay, attempt, self.max_retries
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Exponential backoff, saturating instead of overflowing on long retry budgets
fn backoff_ms(base_ms: u64, attempt: u32) -> u64 {
    base_ms.saturating_mul(2u64.checked_pow(attempt).unwrap_or(u64::MAX))
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Turn a non-success response into an error; 404 becomes `NotFound`.
pub async fn error_for_status(response: Response, entity_type: &str, id: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(Auth0Error::not_found(entity_type, id));
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => {
            let message = parsed
                .message
                .or(parsed.error)
                .unwrap_or_else(|| status.to_string());
            match parsed.error_code {
                Some(code) => format!("{} ({})", message, code),
                None => message,
            }
        }
        Err(_) if body.is_empty() => status.to_string(),
        Err(_) => body,
    };

    Err(Auth0Error::api(status.as_u16(), message))
}
