use anyhow::{anyhow, Context, Result};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, warn};

use crate::error::ScrapeError;

pub fn create_client() -> Result<Client> {
    let client = ClientBuilder::new()
        .user_agent(concat!("flower-scraper/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(25))
        .pool_max_idle_per_host(2)
        .build()?;

    Ok(client)
}

/// Rate limits and server errors are worth another try; other statuses are not.
fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

pub async fn send_with_retry(request: RequestBuilder, max_retries: u32) -> Result<Response> {
    let mut attempts = 0;
    let mut last_error = None;

    while attempts < max_retries {
        let attempt = request
            .try_clone()
            .context("Request body cannot be replayed")?;

        match attempt.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }
                let body = response.text().await.unwrap_or_default();
                let failure = ScrapeError::Http {
                    status: status.as_u16(),
                    body,
                };
                if !is_retryable(status) {
                    return Err(failure.into());
                }
                warn!("HTTP error {}", status);
                last_error = Some(failure.into());
            }
            Err(e) => {
                error!("Request failed: {}", e);
                last_error = Some(e.into());
            }
        }

        attempts += 1;
        if attempts < max_retries {
            let delay = Duration::from_secs(2u64.pow(attempts));
            warn!("Retrying in {:?}... (attempt {}/{})", delay, attempts + 1, max_retries);
            sleep(delay).await;
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow!("Max retries exceeded")))
        .context(format!("Request failed after {} attempts", max_retries))
}
