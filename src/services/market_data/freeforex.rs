use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::{errors::FetchError, Quote, RateSource};

pub const DEFAULT_BASE_URL: &str = "https://www.freeforexapi.com";

/// Client for the FreeForexAPI live quote endpoint.
pub struct FreeForexClient {
    client: Client,
    base_url: String,
    require_success_code: bool,
}

impl FreeForexClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        require_success_code: bool,
    ) -> anyhow::Result<FreeForexClient> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(FreeForexClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            require_success_code,
        })
    }

    fn live_url(&self) -> String {
        format!("{}/api/live", self.base_url)
    }
}

#[async_trait]
impl RateSource for FreeForexClient {
    async fn fetch(&self, code: &str) -> Result<Quote, FetchError> {
        debug!("Requesting live quote for {}", code);
        let res = self
            .client
            .get(self.live_url())
            .query(&[("pairs", code)])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        parse_live_response(status, &body, code, self.require_success_code)
    }
}

/// Validates a live quote response and extracts the quote for `code`.
///
/// Checks run in a fixed order and the first failing one decides the error:
/// HTTP status, JSON body, provider `code` field (only when
/// `require_success_code` is set), `rates` mapping, presence of the pair,
/// shape of the pair's entry.
pub fn parse_live_response(
    status: StatusCode,
    body: &str,
    code: &str,
    require_success_code: bool,
) -> Result<Quote, FetchError> {
    if status != StatusCode::OK {
        return Err(FetchError::Transport(format!("HTTP status {}", status)));
    }

    let data: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::Schema(format!("body is not valid JSON: {}", e)))?;

    if require_success_code {
        if let Some(provider_code) = data.get("code") {
            if provider_code.as_i64() != Some(200) {
                return Err(FetchError::Transport(format!(
                    "provider returned code {}",
                    provider_code
                )));
            }
        }
    }

    let rates = data
        .get("rates")
        .and_then(Value::as_object)
        .ok_or_else(|| FetchError::Schema("missing `rates` mapping".to_string()))?;

    let entry = rates
        .get(code)
        .ok_or_else(|| FetchError::NotFound(code.to_string()))?;

    let rate = entry
        .get("rate")
        .and_then(Value::as_f64)
        .ok_or_else(|| FetchError::Schema(format!("`rate` for {} is not a number", code)))?;
    let timestamp = entry
        .get("timestamp")
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            FetchError::Schema(format!("`timestamp` for {} is not an integer", code))
        })?;

    Quote::from_raw(rate, timestamp)
}
