//! SMS delivery via an HTTP gateway.
//!
//! [`SmsDelivery`] POSTs outbound messages to a bulk-SMS provider.
//! Configuration is loaded from environment variables; if `SMS_API_URL` is
//! not set the channel is considered unconfigured.

use std::time::Duration;

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for SMS delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("SMS gateway returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// SmsConfig
// ---------------------------------------------------------------------------

/// Configuration for the SMS gateway.
#[derive(Debug, Clone)]
pub struct SmsConfig {
    /// Gateway endpoint URL.
    pub api_url: String,
    /// Gateway API key, sent as a bearer token.
    pub api_key: String,
    /// Account username registered with the gateway.
    pub username: String,
}

impl SmsConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMS_API_URL` is not set.
    ///
    /// | Variable       | Required |
    /// |----------------|----------|
    /// | `SMS_API_URL`  | yes      |
    /// | `SMS_API_KEY`  | yes      |
    /// | `SMS_USERNAME` | yes      |
    pub fn from_env() -> Option<Self> {
        Some(Self {
            api_url: std::env::var("SMS_API_URL").ok()?,
            api_key: std::env::var("SMS_API_KEY").ok()?,
            username: std::env::var("SMS_USERNAME").ok()?,
        })
    }
}

// ---------------------------------------------------------------------------
// SmsDelivery
// ---------------------------------------------------------------------------

/// Delivers SMS messages through the configured gateway.
pub struct SmsDelivery {
    config: SmsConfig,
    client: reqwest::Client,
}

impl SmsDelivery {
    /// Create a new delivery service with a pre-configured HTTP client.
    pub fn new(config: SmsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { config, client }
    }

    /// Send a single SMS to `phone_number`.
    pub async fn deliver(&self, phone_number: &str, message: &str) -> Result<(), SmsError> {
        let payload = serde_json::json!({
            "username": self.config.username,
            "to": phone_number,
            "message": message,
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SmsError::HttpStatus(response.status().as_u16()));
        }

        tracing::info!(to = phone_number, "SMS sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_api_url() {
        std::env::remove_var("SMS_API_URL");
        assert!(SmsConfig::from_env().is_none());
    }
}
