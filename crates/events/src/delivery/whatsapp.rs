//! WhatsApp delivery via an HTTP gateway.
//!
//! Same shape as the SMS channel: a single POST per message, authenticated
//! with a bearer token, unconfigured when `WHATSAPP_API_URL` is absent.

use std::time::Duration;

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for WhatsApp delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WhatsAppError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("WhatsApp gateway returned HTTP {0}")]
    HttpStatus(u16),
}

/// Configuration for the WhatsApp gateway.
#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    /// Gateway endpoint URL.
    pub api_url: String,
    /// Gateway API key, sent as a bearer token.
    pub api_key: String,
    /// Registered sender id.
    pub sender_id: String,
}

impl WhatsAppConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `WHATSAPP_API_URL` is not set.
    ///
    /// | Variable             | Required |
    /// |----------------------|----------|
    /// | `WHATSAPP_API_URL`   | yes      |
    /// | `WHATSAPP_API_KEY`   | yes      |
    /// | `WHATSAPP_SENDER_ID` | yes      |
    pub fn from_env() -> Option<Self> {
        Some(Self {
            api_url: std::env::var("WHATSAPP_API_URL").ok()?,
            api_key: std::env::var("WHATSAPP_API_KEY").ok()?,
            sender_id: std::env::var("WHATSAPP_SENDER_ID").ok()?,
        })
    }
}

/// Delivers WhatsApp messages through the configured gateway.
pub struct WhatsAppDelivery {
    config: WhatsAppConfig,
    client: reqwest::Client,
}

impl WhatsAppDelivery {
    /// Create a new delivery service with a pre-configured HTTP client.
    pub fn new(config: WhatsAppConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { config, client }
    }

    /// Send a single WhatsApp message to `phone_number`.
    pub async fn deliver(&self, phone_number: &str, message: &str) -> Result<(), WhatsAppError> {
        let payload = serde_json::json!({
            "to": phone_number,
            "from": self.config.sender_id,
            "text": message,
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WhatsAppError::HttpStatus(response.status().as_u16()));
        }

        tracing::info!(to = phone_number, "WhatsApp message sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_api_url() {
        std::env::remove_var("WHATSAPP_API_URL");
        assert!(WhatsAppConfig::from_env().is_none());
    }
}
