use crate::config::WhatsAppConfig;
use crate::errors::AppError;
use serde_json::json;
use std::time::Duration;

/// Client for the WhatsApp Cloud API messages endpoint.
#[derive(Clone)]
pub struct WhatsAppClient {
    client: reqwest::Client,
    messages_url: String,
    access_token: String,
}

impl WhatsAppClient {
    /// Creates a new `WhatsAppClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API base URL, e.g. `https://graph.facebook.com`.
    /// * `api_version` - Graph API version, e.g. `v21.0`.
    /// * `phone_number_id` - Sender phone-number id.
    /// * `access_token` - Bearer token.
    /// * `timeout` - Per-request timeout.
    pub fn new(
        base_url: &str,
        api_version: &str,
        phone_number_id: &str,
        access_token: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create WhatsApp client: {}", e))
            })?;

        Ok(Self {
            client,
            messages_url: format!(
                "{}/{}/{}/messages",
                base_url.trim_end_matches('/'),
                api_version,
                phone_number_id
            ),
            access_token,
        })
    }

    /// Builds a client from configuration.
    ///
    /// Returns `Ok(None)` when the access token or phone-number id is missing; replies
    /// are then logged instead of sent.
    pub fn from_config(config: &WhatsAppConfig, timeout: Duration) -> Result<Option<Self>, AppError> {
        let (Some(token), Some(phone_number_id)) = (&config.access_token, &config.phone_number_id)
        else {
            return Ok(None);
        };

        Self::new(
            &config.api_base_url,
            &config.api_version,
            phone_number_id,
            token.clone(),
            timeout,
        )
        .map(Some)
    }

    /// Sends a text message.
    ///
    /// # Arguments
    ///
    /// * `to` - Recipient WhatsApp id.
    /// * `body` - Message text.
    pub async fn send_text(&self, to: &str, body: &str) -> Result<(), AppError> {
        tracing::info!("Sending WhatsApp reply to {}", to);

        let payload = json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "text",
            "text": { "preview_url": false, "body": body }
        });

        let response = self
            .client
            .post(&self.messages_url)
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("WhatsApp request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "WhatsApp API returned {}: {}",
                status, error_text
            )));
        }

        tracing::info!("✓ WhatsApp reply sent to {}", to);
        Ok(())
    }

    pub fn messages_url(&self) -> &str {
        &self.messages_url
    }
}
