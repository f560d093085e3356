//! HTTP invitation notifier.
//!
//! Sends the workspace invitation over the provider's member-invite
//! endpoint. The request timeout configured here is the whole retry
//! policy; the orchestrator only sees the final outcome.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use seatflow_core::config::provider::ProviderConfig;
use seatflow_core::error::{AppError, ErrorKind};
use seatflow_core::result::AppResult;
use seatflow_core::traits::InviteNotifier;

/// Invitation notifier backed by the provider HTTP API.
#[derive(Debug, Clone)]
pub struct HttpInviteNotifier {
    client: Client,
    base_url: String,
}

impl HttpInviteNotifier {
    /// Build a notifier from configuration.
    pub fn new(config: &ProviderConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::configuration(format!("Failed to build provider HTTP client: {e}"))
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl InviteNotifier for HttpInviteNotifier {
    async fn send_invite(&self, secret: &str, account_id: &str, email: &str) -> AppResult<()> {
        let url = format!("{}/accounts/{}/invites", self.base_url, account_id);
        let body = serde_json::json!({
            "email_address": email,
            "role": "standard-user",
            "resend_emails": true,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(secret)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Invite request failed: {e}"),
                    e,
                )
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(account_id, email, "Invite accepted by provider");
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        Err(AppError::external_service(format!(
            "Provider rejected invite ({status}): {detail}"
        )))
    }
}
