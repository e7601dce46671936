//! HTTP client for the mail relay service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::error::DispatchError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport seam for sending mail, so the notifier can be tested
/// without a running relay.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send_mail(&self, request: &MailRequest) -> Result<MailResponse, DispatchError>;

    async fn health_check(&self) -> Result<(), DispatchError>;
}

/// Request to send one email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailRequest {
    pub to: String,
    pub subject: String,
    #[serde(rename = "content")]
    pub html_content: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub from: String,
    #[serde(rename = "fromName", skip_serializing_if = "String::is_empty")]
    pub from_name: String,
}

/// Response from a successful send
#[derive(Debug, Clone, Deserialize)]
pub struct MailResponse {
    pub to: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct MailClient {
    base_url: String,
    client: reqwest::Client,
}

impl MailClient {
    /// Create a client for the relay at `base_url`; `timeout` defaults
    /// to 30 seconds.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;
        Ok(MailClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl MailTransport for MailClient {
    async fn send_mail(&self, request: &MailRequest) -> Result<MailResponse, DispatchError> {
        if request.to.is_empty() {
            return Err(DispatchError::InvalidRequest("recipient address is required"));
        }
        if request.subject.is_empty() {
            return Err(DispatchError::InvalidRequest("subject is required"));
        }
        if request.html_content.is_empty() {
            return Err(DispatchError::InvalidRequest("content is required"));
        }

        let url = format!("{}/v1/sendmail", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|parsed| parsed.message)
                .unwrap_or(body);
            return Err(DispatchError::BadResponse {
                code: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<MailResponse>().await?)
    }

    async fn health_check(&self) -> Result<(), DispatchError> {
        let url = format!("{}/", self.base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DispatchError::BadResponse {
                code: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
