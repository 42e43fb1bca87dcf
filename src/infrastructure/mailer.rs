use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::domain::errors::DomainError;
use crate::domain::ports::Mailer;

#[derive(Serialize)]
struct OutgoingMail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Posts each mail as JSON to an HTTP relay. Any non-2xx answer is a failure.
pub struct HttpMailer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(endpoint: String, api_key: Option<String>, from: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            from,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), DomainError> {
        let mut request = self.client.post(&self.endpoint).json(&OutgoingMail {
            from: &self.from,
            to,
            subject,
            html,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::Internal(format!("mail relay unreachable: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::Internal(format!(
                "mail relay answered {status}"
            )));
        }
        log::debug!("Mail '{}' delivered to relay for {}", subject, to);
        Ok(())
    }
}

/// Used when no relay is configured: mails are only logged.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _html: &str) -> Result<(), DomainError> {
        log::info!("Mail relay not configured; skipping '{}' to {}", subject, to);
        Ok(())
    }
}
