use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

/// Error raised by the email transport. Always tolerated by the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("email transport request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("email transport rejected the message: {0}")]
    Rejected(String),
}

/// Outbound email seam. Implementations queue one message per call.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError>;
}

#[derive(Serialize)]
struct OutboundEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Resend-style HTTP transport: bearer-keyed `POST /emails` with an HTML
/// body.
pub struct HttpEmailTransport {
    client: Client,
    base_url: String,
    api_key: String,
    sender: String,
}

impl HttpEmailTransport {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl EmailTransport for HttpEmailTransport {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError> {
        let url = format!("{}/emails", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&OutboundEmail {
                from: &self.sender,
                to: [to],
                subject,
                html,
            })
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(EmailError::Rejected(format!("{status}: {body}")))
        }
    }
}
