//! Outgoing mail hand-off
//!
//! Delivery itself is somebody else's job: messages are POSTed as JSON to a
//! configured webhook (a mail relay, a transactional mail provider's HTTP
//! API, ...). Without a webhook the message only goes to the log.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Mail webhook answered with status {0}")]
    Status(reqwest::StatusCode),
}

/// A message ready to hand to the delivery hook
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    webhook_url: Option<String>,
    from: String,
}

impl Mailer {
    pub fn new(webhook_url: Option<String>, from: String) -> Self {
        if webhook_url.is_none() {
            warn!("MAIL_WEBHOOK_URL not set; outgoing mail will only be logged");
        }

        Self {
            client: reqwest::Client::new(),
            webhook_url,
            from,
        }
    }

    /// Build the one-time passcode message for `to`
    pub fn otp_mail(&self, to: &str, code: &str, ttl_seconds: u64) -> OutgoingMail {
        OutgoingMail {
            from: self.from.clone(),
            to: to.to_string(),
            subject: "Your OTP Code".to_string(),
            text: format!(
                "Your OTP code is {}. It is valid for {} minutes.",
                code,
                ttl_seconds / 60
            ),
        }
    }

    pub async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let Some(url) = &self.webhook_url else {
            info!("Mail to {} not delivered (no webhook configured)", mail.to);
            debug!("Undelivered mail body: {}", mail.text);
            return Ok(());
        };

        let response = self.client.post(url).json(mail).send().await?;
        if !response.status().is_success() {
            return Err(MailError::Status(response.status()));
        }

        info!("Mail to {} handed to delivery webhook", mail.to);
        Ok(())
    }
}
