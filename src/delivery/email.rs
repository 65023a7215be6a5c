use async_trait::async_trait;
use lettre::{
    Message, Transport, message::Mailbox, transport::smtp::SmtpTransport,
    transport::smtp::authentication::Credentials,
};
use tracing::info;

use super::MessageSender;
use crate::PlannerError;
use crate::config::EmailConfig;

/// Sends each chunk as a plain-text e-mail over SMTP
pub struct EmailSender {
    mailer: SmtpTransport,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSender {
    pub fn from_config(config: &EmailConfig) -> crate::Result<Self> {
        let required = |value: &Option<String>, what: &str| {
            value
                .clone()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| PlannerError::not_configured("E-mail delivery", format!("no {what}")))
        };

        let address = required(&config.address, "sender address")?;
        let password = required(&config.password, "app password")?;
        let to = required(&config.to, "recipient address")?;

        let from: Mailbox = format!("TravelAI <{address}>")
            .parse()
            .map_err(|e| PlannerError::config(format!("Failed to parse from address: {e}")))?;
        let to: Mailbox = to
            .trim()
            .parse()
            .map_err(|e| PlannerError::config(format!("Failed to parse to address: {e}")))?;

        let mailer = SmtpTransport::relay(&config.relay)
            .map_err(|e| PlannerError::config(format!("Invalid SMTP relay: {e}")))?
            .credentials(Credentials::new(address, password))
            .build();

        Ok(Self { mailer, from, to })
    }
}

#[async_trait]
impl MessageSender for EmailSender {
    async fn send(&self, body: &str) -> crate::Result<()> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject("Your AI Travel Plan")
            .body(body.to_string())
            .map_err(|e| PlannerError::delivery(format!("Failed to build email: {e}")))?;

        // SmtpTransport blocks
        let mailer = self.mailer.clone();
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| PlannerError::delivery(format!("Email task failed: {e}")))?
            .map_err(|e| PlannerError::delivery(format!("Failed to send email: {e}")))?;

        info!("Sent itinerary email to {}", self.to);
        Ok(())
    }
}
