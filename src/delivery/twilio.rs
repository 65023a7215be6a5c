use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::MessageSender;
use crate::PlannerError;
use crate::config::TwilioConfig;

/// Sends WhatsApp messages through the Twilio Messages API
pub struct TwilioWhatsAppSender {
    client: Client,
    account_sid: String,
    auth_token: String,
    from: String,
    to: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TwilioError {
    message: Option<String>,
    code: Option<u32>,
}

impl TwilioWhatsAppSender {
    pub fn from_config(config: &TwilioConfig) -> crate::Result<Self> {
        let required = |value: &Option<String>, what: &str| {
            value
                .clone()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| PlannerError::not_configured("WhatsApp delivery", format!("no Twilio {what}")))
        };

        Ok(Self {
            client: Client::new(),
            account_sid: required(&config.account_sid, "account SID")?,
            auth_token: required(&config.auth_token, "auth token")?,
            from: whatsapp_address(&required(&config.from, "sender number")?),
            to: whatsapp_address(&required(&config.to, "recipient number")?),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }
}

/// Twilio needs the `whatsapp:` scheme on both numbers
fn whatsapp_address(number: &str) -> String {
    let number = number.trim();
    if number.starts_with("whatsapp:") {
        number.to_string()
    } else {
        format!("whatsapp:{number}")
    }
}

#[async_trait]
impl MessageSender for TwilioWhatsAppSender {
    #[instrument(skip(self, body), fields(body_len = body.chars().count()))]
    async fn send(&self, body: &str) -> crate::Result<()> {
        let params = [("From", self.from.as_str()), ("To", self.to.as_str()), ("Body", body)];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| PlannerError::delivery(format!("Twilio request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            debug!("Twilio accepted message");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<TwilioError>(&text)
            .ok()
            .and_then(|e| match (e.code, e.message) {
                (Some(code), Some(message)) => Some(format!("{message} (code {code})")),
                (None, Some(message)) => Some(message),
                _ => None,
            })
            .unwrap_or(text);
        Err(PlannerError::delivery(format!("Twilio returned HTTP {status}: {detail}")))
    }
}
