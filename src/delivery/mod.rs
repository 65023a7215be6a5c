//! Chunked message delivery
//!
//! A document is split with [`crate::chunk::chunk`] and handed to a
//! [`MessageSender`] one chunk at a time, in order. The first failing chunk
//! stops delivery; chunks already sent stay sent.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::chunk;
use crate::config::{Channel, DeliveryConfig};

pub mod email;
pub mod twilio;

pub use email::EmailSender;
pub use twilio::TwilioWhatsAppSender;

/// Sends one message body over a size-limited channel
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, body: &str) -> crate::Result<()>;
}

/// Outcome of delivering one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryReport {
    Delivered {
        chunks: usize,
    },
    Failed {
        sent: usize,
        total: usize,
        error: String,
    },
}

impl DeliveryReport {
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryReport::Delivered { .. })
    }
}

/// Split `text` into chunks of at most `max_len` characters and send them in order
#[instrument(skip(sender, text), fields(text_len = text.len()))]
pub async fn deliver(sender: &dyn MessageSender, text: &str, max_len: usize) -> DeliveryReport {
    let chunks = chunk::chunk(text, max_len);
    let total = chunks.len();

    for (sent, body) in chunks.iter().enumerate() {
        if let Err(e) = sender.send(body).await {
            warn!("Delivery stopped at chunk {}/{}: {}", sent + 1, total, e);
            return DeliveryReport::Failed {
                sent,
                total,
                error: e.to_string(),
            };
        }
    }

    info!("Delivered {} chunks", total);
    DeliveryReport::Delivered { chunks: total }
}

/// Message prefix used when sending a plan
#[must_use]
pub fn compose_message(destination: &str, document: &str) -> String {
    format!("Your AI Travel Plan for {destination}:\n\n{document}")
}

/// Build the configured sender; fails with `NotConfigured` when credentials are missing
pub fn sender_from_config(config: &DeliveryConfig) -> crate::Result<Arc<dyn MessageSender>> {
    Ok(match config.channel {
        Channel::Whatsapp => Arc::new(TwilioWhatsAppSender::from_config(&config.twilio)?),
        Channel::Email => Arc::new(EmailSender::from_config(&config.email)?),
    })
}
