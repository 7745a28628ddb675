//! Notification dispatcher.
//!
//! [`Dispatcher`] is the single entry point for getting a message to a
//! user. [`notify`](Dispatcher::notify) writes the durable notification
//! record; [`send_external`](Dispatcher::send_external) pushes a copy
//! through an off-band channel (SMS, WhatsApp, email) on a best-effort
//! basis -- failures are logged and swallowed, never surfaced to the
//! ticket operation that triggered them.
//!
//! Channel configuration is passed in at construction; nothing in here
//! reads process-wide globals.

use civicdesk_core::types::DbId;
use civicdesk_db::models::notification::Notification;
use civicdesk_db::repositories::NotificationRepo;
use civicdesk_db::DbPool;

use crate::delivery::email::{EmailConfig, EmailDelivery};
use crate::delivery::sms::{SmsConfig, SmsDelivery};
use crate::delivery::whatsapp::{WhatsAppConfig, WhatsAppDelivery};

/// Off-band delivery channel selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalChannel {
    Sms,
    WhatsApp,
    Email,
}

/// Persists notifications and fans copies out to external channels.
pub struct Dispatcher {
    pool: DbPool,
    email: Option<EmailDelivery>,
    sms: Option<SmsDelivery>,
    whatsapp: Option<WhatsAppDelivery>,
}

impl Dispatcher {
    /// Create a dispatcher with explicit channel configuration.
    ///
    /// A `None` config disables that channel; sends to it become logged
    /// no-ops.
    pub fn new(
        pool: DbPool,
        email: Option<EmailConfig>,
        sms: Option<SmsConfig>,
        whatsapp: Option<WhatsAppConfig>,
    ) -> Self {
        Self {
            pool,
            email: email.map(EmailDelivery::new),
            sms: sms.map(SmsDelivery::new),
            whatsapp: whatsapp.map(WhatsAppDelivery::new),
        }
    }

    /// Build a dispatcher from environment variables, enabling whichever
    /// channels are configured.
    pub fn from_env(pool: DbPool) -> Self {
        Self::new(
            pool,
            EmailConfig::from_env(),
            SmsConfig::from_env(),
            WhatsAppConfig::from_env(),
        )
    }

    /// Persist a notification record for `user_id`.
    ///
    /// This is the durable half of delivery: it succeeds or fails with the
    /// database, independent of whether any realtime push or external
    /// channel reaches the user.
    pub async fn notify(
        &self,
        user_id: DbId,
        message: &str,
    ) -> Result<Notification, sqlx::Error> {
        NotificationRepo::create(&self.pool, user_id, message).await
    }

    /// Send a message through an external channel, best-effort.
    ///
    /// Never returns an error: an unconfigured channel or a failed send is
    /// logged at warn level and otherwise ignored.
    pub async fn send_external(&self, channel: ExternalChannel, recipient: &str, message: &str) {
        match channel {
            ExternalChannel::Sms => match &self.sms {
                Some(sms) => {
                    if let Err(e) = sms.deliver(recipient, message).await {
                        tracing::warn!(to = recipient, error = %e, "SMS delivery failed");
                    }
                }
                None => tracing::debug!(to = recipient, "SMS channel not configured, skipping"),
            },
            ExternalChannel::WhatsApp => match &self.whatsapp {
                Some(wa) => {
                    if let Err(e) = wa.deliver(recipient, message).await {
                        tracing::warn!(to = recipient, error = %e, "WhatsApp delivery failed");
                    }
                }
                None => {
                    tracing::debug!(to = recipient, "WhatsApp channel not configured, skipping")
                }
            },
            ExternalChannel::Email => match &self.email {
                Some(email) => {
                    if let Err(e) = email
                        .deliver(recipient, "Civicdesk ticket update", message)
                        .await
                    {
                        tracing::warn!(to = recipient, error = %e, "Email delivery failed");
                    }
                }
                None => tracing::debug!(to = recipient, "Email channel not configured, skipping"),
            },
        }
    }
}
