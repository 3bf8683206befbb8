//! Email channel adapter
//!
//! Renders the fixed FamilySafe alert template and hands the message to an
//! injected [`EmailTransport`]. When no transport is configured the
//! adapter logs the rendered message and reports `Delivered`, matching the
//! platform's development-mode mock email behavior.

use crate::adapter::{ChannelAdapter, DeliveryResult};
use crate::TransportError;
use famsafe_alert::{Alert, ChannelKind};
use famsafe_directory::Contact;
use std::sync::Arc;

/// Default product name used in the subject line
pub const DEFAULT_PRODUCT_NAME: &str = "FamilySafe";

/// A rendered alert email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    /// Destination address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

/// Outbound SMTP boundary, implemented outside this crate
#[async_trait::async_trait]
pub trait EmailTransport: Send + Sync {
    /// Deliver a rendered message
    async fn send(&self, message: &AlertMessage) -> Result<(), TransportError>;
}

/// Email channel adapter
pub struct EmailChannel {
    product_name: String,
    transport: Option<Arc<dyn EmailTransport>>,
}

impl EmailChannel {
    /// Adapter with no transport: logs rendered messages (dev mode)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
            transport: None,
        }
    }

    /// With a real outbound transport
    #[inline]
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn EmailTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// With a product name for the subject line
    #[inline]
    #[must_use]
    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = name.into();
        self
    }

    /// Render the fixed alert template for one recipient
    ///
    /// Subject: `"<Product> Alert: <title> (<SEVERITY>)"`. Body carries
    /// alert type, severity, title, description, location (or "Unknown"),
    /// formatted timestamp, and the recipient's name.
    #[must_use]
    pub fn render(&self, contact: &Contact, alert: &Alert) -> AlertMessage {
        let subject = format!(
            "{} Alert: {} ({})",
            self.product_name,
            alert.title,
            alert.severity.as_str().to_uppercase()
        );
        let body = format!(
            "Alert Type: {}\nSeverity: {}\nTitle: {}\nDescription: {}\nLocation: {}\nTime: {}\nRecipient: {}",
            alert.alert_type,
            alert.severity,
            alert.title,
            alert.description,
            alert.location_or_unknown(),
            alert.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            contact.name,
        );
        let to = contact
            .endpoint(ChannelKind::Email)
            .map(|ep| ep.destination.clone())
            .unwrap_or_default();
        AlertMessage { to, subject, body }
    }
}

impl Default for EmailChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ChannelAdapter for EmailChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn attempt(&self, contact: &Contact, alert: &Alert) -> DeliveryResult {
        let Some(endpoint) = contact.endpoint(ChannelKind::Email) else {
            return DeliveryResult::Rejected("contact has no email address".to_string());
        };
        let message = self.render(contact, alert);

        match &self.transport {
            None => {
                tracing::info!(
                    alert_id = %alert.id,
                    to = %endpoint.destination,
                    subject = %message.subject,
                    "mock email (no transport configured)"
                );
                DeliveryResult::Delivered
            }
            Some(transport) => match transport.send(&message).await {
                Ok(()) => DeliveryResult::Delivered,
                Err(TransportError::Unreachable(reason)) => {
                    tracing::warn!(alert_id = %alert.id, %reason, "email transport unreachable");
                    DeliveryResult::Unreachable
                }
                Err(TransportError::Rejected(reason)) => DeliveryResult::Rejected(reason),
            },
        }
    }
}
