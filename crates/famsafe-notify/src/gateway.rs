//! SMS and voice-call channel adapters
//!
//! Both delegate the actual transport to injected gateway seams; the
//! concrete SMS gateway and telephony trigger live outside this crate.
//! Like the email adapter, a missing gateway logs and reports `Delivered`
//! so development environments run without external services.

use crate::adapter::{ChannelAdapter, DeliveryResult};
use crate::TransportError;
use famsafe_alert::{Alert, ChannelKind};
use famsafe_directory::Contact;
use std::sync::Arc;

/// Outbound SMS boundary
#[async_trait::async_trait]
pub trait SmsGateway: Send + Sync {
    /// Send a text to a phone number
    async fn send_text(&self, number: &str, text: &str) -> Result<(), TransportError>;
}

/// Outbound telephony trigger boundary
#[async_trait::async_trait]
pub trait CallGateway: Send + Sync {
    /// Place an automated call announcing the alert
    async fn place_call(&self, number: &str, announcement: &str) -> Result<(), TransportError>;
}

/// Short single-line alert summary used for SMS and call announcements
fn short_summary(alert: &Alert) -> String {
    format!(
        "FamilySafe {} alert: {} at {}. {}",
        alert.severity,
        alert.title,
        alert.location_or_unknown(),
        alert.description,
    )
}

/// SMS channel adapter
pub struct SmsChannel {
    gateway: Option<Arc<dyn SmsGateway>>,
}

impl SmsChannel {
    /// Adapter with no gateway: logs messages (dev mode)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { gateway: None }
    }

    /// With a real SMS gateway
    #[inline]
    #[must_use]
    pub fn with_gateway(mut self, gateway: Arc<dyn SmsGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }
}

impl Default for SmsChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ChannelAdapter for SmsChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Sms
    }

    async fn attempt(&self, contact: &Contact, alert: &Alert) -> DeliveryResult {
        let Some(endpoint) = contact.endpoint(ChannelKind::Sms) else {
            return DeliveryResult::Rejected("contact has no SMS number".to_string());
        };
        let text = short_summary(alert);

        match &self.gateway {
            None => {
                tracing::info!(
                    alert_id = %alert.id,
                    to = %endpoint.destination,
                    "mock SMS (no gateway configured)"
                );
                DeliveryResult::Delivered
            }
            Some(gateway) => match gateway.send_text(&endpoint.destination, &text).await {
                Ok(()) => DeliveryResult::Delivered,
                Err(TransportError::Unreachable(reason)) => {
                    tracing::warn!(alert_id = %alert.id, %reason, "SMS gateway unreachable");
                    DeliveryResult::Unreachable
                }
                Err(TransportError::Rejected(reason)) => DeliveryResult::Rejected(reason),
            },
        }
    }
}

/// Voice-call channel adapter
pub struct VoiceChannel {
    gateway: Option<Arc<dyn CallGateway>>,
}

impl VoiceChannel {
    /// Adapter with no gateway: logs calls (dev mode)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { gateway: None }
    }

    /// With a real telephony trigger
    #[inline]
    #[must_use]
    pub fn with_gateway(mut self, gateway: Arc<dyn CallGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }
}

impl Default for VoiceChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ChannelAdapter for VoiceChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::VoiceCall
    }

    async fn attempt(&self, contact: &Contact, alert: &Alert) -> DeliveryResult {
        let Some(endpoint) = contact.endpoint(ChannelKind::VoiceCall) else {
            return DeliveryResult::Rejected("contact has no call number".to_string());
        };
        let announcement = short_summary(alert);

        match &self.gateway {
            None => {
                tracing::info!(
                    alert_id = %alert.id,
                    to = %endpoint.destination,
                    "mock voice call (no gateway configured)"
                );
                DeliveryResult::Delivered
            }
            Some(gateway) => match gateway.place_call(&endpoint.destination, &announcement).await {
                Ok(()) => DeliveryResult::Delivered,
                Err(TransportError::Unreachable(reason)) => {
                    tracing::warn!(alert_id = %alert.id, %reason, "call gateway unreachable");
                    DeliveryResult::Unreachable
                }
                Err(TransportError::Rejected(reason)) => DeliveryResult::Rejected(reason),
            },
        }
    }
}
