//! Channel adapter contract and registry

use famsafe_alert::{Alert, ChannelKind};
use famsafe_directory::Contact;
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of a single delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    /// Message handed to the transport successfully
    Delivered,
    /// Permanent failure for this attempt; not retried
    Rejected(String),
    /// Transient failure; retryable within the same step
    Unreachable,
}

impl DeliveryResult {
    /// Whether this outcome counts as a successful delivery
    #[inline]
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryResult::Delivered)
    }

    /// Lowercase outcome label for structured events
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryResult::Delivered => "delivered",
            DeliveryResult::Rejected(_) => "rejected",
            DeliveryResult::Unreachable => "unreachable",
        }
    }
}

/// A notification sender for one channel kind
///
/// The `attempt` call is the sole boundary to outbound messaging
/// transports. Implementations must be safe to call concurrently; the
/// engine dispatches to multiple contacts in parallel within a step.
#[async_trait::async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// The channel this adapter serves
    fn kind(&self) -> ChannelKind;

    /// Attempt delivery of `alert` to `contact`
    ///
    /// Transport failures are reported through [`DeliveryResult`], never
    /// panics or engine-level errors.
    async fn attempt(&self, contact: &Contact, alert: &Alert) -> DeliveryResult;
}

/// Lookup table from channel kind to adapter
#[derive(Default)]
pub struct ChannelRegistry {
    adapters: HashMap<ChannelKind, Arc<dyn ChannelAdapter>>,
}

impl ChannelRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own kind, replacing any previous one
    #[must_use]
    pub fn with_adapter(mut self, adapter: Arc<dyn ChannelAdapter>) -> Self {
        self.adapters.insert(adapter.kind(), adapter);
        self
    }

    /// Register an adapter in place
    pub fn register(&mut self, adapter: Arc<dyn ChannelAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
    }

    /// Adapter for a channel kind, if registered
    #[must_use]
    pub fn get(&self, kind: ChannelKind) -> Option<Arc<dyn ChannelAdapter>> {
        self.adapters.get(&kind).cloned()
    }

    /// Registered channel kinds
    #[must_use]
    pub fn kinds(&self) -> Vec<ChannelKind> {
        self.adapters.keys().copied().collect()
    }
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
