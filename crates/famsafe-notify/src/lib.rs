//! FamilySafe Notify - notification channel adapters
//!
//! Polymorphic senders behind a uniform "attempt delivery" contract:
//! - [`ChannelAdapter`]: one `attempt` per (contact, alert) dispatch
//! - [`DeliveryResult`]: delivered / rejected / transiently unreachable
//! - [`RetryPolicy`]: exponential backoff with jitter for transient
//!   failures, scoped to a single dispatch attempt
//! - Email adapter rendering the fixed FamilySafe message template,
//!   SMS and voice-call adapters over injected gateway seams
//!
//! Adapters are stateless with respect to the engine; transport
//! credentials and connections live inside the adapter (or its injected
//! transport). A per-channel failure is never fatal to an escalation run.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod adapter;
pub mod email;
pub mod gateway;
pub mod retry;

// Re-exports for convenience
pub use adapter::{ChannelAdapter, ChannelRegistry, DeliveryResult};
pub use email::{AlertMessage, EmailChannel, EmailTransport};
pub use gateway::{CallGateway, SmsChannel, SmsGateway, VoiceChannel};
pub use retry::{dispatch_with_retry, RetryPolicy};

/// Transport-level failure reported by an injected transport/gateway
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Transient failure; the dispatch may be retried
    #[error("transport unreachable: {0}")]
    Unreachable(String),

    /// Permanent failure for this attempt; do not retry
    #[error("transport rejected message: {0}")]
    Rejected(String),
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
