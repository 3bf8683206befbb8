//! FamilySafe Policy - escalation policies
//!
//! Maps an alert severity class to an ordered sequence of escalation
//! steps: which contact tier to notify, via which channels, and how long
//! to wait for an acknowledgment before advancing.
//!
//! Policies are validated on load (recognized severity keys, non-empty
//! step sequences) and may be hot-reloaded between alerts; a run captures
//! its policy snapshot at the start of each step, never mid-step.
//!
//! # Example
//!
//! ```rust
//! use famsafe_alert::{ChannelKind, Severity, Tier};
//! use famsafe_policy::{EscalationPolicy, EscalationStep, PolicyStore, TierFilter};
//! use std::time::Duration;
//!
//! let policy = EscalationPolicy::new(Severity::Critical)
//!     .with_step(
//!         EscalationStep::new(TierFilter::AtLeast(Tier::High), Duration::from_secs(120))
//!             .with_channel(ChannelKind::Email)
//!             .with_channel(ChannelKind::Sms),
//!     );
//!
//! let store = PolicyStore::new();
//! store.load([policy]).unwrap();
//! assert!(store.get(Severity::Critical).is_ok());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod policy;
pub mod store;

// Re-exports for convenience
pub use error::PolicyError;
pub use policy::{EscalationPolicy, EscalationStep, PolicyFile, TierFilter};
pub use store::PolicyStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
