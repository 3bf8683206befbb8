//! FamilySafe Alert - core data model
//!
//! Shared vocabulary for the escalation engine:
//! - Typed identifiers for alerts, contacts, and escalation runs
//! - Severity classes and alert types
//! - Contact tiers and notification channel kinds
//! - The immutable [`Alert`] record
//!
//! # Example
//!
//! ```rust
//! use famsafe_alert::{Alert, AlertType, Severity};
//!
//! let alert = Alert::new(Severity::Critical, AlertType::Fall, "Fall Detected")
//!     .with_description("Sudden impact detected in living room")
//!     .with_location("Living Room");
//!
//! assert_eq!(alert.severity, Severity::Critical);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod alert;
pub mod ids;
pub mod types;

// Re-exports for convenience
pub use alert::Alert;
pub use ids::{AlertId, ContactId, RunId};
pub use types::{AlertType, ChannelEndpoint, ChannelKind, ParseSeverityError, Severity, Tier};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
