//! FamilySafe Directory - caregiver/contact records
//!
//! Holds the contact list consulted by the escalation engine:
//! - Contact records with priority tier, role, enabled alert types, and
//!   reachable channels
//! - Add/update/remove administration
//! - Tier-filtered lookups used at each escalation step
//!
//! The directory is read-mostly. Runs take a consistent snapshot of the
//! matching contacts at the start of each step, so administrative edits
//! never block in-flight escalations and take effect from the next step
//! onward.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod contact;
pub mod directory;
pub mod error;

// Re-exports for convenience
pub use contact::{Contact, ContactPatch, ContactStatus};
pub use directory::ContactDirectory;
pub use error::DirectoryError;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
