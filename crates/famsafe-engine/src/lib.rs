//! FamilySafe Engine - alert escalation and notification dispatch
//!
//! The core of the platform's safety response:
//! - Consumes incoming alerts and resolves the applicable escalation
//!   policy (falling back safely when none is configured)
//! - Drives one concurrent state machine per alert through its policy's
//!   steps, dispatching notifications through pluggable channel adapters
//! - Tracks acknowledgments and cancels pending escalation the moment a
//!   contact responds
//! - Escalates tier by tier on timeout, ending in a catch-all dispatch to
//!   the emergency contact class when every step is exhausted
//!
//! # Example
//!
//! ```rust
//! use famsafe_alert::{Alert, AlertType, Severity};
//! use famsafe_engine::EscalationEngine;
//!
//! # async fn example() {
//! let engine = EscalationEngine::with_defaults();
//!
//! let alert = Alert::new(Severity::Critical, AlertType::Fall, "Fall Detected")
//!     .with_location("Living Room");
//! let run_id = engine.submit(alert);
//!
//! println!("escalating as run {run_id}");
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod engine;
pub mod error;
pub mod run;
pub mod tracker;

// Re-exports for convenience
pub use config::EngineConfig;
pub use engine::EscalationEngine;
pub use error::{EngineError, TrackerError};
pub use run::{AttemptRecord, RunRecord, RunState};
pub use tracker::{AckEvent, AckKind, AckStatus, AckTracker};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the escalation engine
    pub use crate::{
        AckStatus, AckTracker, EngineConfig, EngineError, EscalationEngine, RunRecord, RunState,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
