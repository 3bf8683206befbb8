//! Per-run state and records
//!
//! One [`RunState`] machine instance exists per alert. The step index
//! embedded in the state is monotonically non-decreasing and bounded by
//! the policy's step count; a run reaches a terminal state exactly once.

use crate::tracker::AckEvent;
use chrono::{DateTime, Utc};
use famsafe_alert::{Alert, ChannelKind, ContactId, RunId};
use famsafe_notify::DeliveryResult;
use tokio::sync::{watch, Notify};

/// Escalation run state machine
///
/// `Pending → Notifying(step) → WaitingAck(step) → Escalating(step + 1) → …`
/// ending in `Acknowledged`, `Resolved`, or `Exhausted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Created, not yet dispatching
    Pending,
    /// Dispatching notifications for a step
    Notifying(usize),
    /// Waiting out a step's acknowledgment window
    WaitingAck(usize),
    /// Advancing to the next step
    Escalating(usize),
    /// A contact acknowledged the alert (terminal)
    Acknowledged,
    /// A contact resolved the alert (terminal)
    Resolved,
    /// Every step elapsed without acknowledgment (terminal)
    Exhausted,
}

impl RunState {
    /// Whether the run has finished
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Acknowledged | RunState::Resolved | RunState::Exhausted
        )
    }

    /// Step index, for the states that carry one
    #[inline]
    #[must_use]
    pub fn step(&self) -> Option<usize> {
        match self {
            RunState::Notifying(step) | RunState::WaitingAck(step) | RunState::Escalating(step) => {
                Some(*step)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Pending => write!(f, "pending"),
            RunState::Notifying(step) => write!(f, "notifying({step})"),
            RunState::WaitingAck(step) => write!(f, "waiting-ack({step})"),
            RunState::Escalating(step) => write!(f, "escalating({step})"),
            RunState::Acknowledged => write!(f, "acknowledged"),
            RunState::Resolved => write!(f, "resolved"),
            RunState::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// One resolved notification attempt, attributable to exactly one
/// (run, step, contact, channel) tuple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// Step index; the exhaustion catch-all records one past the last
    /// policy step
    pub step: usize,
    /// Notified contact
    pub contact_id: ContactId,
    /// Channel used
    pub channel: ChannelKind,
    /// Final outcome after per-channel retry
    pub outcome: DeliveryResult,
    /// Number of transport attempts made (retries included)
    pub tries: u32,
}

/// Archived record of a finished escalation run
#[derive(Debug, Clone)]
pub struct RunRecord {
    /// Run identifier
    pub run_id: RunId,
    /// The alert this run escalated
    pub alert: Alert,
    /// Terminal state
    pub state: RunState,
    /// Highest step index the run entered, if it dispatched at all
    pub step_reached: Option<usize>,
    /// Every dispatch attempt, in dispatch order
    pub attempts: Vec<AttemptRecord>,
    /// Contact responses, in arrival order
    pub ack_audit: Vec<AckEvent>,
    /// Whether policy lookup missed and the fallback policy was used
    pub used_fallback_policy: bool,
    /// Run creation time
    pub created_at: DateTime<Utc>,
    /// Termination time
    pub terminated_at: DateTime<Utc>,
}

impl RunRecord {
    /// Whether any attempt anywhere in the run was delivered
    #[must_use]
    pub fn any_delivered(&self) -> bool {
        self.attempts.iter().any(|a| a.outcome.is_delivered())
    }
}

/// Live handle to a running escalation task
///
/// The task itself is detached; observers follow the state watch channel.
#[derive(Debug)]
pub(crate) struct RunHandle {
    pub(crate) alert_id: famsafe_alert::AlertId,
    pub(crate) state_rx: watch::Receiver<RunState>,
    pub(crate) escalate: std::sync::Arc<Notify>,
}
