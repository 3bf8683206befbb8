//! Acknowledgment tracker
//!
//! Records contact responses to live alerts. Entries are keyed by alert
//! id and append-only: the first acknowledgment decides the status, later
//! responses land in the audit trail without changing it. Each entry
//! carries a watch channel; the owning run waits on it to cancel its step
//! timer the moment a response arrives.

use crate::error::TrackerError;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use famsafe_alert::{AlertId, ContactId};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Acknowledgment state of one alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Pending,
    Acknowledged,
    Resolved,
}

impl AckStatus {
    /// Whether this status halts escalation
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AckStatus::Pending)
    }
}

impl std::fmt::Display for AckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AckStatus::Pending => "pending",
            AckStatus::Acknowledged => "acknowledged",
            AckStatus::Resolved => "resolved",
        };
        f.write_str(name)
    }
}

/// Kind of response a contact sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckKind {
    Acknowledge,
    Resolve,
}

/// One audited contact response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckEvent {
    /// Responding contact
    pub contact_id: ContactId,
    /// When the response arrived
    pub timestamp: DateTime<Utc>,
    /// Acknowledge or resolve
    pub kind: AckKind,
}

#[derive(Debug)]
struct AckEntry {
    status: AckStatus,
    audit: Vec<AckEvent>,
    tx: watch::Sender<AckStatus>,
}

/// Tracks acknowledgments for all live alerts
///
/// Safe for concurrent access across runs: each run only touches its own
/// alert id.
#[derive(Debug, Default)]
pub struct AckTracker {
    entries: DashMap<AlertId, AckEntry>,
}

impl AckTracker {
    /// Create empty tracker
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live alert; the returned receiver observes status changes
    ///
    /// Called by the engine when a run is created. Double registration
    /// resets the entry.
    pub fn register(&self, alert_id: AlertId) -> watch::Receiver<AckStatus> {
        let (tx, rx) = watch::channel(AckStatus::Pending);
        self.entries.insert(
            alert_id,
            AckEntry {
                status: AckStatus::Pending,
                audit: Vec::new(),
                tx,
            },
        );
        rx
    }

    /// Record an acknowledgment
    ///
    /// First acknowledgment wins; later ones are audited only. Returns the
    /// status after the write.
    ///
    /// # Errors
    /// `TrackerError::UnknownAlert` if the alert has no live run
    pub fn acknowledge(
        &self,
        alert_id: AlertId,
        contact_id: ContactId,
        timestamp: DateTime<Utc>,
    ) -> Result<AckStatus, TrackerError> {
        self.record(alert_id, contact_id, timestamp, AckKind::Acknowledge)
    }

    /// Record a resolution (implies acknowledgment if not already acknowledged)
    ///
    /// # Errors
    /// `TrackerError::UnknownAlert` if the alert has no live run
    pub fn resolve(
        &self,
        alert_id: AlertId,
        contact_id: ContactId,
        timestamp: DateTime<Utc>,
    ) -> Result<AckStatus, TrackerError> {
        self.record(alert_id, contact_id, timestamp, AckKind::Resolve)
    }

    /// Current status of an alert
    ///
    /// # Errors
    /// `TrackerError::UnknownAlert` if the alert has no live run
    pub fn status_of(&self, alert_id: AlertId) -> Result<AckStatus, TrackerError> {
        self.entries
            .get(&alert_id)
            .map(|entry| entry.status)
            .ok_or(TrackerError::UnknownAlert(alert_id))
    }

    /// Audit trail for an alert
    ///
    /// # Errors
    /// `TrackerError::UnknownAlert` if the alert has no live run
    pub fn audit(&self, alert_id: AlertId) -> Result<Vec<AckEvent>, TrackerError> {
        self.entries
            .get(&alert_id)
            .map(|entry| entry.audit.clone())
            .ok_or(TrackerError::UnknownAlert(alert_id))
    }

    /// Drop the entry for a terminated run, returning its final state
    pub(crate) fn archive(&self, alert_id: AlertId) -> Option<(AckStatus, Vec<AckEvent>)> {
        self.entries
            .remove(&alert_id)
            .map(|(_, entry)| (entry.status, entry.audit))
    }

    fn record(
        &self,
        alert_id: AlertId,
        contact_id: ContactId,
        timestamp: DateTime<Utc>,
        kind: AckKind,
    ) -> Result<AckStatus, TrackerError> {
        let mut entry = self
            .entries
            .get_mut(&alert_id)
            .ok_or(TrackerError::UnknownAlert(alert_id))?;

        entry.audit.push(AckEvent {
            contact_id,
            timestamp,
            kind,
        });

        let new_status = match (entry.status, kind) {
            (AckStatus::Pending, AckKind::Acknowledge) => AckStatus::Acknowledged,
            // Resolve implies acknowledge; it also upgrades an acknowledged alert.
            (AckStatus::Pending | AckStatus::Acknowledged, AckKind::Resolve) => AckStatus::Resolved,
            (current, _) => current,
        };

        if new_status != entry.status {
            entry.status = new_status;
            let _ = entry.tx.send(new_status);
            tracing::info!(
                alert_id = %alert_id,
                contact_id = %contact_id,
                status = %new_status,
                "acknowledgment recorded"
            );
        } else {
            tracing::debug!(
                alert_id = %alert_id,
                contact_id = %contact_id,
                status = %entry.status,
                "acknowledgment audited (status unchanged)"
            );
        }

        Ok(entry.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_acknowledgment_wins() {
        let tracker = AckTracker::new();
        let alert = AlertId::new();
        let first = ContactId::new();
        let second = ContactId::new();
        tracker.register(alert);

        assert_eq!(
            tracker.acknowledge(alert, first, Utc::now()).unwrap(),
            AckStatus::Acknowledged
        );
        assert_eq!(
            tracker.acknowledge(alert, second, Utc::now()).unwrap(),
            AckStatus::Acknowledged
        );

        // Both responses are audited.
        let audit = tracker.audit(alert).unwrap();
        assert_eq!(audit.len(), 2);
        assert_eq!(audit[0].contact_id, first);
        assert_eq!(audit[1].contact_id, second);
    }

    #[test]
    fn resolve_implies_acknowledge() {
        let tracker = AckTracker::new();
        let alert = AlertId::new();
        tracker.register(alert);

        assert_eq!(
            tracker.resolve(alert, ContactId::new(), Utc::now()).unwrap(),
            AckStatus::Resolved
        );
        assert_eq!(tracker.status_of(alert).unwrap(), AckStatus::Resolved);
    }

    #[test]
    fn resolve_upgrades_acknowledged() {
        let tracker = AckTracker::new();
        let alert = AlertId::new();
        tracker.register(alert);

        tracker.acknowledge(alert, ContactId::new(), Utc::now()).unwrap();
        assert_eq!(
            tracker.resolve(alert, ContactId::new(), Utc::now()).unwrap(),
            AckStatus::Resolved
        );
        // A late acknowledge does not downgrade.
        assert_eq!(
            tracker.acknowledge(alert, ContactId::new(), Utc::now()).unwrap(),
            AckStatus::Resolved
        );
    }

    #[test]
    fn unknown_alert_is_an_error() {
        let tracker = AckTracker::new();
        let alert = AlertId::new();

        assert!(matches!(
            tracker.status_of(alert),
            Err(TrackerError::UnknownAlert(_))
        ));
        assert!(matches!(
            tracker.acknowledge(alert, ContactId::new(), Utc::now()),
            Err(TrackerError::UnknownAlert(_))
        ));
    }

    #[test]
    fn archived_alert_becomes_unknown() {
        let tracker = AckTracker::new();
        let alert = AlertId::new();
        tracker.register(alert);
        tracker.acknowledge(alert, ContactId::new(), Utc::now()).unwrap();

        let (status, audit) = tracker.archive(alert).unwrap();
        assert_eq!(status, AckStatus::Acknowledged);
        assert_eq!(audit.len(), 1);
        assert!(matches!(
            tracker.status_of(alert),
            Err(TrackerError::UnknownAlert(_))
        ));
    }

    #[tokio::test]
    async fn watch_receiver_observes_acknowledgment() {
        let tracker = AckTracker::new();
        let alert = AlertId::new();
        let mut rx = tracker.register(alert);

        tracker.acknowledge(alert, ContactId::new(), Utc::now()).unwrap();
        let status = *rx.wait_for(|s| s.is_terminal()).await.unwrap();
        assert_eq!(status, AckStatus::Acknowledged);
    }
}
