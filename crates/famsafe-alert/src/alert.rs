//! The alert record
//!
//! An [`Alert`] is immutable once created. It is owned by the engine for
//! the duration of its escalation lifecycle, then archived with the run.

use crate::ids::AlertId;
use crate::types::{AlertType, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A detected safety event requiring notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Unique identifier
    pub id: AlertId,
    /// Severity class, fixed at creation
    pub severity: Severity,
    /// Kind of detected event
    pub alert_type: AlertType,
    /// Origin timestamp
    pub timestamp: DateTime<Utc>,
    /// Short human-readable title
    pub title: String,
    /// Free-text description
    pub description: String,
    /// Where the event was detected, if known
    pub location: Option<String>,
    /// Detection confidence percentage (0-100), if the detector reports one
    pub confidence: Option<u8>,
}

impl Alert {
    /// Create a new alert with a fresh id and the current timestamp
    #[inline]
    #[must_use]
    pub fn new(severity: Severity, alert_type: AlertType, title: impl Into<String>) -> Self {
        Self {
            id: AlertId::new(),
            severity,
            alert_type,
            timestamp: Utc::now(),
            title: title.into(),
            description: String::new(),
            location: None,
            confidence: None,
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With detection location
    #[inline]
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// With detection confidence percentage
    #[inline]
    #[must_use]
    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = Some(confidence.min(100));
        self
    }

    /// With an explicit origin timestamp
    #[inline]
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Location for display, "Unknown" when absent
    #[inline]
    #[must_use]
    pub fn location_or_unknown(&self) -> &str {
        self.location.as_deref().unwrap_or("Unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn alert_builder() {
        let alert = Alert::new(Severity::High, AlertType::Inactivity, "Prolonged Inactivity")
            .with_description("No movement detected for 2 hours")
            .with_location("Bedroom")
            .with_confidence(84);

        assert_eq!(alert.severity, Severity::High);
        assert_eq!(alert.alert_type, AlertType::Inactivity);
        assert_eq!(alert.location.as_deref(), Some("Bedroom"));
        assert_eq!(alert.confidence, Some(84));
    }

    #[test]
    fn confidence_is_clamped() {
        let alert = Alert::new(Severity::Low, AlertType::Wellness, "t").with_confidence(250);
        assert_eq!(alert.confidence, Some(100));
    }

    #[test]
    fn location_defaults_to_unknown() {
        let alert = Alert::new(Severity::Medium, AlertType::Wellness, "t");
        assert_eq!(alert.location_or_unknown(), "Unknown");
    }

    #[test]
    fn alert_serde_round_trip() {
        let alert = Alert::new(Severity::Critical, AlertType::Fall, "Fall Detected")
            .with_description("Sudden impact detected in living room")
            .with_location("Living Room");

        let json = serde_json::to_string(&alert).unwrap();
        let back: Alert = serde_json::from_str(&json).unwrap();
        assert_eq!(alert, back);
    }
}
