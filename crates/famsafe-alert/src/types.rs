//! Severity classes, alert types, contact tiers, and channel kinds

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Alert severity class, fixed at alert creation time.
///
/// A later severity correction is modeled as a new alert, never as a
/// mutation of an in-flight one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// All recognized severity classes
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// Lowercase name, as used in policy files
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a severity class name
#[derive(Debug, thiserror::Error)]
pub enum ParseSeverityError {
    /// Not one of the recognized severity names
    #[error("unrecognized severity class: {0}")]
    Unrecognized(String),
}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            other => Err(ParseSeverityError::Unrecognized(other.to_string())),
        }
    }
}

/// Kind of detected safety event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertType {
    /// Sudden impact / fall detection
    Fall,
    /// Prolonged inactivity
    Inactivity,
    /// Missed medication reminder
    MedicationMissed,
    /// General wellness deviation
    Wellness,
    /// Health-provider relevant event
    Health,
    /// Unusual sleep pattern
    SleepPattern,
}

impl AlertType {
    /// Lowercase kebab-case name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Fall => "fall",
            AlertType::Inactivity => "inactivity",
            AlertType::MedicationMissed => "medication-missed",
            AlertType::Wellness => "wellness",
            AlertType::Health => "health",
            AlertType::SleepPattern => "sleep-pattern",
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contact priority tier, independent of alert severity.
///
/// Escalation policies select contacts by minimum tier; higher tiers are
/// notified in earlier steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Critical,
    High,
    Medium,
    Low,
}

impl Tier {
    /// Numeric rank; higher means more urgent
    #[inline]
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            Tier::Critical => 3,
            Tier::High => 2,
            Tier::Medium => 1,
            Tier::Low => 0,
        }
    }

    /// Check whether this tier meets a minimum tier requirement
    #[inline]
    #[must_use]
    pub fn meets(&self, min: Tier) -> bool {
        self.rank() >= min.rank()
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Tier::Critical => "critical",
            Tier::High => "high",
            Tier::Medium => "medium",
            Tier::Low => "low",
        };
        f.write_str(name)
    }
}

/// Notification transport kind.
///
/// New channels (push notification, messaging-app bot) are added here and
/// behind a matching adapter; the engine is unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum ChannelKind {
    Email,
    Sms,
    VoiceCall,
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChannelKind::Email => "email",
            ChannelKind::Sms => "sms",
            ChannelKind::VoiceCall => "voice-call",
        };
        f.write_str(name)
    }
}

/// A reachable destination on one channel (phone number, email address)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEndpoint {
    /// Transport kind
    pub kind: ChannelKind,
    /// Channel-specific destination string
    pub destination: String,
}

impl ChannelEndpoint {
    /// Create new endpoint
    #[inline]
    #[must_use]
    pub fn new(kind: ChannelKind, destination: impl Into<String>) -> Self {
        Self {
            kind,
            destination: destination.into(),
        }
    }

    /// Email endpoint
    #[inline]
    #[must_use]
    pub fn email(address: impl Into<String>) -> Self {
        Self::new(ChannelKind::Email, address)
    }

    /// SMS endpoint
    #[inline]
    #[must_use]
    pub fn sms(number: impl Into<String>) -> Self {
        Self::new(ChannelKind::Sms, number)
    }

    /// Voice-call endpoint
    #[inline]
    #[must_use]
    pub fn voice(number: impl Into<String>) -> Self {
        Self::new(ChannelKind::VoiceCall, number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn severity_parse_round_trip() {
        for sev in Severity::ALL {
            assert_eq!(sev.as_str().parse::<Severity>().unwrap(), sev);
        }
    }

    #[test]
    fn severity_parse_rejects_unknown_names() {
        let err = "urgent".parse::<Severity>().unwrap_err();
        assert!(matches!(err, ParseSeverityError::Unrecognized(_)));
        assert_eq!(err.to_string(), "unrecognized severity class: urgent");
    }

    #[test]
    fn severity_serde_lowercase() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }

    #[test]
    fn tier_ordering() {
        assert!(Tier::Critical.meets(Tier::High));
        assert!(Tier::High.meets(Tier::High));
        assert!(!Tier::Medium.meets(Tier::High));
        assert!(Tier::Low.meets(Tier::Low));
    }

    #[test]
    fn alert_type_serde_kebab_case() {
        let json = serde_json::to_string(&AlertType::MedicationMissed).unwrap();
        assert_eq!(json, "\"medication-missed\"");
    }

    #[test]
    fn channel_endpoint_constructors() {
        let ep = ChannelEndpoint::email("sarah.j@email.com");
        assert_eq!(ep.kind, ChannelKind::Email);
        assert_eq!(ep.destination, "sarah.j@email.com");

        let ep = ChannelEndpoint::voice("911");
        assert_eq!(ep.kind, ChannelKind::VoiceCall);
    }
}
