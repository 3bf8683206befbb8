//! Escalation policy model
//!
//! An [`EscalationPolicy`] is keyed by alert severity and holds an ordered
//! sequence of [`EscalationStep`]s. Serialization (TOML for policy files,
//! any serde format elsewhere) preserves step order, tier filters, channel
//! lists, and wait durations exactly.

use crate::error::PolicyError;
use famsafe_alert::{ChannelKind, Severity, Tier};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which contact tiers a step notifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TierFilter {
    /// All active contacts
    All,
    /// Contacts at or above the given tier
    AtLeast(Tier),
}

impl TierFilter {
    /// Minimum tier this filter resolves to
    #[inline]
    #[must_use]
    pub fn min_tier(&self) -> Tier {
        match self {
            TierFilter::All => Tier::Low,
            TierFilter::AtLeast(tier) => *tier,
        }
    }
}

/// One tier/channel/wait unit in an escalation policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationStep {
    /// Which contact tiers to notify
    pub tier: TierFilter,
    /// Channels to dispatch through
    pub channels: Vec<ChannelKind>,
    /// How long to wait for acknowledgment before auto-advancing
    #[serde(rename = "wait_secs", with = "wait_secs")]
    pub wait: Duration,
    /// Re-notify contacts already notified at an earlier step of this run
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub renotify: bool,
}

impl EscalationStep {
    /// Create a step with no channels yet
    #[inline]
    #[must_use]
    pub fn new(tier: TierFilter, wait: Duration) -> Self {
        Self {
            tier,
            channels: Vec::new(),
            wait,
            renotify: false,
        }
    }

    /// Add a dispatch channel
    #[inline]
    #[must_use]
    pub fn with_channel(mut self, channel: ChannelKind) -> Self {
        self.channels.push(channel);
        self
    }

    /// Re-notify previously notified contacts
    #[inline]
    #[must_use]
    pub fn with_renotify(mut self) -> Self {
        self.renotify = true;
        self
    }
}

/// Ordered escalation steps for one severity class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationPolicy {
    /// Severity class this policy applies to
    pub severity: Severity,
    /// Ordered step sequence
    #[serde(rename = "step")]
    pub steps: Vec<EscalationStep>,
}

impl EscalationPolicy {
    /// Create a policy with no steps yet (must gain at least one before load)
    #[inline]
    #[must_use]
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            steps: Vec::new(),
        }
    }

    /// Append a step
    #[inline]
    #[must_use]
    pub fn with_step(mut self, step: EscalationStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Validate load-time constraints
    ///
    /// # Errors
    /// `PolicyError::InvalidPolicy` on an empty step sequence or a step
    /// with no channels
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.steps.is_empty() {
            return Err(PolicyError::InvalidPolicy(format!(
                "policy for severity {} has an empty step sequence",
                self.severity
            )));
        }
        for (index, step) in self.steps.iter().enumerate() {
            if step.channels.is_empty() {
                return Err(PolicyError::InvalidPolicy(format!(
                    "policy for severity {} step {index} has no channels",
                    self.severity
                )));
            }
        }
        Ok(())
    }

    /// Number of steps
    #[inline]
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

/// On-disk policy file: a list of `[[policy]]` tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyFile {
    /// The policies, one per severity class
    #[serde(rename = "policy")]
    pub policies: Vec<EscalationPolicy>,
}

impl PolicyFile {
    /// Parse and validate a TOML policy file
    ///
    /// # Errors
    /// `PolicyError::Parse` on malformed TOML (including unrecognized
    /// severity keys), `PolicyError::InvalidPolicy` on constraint
    /// violations
    pub fn from_toml(input: &str) -> Result<Self, PolicyError> {
        let file: PolicyFile = toml::from_str(input)?;
        for policy in &file.policies {
            policy.validate()?;
        }
        Ok(file)
    }

    /// Render back to TOML
    #[must_use]
    pub fn to_toml(&self) -> String {
        // Serialization of this shape cannot fail.
        toml::to_string(self).unwrap_or_default()
    }
}

mod wait_secs {
    //! Seconds-granularity serde encoding for step wait durations

    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(wait: &Duration, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_u64(wait.as_secs())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(de)?;
        Ok(Duration::from_secs(secs))
    }
}
