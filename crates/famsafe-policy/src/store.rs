//! Hot-reloadable policy store
//!
//! Policies may be replaced between alerts; a run that already captured a
//! policy snapshot keeps escalating under that snapshot. A missing policy
//! never drops an alert: the store carries a hardwired always-critical
//! fallback that `get_or_fallback` routes to.

use crate::error::PolicyError;
use crate::policy::{EscalationPolicy, EscalationStep, PolicyFile, TierFilter};
use famsafe_alert::{ChannelKind, Severity, Tier};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Severity-keyed escalation policy store
#[derive(Debug)]
pub struct PolicyStore {
    policies: RwLock<HashMap<Severity, Arc<EscalationPolicy>>>,
    fallback: Arc<EscalationPolicy>,
}

impl PolicyStore {
    /// Empty store with the built-in fallback policy
    #[must_use]
    pub fn new() -> Self {
        Self {
            policies: RwLock::new(HashMap::new()),
            fallback: Arc::new(fallback_policy()),
        }
    }

    /// Store pre-loaded with the platform's default escalation matrix
    #[must_use]
    pub fn with_defaults() -> Self {
        let store = Self::new();
        // Built-in defaults always validate.
        store
            .load(default_policies())
            .unwrap_or_else(|_| unreachable!("built-in default policies are valid"));
        store
    }

    /// Validate and install policies, replacing same-severity entries
    ///
    /// # Errors
    /// `PolicyError::InvalidPolicy` if any policy fails validation; on
    /// error nothing is installed
    pub fn load(
        &self,
        policies: impl IntoIterator<Item = EscalationPolicy>,
    ) -> Result<(), PolicyError> {
        let incoming: Vec<EscalationPolicy> = policies.into_iter().collect();
        for policy in &incoming {
            policy.validate()?;
        }
        let mut table = self.policies.write();
        for policy in incoming {
            let severity = policy.severity;
            table.insert(severity, Arc::new(policy));
            tracing::info!(severity = %severity, "escalation policy installed");
        }
        Ok(())
    }

    /// Parse, validate, and install a TOML policy file
    ///
    /// # Errors
    /// `PolicyError::Parse` or `PolicyError::InvalidPolicy`
    pub fn load_toml(&self, input: &str) -> Result<(), PolicyError> {
        let file = PolicyFile::from_toml(input)?;
        self.load(file.policies)
    }

    /// Policy for a severity class
    ///
    /// # Errors
    /// `PolicyError::PolicyMissing` when none is configured
    pub fn get(&self, severity: Severity) -> Result<Arc<EscalationPolicy>, PolicyError> {
        self.policies
            .read()
            .get(&severity)
            .cloned()
            .ok_or(PolicyError::PolicyMissing(severity))
    }

    /// Policy for a severity class, falling back to the always-critical
    /// policy on a miss. Returns whether the fallback was used.
    #[must_use]
    pub fn get_or_fallback(&self, severity: Severity) -> (Arc<EscalationPolicy>, bool) {
        match self.get(severity) {
            Ok(policy) => (policy, false),
            Err(_) => {
                tracing::warn!(
                    severity = %severity,
                    "no escalation policy configured, routing to fallback"
                );
                (self.fallback.clone(), true)
            }
        }
    }

    /// The built-in fallback policy
    #[must_use]
    pub fn fallback(&self) -> Arc<EscalationPolicy> {
        self.fallback.clone()
    }
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Always-critical fallback used when a severity has no configured policy
fn fallback_policy() -> EscalationPolicy {
    EscalationPolicy::new(Severity::Critical)
        .with_step(
            EscalationStep::new(TierFilter::AtLeast(Tier::High), Duration::from_secs(120))
                .with_channel(ChannelKind::Email)
                .with_channel(ChannelKind::Sms)
                .with_channel(ChannelKind::VoiceCall),
        )
        .with_step(
            EscalationStep::new(TierFilter::All, Duration::from_secs(300))
                .with_channel(ChannelKind::VoiceCall),
        )
}

/// The platform's default escalation matrix
///
/// - critical: emergency tier immediately, then all high-priority
///   contacts after 2 minutes
/// - high: primary caregivers, then emergency contacts after 10 minutes
/// - medium: primary caregivers (non-urgent), follow-up after 30 minutes
/// - low: primary caregivers, follow-up after an hour
#[must_use]
pub(crate) fn default_policies() -> Vec<EscalationPolicy> {
    vec![
        EscalationPolicy::new(Severity::Critical)
            .with_step(
                EscalationStep::new(TierFilter::AtLeast(Tier::Critical), Duration::from_secs(120))
                    .with_channel(ChannelKind::VoiceCall)
                    .with_channel(ChannelKind::Sms),
            )
            .with_step(
                EscalationStep::new(TierFilter::AtLeast(Tier::High), Duration::from_secs(300))
                    .with_channel(ChannelKind::VoiceCall)
                    .with_channel(ChannelKind::Sms)
                    .with_channel(ChannelKind::Email),
            ),
        EscalationPolicy::new(Severity::High)
            .with_step(
                EscalationStep::new(TierFilter::AtLeast(Tier::High), Duration::from_secs(600))
                    .with_channel(ChannelKind::Sms)
                    .with_channel(ChannelKind::Email),
            )
            .with_step(
                EscalationStep::new(TierFilter::AtLeast(Tier::Medium), Duration::from_secs(600))
                    .with_channel(ChannelKind::VoiceCall)
                    .with_channel(ChannelKind::Sms),
            ),
        EscalationPolicy::new(Severity::Medium)
            .with_step(
                EscalationStep::new(TierFilter::AtLeast(Tier::High), Duration::from_secs(1800))
                    .with_channel(ChannelKind::Email),
            )
            .with_step(
                EscalationStep::new(TierFilter::AtLeast(Tier::High), Duration::from_secs(1800))
                    .with_channel(ChannelKind::Sms)
                    .with_renotify(),
            ),
        EscalationPolicy::new(Severity::Low).with_step(
            EscalationStep::new(TierFilter::AtLeast(Tier::High), Duration::from_secs(3600))
                .with_channel(ChannelKind::Email),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_cover_every_severity() {
        let store = PolicyStore::with_defaults();
        for severity in Severity::ALL {
            assert!(store.get(severity).is_ok(), "missing policy for {severity}");
        }
    }

    #[test]
    fn missing_policy_routes_to_fallback() {
        let store = PolicyStore::new();
        assert!(matches!(
            store.get(Severity::Medium),
            Err(PolicyError::PolicyMissing(Severity::Medium))
        ));

        let (policy, used_fallback) = store.get_or_fallback(Severity::Medium);
        assert!(used_fallback);
        assert_eq!(policy.severity, Severity::Critical);
        assert!(policy.step_count() > 0);
    }

    #[test]
    fn load_rejects_invalid_policy_atomically() {
        let store = PolicyStore::new();
        let valid = default_policies().remove(0);
        let invalid = EscalationPolicy::new(Severity::Low);

        let err = store.load([valid, invalid]).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidPolicy(_)));
        // Nothing was installed, not even the valid one.
        assert!(store.get(Severity::Critical).is_err());
    }

    #[test]
    fn hot_reload_replaces_policy() {
        let store = PolicyStore::with_defaults();
        let before = store.get(Severity::Low).unwrap();

        let replacement = EscalationPolicy::new(Severity::Low).with_step(
            EscalationStep::new(TierFilter::All, Duration::from_secs(60))
                .with_channel(ChannelKind::Sms),
        );
        store.load([replacement.clone()]).unwrap();

        let after = store.get(Severity::Low).unwrap();
        assert_ne!(*before, *after);
        assert_eq!(*after, replacement);
        // The old snapshot is still usable by an in-flight run.
        assert!(before.step_count() > 0);
    }

    #[test]
    fn load_toml_end_to_end() {
        let store = PolicyStore::new();
        store
            .load_toml(
                r#"
                [[policy]]
                severity = "high"

                [[policy.step]]
                tier = { at-least = "high" }
                channels = ["sms"]
                wait_secs = 600
                "#,
            )
            .unwrap();
        assert!(store.get(Severity::High).is_ok());
    }
}
