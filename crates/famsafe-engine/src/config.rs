//! Engine configuration

use famsafe_alert::{ChannelKind, Tier};
use famsafe_notify::RetryPolicy;
use serde::Deserialize;
use std::collections::HashMap;

/// Escalation engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Retry policy applied to channels without a specific override
    pub default_retry: RetryPolicy,
    /// Per-channel retry overrides
    pub retry: HashMap<ChannelKind, RetryPolicy>,
    /// Contact tier notified when escalation exhausts without response
    pub catch_all_tier: Tier,
    /// Channels used for the exhaustion catch-all dispatch
    pub catch_all_channels: Vec<ChannelKind>,
}

impl EngineConfig {
    /// Default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML
    ///
    /// # Errors
    /// `EngineError::Config` on malformed input
    pub fn from_toml(input: &str) -> Result<Self, crate::error::EngineError> {
        Ok(toml::from_str(input)?)
    }

    /// With a retry override for one channel
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, channel: ChannelKind, policy: RetryPolicy) -> Self {
        self.retry.insert(channel, policy);
        self
    }

    /// With a default retry policy for all channels
    #[inline]
    #[must_use]
    pub fn with_default_retry(mut self, policy: RetryPolicy) -> Self {
        self.default_retry = policy;
        self
    }

    /// With the exhaustion catch-all target
    #[inline]
    #[must_use]
    pub fn with_catch_all(mut self, tier: Tier, channels: Vec<ChannelKind>) -> Self {
        self.catch_all_tier = tier;
        self.catch_all_channels = channels;
        self
    }

    /// Retry policy for a channel
    #[inline]
    #[must_use]
    pub fn retry_for(&self, channel: ChannelKind) -> RetryPolicy {
        self.retry.get(&channel).copied().unwrap_or(self.default_retry)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_retry: RetryPolicy::default(),
            retry: HashMap::new(),
            catch_all_tier: Tier::Critical,
            catch_all_channels: vec![ChannelKind::VoiceCall, ChannelKind::Sms],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn retry_override_falls_back_to_default() {
        let config = EngineConfig::new()
            .with_retry(ChannelKind::Sms, RetryPolicy::default().with_max_attempts(6));

        assert_eq!(config.retry_for(ChannelKind::Sms).max_attempts, 6);
        assert_eq!(config.retry_for(ChannelKind::Email).max_attempts, 4);
    }

    #[test]
    fn parses_from_toml() {
        let config = EngineConfig::from_toml(
            r#"
            catch_all_tier = "critical"
            catch_all_channels = ["voice-call"]

            [default_retry]
            max_attempts = 2

            [retry.email]
            max_attempts = 5
            base_secs = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.catch_all_channels, vec![ChannelKind::VoiceCall]);
        assert_eq!(config.default_retry.max_attempts, 2);
        assert_eq!(config.retry_for(ChannelKind::Email).max_attempts, 5);
        assert_eq!(
            config.retry_for(ChannelKind::Email).base,
            std::time::Duration::from_secs(2)
        );
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = EngineConfig::from_toml("catch_all_tier = 7").unwrap_err();
        assert!(matches!(err, crate::error::EngineError::Config(_)));
        assert!(err.to_string().contains("configuration error"));
    }

    #[test]
    fn default_catch_all_targets_emergency_tier() {
        let config = EngineConfig::default();
        assert_eq!(config.catch_all_tier, Tier::Critical);
        assert!(config.catch_all_channels.contains(&ChannelKind::VoiceCall));
    }
}
