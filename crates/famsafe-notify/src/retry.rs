//! Bounded retry with exponential backoff for transient delivery failures
//!
//! Retry is scoped to a single (contact, channel) dispatch attempt and is
//! independent across contacts and channels within the same escalation
//! step, so backoff for one recipient never delays another.

use crate::adapter::{ChannelAdapter, DeliveryResult};
use famsafe_alert::Alert;
use famsafe_directory::Contact;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-channel retry configuration
///
/// `Unreachable` outcomes are retried up to `max_attempts` total attempts
/// with exponential backoff; `Rejected` is never retried.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first (1 = no retry)
    pub max_attempts: u32,
    /// Backoff base delay
    #[serde(rename = "base_secs", with = "secs")]
    pub base: Duration,
    /// Backoff cap
    #[serde(rename = "cap_secs", with = "secs")]
    pub cap: Duration,
    /// Jitter fraction applied to each delay (0.2 = ±20%)
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base: Duration::from_secs(1),
            cap: Duration::from_secs(30),
            jitter: 0.2,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    #[inline]
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// With total attempt count
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Un-jittered delay before retry number `retry` (0-based)
    #[inline]
    #[must_use]
    pub fn base_delay(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base.saturating_mul(factor).min(self.cap)
    }

    /// Jittered delay before retry number `retry` (0-based)
    #[must_use]
    pub fn delay(&self, retry: u32) -> Duration {
        let base = self.base_delay(retry);
        if self.jitter <= 0.0 {
            return base;
        }
        let spread = rand::rng().random_range(-self.jitter..=self.jitter);
        base.mul_f64(1.0 + spread)
    }
}

mod secs {
    //! Seconds-granularity serde encoding for backoff durations

    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(d: &Duration, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_u64(d.as_secs())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(de)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Dispatch through an adapter, retrying transient failures
///
/// Returns the final outcome and the number of attempts made. The final
/// outcome is `Unreachable` only when every attempt was transiently
/// unreachable and the retry budget is exhausted.
pub async fn dispatch_with_retry(
    adapter: &dyn ChannelAdapter,
    contact: &Contact,
    alert: &Alert,
    policy: &RetryPolicy,
) -> (DeliveryResult, u32) {
    let mut attempts = 0;
    loop {
        attempts += 1;
        let result = adapter.attempt(contact, alert).await;
        match &result {
            DeliveryResult::Unreachable if attempts < policy.max_attempts => {
                let delay = policy.delay(attempts - 1);
                tracing::debug!(
                    alert_id = %alert.id,
                    contact_id = %contact.id,
                    channel = %adapter.kind(),
                    attempt = attempts,
                    delay_ms = delay.as_millis() as u64,
                    "delivery unreachable, backing off"
                );
                tokio::time::sleep(delay).await;
            }
            _ => {
                return (result, attempts);
            }
        }
    }
}
