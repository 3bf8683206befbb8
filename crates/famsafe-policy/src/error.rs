//! Error types for policy loading and lookup

use famsafe_alert::Severity;

/// Policy store errors
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// No policy configured for the severity class
    #[error("no escalation policy for severity: {0}")]
    PolicyMissing(Severity),

    /// Policy rejected at load time
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    /// Policy file could not be parsed
    #[error("policy parse failed: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_error_display() {
        let err = PolicyError::PolicyMissing(Severity::High);
        assert!(err.to_string().contains("high"));

        let err = PolicyError::InvalidPolicy("empty step sequence".to_string());
        assert!(err.to_string().contains("empty step sequence"));
    }
}
