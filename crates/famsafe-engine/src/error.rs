//! Error types for the escalation engine

use famsafe_alert::{AlertId, RunId};
use famsafe_directory::DirectoryError;
use famsafe_policy::PolicyError;

/// Acknowledgment tracker errors
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The alert id has no live run (already archived or never created)
    #[error("unknown alert: {0}")]
    UnknownAlert(AlertId),
}

/// Engine-level errors surfaced to callers
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Policy store error
    #[error("policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Contact directory error
    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Acknowledgment tracker error
    #[error("acknowledgment error: {0}")]
    Tracker(#[from] TrackerError),

    /// No live run with the given id
    #[error("run not found: {0}")]
    RunNotFound(RunId),

    /// Engine configuration could not be parsed
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_error_converts_into_engine_error() {
        let id = AlertId::new();
        let err: EngineError = TrackerError::UnknownAlert(id).into();
        assert!(err.to_string().contains("unknown alert"));
    }

    #[test]
    fn run_not_found_display() {
        let id = RunId::new();
        let err = EngineError::RunNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }
}
