//! Error types for the QTE domain
//!
//! Only two things can go wrong before a run produces a result: the
//! configuration is rejected, or a run is already in flight. Everything that
//! happens once a run is active resolves to a [`QteOutcome`](crate::QteOutcome).

use thiserror::Error;

/// Unified error type for QTE operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QteError {
    /// Configuration failed validation; no run was started
    #[error("QTE configuration error: {}", .issues.join("; "))]
    InvalidConfiguration { issues: Vec<String> },

    /// `start` was called while another run is still active
    #[error("A QTE run is already active")]
    AlreadyRunning,

    /// Configuration data could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),
}

impl QteError {
    /// Creates a configuration error from a list of validation issues.
    pub fn invalid_configuration(issues: Vec<String>) -> Self {
        Self::InvalidConfiguration { issues }
    }

    /// Creates a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Validation issues carried by this error, if any.
    pub fn issues(&self) -> &[String] {
        match self {
            Self::InvalidConfiguration { issues } => issues,
            _ => &[],
        }
    }
}

impl From<serde_json::Error> for QteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_configuration_joins_issues() {
        let err = QteError::invalid_configuration(vec![
            "Time limit must be positive".to_string(),
            "QTE needs at least one outcome node".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "QTE configuration error: Time limit must be positive; QTE needs at least one outcome node"
        );
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn already_running_has_no_issues() {
        assert!(QteError::AlreadyRunning.issues().is_empty());
    }
}
