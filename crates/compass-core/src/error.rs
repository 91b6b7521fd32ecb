use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompassError {
    #[error("Malformed {record} record: {reason}")]
    MalformedRecord { record: &'static str, reason: String },

    #[error("Feed event for {0} is missing its key")]
    MissingKey(&'static str),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Maximum length for payload excerpts in error messages
const MAX_REASON_LENGTH: usize = 200;

impl CompassError {
    /// Build a malformed-record error, truncating the reason so a huge
    /// payload does not end up in the logs verbatim.
    pub fn malformed(record: &'static str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let reason = if reason.len() <= MAX_REASON_LENGTH {
            reason
        } else {
            let cut: String = reason.chars().take(MAX_REASON_LENGTH).collect();
            format!("{}... (truncated)", cut)
        };
        CompassError::MalformedRecord { record, reason }
    }
}

pub type Result<T> = std::result::Result<T, CompassError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_truncates_long_reason() {
        let err = CompassError::malformed("Event", "x".repeat(500));
        let msg = err.to_string();
        assert!(msg.starts_with("Malformed Event record: "));
        assert!(msg.ends_with("... (truncated)"));
    }

    #[test]
    fn test_malformed_keeps_short_reason() {
        let err = CompassError::malformed("Question", "missing field `Answer`");
        assert_eq!(
            err.to_string(),
            "Malformed Question record: missing field `Answer`"
        );
    }
}
