use thiserror::Error;

/// Text shown when a failure has no message meant for the user.
pub const GENERIC_ERROR: &str = "An error occurred while processing the image";

/// Used when the backend reports failure without an `error` field.
pub const BACKEND_FALLBACK_ERROR: &str = "Failed to process the image";

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The backend answered with an error message of its own.
    #[error("{0}")]
    Backend(String),
    #[error("request to analysis backend failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response from analysis backend: {0}")]
    Malformed(String),
    #[error("backend health check returned {0}")]
    Unhealthy(reqwest::StatusCode),
}

impl AnalysisError {
    /// What the user sees: backend messages verbatim, everything else generic.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Backend(message) => message.clone(),
            AnalysisError::Transport(_)
            | AnalysisError::Malformed(_)
            | AnalysisError::Unhealthy(_) => GENERIC_ERROR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        assert_eq!(
            AnalysisError::Backend("No image file provided".into()).user_message(),
            "No image file provided"
        );
        assert_eq!(
            AnalysisError::Malformed("expected value".into()).user_message(),
            GENERIC_ERROR
        );
    }
}
