use std::path::PathBuf;
use thiserror::Error;

/// Shown when the service gives no usable explanation for a failure.
pub const GENERIC_FAILURE: &str = "An error occurred during comparison.";

#[derive(Debug, Error)]
pub enum CompareError {
    /// Local precondition, never reaches the network.
    #[error("Please select exactly two PDF files.")]
    WrongFileCount { found: usize },

    #[error("comparison service returned {status}")]
    Status { status: u16, detail: Option<String> },

    #[error("request to comparison service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid service base url `{url}`: {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

impl CompareError {
    /// Text for the error panel: the service-supplied detail when there is one,
    /// the fixed precondition text for local errors, the generic fallback otherwise.
    pub fn display_message(&self) -> String {
        match self {
            CompareError::WrongFileCount { .. } => self.to_string(),
            CompareError::Status { detail: Some(detail), .. } => detail.clone(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FileError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a file", .path.display())]
    NotAFile { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_wins_over_fallback() {
        let err = CompareError::Status { status: 400, detail: Some("fichier invalide".into()) };
        assert_eq!(err.display_message(), "fichier invalide");
    }

    #[test]
    fn missing_detail_uses_fallback() {
        let err = CompareError::Status { status: 500, detail: None };
        assert_eq!(err.display_message(), GENERIC_FAILURE);
        let err = CompareError::InvalidEndpoint { url: "x".into(), reason: "bad".into() };
        assert_eq!(err.display_message(), GENERIC_FAILURE);
    }

    #[test]
    fn precondition_message_is_fixed() {
        let err = CompareError::WrongFileCount { found: 1 };
        assert_eq!(err.display_message(), "Please select exactly two PDF files.");
    }
}
