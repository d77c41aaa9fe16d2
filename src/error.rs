//! Error kinds reported by the session controller and the HTTP gateway.

use thiserror::Error;

const HOST_FAILURE_MESSAGE: &str = "Oops, something went wrong at the model host's end. Check the status of the service and try again later.";

/// Every failure a user action can end with.
///
/// None of these are fatal: the session stays usable after any of them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatError {
    #[error("Invalid Base URL. Please enter a URL starting with 'https://' and ending with '/v1'.")]
    Validation,

    #[error("Please enter both Base URL and Key.")]
    Credentials,

    #[error("You can't just send nothing!")]
    EmptyInput,

    #[error("Unsupported attachment '{filename}': only .jpg, .png, .gif, or .webp are supported")]
    UnsupportedMedia { filename: String },

    #[error("Select an image generation model first (/models, then /image-model).")]
    ModelUnset,

    #[error("AuthenticationError: Invalid API Key.")]
    Authentication,

    #[error("Error fetching models: {status} {body}")]
    Remote { status: u16, body: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("{}", gateway_summary(.raw))]
    Gateway { raw: String },

    #[error("Something went wrong. Please check your request and try again. ({0})")]
    MalformedResponse(String),
}

impl ChatError {
    /// Classifies the raw text of a failed chat or image call.
    ///
    /// `"500"` wins over `"401"` when both appear.
    pub fn from_gateway_failure(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if !raw.contains("500") && raw.contains("401") {
            return Self::Authentication;
        }
        Self::Gateway { raw }
    }

    pub(crate) fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {}", err))
        } else if err.is_connect() {
            Self::Transport(format!("connection failed: {}", err))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

fn gateway_summary(raw: &str) -> String {
    if raw.contains("500") {
        return HOST_FAILURE_MESSAGE.to_string();
    }
    let short = raw.split(" - ").next().unwrap_or(raw);
    format!("An error occurred: {}", short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_failure_with_500_reports_host_side_problem() {
        let err = ChatError::from_gateway_failure("500 Internal Server Error - {\"error\":\"401\"}");
        assert!(matches!(err, ChatError::Gateway { .. }));
        assert_eq!(err.to_string(), HOST_FAILURE_MESSAGE);
    }

    #[test]
    fn gateway_failure_with_401_is_authentication() {
        let err = ChatError::from_gateway_failure("401 Unauthorized - bad key");
        assert_eq!(err, ChatError::Authentication);
    }

    #[test]
    fn other_gateway_failures_are_cut_at_first_delimiter() {
        let err = ChatError::from_gateway_failure("400 Bad Request - {\"error\":\"model not found\"}");
        assert_eq!(err.to_string(), "An error occurred: 400 Bad Request");
    }

    #[test]
    fn gateway_failure_without_delimiter_keeps_whole_text() {
        let err = ChatError::from_gateway_failure("429 Too Many Requests");
        assert_eq!(err.to_string(), "An error occurred: 429 Too Many Requests");
    }
}
