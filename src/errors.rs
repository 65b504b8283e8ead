//! Error types for the reader.
//!
//! The three recoverable failures all end up rendered into the result
//! pane; their Display strings are the user-facing messages.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("API key not found. Please set your API key in the credentials file.")]
    MissingApiKey,

    #[error("Could not extract article text from this page.")]
    NoArticleText,

    #[error("Failed to send HTTP request: {0}")]
    Http(String),

    /// Server-provided failure message from the Gemini API.
    #[error("{0}")]
    Api(String),
}

impl From<reqwest::Error> for ReaderError {
    fn from(error: reqwest::Error) -> Self {
        ReaderError::Http(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_server_message_verbatim() {
        let err = ReaderError::Api("quota exceeded".to_string());
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[test]
    fn fixed_messages_match_pane_strings() {
        assert_eq!(
            ReaderError::NoArticleText.to_string(),
            "Could not extract article text from this page."
        );
        assert!(ReaderError::MissingApiKey.to_string().starts_with("API key not found."));
    }
}
