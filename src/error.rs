//! Error types for the HTML view renderer

use thiserror::Error;

/// Result type alias for renderer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing, compiling, or resolving a document
#[derive(Error, Debug)]
pub enum Error {
    /// The parsing bridge rejected the document
    #[error("Failed to parse document: {0}")]
    ParseError(String),

    /// A style sheet entry could not be understood
    #[error("Invalid style sheet: {0}")]
    StyleError(String),

    /// Natural-size lookup for an image failed
    #[error("Image size query failed for {uri}: {reason}")]
    ImageError { uri: String, reason: String },

    /// The image source cannot serve this kind of URI
    #[error("Unsupported image source: {0}")]
    UnsupportedSource(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The host refused to open a link
    #[error("Failed to open URL: {0}")]
    LinkError(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Filesystem error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed JSON configuration
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for an [`Error::ImageError`] tied to `uri`.
    pub fn image(uri: &str, reason: impl Into<String>) -> Self {
        Error::ImageError {
            uri: uri.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::NetworkError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_error_mentions_uri() {
        let err = Error::image("https://example.com/a.png", "404");
        assert_eq!(
            err.to_string(),
            "Image size query failed for https://example.com/a.png: 404"
        );
    }
}
