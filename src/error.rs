//! Error types for poster generation, editing and the gallery

use thiserror::Error;

/// Result type alias for studio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while composing, generating or storing posters
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected before any remote call was made
    #[error("{0}")]
    ValidationError(String),

    /// Malformed data URL, unreadable file or bad base64 payload
    #[error("Could not read image data: {0}")]
    DecodeError(String),

    /// The model answered without a single candidate
    #[error("The AI did not return any candidates. Please try again.")]
    NoCandidates,

    /// Candidates came back but none of them carried an image
    #[error("The AI did not generate any images. Please try again with a different image or prompt.")]
    NoImagesGenerated,

    /// The edit response carried no image
    #[error("The AI failed to edit the poster. Please try again.")]
    EditEmpty,

    /// Provider rejected the credential or could not find the model
    #[error("API configuration problem: {0}. Check that your API key is valid and has access to the image model.")]
    AuthError(String),

    /// Provider answered with a non-success status
    #[error("Remote model error ({status}): {message}")]
    RemoteError { status: u16, message: String },

    /// Transport-level failure talking to the provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Local gallery could not be read or written
    #[error("Gallery persistence failed: {0}")]
    PersistenceError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the failure came back from the remote model (as opposed to
    /// local validation or decoding).
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::NoCandidates
                | Error::NoImagesGenerated
                | Error::EditEmpty
                | Error::AuthError(_)
                | Error::RemoteError { .. }
                | Error::NetworkError(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::PersistenceError(err.to_string())
    }
}
