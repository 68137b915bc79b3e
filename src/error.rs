use thiserror::Error;

/// Errors that abort a client operation before any socket is touched.
///
/// These are reported once through the status text and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// No API key configured for the live endpoint
    #[error("No API Key")]
    MissingApiKey,

    /// No socket factory was supplied to the client
    #[error("No transport")]
    MissingTransport,

    /// The endpoint URL could not be built from the configuration
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ClientError {
    /// Text shown in the status widget for this error
    pub fn status_text(&self) -> String {
        format!("Error: {}", self)
    }
}
