/// Errors from the question generation / scoring service
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No credential configured
    #[error("API key not found. Please check your environment variables.")]
    MissingCredential,

    /// Network or client error, with the request URL stripped
    #[error("Request failed: {0}")]
    Transport(reqwest::Error),

    /// Non-success status from the service
    #[error("Service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response did not have the expected shape
    #[error("Invalid response format from API: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        ServiceError::Transport(e.without_url())
    }
}
