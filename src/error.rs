/// Errors surfaced by the bridge outside of page aggregation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A session was established without an access token.
    #[error("missing access token")]
    MissingCredential,

    /// The resource server rejected the credentials after at most one refresh.
    #[error("authentication failed with status {status}")]
    AuthenticationFailure { status: u16 },

    /// Any other non-success status from the resource server.
    #[error("resource request failed: {status} {status_text}")]
    Resource { status: u16, status_text: String },

    /// No response was received at all.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body was not the JSON we expected.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Startup configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// The session is no longer usable and the user must log in again.
    #[must_use]
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::AuthenticationFailure { .. })
    }

    /// The failure is transient; existing credentials should be kept.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Resource { .. } | Self::Network(_) | Self::Decode(_))
    }

    /// HTTP status received from the resource server, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationFailure { status } | Self::Resource { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}
