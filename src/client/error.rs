//! Error taxonomy for the FatSecret client.
//!
//! Every failure the client can produce is one of the variants of
//! [`FatSecretError`]. Nothing is recovered locally and nothing is retried
//! implicitly; see [`crate::client::retry`] for the opt-in wrapper.

use thiserror::Error;

/// Errors surfaced by [`crate::client::FatSecretClient`] and
/// [`crate::client::auth::TokenManager`].
#[derive(Debug, Error)]
pub enum FatSecretError {
    /// A request could not be constructed from the configuration or the
    /// caller's input (bad base URL, empty credentials, unparsable final URL).
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The token endpoint rejected the credentials or could not be reached.
    #[error("Failed to authenticate with FatSecret API: {0}")]
    AuthenticationFailed(String),

    /// The food API answered with a non-2xx status, an error envelope, or a
    /// body that does not match the expected shape.
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Transport failure while talking to the food API (timeouts, DNS,
    /// connection resets).
    #[error("Network error occurred: {0}")]
    NetworkError(#[source] reqwest::Error),

    /// The caller cancelled the operation before it completed.
    #[error("Operation cancelled")]
    Cancelled,
}

impl FatSecretError {
    /// Whether a caller-driven retry could plausibly succeed.
    ///
    /// Only transport failures qualify. Authentication and decode failures
    /// are deterministic for a given input.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkError(_))
    }

    pub const fn is_authentication_error(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }
}

pub type Result<T, E = FatSecretError> = std::result::Result<T, E>;
