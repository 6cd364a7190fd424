//! Error types for the Reventic SDK.

/// Errors that can occur when using the Reventic SDK.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No API key was set when a request was attempted.
    #[error("No API key configured")]
    MissingCredential,

    /// HTTP request failed (connection, timeout or non-success status).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body was not valid JSON.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
