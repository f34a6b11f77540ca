use thiserror::Error;

/// Errors raised while asking the void for artifacts.
///
/// Every variant is recoverable from the game's point of view: the caller refunds the
/// generation cost and carries on.
#[derive(Debug, Error)]
pub enum VoidError {
    /// No API key in the config and none in the provider's environment variable.
    #[error("no API key configured (set {0} or generator.api_key)")]
    MissingApiKey(&'static str),

    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("request timeout after {0}s")]
    Timeout(u32),

    /// Connection, TLS, or body-read failure.
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// The reply was not the JSON shape the provider documents.
    #[error("failed to parse API response: {0}")]
    Parse(String),

    /// The reply parsed but carried no text.
    #[error("API returned an empty response")]
    EmptyResponse,

    /// Prompt library could not be read or written.
    #[error("prompt library error: {0}")]
    PromptLibrary(String),
}
