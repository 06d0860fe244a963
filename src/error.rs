use thiserror::Error;

/// Errors that can occur inside the provider and persistence layers.
///
/// The generation pipeline itself is total: every one of these degrades to a
/// deterministic fallback before reaching the caller of
/// [`RecipeGenerator::generate`](crate::RecipeGenerator::generate).
#[derive(Error, Debug)]
pub enum ChefError {
    /// HTTP transport failure talking to a collaborator
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// No API key configured for a provider
    #[error("API key not found for {0} in config or environment")]
    MissingApiKey(&'static str),

    /// Response body did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Persistence layer rejected an operation
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
