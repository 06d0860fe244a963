mod dall_e;
mod open_router;
mod prompt;

pub use dall_e::DallEProvider;
pub use open_router::OpenRouterProvider;
pub use prompt::{build_image_prompt, build_recipe_prompt};

use async_trait::async_trait;

use crate::error::ChefError;

/// A chat-completions backend that turns a prompt into free text.
///
/// Implementations must surface a non-2xx response as an empty completion
/// rather than an error; the generator treats emptiness as its fallback
/// signal.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logging (e.g. "openrouter")
    fn provider_name(&self) -> &str;

    /// Run the prompt and return the raw completion text.
    async fn complete(&self, prompt: &str) -> Result<String, ChefError>;
}

/// An image-generation backend.
///
/// Total by design: any failure (transport, non-2xx, malformed body, missing
/// URL) yields `None` and the caller falls back to the static image pool.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Provider name for logging (e.g. "dall-e")
    fn provider_name(&self) -> &str;

    /// Generate one image for the prompt, returning its URL.
    async fn generate_image(&self, prompt: &str) -> Option<String>;
}
