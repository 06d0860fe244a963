use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::LlmConfig;
use crate::error::ChefError;
use crate::providers::CompletionProvider;

/// Chat-completions provider routed through OpenRouter.
pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

impl OpenRouterProvider {
    /// Create a provider from configuration.
    ///
    /// The key comes from config first, then the OPEN_ROUTER_API_KEY
    /// environment variable; without one this fails and the generator takes
    /// its fallback path instead.
    pub fn new(config: &LlmConfig, timeout: u64) -> Result<Self, ChefError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPEN_ROUTER_API_KEY").ok())
            .ok_or(ChefError::MissingApiKey("openrouter"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;

        Ok(OpenRouterProvider {
            client,
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: config.top_p,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterProvider {
    fn provider_name(&self) -> &str {
        "openrouter"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ChefError> {
        debug!("sending prompt to {} ({})", self.provider_name(), self.model);

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", "chefai-app")
            .header("X-Title", "ChefAI")
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "user", "content": prompt}
                ],
                "temperature": self.temperature,
                "max_tokens": self.max_tokens,
                "top_p": self.top_p
            }))
            .send()
            .await?;

        // Contract: a non-2xx status surfaces as an empty completion, which
        // the generator maps to the fallback recipe.
        if !response.status().is_success() {
            warn!(
                "completion request failed with status {}",
                response.status()
            );
            return Ok(String::new());
        }

        let body: Value = response.json().await?;
        let completion = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                ChefError::MalformedResponse("no choices[0].message.content in body".to_string())
            })?
            .to_string();

        debug!("received {} chars of completion", completion.len());
        Ok(completion)
    }
}
