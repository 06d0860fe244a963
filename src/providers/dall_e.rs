use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::ImageConfig;
use crate::error::ChefError;
use crate::providers::ImageProvider;

/// DALL-E image generation through the OpenAI images endpoint.
pub struct DallEProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    size: String,
}

impl DallEProvider {
    /// Create a provider from configuration. The key comes from config first,
    /// then the OPENAI_DALL_E_API_KEY environment variable.
    pub fn new(config: &ImageConfig, timeout: u64) -> Result<Self, ChefError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_DALL_E_API_KEY").ok())
            .ok_or(ChefError::MissingApiKey("dall-e"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;

        Ok(DallEProvider {
            client,
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            size: config.size.clone(),
        })
    }

    async fn request_image(&self, prompt: &str) -> Result<Option<String>, ChefError> {
        let response = self
            .client
            .post(format!("{}/v1/images/generations", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "prompt": prompt,
                "n": 1,
                "size": self.size,
                "quality": "standard",
                "response_format": "url"
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("image request failed with status {}", response.status());
            return Ok(None);
        }

        let body: Value = response.json().await?;
        Ok(body["data"][0]["url"].as_str().map(str::to_string))
    }
}

#[async_trait]
impl ImageProvider for DallEProvider {
    fn provider_name(&self) -> &str {
        "dall-e"
    }

    async fn generate_image(&self, prompt: &str) -> Option<String> {
        debug!("requesting image for prompt: {}", prompt);

        match self.request_image(prompt).await {
            Ok(Some(url)) => {
                debug!("generated image: {}", url);
                Some(url)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("image generation failed: {}", e);
                None
            }
        }
    }
}
