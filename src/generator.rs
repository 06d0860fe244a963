//! Sequences prompt construction, the LLM call, parsing and image
//! generation into a final [`Recipe`].
//!
//! The public contract is total: `generate` always returns a valid recipe.
//! Missing configuration, transport failures and parse anomalies all degrade
//! to the deterministic fallback path instead of surfacing.

use log::{info, warn};
use rand::Rng;

use crate::classifier::distinctive_ingredients;
use crate::config::AppConfig;
use crate::dish_type::extract_dish_type;
use crate::model::Recipe;
use crate::parser::parse_completion;
use crate::providers::{
    build_image_prompt, build_recipe_prompt, CompletionProvider, DallEProvider, ImageProvider,
    OpenRouterProvider,
};

/// Stock photos used when image generation is unavailable or fails.
pub const FALLBACK_IMAGES: [&str; 3] = [
    "https://media.istockphoto.com/id/513124350/photo/cuisine-of-different-countries.jpg?s=612x612&w=0&k=20&c=KlcikHT7Cw5pLOynGjB4w_q3TAh-iDnpPHClBEfIBbY=",
    "https://img.freepik.com/premium-photo/beautiful-spread-diverse-culinary-dishes-showcasing-vibrant-mix-flavors-cuisines-from-around-world-grand-array-dishes-from-around-world_538213-76553.jpg",
    "https://img.freepik.com/premium-photo/table-full-food-including-turkey-turkey-turkey_670382-12577.jpg",
];

/// How many distinctive ingredients go into the image prompt.
const IMAGE_PROMPT_INGREDIENTS: usize = 4;

/// One-shot recipe generation pipeline.
pub struct RecipeGenerator {
    llm: Option<Box<dyn CompletionProvider>>,
    image: Option<Box<dyn ImageProvider>>,
}

/// Builder for a [`RecipeGenerator`] with per-field overrides on top of the
/// default configuration.
///
/// # Example
/// ```no_run
/// use chefai::RecipeGenerator;
///
/// let generator = RecipeGenerator::builder()
///     .llm_api_key("sk-or-...")
///     .model("openai/gpt-4o-mini")
///     .timeout(10)
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct RecipeGeneratorBuilder {
    llm_api_key: Option<String>,
    llm_base_url: Option<String>,
    model: Option<String>,
    image_api_key: Option<String>,
    image_base_url: Option<String>,
    timeout: Option<u64>,
}

impl RecipeGeneratorBuilder {
    /// Set the completion API key (otherwise OPEN_ROUTER_API_KEY is tried)
    pub fn llm_api_key(mut self, key: impl Into<String>) -> Self {
        self.llm_api_key = Some(key.into());
        self
    }

    /// Override the completions base URL
    pub fn llm_base_url(mut self, url: impl Into<String>) -> Self {
        self.llm_base_url = Some(url.into());
        self
    }

    /// Override the completion model identifier
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the image API key (otherwise OPENAI_DALL_E_API_KEY is tried)
    pub fn image_api_key(mut self, key: impl Into<String>) -> Self {
        self.image_api_key = Some(key.into());
        self
    }

    /// Override the image-generation base URL
    pub fn image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = Some(url.into());
        self
    }

    /// Override the per-request timeout in seconds
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    /// Build the generator. A provider left without an API key is simply
    /// absent and its requests take the fallback path.
    pub fn build(self) -> RecipeGenerator {
        let mut config = AppConfig::default();
        if self.llm_api_key.is_some() {
            config.llm.api_key = self.llm_api_key;
        }
        if let Some(url) = self.llm_base_url {
            config.llm.base_url = url;
        }
        if let Some(model) = self.model {
            config.llm.model = model;
        }
        if self.image_api_key.is_some() {
            config.image.api_key = self.image_api_key;
        }
        if let Some(url) = self.image_base_url {
            config.image.base_url = url;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }

        RecipeGenerator::from_config(&config)
    }
}

impl RecipeGenerator {
    /// Start building a generator with explicit overrides.
    pub fn builder() -> RecipeGeneratorBuilder {
        RecipeGeneratorBuilder::default()
    }

    /// Build a generator from configuration.
    ///
    /// A provider whose API key is missing is simply absent, which routes
    /// every request straight down the fallback path for that collaborator.
    pub fn from_config(config: &AppConfig) -> Self {
        let llm = match OpenRouterProvider::new(&config.llm, config.timeout) {
            Ok(p) => Some(Box::new(p) as Box<dyn CompletionProvider>),
            Err(e) => {
                warn!("completion provider unavailable: {}", e);
                None
            }
        };
        let image = match DallEProvider::new(&config.image, config.timeout) {
            Ok(p) => Some(Box::new(p) as Box<dyn ImageProvider>),
            Err(e) => {
                warn!("image provider unavailable: {}", e);
                None
            }
        };

        RecipeGenerator { llm, image }
    }

    /// Build a generator from explicit providers; either may be absent.
    pub fn with_providers(
        llm: Option<Box<dyn CompletionProvider>>,
        image: Option<Box<dyn ImageProvider>>,
    ) -> Self {
        RecipeGenerator { llm, image }
    }

    /// Generate a recipe for a comma-separated ingredient string.
    ///
    /// Never fails: any error at any step yields the fallback recipe for the
    /// trimmed ingredient list.
    pub async fn generate(&self, ingredients: &str) -> Recipe {
        info!("generating recipe for ingredients: {}", ingredients);

        let ingredient_list: Vec<String> = ingredients
            .split(',')
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();

        let completion = match &self.llm {
            Some(provider) => {
                let prompt = build_recipe_prompt(&ingredient_list);
                match provider.complete(&prompt).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("completion failed, using fallback recipe: {}", e);
                        String::new()
                    }
                }
            }
            None => String::new(),
        };

        if completion.is_empty() {
            info!("empty completion, synthesizing fallback recipe");
        }

        // An empty completion parses into exactly the fallback recipe, so
        // both branches share one code path from here on.
        let parsed = parse_completion(&completion, &ingredient_list);

        let (image, is_dalle_image) = self.resolve_image(&parsed.title, &parsed.description, &parsed.ingredients).await;

        Recipe {
            id: None,
            title: parsed.title,
            description: parsed.description,
            image,
            prep_time: parsed.prep_time,
            cook_time: parsed.cook_time,
            ingredients: parsed.ingredients,
            instructions: parsed.instructions,
            is_dalle_image,
        }
    }

    /// Ask the image provider for a dish photo; fall back to a random entry
    /// from the stock pool when that yields nothing.
    async fn resolve_image(
        &self,
        title: &str,
        description: &str,
        ingredients: &[String],
    ) -> (String, bool) {
        let distinctive = distinctive_ingredients(ingredients, IMAGE_PROMPT_INGREDIENTS);
        let dish_type = extract_dish_type(title, description);

        let generated = match &self.image {
            Some(provider) => {
                let prompt = build_image_prompt(&distinctive, dish_type.as_deref());
                provider.generate_image(&prompt).await
            }
            None => None,
        };

        match generated {
            Some(url) => (url, true),
            None => {
                let pick = rand::thread_rng().gen_range(0..FALLBACK_IMAGES.len());
                (FALLBACK_IMAGES[pick].to_string(), false)
            }
        }
    }
}
