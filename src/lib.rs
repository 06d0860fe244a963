//! Ingredient-to-recipe generation.
//!
//! Give [`generate_recipe`] a comma-separated ingredient string and it
//! returns a structured [`Recipe`]: an LLM drafts the text, a best-effort
//! parser structures it, and an image provider illustrates it. Every failure
//! along the way degrades to a deterministic fallback, so the call always
//! succeeds. Persistence of favorites and recents lives in [`store`].

pub mod classifier;
pub mod config;
pub mod dish_type;
pub mod error;
pub mod generator;
pub mod model;
pub mod parser;
pub mod providers;
pub mod store;

pub use config::AppConfig;
pub use error::ChefError;
pub use generator::{RecipeGenerator, RecipeGeneratorBuilder, FALLBACK_IMAGES};
pub use model::Recipe;
pub use store::SupabaseStore;

use log::warn;

/// Generate a recipe from ambient configuration (config.toml / CHEFAI__ env).
///
/// Total like the generator itself: a broken configuration just means no
/// providers, which produces the fallback recipe.
pub async fn generate_recipe(ingredients: &str) -> Recipe {
    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!("failed to load configuration, using defaults: {}", e);
        AppConfig::default()
    });

    RecipeGenerator::from_config(&config).generate(ingredients).await
}
