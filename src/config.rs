use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Top-level application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// LLM completion provider settings
    #[serde(default)]
    pub llm: LlmConfig,
    /// Image-generation provider settings
    #[serde(default)]
    pub image: ImageConfig,
    /// Supabase persistence settings
    #[serde(default)]
    pub supabase: SupabaseConfig,
    /// Request timeout in seconds, applied per HTTP client
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            image: ImageConfig::default(),
            supabase: SupabaseConfig::default(),
            timeout: default_timeout(),
        }
    }
}

/// Configuration for the chat-completions provider
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// API key for authentication (can also be set via OPEN_ROUTER_API_KEY)
    pub api_key: Option<String>,
    /// Base URL for the completions endpoint
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Model identifier routed through the completions endpoint
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Nucleus sampling cutoff
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
        }
    }
}

/// Configuration for the image-generation provider
#[derive(Debug, Deserialize, Clone)]
pub struct ImageConfig {
    /// API key for authentication (can also be set via OPENAI_DALL_E_API_KEY)
    pub api_key: Option<String>,
    /// Base URL for the image-generation endpoint
    #[serde(default = "default_image_base_url")]
    pub base_url: String,
    /// Image model identifier
    #[serde(default = "default_image_model")]
    pub model: String,
    /// Requested image size
    #[serde(default = "default_image_size")]
    pub size: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_image_base_url(),
            model: default_image_model(),
            size: default_image_size(),
        }
    }
}

/// Configuration for the Supabase backend
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SupabaseConfig {
    /// Project base URL, e.g. https://xyz.supabase.co
    pub url: Option<String>,
    /// Anonymous API key sent as the `apikey` header
    pub anon_key: Option<String>,
}

// Default value functions
fn default_llm_base_url() -> String {
    "https://openrouter.ai/api".to_string()
}

fn default_llm_model() -> String {
    "openai/gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_top_p() -> f32 {
    0.95
}

fn default_image_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with CHEFAI__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: CHEFAI__LLM__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Optional config file (can be missing)
            .add_source(File::with_name("config").required(false))
            // Use double underscore for nested: CHEFAI__SUPABASE__ANON_KEY
            .add_source(
                Environment::with_prefix("CHEFAI")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
