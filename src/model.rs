use serde::{Deserialize, Serialize};

/// A generated (or stored) recipe.
///
/// `id` is assigned by the persistence layer on insert and stays `None` for
/// recipes that only live in memory. The value is immutable once returned by
/// the generator except for `image`, which a client may swap once for a
/// fallback URL when the original fails to load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub image: String,
    pub prep_time: String,
    pub cook_time: String,
    /// Never empty: the parser backfills the caller's ingredient list.
    pub ingredients: Vec<String>,
    /// Never empty: the parser synthesizes generic steps when extraction fails.
    pub instructions: Vec<String>,
    /// Whether `image` came from the image-generation API rather than the
    /// static fallback pool.
    #[serde(default)]
    pub is_dalle_image: bool,
}
