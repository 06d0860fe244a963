use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::SupabaseConfig;
use crate::error::ChefError;
use crate::model::Recipe;
use crate::store::Cache;

/// Maximum number of recent recipes kept per user.
const MAX_RECENT_RECIPES: usize = 10;

/// Database row shape for the recipes table.
#[derive(Debug, Serialize, Deserialize)]
struct RecipeRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    title: String,
    description: String,
    image: String,
    prep_time: String,
    cook_time: String,
    ingredients: Vec<String>,
    instructions: Vec<String>,
    #[serde(default)]
    is_dalle_image: bool,
}

impl RecipeRow {
    fn from_recipe(recipe: &Recipe, user_id: &str) -> Self {
        RecipeRow {
            id: None,
            user_id: Some(user_id.to_string()),
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            image: recipe.image.clone(),
            prep_time: recipe.prep_time.clone(),
            cook_time: recipe.cook_time.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
            is_dalle_image: recipe.is_dalle_image,
        }
    }

    fn into_recipe(self) -> Recipe {
        Recipe {
            id: self.id,
            title: self.title,
            description: self.description,
            image: self.image,
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            ingredients: self.ingredients,
            instructions: self.instructions,
            is_dalle_image: self.is_dalle_image,
        }
    }
}

/// Join-row shape for the favorites and recent_recipes tables, selected with
/// the embedded recipe. Extra columns in the payload are ignored.
#[derive(Debug, Deserialize)]
struct JoinRow {
    recipes: RecipeRow,
}

const RECIPE_COLUMNS: &str =
    "id,title,description,image,prep_time,cook_time,ingredients,instructions,is_dalle_image";

/// Recipe persistence over the Supabase REST (PostgREST) interface.
///
/// All operations are keyed by an externally authenticated user id; auth
/// itself is outside this crate. Favorites and recents each carry a cache
/// that is invalidated on every mutation.
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    anon_key: String,
    favorites: Cache<Vec<Recipe>>,
    recents: Cache<Vec<Recipe>>,
}

impl SupabaseStore {
    /// Create a store from configuration.
    pub fn new(config: &SupabaseConfig, timeout: u64) -> Result<Self, ChefError> {
        let base_url = config
            .url
            .clone()
            .ok_or_else(|| ChefError::Store("supabase url not configured".to_string()))?;
        let anon_key = config
            .anon_key
            .clone()
            .ok_or_else(|| ChefError::Store("supabase anon key not configured".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;

        Ok(SupabaseStore {
            client,
            base_url,
            anon_key,
            favorites: Cache::new(),
            recents: Cache::new(),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(base_url: String, anon_key: String) -> Self {
        SupabaseStore {
            client: Client::new(),
            base_url,
            anon_key,
            favorites: Cache::new(),
            recents: Cache::new(),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ChefError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ChefError::Store(format!("status {}: {}", status, body)))
        }
    }

    /// Insert a recipe for the user and return it with its assigned id.
    pub async fn save_recipe(&self, user_id: &str, recipe: &Recipe) -> Result<Recipe, ChefError> {
        let response = self
            .request(self.client.post(self.rest_url("recipes")))
            .header("Prefer", "return=representation")
            .json(&RecipeRow::from_recipe(recipe, user_id))
            .send()
            .await?;
        let rows: Vec<RecipeRow> = Self::check(response).await?.json().await?;

        rows.into_iter()
            .next()
            .map(RecipeRow::into_recipe)
            .ok_or_else(|| ChefError::Store("insert returned no rows".to_string()))
    }

    /// All recipes owned by the user, newest first.
    pub async fn user_recipes(&self, user_id: &str) -> Result<Vec<Recipe>, ChefError> {
        let response = self
            .request(self.client.get(self.rest_url("recipes")))
            .query(&[
                ("user_id", format!("eq.{}", user_id).as_str()),
                ("order", "created_at.desc"),
            ])
            .send()
            .await?;
        let rows: Vec<RecipeRow> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().map(RecipeRow::into_recipe).collect())
    }

    /// Fetch one recipe by id.
    pub async fn recipe_by_id(&self, recipe_id: &str) -> Result<Option<Recipe>, ChefError> {
        let response = self
            .request(self.client.get(self.rest_url("recipes")))
            .query(&[("id", format!("eq.{}", recipe_id).as_str())])
            .send()
            .await?;
        let rows: Vec<RecipeRow> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().next().map(RecipeRow::into_recipe))
    }

    /// Update a recipe the user owns.
    pub async fn update_recipe(
        &self,
        user_id: &str,
        recipe_id: &str,
        recipe: &Recipe,
    ) -> Result<(), ChefError> {
        let response = self
            .request(self.client.patch(self.rest_url("recipes")))
            .query(&[
                ("id", format!("eq.{}", recipe_id).as_str()),
                ("user_id", format!("eq.{}", user_id).as_str()),
            ])
            .json(&RecipeRow::from_recipe(recipe, user_id))
            .send()
            .await?;
        Self::check(response).await?;
        self.invalidate_caches();
        Ok(())
    }

    /// Delete a recipe the user owns.
    pub async fn delete_recipe(&self, user_id: &str, recipe_id: &str) -> Result<(), ChefError> {
        let response = self
            .request(self.client.delete(self.rest_url("recipes")))
            .query(&[
                ("id", format!("eq.{}", recipe_id).as_str()),
                ("user_id", format!("eq.{}", user_id).as_str()),
            ])
            .send()
            .await?;
        Self::check(response).await?;
        self.invalidate_caches();
        Ok(())
    }

    /// Resolve a recipe to its database id, inserting it first if it has
    /// none. Join records must never reference an unpersisted recipe.
    async fn ensure_recipe_id(&self, user_id: &str, recipe: &Recipe) -> Result<String, ChefError> {
        match &recipe.id {
            Some(id) => Ok(id.clone()),
            None => {
                let saved = self.save_recipe(user_id, recipe).await?;
                saved
                    .id
                    .ok_or_else(|| ChefError::Store("insert returned no id".to_string()))
            }
        }
    }

    /// The user's favorite recipes, served from cache when warm.
    pub async fn favorite_recipes(&self, user_id: &str) -> Result<Vec<Recipe>, ChefError> {
        if let Some(cached) = self.favorites.get() {
            debug!("favorites served from cache");
            return Ok(cached);
        }

        let select = format!("id,recipes({})", RECIPE_COLUMNS);
        let response = self
            .request(self.client.get(self.rest_url("favorites")))
            .query(&[
                ("select", select.as_str()),
                ("user_id", format!("eq.{}", user_id).as_str()),
            ])
            .send()
            .await?;
        let rows: Vec<JoinRow> = Self::check(response).await?.json().await?;

        let favorites: Vec<Recipe> = rows.into_iter().map(|r| r.recipes.into_recipe()).collect();
        self.favorites.put(favorites.clone());
        Ok(favorites)
    }

    /// Mark a recipe as favorite, persisting it first if needed.
    pub async fn add_favorite(&self, user_id: &str, recipe: &Recipe) -> Result<(), ChefError> {
        let recipe_id = self.ensure_recipe_id(user_id, recipe).await?;

        let response = self
            .request(self.client.post(self.rest_url("favorites")))
            .json(&json!({ "user_id": user_id, "recipe_id": recipe_id }))
            .send()
            .await?;
        Self::check(response).await?;

        self.favorites.invalidate();
        Ok(())
    }

    /// Remove a recipe from the user's favorites.
    pub async fn remove_favorite(&self, user_id: &str, recipe_id: &str) -> Result<(), ChefError> {
        let response = self
            .request(self.client.delete(self.rest_url("favorites")))
            .query(&[
                ("user_id", format!("eq.{}", user_id).as_str()),
                ("recipe_id", format!("eq.{}", recipe_id).as_str()),
            ])
            .send()
            .await?;
        Self::check(response).await?;

        self.favorites.invalidate();
        Ok(())
    }

    /// The user's most recently generated recipes, newest first, at most
    /// [`MAX_RECENT_RECIPES`]. Served from cache when warm.
    pub async fn recent_recipes(&self, user_id: &str) -> Result<Vec<Recipe>, ChefError> {
        if let Some(cached) = self.recents.get() {
            debug!("recents served from cache");
            return Ok(cached);
        }

        let select = format!("id,created_at,recipes({})", RECIPE_COLUMNS);
        let limit = MAX_RECENT_RECIPES.to_string();
        let response = self
            .request(self.client.get(self.rest_url("recent_recipes")))
            .query(&[
                ("select", select.as_str()),
                ("user_id", format!("eq.{}", user_id).as_str()),
                ("order", "created_at.desc"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;
        let rows: Vec<JoinRow> = Self::check(response).await?.json().await?;

        let recents: Vec<Recipe> = rows.into_iter().map(|r| r.recipes.into_recipe()).collect();
        self.recents.put(recents.clone());
        Ok(recents)
    }

    /// Record a recipe as recently generated.
    ///
    /// Deduplicates on recipe id (re-generating bumps the entry to the top)
    /// and trims join rows beyond the retention limit.
    pub async fn add_recent(&self, user_id: &str, recipe: &Recipe) -> Result<(), ChefError> {
        let recipe_id = self.ensure_recipe_id(user_id, recipe).await?;

        // Drop any existing entry for this recipe so the insert is the newest
        let response = self
            .request(self.client.delete(self.rest_url("recent_recipes")))
            .query(&[
                ("user_id", format!("eq.{}", user_id).as_str()),
                ("recipe_id", format!("eq.{}", recipe_id).as_str()),
            ])
            .send()
            .await?;
        Self::check(response).await?;

        let response = self
            .request(self.client.post(self.rest_url("recent_recipes")))
            .json(&json!({ "user_id": user_id, "recipe_id": recipe_id }))
            .send()
            .await?;
        Self::check(response).await?;

        if let Err(e) = self.trim_recents(user_id).await {
            warn!("failed to trim recent recipes: {}", e);
        }

        self.recents.invalidate();
        Ok(())
    }

    /// Delete recent-recipe join rows past the retention limit.
    async fn trim_recents(&self, user_id: &str) -> Result<(), ChefError> {
        #[derive(Deserialize)]
        struct IdRow {
            id: String,
        }

        let response = self
            .request(self.client.get(self.rest_url("recent_recipes")))
            .query(&[
                ("select", "id"),
                ("user_id", format!("eq.{}", user_id).as_str()),
                ("order", "created_at.desc"),
            ])
            .send()
            .await?;
        let rows: Vec<IdRow> = Self::check(response).await?.json().await?;

        if rows.len() <= MAX_RECENT_RECIPES {
            return Ok(());
        }

        let stale: Vec<String> = rows[MAX_RECENT_RECIPES..]
            .iter()
            .map(|r| r.id.clone())
            .collect();
        let response = self
            .request(self.client.delete(self.rest_url("recent_recipes")))
            .query(&[("id", format!("in.({})", stale.join(",")).as_str())])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    fn invalidate_caches(&self) {
        self.favorites.invalidate();
        self.recents.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn sample_recipe(id: Option<&str>) -> Recipe {
        Recipe {
            id: id.map(str::to_string),
            title: "Chicken Delight".to_string(),
            description: "Quick dinner".to_string(),
            image: "https://example.com/pic.jpg".to_string(),
            prep_time: "5 minutes".to_string(),
            cook_time: "10 minutes".to_string(),
            ingredients: vec!["chicken".to_string(), "rice".to_string()],
            instructions: vec!["Cook it".to_string()],
            is_dalle_image: false,
        }
    }

    fn recipe_row_json(id: &str) -> String {
        format!(
            r#"{{
                "id": "{}",
                "title": "Chicken Delight",
                "description": "Quick dinner",
                "image": "https://example.com/pic.jpg",
                "prep_time": "5 minutes",
                "cook_time": "10 minutes",
                "ingredients": ["chicken", "rice"],
                "instructions": ["Cook it"],
                "is_dalle_image": false
            }}"#,
            id
        )
    }

    #[tokio::test]
    async fn test_save_recipe_returns_assigned_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/recipes")
            .match_header("apikey", "anon")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(format!("[{}]", recipe_row_json("r-1")))
            .create();

        let store = SupabaseStore::with_base_url(server.url(), "anon".to_string());
        let saved = store
            .save_recipe("user-1", &sample_recipe(None))
            .await
            .unwrap();
        assert_eq!(saved.id.as_deref(), Some("r-1"));
        mock.assert();
    }

    #[tokio::test]
    async fn test_favorites_cached_until_invalidated() {
        let mut server = Server::new_async().await;
        let list_mock = server
            .mock("GET", "/rest/v1/favorites")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"[{{"id": "f-1", "recipes": {}}}]"#,
                recipe_row_json("r-1")
            ))
            .expect(1)
            .create();

        let store = SupabaseStore::with_base_url(server.url(), "anon".to_string());
        let first = store.favorite_recipes("user-1").await.unwrap();
        let second = store.favorite_recipes("user-1").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].id.as_deref(), Some("r-1"));
        // One backend hit for two reads
        list_mock.assert();
    }

    #[tokio::test]
    async fn test_add_favorite_inserts_unsaved_recipe_first() {
        let mut server = Server::new_async().await;
        let insert_recipe = server
            .mock("POST", "/rest/v1/recipes")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(format!("[{}]", recipe_row_json("r-9")))
            .expect(1)
            .create();
        let insert_favorite = server
            .mock("POST", "/rest/v1/favorites")
            .match_body(Matcher::PartialJsonString(
                r#"{"recipe_id": "r-9"}"#.to_string(),
            ))
            .with_status(201)
            .with_body("[]")
            .expect(1)
            .create();

        let store = SupabaseStore::with_base_url(server.url(), "anon".to_string());
        store
            .add_favorite("user-1", &sample_recipe(None))
            .await
            .unwrap();
        insert_recipe.assert();
        insert_favorite.assert();
    }

    #[tokio::test]
    async fn test_add_favorite_reuses_existing_id() {
        let mut server = Server::new_async().await;
        let insert_favorite = server
            .mock("POST", "/rest/v1/favorites")
            .match_body(Matcher::PartialJsonString(
                r#"{"recipe_id": "r-1"}"#.to_string(),
            ))
            .with_status(201)
            .with_body("[]")
            .expect(1)
            .create();

        let store = SupabaseStore::with_base_url(server.url(), "anon".to_string());
        store
            .add_favorite("user-1", &sample_recipe(Some("r-1")))
            .await
            .unwrap();
        insert_favorite.assert();
    }

    #[tokio::test]
    async fn test_remove_favorite_invalidates_cache() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/rest/v1/favorites")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .expect(2)
            .create();
        let _delete = server
            .mock("DELETE", "/rest/v1/favorites")
            .match_query(Matcher::Any)
            .with_status(204)
            .create();

        let store = SupabaseStore::with_base_url(server.url(), "anon".to_string());
        store.favorite_recipes("user-1").await.unwrap();
        store.remove_favorite("user-1", "r-1").await.unwrap();
        // Cache was invalidated, so this read hits the backend again
        store.favorite_recipes("user-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_store_error_on_failure_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/v1/recipes")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("permission denied")
            .create();

        let store = SupabaseStore::with_base_url(server.url(), "anon".to_string());
        let result = store.user_recipes("user-1").await;
        assert!(matches!(result, Err(ChefError::Store(_))));
    }

    #[tokio::test]
    async fn test_recipe_by_id_found_and_missing() {
        let mut server = Server::new_async().await;
        let _found = server
            .mock("GET", "/rest/v1/recipes")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.r-1".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!("[{}]", recipe_row_json("r-1")))
            .create();
        let _missing = server
            .mock("GET", "/rest/v1/recipes")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.r-404".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create();

        let store = SupabaseStore::with_base_url(server.url(), "anon".to_string());
        let found = store.recipe_by_id("r-1").await.unwrap();
        assert_eq!(found.unwrap().title, "Chicken Delight");
        assert!(store.recipe_by_id("r-404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_recipe_scoped_to_owner() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PATCH", "/rest/v1/recipes")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "eq.r-1".into()),
                Matcher::UrlEncoded("user_id".into(), "eq.user-1".into()),
            ]))
            .with_status(204)
            .create();

        let store = SupabaseStore::with_base_url(server.url(), "anon".to_string());
        store
            .update_recipe("user-1", "r-1", &sample_recipe(Some("r-1")))
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_delete_recipe_scoped_to_owner() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/rest/v1/recipes")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "eq.r-1".into()),
                Matcher::UrlEncoded("user_id".into(), "eq.user-1".into()),
            ]))
            .with_status(204)
            .create();

        let store = SupabaseStore::with_base_url(server.url(), "anon".to_string());
        store.delete_recipe("user-1", "r-1").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_add_recent_dedups_on_recipe_id() {
        let mut server = Server::new_async().await;
        // Existing entry for the same recipe is dropped before the insert
        let dedup_delete = server
            .mock("DELETE", "/rest/v1/recent_recipes")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("user_id".into(), "eq.user-1".into()),
                Matcher::UrlEncoded("recipe_id".into(), "eq.r-1".into()),
            ]))
            .with_status(204)
            .expect(1)
            .create();
        let insert = server
            .mock("POST", "/rest/v1/recent_recipes")
            .match_body(Matcher::PartialJsonString(
                r#"{"recipe_id": "r-1"}"#.to_string(),
            ))
            .with_status(201)
            .with_body("[]")
            .expect(1)
            .create();
        // Under the retention limit, so no trim delete follows
        let _trim_check = server
            .mock("GET", "/rest/v1/recent_recipes")
            .match_query(Matcher::UrlEncoded("select".into(), "id".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": "j-1"}]"#)
            .create();

        let store = SupabaseStore::with_base_url(server.url(), "anon".to_string());
        store
            .add_recent("user-1", &sample_recipe(Some("r-1")))
            .await
            .unwrap();
        dedup_delete.assert();
        insert.assert();
    }

    #[tokio::test]
    async fn test_add_recent_trims_rows_past_limit() {
        let mut server = Server::new_async().await;
        let _dedup_delete = server
            .mock("DELETE", "/rest/v1/recent_recipes")
            .match_query(Matcher::UrlEncoded("recipe_id".into(), "eq.r-1".into()))
            .with_status(204)
            .create();
        let _insert = server
            .mock("POST", "/rest/v1/recent_recipes")
            .with_status(201)
            .with_body("[]")
            .create();
        // Twelve join rows, newest first: j-11 and j-12 are past the limit
        let ids: Vec<String> = (1..=12).map(|i| format!(r#"{{"id": "j-{}"}}"#, i)).collect();
        let _trim_check = server
            .mock("GET", "/rest/v1/recent_recipes")
            .match_query(Matcher::UrlEncoded("select".into(), "id".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!("[{}]", ids.join(",")))
            .create();
        let trim_delete = server
            .mock("DELETE", "/rest/v1/recent_recipes")
            .match_query(Matcher::UrlEncoded("id".into(), "in.(j-11,j-12)".into()))
            .with_status(204)
            .expect(1)
            .create();

        let store = SupabaseStore::with_base_url(server.url(), "anon".to_string());
        store
            .add_recent("user-1", &sample_recipe(Some("r-1")))
            .await
            .unwrap();
        trim_delete.assert();
    }

    #[tokio::test]
    async fn test_recent_recipes_limit_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/recent_recipes")
            .match_query(Matcher::UrlEncoded("limit".into(), "10".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create();

        let store = SupabaseStore::with_base_url(server.url(), "anon".to_string());
        let recents = store.recent_recipes("user-1").await.unwrap();
        assert!(recents.is_empty());
        mock.assert();
    }
}
