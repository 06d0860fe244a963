//! Prompt templates for the completion and image providers.

/// Build the recipe-generation prompt for a trimmed ingredient list.
pub fn build_recipe_prompt(ingredients: &[String]) -> String {
    format!(
        "Create a quick and easy recipe (15-20 minutes total cooking time) using these ingredients: {}.

The recipe should include:
1. A creative title
2. A brief description
3. Preparation time (around 5 minutes)
4. Cooking time (around 10-15 minutes)
5. A list of all ingredients with measurements
6. Step-by-step cooking instructions
7. A URL to an image that represents this dish (must be a valid, publicly accessible image URL)

Make sure the recipe is simple, delicious, and uses all or most of the provided ingredients.
For the image URL, please provide a link to a high-quality, appetizing image that accurately represents the dish.",
        ingredients.join(", ")
    )
}

/// Build the image-generation prompt from distinctive ingredients and an
/// optional dish type.
pub fn build_image_prompt(ingredients: &[String], dish_type: Option<&str>) -> String {
    match dish_type.filter(|d| !d.is_empty()) {
        Some(dish) => format!(
            "generate an instagram food blog worthy food pic of a {} dish that includes these ingredients: {}",
            dish,
            ingredients.join(", ")
        ),
        None => format!(
            "generate an instagram food blog worthy food pic of a dish that includes these ingredients: {}",
            ingredients.join(", ")
        ),
    }
}
