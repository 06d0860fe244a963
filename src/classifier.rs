//! Scores raw ingredient strings for visual distinctiveness.
//!
//! Image prompts built from "2 tbsp of olive oil, salt, pepper" produce
//! generic stock-photo results. This module normalizes ingredient lines,
//! filters out pantry staples and ranks what is left so the image prompt
//! leads with the things a camera would actually see.

use std::sync::LazyLock;

use regex::Regex;

/// Pantry staples that skew image prompts toward generic results.
const GENERIC_INGREDIENTS: &[&str] = &[
    "salt", "pepper", "oil", "water", "sugar", "flour", "butter", "garlic", "onion", "spice",
    "herb", "seasoning", "vinegar",
];

/// Ingredients that are visually distinctive and good for image prompts.
const DISTINCTIVE_INGREDIENTS: &[&str] = &[
    // Proteins
    "chicken", "beef", "pork", "lamb", "fish", "salmon", "tuna", "shrimp", "tofu",
    // Vegetables
    "tomato", "carrot", "broccoli", "spinach", "kale", "pepper", "zucchini", "eggplant",
    "mushroom",
    // Fruits
    "apple", "orange", "lemon", "lime", "berry", "strawberry", "blueberry", "raspberry", "banana",
    // Other distinctive ingredients
    "cheese", "chocolate", "avocado", "egg", "rice", "pasta", "noodle", "bean", "lentil",
];

const COLOR_WORDS: &[&str] = &[
    "red", "green", "yellow", "orange", "purple", "black", "white", "blue", "brown",
];

static MEASUREMENT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\d+\s*/?\d*\s*(tbsp|tsp|cup|g|oz|ml|pound|lb|pinch|dash|tablespoon|teaspoon)s?\s*(of)?\s*",
    )
    .unwrap()
});

static BULLET_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-*•]\s*").unwrap());

static GENERIC_MEASUREMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+\s*(tbsp|tsp|cup|g|oz|ml|pinch|dash)\s*of\s*").unwrap()
});

/// Parser-internal ranking record, discarded after selection.
struct ScoredIngredient {
    ingredient: String,
    score: u32,
}

/// Strip a leading quantity+unit token and bullet markers, trim, lowercase.
pub fn normalize(ingredient: &str) -> String {
    let stripped = MEASUREMENT_PREFIX.replace(ingredient, "");
    let stripped = BULLET_PREFIX.replace(&stripped, "");
    stripped.trim().to_lowercase()
}

/// Whether an ingredient is a pantry staple (or a measured quantity of one)
/// that would skew image results.
pub fn is_generic(ingredient: &str) -> bool {
    let lower = ingredient.to_lowercase();
    GENERIC_INGREDIENTS.iter().any(|g| lower.contains(g)) || GENERIC_MEASUREMENT.is_match(&lower)
}

fn score(ingredient: &str) -> u32 {
    if is_generic(ingredient) {
        return 0;
    }

    let mut score = 1;
    if DISTINCTIVE_INGREDIENTS.iter().any(|d| ingredient.contains(d)) {
        score += 3;
    }
    if COLOR_WORDS.iter().any(|c| ingredient.contains(c)) {
        score += 2;
    }
    // Longer names are usually more specific ("heirloom tomatoes")
    if ingredient.len() > 10 {
        score += 1;
    }
    score
}

/// Return the `max_count` most visually distinctive ingredients, normalized.
///
/// Ties keep their original order (the sort is stable), so the result is
/// deterministic for identical input. Generic ingredients are never returned;
/// if the scored picks run short, the remaining slots are backfilled from the
/// normalized list in original order.
pub fn distinctive_ingredients(ingredients: &[String], max_count: usize) -> Vec<String> {
    let cleaned: Vec<String> = ingredients.iter().map(|i| normalize(i)).collect();

    let mut scored: Vec<ScoredIngredient> = cleaned
        .iter()
        .map(|ingredient| ScoredIngredient {
            ingredient: ingredient.clone(),
            score: score(ingredient),
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    let mut top: Vec<String> = scored
        .into_iter()
        .take(max_count)
        .map(|s| s.ingredient)
        .filter(|i| !i.is_empty() && !is_generic(i))
        .collect();

    // Backfill when the distinctive picks run short of min(max_count, input)
    if top.len() < max_count.min(ingredients.len()) {
        for ingredient in &cleaned {
            if top.len() >= max_count {
                break;
            }
            if !top.contains(ingredient) && !is_generic(ingredient) && !ingredient.is_empty() {
                top.push(ingredient.clone());
            }
        }
    }

    top
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_strips_measurements_and_bullets() {
        assert_eq!(normalize("2 tbsp of Olive Tapenade"), "olive tapenade");
        assert_eq!(normalize("- Chicken Breast"), "chicken breast");
        assert_eq!(normalize("1 cup rice"), "rice");
        assert_eq!(normalize("• fresh basil leaves"), "fresh basil leaves");
        assert_eq!(normalize("  salmon fillet  "), "salmon fillet");
    }

    #[test]
    fn test_generic_ingredients_detected() {
        assert!(is_generic("salt"));
        assert!(is_generic("extra virgin olive oil"));
        assert!(is_generic("2 tsp of cumin"));
        assert!(!is_generic("chicken breast"));
    }

    #[test]
    fn test_never_returns_more_than_max_count() {
        let ingredients = list(&["chicken", "salmon", "tomato", "avocado", "cheese"]);
        let result = distinctive_ingredients(&ingredients, 3);
        assert!(result.len() <= 3);
    }

    #[test]
    fn test_never_returns_generic_ingredient() {
        let ingredients = list(&["salt", "pepper", "olive oil", "chicken", "water"]);
        let result = distinctive_ingredients(&ingredients, 4);
        assert!(result.iter().all(|i| !is_generic(i)));
        assert_eq!(result, vec!["chicken"]);
    }

    #[test]
    fn test_distinctive_keyword_outranks_plain() {
        let ingredients = list(&["jicama", "chicken"]);
        let result = distinctive_ingredients(&ingredients, 1);
        assert_eq!(result, vec!["chicken"]);
    }

    #[test]
    fn test_color_word_boosts_score() {
        // "red cabbage" scores 1+2 (color) +1 (length), "cabbage" just 1
        let ingredients = list(&["cabbage", "red cabbage", "salmon"]);
        let result = distinctive_ingredients(&ingredients, 2);
        assert_eq!(result, vec!["red cabbage", "salmon"]);
    }

    #[test]
    fn test_stable_tie_break_keeps_original_order() {
        let ingredients = list(&["tofu", "kale", "tuna"]);
        let result = distinctive_ingredients(&ingredients, 3);
        assert_eq!(result, vec!["tofu", "kale", "tuna"]);
    }

    #[test]
    fn test_low_scorers_still_fill_remaining_slots() {
        let ingredients = list(&["quince", "medlar", "chicken"]);
        let result = distinctive_ingredients(&ingredients, 3);
        assert_eq!(result, vec!["chicken", "quince", "medlar"]);
    }

    #[test]
    fn test_empty_input() {
        let result = distinctive_ingredients(&[], 4);
        assert!(result.is_empty());
    }
}
