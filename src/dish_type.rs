//! Detects a coarse dish category from recipe title and description.

use std::sync::LazyLock;

use regex::Regex;

/// Common dish types, tested in order: the first one found wins, so broader
/// categories near the front take precedence over later ones.
const DISH_TYPES: &[&str] = &[
    "pasta", "salad", "soup", "stew", "curry", "stir-fry", "casserole", "roast", "grill",
    "sandwich", "burger", "pizza", "taco", "burrito", "risotto", "pilaf", "paella", "omelette",
    "frittata", "quiche", "cake", "pie", "cookie", "bread", "muffin", "pancake", "waffle",
];

static DISH_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\w+(?:soup|salad|stew|curry|pasta|sandwich|burger|pizza|cake|pie)\b").unwrap()
});

/// Extract a dish type from title and description, if one can be found.
pub fn extract_dish_type(title: &str, description: &str) -> Option<String> {
    let text = format!("{} {}", title, description).to_lowercase();

    for dish_type in DISH_TYPES {
        if text.contains(dish_type) {
            return Some((*dish_type).to_string());
        }
    }

    // Compound names like "minestrone" won't hit the vocabulary, but
    // "noodlesoup" or "cheeseburger" still carry their category as a suffix.
    DISH_SUFFIX
        .find(&text)
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_match() {
        assert_eq!(
            extract_dish_type("A hearty beef stew for winter", ""),
            Some("stew".to_string())
        );
        assert_eq!(
            extract_dish_type("Weeknight dinner", "Creamy mushroom risotto"),
            Some("risotto".to_string())
        );
    }

    #[test]
    fn test_first_vocabulary_entry_wins() {
        // Both "pasta" and "salad" appear; vocabulary order decides.
        assert_eq!(
            extract_dish_type("Pasta salad", "cold salad with pasta"),
            Some("pasta".to_string())
        );
    }

    #[test]
    fn test_compound_names_match_by_substring() {
        assert_eq!(
            extract_dish_type("Classic cheeseburger night", ""),
            Some("burger".to_string())
        );
        assert_eq!(
            extract_dish_type("Grandma's shortcake", ""),
            Some("cake".to_string())
        );
    }

    #[test]
    fn test_no_match() {
        assert_eq!(
            extract_dish_type("Shakshuka", "eggs poached in tomato sauce"),
            None
        );
        assert_eq!(extract_dish_type("", ""), None);
    }
}
