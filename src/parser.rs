//! Turns a free-text LLM completion into structured recipe fields.
//!
//! Extraction is best-effort: every rule is a prioritized fallback chain and
//! the ordering matters, since later defaults depend on what earlier steps
//! left empty. Parsing never fails; the worst case for any field is its
//! deterministic default, which is also exactly what `parse_completion("")`
//! produces for the fallback path.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

/// Textual recipe fields extracted from a completion, before an image is
/// attached by the generator.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecipe {
    pub title: String,
    pub description: String,
    pub prep_time: String,
    pub cook_time: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

static TITLE_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^title:\s*").unwrap());
static HEADING_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#+\s*").unwrap());
static DESCRIPTION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^description:\s*").unwrap());
static METADATA_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)prep time|cook time|ingredients|instructions").unwrap());

static PREP_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)prep\s*time:?\s*(\d+[-\s]?\d*\s*minutes?)").unwrap());
static COOK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)cook\s*time:?\s*(\d+[-\s]?\d*\s*minutes?)").unwrap());

static INGREDIENTS_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)ingredients").unwrap());
static INSTRUCTIONS_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)instructions|directions|steps").unwrap());

static BULLET_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[-*•]\s+").unwrap());
static MEASUREMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d+\s*(cup|tbsp|tsp|g|oz|ml|pound|lb)").unwrap());
static NUMBERED_STEP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\d+[.)]\s+").unwrap());

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Default title when the completion has none worth keeping.
pub fn fallback_title(ingredient_list: &[String]) -> String {
    let first = ingredient_list.first().map(String::as_str).unwrap_or("");
    format!("{} Delight", capitalize_first(first))
}

/// Default description naming every ingredient.
pub fn fallback_description(ingredient_list: &[String]) -> String {
    format!(
        "A quick and easy recipe using {}. Ready in just 15 minutes!",
        ingredient_list.join(", ")
    )
}

/// Six generic steps parameterized by the ingredient list.
pub fn generic_instructions(ingredient_list: &[String]) -> Vec<String> {
    let first = ingredient_list.first().map(String::as_str).unwrap_or("");
    vec![
        format!("Prepare the {} by washing and cutting into bite-sized pieces.", first),
        "Heat a pan over medium heat and add a tablespoon of oil.".to_string(),
        format!("Add {} to the pan and cook for 5 minutes.", first),
        if ingredient_list.len() > 1 {
            format!(
                "Add {} and cook for another 5 minutes.",
                ingredient_list[1..].join(", ")
            )
        } else {
            "Cook for another 5 minutes.".to_string()
        },
        "Season with salt and pepper to taste.".to_string(),
        "Serve hot and enjoy your meal!".to_string(),
    ]
}

fn extract_title(lines: &[&str], ingredient_list: &[String]) -> String {
    let raw = lines.first().copied().unwrap_or("");
    let title = HEADING_MARKER.replace(raw, "");
    let title = TITLE_PREFIX.replace(title.trim(), "").trim().to_string();

    if title.is_empty() || title.len() > 50 {
        fallback_title(ingredient_list)
    } else {
        title
    }
}

fn extract_description(lines: &[&str], ingredient_list: &[String]) -> String {
    // The search window is bounded to the first five lines.
    let candidate = lines
        .iter()
        .take(5)
        .skip(1)
        .map(|line| line.trim())
        .find(|line| !line.is_empty() && !line.starts_with('#') && !METADATA_LINE.is_match(line));

    // Strip before the emptiness check: a bare "Description:" label must
    // synthesize the default, not come through as an empty description.
    candidate
        .map(|line| DESCRIPTION_PREFIX.replace(line, "").to_string())
        .filter(|description| !description.is_empty())
        .unwrap_or_else(|| fallback_description(ingredient_list))
}

fn extract_ingredients(lines: &[&str], ingredient_list: &[String]) -> Vec<String> {
    let mut ingredients = Vec::new();
    let mut in_section = false;

    for line in lines {
        if !in_section {
            if INGREDIENTS_HEADER.is_match(line) {
                in_section = true;
            }
            continue;
        }
        if INSTRUCTIONS_HEADER.is_match(line) {
            in_section = false;
            continue;
        }
        if BULLET_LINE.is_match(line) || MEASUREMENT.is_match(line) {
            ingredients.push(BULLET_LINE.replace(line, "").trim().to_string());
        }
    }

    if ingredients.is_empty() {
        ingredient_list.to_vec()
    } else {
        ingredients
    }
}

fn extract_instructions(lines: &[&str], ingredient_list: &[String]) -> Vec<String> {
    let mut instructions = Vec::new();
    let mut in_section = false;

    for line in lines {
        if !in_section {
            if INSTRUCTIONS_HEADER.is_match(line) {
                in_section = true;
            }
            continue;
        }
        if NUMBERED_STEP.is_match(line) || BULLET_LINE.is_match(line) {
            let step = NUMBERED_STEP.replace(line, "");
            let step = BULLET_LINE.replace(&step, "");
            instructions.push(step.trim().to_string());
        }
    }

    if instructions.is_empty() {
        generic_instructions(ingredient_list)
    } else {
        instructions
    }
}

/// Parse a completion into recipe fields, falling back per-field when the
/// text does not yield one. `ingredient_list` is the user's original input,
/// used for every synthesized default.
pub fn parse_completion(completion: &str, ingredient_list: &[String]) -> ParsedRecipe {
    let lines: Vec<&str> = completion.lines().filter(|l| !l.trim().is_empty()).collect();

    let title = extract_title(&lines, ingredient_list);
    let description = extract_description(&lines, ingredient_list);

    let prep_time = PREP_TIME
        .captures(completion)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| "5 minutes".to_string());
    let cook_time = COOK_TIME
        .captures(completion)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| "10 minutes".to_string());

    let ingredients = extract_ingredients(&lines, ingredient_list);
    let instructions = extract_instructions(&lines, ingredient_list);

    debug!(
        "parsed completion: title={:?}, {} ingredients, {} steps",
        title,
        ingredients.len(),
        instructions.len()
    );

    ParsedRecipe {
        title,
        description,
        prep_time,
        cook_time,
        ingredients,
        instructions,
    }
}
