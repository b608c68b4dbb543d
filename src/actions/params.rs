use serde_json::{Map, Value, json};

use crate::actions::schema::ParamSchema;

/// Loose parameter names rewritten to the names agent schemas expect.
pub const FIELD_ALIASES: &[(&str, &str)] = &[
    ("desc", "description"),
    ("details", "description"),
    ("ticker", "tokenTicker"),
    ("token_ticker", "tokenTicker"),
    ("img", "imageUrl"),
    ("url", "imageUrl"),
];

pub const PLACEHOLDER_NAME: &str = "Flow Token";
pub const PLACEHOLDER_TICKER: &str = "FLOW";
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/512x512.png";

const SOCIAL_HINTS: &[&str] = &["twitter", "telegram", "discord", "website", "social"];

/// Renames aliased fields to their canonical names. An alias the schema
/// declares itself is left alone, and an existing canonical value is never
/// overwritten. Other fields pass through in order.
pub fn normalize_fields(params: Map<String, Value>, schema: Option<&ParamSchema>) -> Map<String, Value> {
    let mut out = Map::with_capacity(params.len());
    for (key, value) in params {
        let canonical = FIELD_ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, canonical)| *canonical)
            .filter(|_| !schema.is_some_and(|s| s.declares(&key)));

        match canonical {
            Some(name) if !out.contains_key(name) => {
                out.insert(name.to_string(), value);
            }
            Some(_) => {}
            None => {
                out.insert(key, value);
            }
        }
    }
    out
}

/// Placeholder for a required field, guessed from its name.
pub fn default_for_field(name: &str) -> Option<Value> {
    let lower = name.to_ascii_lowercase();
    if SOCIAL_HINTS.iter().any(|h| lower.contains(h)) {
        Some(json!(""))
    } else if lower.contains("url") || lower.contains("image") || lower.contains("uri") {
        Some(json!(PLACEHOLDER_IMAGE_URL))
    } else if lower.contains("ticker") || lower.contains("symbol") {
        Some(json!(PLACEHOLDER_TICKER))
    } else if lower.contains("name") {
        Some(json!(PLACEHOLDER_NAME))
    } else {
        None
    }
}

/// Fills every missing field that has a known placeholder. Returns the names
/// that were filled.
pub fn inject_defaults(params: &mut Map<String, Value>, missing: &[String]) -> Vec<String> {
    let mut injected = Vec::new();
    for field in missing {
        if let Some(value) = default_for_field(field) {
            params.insert(field.clone(), value);
            injected.push(field.clone());
        }
    }
    injected
}
