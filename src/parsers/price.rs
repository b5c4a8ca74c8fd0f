use once_cell::sync::Lazy;
use regex::Regex;

use super::normalize_text;

static QUANTITY_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[xX]\s+").expect("Invalid quantity prefix regex")
});

/// Price text with a decimal comma turned into a dot.
pub fn normalize_price(raw: &str) -> String {
    normalize_text(&raw.replace(',', "."))
}

/// Drop the leading `x ` token of a tier quantity label (`"x 50"` -> `"50"`).
pub fn strip_quantity_prefix(raw: &str) -> String {
    normalize_text(&QUANTITY_PREFIX.replace(raw, ""))
}
