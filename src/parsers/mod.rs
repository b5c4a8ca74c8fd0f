pub mod details;
pub mod price;
pub mod time;

pub use details::*;
pub use price::*;
pub use time::*;

use crate::models::NOT_AVAILABLE;

/// Mis-decoded UTF-8 euro sign as it arrives from the portal.
const MOJIBAKE_EURO: &str = "â‚¬";

/// Clean a scraped text value for the sheet.
///
/// Keeps printable ASCII plus `€` and trims. Absent
/// input, or input with nothing left after cleanup, becomes `"N/A"`.
pub fn normalize(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(text) if !text.is_empty() => text,
        _ => return NOT_AVAILABLE.to_string(),
    };

    let repaired = raw.replace(MOJIBAKE_EURO, "€");
    let kept: String = repaired
        .chars()
        .filter(|c| matches!(c, ' '..='~' | '€'))
        .collect();

    let cleaned = kept.trim();
    if cleaned.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        cleaned.to_string()
    }
}

/// `normalize` for values that are already present.
pub fn normalize_text(raw: &str) -> String {
    normalize(Some(raw))
}
