use once_cell::sync::Lazy;
use regex::Regex;

use super::normalize_text;

static ASSORTMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)assortment").expect("Invalid assortment regex")
});

static ABSOLUTE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://").expect("Invalid absolute url regex")
});

/// Image proxy URLs sometimes lose a slash after the scheme or gain one
/// after the proxy path segment.
static MALFORMED_IMAGE_PROXY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?:/+([^/]+)/image-proxy/+").expect("Invalid image proxy regex")
});

/// Available quantity text without the "assortment" marker.
pub fn strip_assortment(raw: &str) -> String {
    normalize_text(&ASSORTMENT.replace_all(raw, ""))
}

/// `"{unit} ({code}) {available}"` label shown next to the first tier.
pub fn pack_label(unit_name: &str, unit_code: &str, available: &str) -> String {
    format!(
        "{} ({}) {}",
        normalize_text(unit_name),
        normalize_text(unit_code),
        available
    )
}

/// Resolve a link against the site origin.
///
/// Absolute `http(s)://` links pass through; anything else is joined to the
/// base with exactly one slash between them.
pub fn resolve_url(base_url: &str, href: &str) -> String {
    let href = href.trim();
    if ABSOLUTE_URL.is_match(href) {
        return href.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        href.trim_start_matches('/')
    )
}

pub fn repair_image_url(src: &str) -> String {
    MALFORMED_IMAGE_PROXY
        .replace(src.trim(), "https://$1/image-proxy/")
        .into_owned()
}
