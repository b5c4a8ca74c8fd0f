//! Selectors for the portal's markup. Everything site-specific lives here.

use once_cell::sync::Lazy;
use scraper::Selector;

use crate::models::Field;

pub const LOGIN_USERNAME: &str = "#username";
pub const LOGIN_PASSWORD: &str = "#password";
pub const LOGIN_SUBMIT: &str = "button[type=\"submit\"]";

/// Banners and popups that block clicks on the page underneath.
pub const OVERLAYS: [&str; 3] = [".cookie-banner", ".modal-backdrop", ".popup-overlay"];

pub const CALENDAR_TRIGGER: &str = ".datepicker-trigger";
pub const CALENDAR_TITLE: &str = ".datepicker-header .datepicker-title";
pub const CALENDAR_NEXT: &str = ".datepicker-next";
pub const CALENDAR_CONTINUE: &str = "button.datepicker-continue";

/// Day cells carry their full date as an aria label, e.g. `June 15, 2025`.
pub fn day_cell(label: &str) -> String {
    format!(".datepicker-days td[aria-label=\"{}\"]", label)
}

pub const PRODUCT_CARD: &str = "div.product-card";
pub const COLOR_SWATCH: &str = ".color-swatch";
pub const NEXT_PAGE: &str = "a[rel=\"next\"]:not(.disabled)";

/// Icon classes of the attribute list and the field each one fills.
/// Bud count has no icon in the listing markup.
pub const ATTRIBUTE_ICONS: [(&str, Field); 4] = [
    ("icon-length", Field::Length),
    ("icon-diameter", Field::Diameter),
    ("icon-weight", Field::Weight),
    ("icon-certificate", Field::Certificate),
];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Invalid card selector")
}

pub static NAME: Lazy<Selector> = Lazy::new(|| selector(".product-name"));
pub static TAG: Lazy<Selector> = Lazy::new(|| selector(".product-tag"));
pub static IMAGE: Lazy<Selector> = Lazy::new(|| selector("img.product-image"));
pub static ORIGIN: Lazy<Selector> = Lazy::new(|| selector(".product-origin"));
pub static ATTRIBUTE_ITEM: Lazy<Selector> = Lazy::new(|| selector("ul.product-attributes li"));
pub static ATTRIBUTE_ICON: Lazy<Selector> = Lazy::new(|| selector("i"));
pub static ATTRIBUTE_TEXT: Lazy<Selector> = Lazy::new(|| selector("span"));
pub static FARM: Lazy<Selector> = Lazy::new(|| selector(".product-farm"));
pub static FARM_LABEL: Lazy<Selector> = Lazy::new(|| selector("span.label"));
pub static FIRST_QUANTITY: Lazy<Selector> = Lazy::new(|| selector(".first-quantity"));
pub static PACK_UNIT: Lazy<Selector> = Lazy::new(|| selector(".pack-unit"));
pub static SPAN: Lazy<Selector> = Lazy::new(|| selector("span"));
pub static PRODUCT_LINK: Lazy<Selector> = Lazy::new(|| selector("a.product-link"));
pub static PRICE_ROW: Lazy<Selector> = Lazy::new(|| selector(".price-row"));
pub static PRICE: Lazy<Selector> = Lazy::new(|| selector(".price"));
pub static QUANTITY_LABEL: Lazy<Selector> = Lazy::new(|| selector(".quantity-label"));
pub static READONLY_INPUT: Lazy<Selector> = Lazy::new(|| selector("input[readonly]"));
pub static CARD: Lazy<Selector> = Lazy::new(|| selector(PRODUCT_CARD));
