use scraper::{ElementRef, Html, Selector};

use super::markup::{self, ATTRIBUTE_ICONS};
use crate::browser::CardSnapshot;
use crate::models::{Field, PriceTier, ProductRecord, NOT_AVAILABLE};
use crate::parsers::{
    normalize_price, normalize_text, pack_label, repair_image_url, resolve_url, strip_assortment,
    strip_quantity_prefix,
};

/// How many price rows a record has columns for.
const MAX_TIERS: usize = 3;

/// One card plus what the live DOM told us about it.
pub struct CardScope<'a> {
    card: ElementRef<'a>,
    color: Option<&'a str>,
    base_url: &'a str,
    tiers: Vec<PriceTier>,
}

/// `None` leaves the field at `"N/A"`.
type FieldReader = fn(&CardScope<'_>) -> Option<String>;

/// Readers run independently; a miss in one never affects another.
static FIELD_TABLE: [(Field, FieldReader); 20] = [
    (Field::Name, read_name),
    (Field::Tag, read_tag),
    (Field::ImageUrl, read_image_url),
    (Field::Origin, read_origin),
    (Field::Length, read_attribute::<0>),
    (Field::Diameter, read_attribute::<1>),
    (Field::BudCount, read_bud_count),
    (Field::Weight, read_attribute::<2>),
    (Field::Certificate, read_attribute::<3>),
    (Field::Farm, read_farm),
    (Field::Color, read_color),
    (Field::StemPrice, read_tier_price::<0>),
    (Field::StemQuantity, read_tier_quantity::<0>),
    (Field::FirstQuantityLabel, read_first_quantity_label),
    (Field::AvailableQuantity, read_available_quantity),
    (Field::ProductUrl, read_product_url),
    (Field::SecondPrice, read_tier_price::<1>),
    (Field::SecondQuantity, read_tier_quantity::<1>),
    (Field::ThirdPrice, read_tier_price::<2>),
    (Field::ThirdQuantity, read_tier_quantity::<2>),
];

/// Build a record from one product card. Never fails: whatever cannot be
/// read stays `"N/A"`.
pub fn extract(
    card: ElementRef<'_>,
    color: Option<&str>,
    base_url: &str,
    captured_at: &str,
) -> ProductRecord {
    let scope = CardScope {
        card,
        color,
        base_url,
        tiers: price_tiers(card),
    };
    let mut record = ProductRecord::default();

    for (field, read) in FIELD_TABLE.iter() {
        if let Some(value) = read(&scope) {
            *record.field_mut(*field) = value;
        }
    }
    record.capture_timestamp = captured_at.to_string();
    record
}

pub fn extract_snapshot(snapshot: &CardSnapshot, base_url: &str, captured_at: &str) -> ProductRecord {
    let fragment = Html::parse_fragment(&snapshot.html);
    let card = fragment
        .select(&markup::CARD)
        .next()
        .unwrap_or_else(|| fragment.root_element());
    extract(card, snapshot.color.as_deref(), base_url, captured_at)
}

/// Purchasable price rows in DOM order, at most three.
pub fn price_tiers(card: ElementRef<'_>) -> Vec<PriceTier> {
    card.select(&markup::PRICE_ROW)
        .filter(|row| !is_unavailable_row(row))
        .take(MAX_TIERS)
        .map(|row| PriceTier {
            price: row_price(&row),
            quantity: row
                .select(&markup::QUANTITY_LABEL)
                .next()
                .map(|label| strip_quantity_prefix(&element_text(&label)))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        })
        .collect()
}

fn is_unavailable_row(row: &ElementRef<'_>) -> bool {
    let element = row.value();
    element.classes().any(|class| class == "disabled")
        || element.attr("aria-disabled") == Some("true")
        || row.select(&markup::READONLY_INPUT).next().is_some()
}

fn row_price(row: &ElementRef<'_>) -> String {
    let Some(price) = row.select(&markup::PRICE).next() else {
        return NOT_AVAILABLE.to_string();
    };
    match price.value().attr("data-price-amount") {
        Some(amount) if !amount.trim().is_empty() => normalize_price(amount),
        _ => normalize_price(&element_text(&price)),
    }
}

impl<'a> CardScope<'a> {
    fn first(&self, selector: &Selector) -> Option<ElementRef<'a>> {
        self.card.select(selector).next()
    }

    fn text(&self, selector: &Selector) -> Option<String> {
        self.first(selector)
            .map(|element| normalize_text(&element_text(&element)))
            .and_then(present)
    }

    fn attr(&self, selector: &Selector, name: &str) -> Option<&'a str> {
        self.first(selector)
            .and_then(|element| element.value().attr(name))
            .filter(|value| !value.trim().is_empty())
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

fn present(value: String) -> Option<String> {
    if value == NOT_AVAILABLE {
        None
    } else {
        Some(value)
    }
}

/// Text of `element` with every descendant matching `skip` left out.
fn text_excluding(element: ElementRef<'_>, skip: &Selector) -> String {
    let mut out = String::new();
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            if !skip.matches(&child) {
                out.push_str(&text_excluding(child, skip));
            }
        }
    }
    out
}

fn read_name(scope: &CardScope<'_>) -> Option<String> {
    scope.text(&markup::NAME)
}

fn read_tag(scope: &CardScope<'_>) -> Option<String> {
    scope.text(&markup::TAG)
}

fn read_origin(scope: &CardScope<'_>) -> Option<String> {
    scope.text(&markup::ORIGIN)
}

fn read_image_url(scope: &CardScope<'_>) -> Option<String> {
    scope
        .attr(&markup::IMAGE, "src")
        .or_else(|| scope.attr(&markup::IMAGE, "data-src"))
        .map(|src| normalize_text(&repair_image_url(src)))
        .and_then(present)
}

/// `I` indexes `ATTRIBUTE_ICONS`.
fn read_attribute<const I: usize>(scope: &CardScope<'_>) -> Option<String> {
    let (icon_class, _) = ATTRIBUTE_ICONS[I];
    scope
        .card
        .select(&markup::ATTRIBUTE_ITEM)
        .find(|item| {
            item.select(&markup::ATTRIBUTE_ICON)
                .next()
                .map_or(false, |icon| icon.value().classes().any(|c| c == icon_class))
        })
        .and_then(|item| item.select(&markup::ATTRIBUTE_TEXT).next())
        .map(|text| normalize_text(&element_text(&text)))
        .and_then(present)
}

/// No icon class marks bud count in the listing markup.
fn read_bud_count(_scope: &CardScope<'_>) -> Option<String> {
    None
}

fn read_farm(scope: &CardScope<'_>) -> Option<String> {
    scope
        .first(&markup::FARM)
        .map(|farm| normalize_text(&text_excluding(farm, &markup::FARM_LABEL)))
        .and_then(present)
}

fn read_color(scope: &CardScope<'_>) -> Option<String> {
    scope.color.map(normalize_text).and_then(present)
}

fn read_available_quantity(scope: &CardScope<'_>) -> Option<String> {
    scope
        .first(&markup::FIRST_QUANTITY)
        .map(|quantity| strip_assortment(&element_text(&quantity)))
        .and_then(present)
}

fn read_first_quantity_label(scope: &CardScope<'_>) -> Option<String> {
    let available = read_available_quantity(scope)?;
    let spans: Vec<String> = match scope.first(&markup::PACK_UNIT) {
        Some(pack) => pack.select(&markup::SPAN).map(|s| element_text(&s)).collect(),
        None => Vec::new(),
    };
    match spans.as_slice() {
        [unit_name, unit_code, ..] => Some(pack_label(unit_name, unit_code, &available)),
        _ => Some(available),
    }
}

fn read_product_url(scope: &CardScope<'_>) -> Option<String> {
    scope
        .attr(&markup::PRODUCT_LINK, "href")
        .map(|href| normalize_text(&resolve_url(scope.base_url, href)))
        .and_then(present)
}

fn read_tier_price<const N: usize>(scope: &CardScope<'_>) -> Option<String> {
    scope.tiers.get(N).map(|tier| tier.price.clone())
}

fn read_tier_quantity<const N: usize>(scope: &CardScope<'_>) -> Option<String> {
    scope.tiers.get(N).map(|tier| tier.quantity.clone())
}
