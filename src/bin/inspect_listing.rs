//! Run the card extractor over a saved listing page and print one JSON row
//! per product. Useful when the shop changes its markup.
//!
//! Usage: inspect_listing <page.html> [base-url]

use anyhow::{bail, Context, Result};
use scraper::Html;
use std::fs;

use flower_scraper::models::OUTPUT_HEADER;
use flower_scraper::parsers::{capture_timestamp, dubai_now};
use flower_scraper::scraping::{extract, markup};

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: inspect_listing <page.html> [base-url]");
    };
    let base_url = args.next().unwrap_or_default();

    let html = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path))?;
    let document = Html::parse_document(&html);
    let captured_at = capture_timestamp(&dubai_now());

    let cards: Vec<_> = document.select(&markup::CARD).collect();
    eprintln!("Found {} product cards in {}", cards.len(), path);

    for card in cards {
        let record = extract(card, None, &base_url, &captured_at);
        let row: serde_json::Map<String, serde_json::Value> = OUTPUT_HEADER
            .iter()
            .zip(record.to_row())
            .map(|(name, value)| (name.to_string(), serde_json::Value::String(value)))
            .collect();
        println!("{}", serde_json::to_string(&row)?);
    }

    Ok(())
}
