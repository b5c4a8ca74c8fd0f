use anyhow::Result;
use chrono::Utc;
use std::collections::HashSet;
use tracing::{error, info, warn};

use super::markup;
use super::product::extract_snapshot;
use crate::browser::PageDriver;
use crate::config::Timings;
use crate::models::ProductRecord;
use crate::parsers::{capture_timestamp, resolve_url};

/// Upper bound on scrolls per page while waiting for lazy cards.
const MAX_SCROLLS: usize = 20;

/// Extract every product of the listing the driver is on, following
/// "next page" links until there are none.
pub async fn crawl_all<D>(driver: &mut D, base_url: &str, timings: &Timings) -> Result<Vec<ProductRecord>>
where
    D: PageDriver + ?Sized,
{
    let mut records = Vec::new();
    let mut visited = HashSet::new();
    visited.insert(driver.current_url().await?);
    let mut page_number = 1;

    loop {
        let scrolls = autoscroll(driver, timings).await?;
        let page_records = extract_page(driver, base_url).await?;
        info!(
            "Page {}: {} products after {} scrolls",
            page_number,
            page_records.len(),
            scrolls
        );
        records.extend(page_records);

        let Some(href) = driver.attr(markup::NEXT_PAGE, "href").await? else {
            break;
        };
        let next = resolve_url(base_url, &href);
        if !visited.insert(next.clone()) {
            warn!("Next page {} was already crawled, stopping", next);
            break;
        }

        info!("Following next page {}", next);
        driver.goto(&next).await?;
        driver.settle(timings.settle()).await;
        page_number += 1;
    }

    Ok(records)
}

/// Scroll to the bottom until the page height stops changing. Returns the
/// number of scrolls performed.
pub async fn autoscroll<D>(driver: &mut D, timings: &Timings) -> Result<usize>
where
    D: PageDriver + ?Sized,
{
    let mut last_height = driver.scroll_to_bottom().await?;
    for scrolls in 2..=MAX_SCROLLS {
        driver.settle(timings.scroll()).await;
        let height = driver.scroll_to_bottom().await?;
        if height == last_height {
            return Ok(scrolls);
        }
        last_height = height;
    }
    Ok(MAX_SCROLLS)
}

/// Records for every card currently rendered, in DOM order. A card that
/// cannot be read is logged and left out.
async fn extract_page<D>(driver: &mut D, base_url: &str) -> Result<Vec<ProductRecord>>
where
    D: PageDriver + ?Sized,
{
    let total = driver.count(markup::PRODUCT_CARD).await?;
    let captured_at = capture_timestamp(&Utc::now());
    let mut records = Vec::with_capacity(total);

    for index in 0..total {
        match driver
            .card_snapshot(markup::PRODUCT_CARD, index, markup::COLOR_SWATCH)
            .await
        {
            Ok(snapshot) => records.push(extract_snapshot(&snapshot, base_url, &captured_at)),
            Err(e) => error!("Skipping product #{}: {:#}", index, e),
        }
    }

    Ok(records)
}
