use anyhow::Result;
use chrono::NaiveDate;
use tracing::{error, info, warn};

use super::login::dismiss_popups;
use super::markup;
use crate::browser::PageDriver;
use crate::config::Timings;

/// The calendar never needs to be paged further than a year ahead.
const MAX_MONTH_ADVANCES: usize = 12;

/// Outcome of driving the packing-date calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateSelection {
    Selected,
    /// The day cell exists but the portal does not offer that date.
    Disabled,
    /// Some part of the widget could not be found or operated.
    NotFound(String),
}

impl DateSelection {
    pub fn is_selected(&self) -> bool {
        matches!(self, DateSelection::Selected)
    }
}

/// Pick `date_str` (`MM/DD/YYYY`) on the packing-date calendar.
///
/// Driver errors are folded into `NotFound`; the caller only needs to know
/// whether the date ended up selected.
pub async fn select_packing_date<D>(driver: &mut D, date_str: &str, timings: &Timings) -> DateSelection
where
    D: PageDriver + ?Sized,
{
    let date = match NaiveDate::parse_from_str(date_str.trim(), "%m/%d/%Y") {
        Ok(date) => date,
        Err(e) => {
            warn!("Packing date {:?} is not MM/DD/YYYY: {}", date_str, e);
            return DateSelection::NotFound(format!("unparseable packing date {:?}", date_str));
        }
    };

    match drive_calendar(driver, date, timings).await {
        Ok(selection) => selection,
        Err(e) => {
            error!("Browser command failed during date selection: {:#}", e);
            DateSelection::NotFound(e.to_string())
        }
    }
}

async fn drive_calendar<D>(driver: &mut D, date: NaiveDate, timings: &Timings) -> Result<DateSelection>
where
    D: PageDriver + ?Sized,
{
    dismiss_popups(driver).await?;

    if !driver.exists(markup::CALENDAR_TRIGGER).await? {
        warn!("Calendar trigger icon not found");
        return Ok(DateSelection::NotFound("calendar trigger missing".into()));
    }
    driver.click(markup::CALENDAR_TRIGGER).await?;
    driver.settle(timings.settle()).await;

    let target = month_key(date);
    let mut advances = 0;
    loop {
        let shown = driver.text(markup::CALENDAR_TITLE).await?.unwrap_or_default();
        if same_month(&shown, &target) {
            break;
        }
        if advances == MAX_MONTH_ADVANCES {
            warn!("{} not reached after {} months", target, MAX_MONTH_ADVANCES);
            return Ok(DateSelection::NotFound(format!("{} out of calendar range", target)));
        }
        if !driver.exists(markup::CALENDAR_NEXT).await? {
            warn!("Calendar exhausted at {:?} before reaching {}", shown, target);
            return Ok(DateSelection::NotFound(format!("calendar ends before {}", target)));
        }
        driver.click(markup::CALENDAR_NEXT).await?;
        driver.settle(timings.settle()).await;
        advances += 1;
    }

    let label = day_label(date);
    let cell = markup::day_cell(&label);
    if !driver.exists(&cell).await? {
        warn!("No day cell for {}", label);
        return Ok(DateSelection::NotFound(format!("no day cell for {}", label)));
    }
    if is_disabled(driver, &cell).await? {
        warn!("Packing date {} is disabled", label);
        return Ok(DateSelection::Disabled);
    }

    driver.click(&cell).await?;
    if driver
        .wait_for(markup::CALENDAR_CONTINUE, timings.continue_wait())
        .await?
    {
        driver.click(markup::CALENDAR_CONTINUE).await?;
    }
    driver.settle(timings.settle()).await;

    info!("Selected packing date {}", label);
    Ok(DateSelection::Selected)
}

async fn is_disabled<D>(driver: &mut D, cell: &str) -> Result<bool>
where
    D: PageDriver + ?Sized,
{
    let class = driver.attr(cell, "class").await?.unwrap_or_default();
    let aria = driver.attr(cell, "aria-disabled").await?;
    Ok(class.split_whitespace().any(|c| c == "disabled") || aria.as_deref() == Some("true"))
}

/// Calendar header key, e.g. `June 2025`.
fn month_key(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Day cell label, e.g. `June 15, 2025`.
fn day_label(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn same_month(shown: &str, target: &str) -> bool {
    let key = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    key(shown) == key(target)
}
