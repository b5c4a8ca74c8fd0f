use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::Config;
use crate::models::{ProductRecord, RunStatus, OUTPUT_HEADER};
use crate::parsers::{capture_timestamp, dubai_now, format_runtime};
use crate::storage::{range, SheetStore};

/// Longest error text put into the status cell.
pub const MAX_DETAIL_CHARS: usize = 100;

/// First data row; row 1 holds the header.
const FIRST_DATA_ROW: usize = 2;

/// Render the status cell text.
///
/// `RUNNING | Started: 15/06/2025, 10:00:00`
/// `SUCCESS | Started: 15/06/2025, 10:00:00 | Runtime: 2m 05s | 8 products scraped`
pub fn format_status(
    status: RunStatus,
    started_at: &DateTime<FixedOffset>,
    elapsed: Duration,
    detail: Option<&str>,
) -> String {
    let mut line = format!("{} | Started: {}", status, capture_timestamp(started_at));
    if status != RunStatus::Running {
        line.push_str(&format!(" | Runtime: {}", format_runtime(elapsed)));
    }
    if let Some(detail) = detail {
        line.push_str(" | ");
        line.push_str(&truncate(detail, MAX_DETAIL_CHARS));
    }
    line
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// The single row written when the packing date cannot be selected.
pub fn placeholder_row(packing_date: &str) -> Vec<String> {
    vec![format!("No products found {{{}}}", packing_date)]
}

/// Writes run status and product rows for one run.
pub struct Reporter<'a, S: SheetStore + ?Sized> {
    store: &'a S,
    config: &'a Config,
    started_at: DateTime<FixedOffset>,
    started: Instant,
    header_written: bool,
    cleared: bool,
    next_row: usize,
}

impl<'a, S: SheetStore + ?Sized> Reporter<'a, S> {
    pub fn new(store: &'a S, config: &'a Config) -> Self {
        Self {
            store,
            config,
            started_at: dubai_now(),
            started: Instant::now(),
            header_written: false,
            cleared: false,
            next_row: FIRST_DATA_ROW,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Overwrite the status cell.
    pub async fn status(&self, status: RunStatus, detail: Option<&str>) -> Result<()> {
        let line = format_status(status, &self.started_at, self.elapsed(), detail);
        let cell = range::qualified(&self.config.config_sheet, &self.config.status_cell);
        self.store.write_range(&cell, &[vec![line.clone()]]).await?;
        info!("Status: {}", line);
        Ok(())
    }

    async fn header(&mut self) -> Result<()> {
        if self.header_written {
            return Ok(());
        }
        let header: Vec<String> = OUTPUT_HEADER.iter().map(|h| h.to_string()).collect();
        let target = range::rows(&self.config.sheet_name, 1, 1, OUTPUT_HEADER.len());
        self.store.write_range(&target, &[header]).await?;
        self.header_written = true;
        Ok(())
    }

    async fn clear_once(&mut self) -> Result<()> {
        if self.cleared {
            return Ok(());
        }
        let target = range::rows_from(&self.config.sheet_name, FIRST_DATA_ROW, OUTPUT_HEADER.len());
        self.store.clear_range(&target).await?;
        self.cleared = true;
        self.next_row = FIRST_DATA_ROW;
        Ok(())
    }

    /// Write one URL's records below everything written so far. The first
    /// flush of a run clears the previous data.
    pub async fn flush(&mut self, records: &[ProductRecord]) -> Result<usize> {
        self.header().await?;
        self.clear_once().await?;
        if records.is_empty() {
            return Ok(0);
        }

        let rows: Vec<Vec<String>> = records.iter().map(ProductRecord::to_row).collect();
        let target = range::rows(
            &self.config.sheet_name,
            self.next_row,
            rows.len(),
            OUTPUT_HEADER.len(),
        );
        self.store.write_range(&target, &rows).await?;
        debug!("Flushed {} rows to {}", rows.len(), target);

        self.next_row += rows.len();
        Ok(rows.len())
    }

    /// Replace the data with the "no products" placeholder row.
    pub async fn placeholder(&mut self, packing_date: &str) -> Result<()> {
        self.header().await?;
        self.clear_once().await?;
        let target = range::qualified(&self.config.sheet_name, &format!("A{}", FIRST_DATA_ROW));
        self.store
            .write_range(&target, &[placeholder_row(packing_date)])
            .await?;
        self.next_row = FIRST_DATA_ROW + 1;
        Ok(())
    }
}
