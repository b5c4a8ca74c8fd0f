use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::browser::{DriverLauncher, PageDriver};
use crate::config::Config;
use crate::error::ScrapeError;
use crate::models::RunStatus;
use crate::report::Reporter;
use crate::scraping::{crawl_all, dismiss_popups, login, select_packing_date};
use crate::storage::{range, SheetStore};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Authenticating,
    ReadingConfig,
    LaunchingBrowser,
    LoggingIn,
    SelectingDate,
    DateDisabled,
    NoUrls,
    Scraping,
    Finalizing,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub products: usize,
}

fn advance(stage: &mut Stage, next: Stage) {
    info!("Run stage {:?} -> {:?}", stage, next);
    *stage = next;
}

/// One unattended scraping run, from spreadsheet login to final status.
///
/// The browser is only launched once the status cell shows the run, so a
/// browser that fails to start is reported like any other failure.
pub struct Session<'a, L: DriverLauncher, S: SheetStore + ?Sized> {
    config: &'a Config,
    launcher: &'a L,
    store: &'a S,
    driver: Option<L::Driver>,
    stage: Stage,
}

impl<'a, L: DriverLauncher, S: SheetStore + ?Sized> Session<'a, L, S> {
    pub fn new(config: &'a Config, launcher: &'a L, store: &'a S) -> Self {
        Self {
            config,
            launcher,
            store,
            driver: None,
            stage: Stage::Init,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The browser session, if the run got far enough to launch one.
    pub fn into_driver(self) -> Option<L::Driver> {
        self.driver
    }

    /// Execute the run. A launched browser is closed on every path.
    pub async fn run(&mut self) -> Result<RunOutcome> {
        let result = self.run_reported().await;
        if let Some(driver) = self.driver.as_mut() {
            if let Err(e) = driver.close().await {
                warn!("Failed to close browser session: {:#}", e);
            }
        }
        result
    }

    async fn run_reported(&mut self) -> Result<RunOutcome> {
        let mut reporter = Reporter::new(self.store, self.config);

        advance(&mut self.stage, Stage::Authenticating);
        if let Err(e) = self
            .store
            .authenticate()
            .await
            .context("Spreadsheet authentication failed")
        {
            advance(&mut self.stage, Stage::Failed);
            return Err(e);
        }

        match self.pipeline(&mut reporter).await {
            Ok(outcome) => {
                advance(&mut self.stage, Stage::Done);
                Ok(outcome)
            }
            Err(e) => {
                advance(&mut self.stage, Stage::Failed);
                error!("Run failed: {:#}", e);
                let message = format!("{:#}", e);
                if let Err(report_err) = reporter.status(RunStatus::Error, Some(&message)).await {
                    error!("Could not report error status: {:#}", report_err);
                }
                Err(e)
            }
        }
    }

    async fn pipeline(&mut self, reporter: &mut Reporter<'a, S>) -> Result<RunOutcome> {
        let config = self.config;
        let timings = config.timings();
        reporter.status(RunStatus::Running, None).await?;

        advance(&mut self.stage, Stage::ReadingConfig);
        let packing_date = self.read_packing_date().await?;
        info!("Packing date {}", packing_date);

        advance(&mut self.stage, Stage::LaunchingBrowser);
        let launched = self
            .launcher
            .launch()
            .await
            .context("Failed to start browser session")?;
        let driver = self.driver.insert(launched);

        advance(&mut self.stage, Stage::LoggingIn);
        login(driver, config).await?;

        advance(&mut self.stage, Stage::SelectingDate);
        let selection = select_packing_date(driver, &packing_date, &timings).await;
        if !selection.is_selected() {
            advance(&mut self.stage, Stage::DateDisabled);
            warn!("Packing date {} not selectable: {:?}", packing_date, selection);
            reporter.placeholder(&packing_date).await?;
            let detail = format!("packing date {} is not available", packing_date);
            reporter.status(RunStatus::DateDisabled, Some(&detail)).await?;
            return Ok(RunOutcome {
                status: RunStatus::DateDisabled,
                products: 0,
            });
        }

        if config.listing_urls.is_empty() {
            advance(&mut self.stage, Stage::NoUrls);
            reporter
                .status(RunStatus::NoUrls, Some("no listing URLs configured"))
                .await?;
            return Ok(RunOutcome {
                status: RunStatus::NoUrls,
                products: 0,
            });
        }

        advance(&mut self.stage, Stage::Scraping);
        let mut total = 0;
        for (index, url) in config.listing_urls.iter().enumerate() {
            info!(
                "Processing listing {}/{}: {}",
                index + 1,
                config.listing_urls.len(),
                url
            );
            driver.goto(url).await?;
            driver.settle(timings.settle()).await;
            dismiss_popups(driver).await?;

            let records = crawl_all(driver, &config.base_url, &timings)
                .await
                .with_context(|| format!("Failed to crawl {}", url))?;
            info!("Found {} products on {}", records.len(), url);
            total += reporter.flush(&records).await?;
        }

        advance(&mut self.stage, Stage::Finalizing);
        let (status, detail) = if total > 0 {
            (RunStatus::Success, format!("{} products scraped", total))
        } else {
            (RunStatus::NoProducts, "no products found".to_string())
        };
        reporter.status(status, Some(&detail)).await?;

        Ok(RunOutcome {
            status,
            products: total,
        })
    }

    async fn read_packing_date(&self) -> Result<String> {
        let cell = range::qualified(&self.config.config_sheet, &self.config.packing_date_cell);
        let values = self
            .store
            .read_range(&cell)
            .await
            .with_context(|| format!("Failed to read packing date from {}", cell))?;

        values
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ScrapeError::EmptyPackingDate(cell).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeDriver, FakeLauncher};
    use crate::models::OUTPUT_HEADER;
    use crate::storage::memory::{MemorySheet, SheetOp};
    use pretty_assertions::assert_eq;

    const ROSES: &str = "https://shop.example.com/roses";
    const TULIPS: &str = "https://shop.example.com/tulips";

    fn calendar(disabled: bool) -> FakeDriver {
        FakeDriver::new()
            .with_calendar(&["June 2025"])
            .with_day(0, "June 15, 2025", disabled)
    }

    fn store() -> MemorySheet {
        MemorySheet::with_cell("Config!B1", "06/15/2025")
    }

    /// Run a session over `driver` and hand the driver back for inspection.
    async fn run_with(
        config: &Config,
        driver: FakeDriver,
        store: &MemorySheet,
    ) -> (Result<RunOutcome>, FakeDriver) {
        let launcher = FakeLauncher::new(driver);
        let mut session = Session::new(config, &launcher, store);
        let result = session.run().await;
        let driver = session.into_driver().expect("browser was launched");
        (result, driver)
    }

    fn statuses(store: &MemorySheet) -> Vec<String> {
        store
            .writes_to("Config!B2")
            .into_iter()
            .map(|(_, rows)| rows[0][0].clone())
            .collect()
    }

    fn last_status(store: &MemorySheet) -> String {
        statuses(store).pop().unwrap()
    }

    #[tokio::test]
    async fn disabled_date_writes_placeholder_and_stops() {
        let config = Config::for_tests(&[ROSES]);
        let store = store();

        let (result, driver) =
            run_with(&config, calendar(true).with_page(ROSES, &["a"], None), &store).await;

        assert_eq!(result.unwrap().status, RunStatus::DateDisabled);
        assert_eq!(
            store.writes_to("Data!A2"),
            vec![(
                "Data!A2".to_string(),
                vec![vec!["No products found {06/15/2025}".to_string()]]
            )]
        );
        assert!(last_status(&store).starts_with("DATE DISABLED"));
        assert_eq!(driver.visited(), vec![config.login_url.clone()]);
        assert!(driver.closed);
    }

    #[tokio::test]
    async fn missing_calendar_counts_as_disabled_date() {
        let config = Config::for_tests(&[ROSES]);
        let store = store();

        let (result, _) = run_with(&config, FakeDriver::new(), &store).await;

        assert_eq!(result.unwrap().status, RunStatus::DateDisabled);
    }

    #[tokio::test]
    async fn no_urls_skips_header_and_data() {
        let config = Config::for_tests(&[]);
        let store = store();

        let (result, _) = run_with(&config, calendar(false), &store).await;

        assert_eq!(result.unwrap().status, RunStatus::NoUrls);
        assert!(store.writes_to("Data").is_empty());
        assert!(!store.ops().iter().any(|op| matches!(op, SheetOp::Clear { .. })));
        let statuses = statuses(&store);
        assert_eq!(statuses.len(), 2);
        assert!(statuses[0].starts_with("RUNNING"));
        assert!(statuses[1].starts_with("NO URLS"));
    }

    #[tokio::test]
    async fn two_pages_end_in_success() {
        let config = Config::for_tests(&[ROSES]);
        let driver = calendar(false)
            .with_page(ROSES, &["a1", "a2", "a3", "a4", "a5"], Some("/roses?page=2"))
            .with_page(
                "https://shop.example.com/roses?page=2",
                &["b1", "b2", "b3"],
                None,
            );
        let store = store();

        let (result, driver) = run_with(&config, driver, &store).await;

        assert_eq!(
            result.unwrap(),
            RunOutcome {
                status: RunStatus::Success,
                products: 8
            }
        );
        let data = store.writes_to("Data");
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].0, "Data!A1:R1");
        assert_eq!(data[0].1[0].len(), OUTPUT_HEADER.len());
        assert_eq!(data[1].0, "Data!A2:R9");
        assert_eq!(data[1].1.len(), 8);
        assert!(last_status(&store).starts_with("SUCCESS"));
        assert!(last_status(&store).ends_with("8 products scraped"));
        assert!(driver.closed);
    }

    #[tokio::test]
    async fn second_url_appends_without_clearing() {
        let config = Config::for_tests(&[ROSES, TULIPS]);
        let driver = calendar(false)
            .with_page(ROSES, &["r1", "r2", "r3"], None)
            .with_page(TULIPS, &["t1", "t2"], None);
        let store = store();

        let (result, _) = run_with(&config, driver, &store).await;

        assert_eq!(result.unwrap().products, 5);
        let ranges: Vec<String> = store
            .ops()
            .into_iter()
            .filter_map(|op| match op {
                SheetOp::Write { range, .. } if range.starts_with("Config") => None,
                SheetOp::Write { range, .. } => Some(format!("write {}", range)),
                SheetOp::Clear { range } => Some(format!("clear {}", range)),
            })
            .collect();
        assert_eq!(
            ranges,
            vec![
                "write Data!A1:R1",
                "clear Data!A2:R",
                "write Data!A2:R4",
                "write Data!A5:R6",
            ]
        );
    }

    #[tokio::test]
    async fn listings_without_products_report_no_products() {
        let config = Config::for_tests(&[ROSES]);
        let store = store();

        let (result, _) =
            run_with(&config, calendar(false).with_page(ROSES, &[], None), &store).await;

        assert_eq!(result.unwrap().status, RunStatus::NoProducts);
        assert!(last_status(&store).starts_with("NO PRODUCTS"));
    }

    #[tokio::test]
    async fn navigation_failure_reports_error_and_closes_browser() {
        let config = Config::for_tests(&[ROSES]);
        let mut driver = calendar(false);
        driver.failing_urls.insert(ROSES.to_string());
        let store = store();

        let (result, driver) = run_with(&config, driver, &store).await;

        assert!(result.is_err());
        let status = last_status(&store);
        assert!(status.starts_with("ERROR"));
        assert!(status.contains("timed out"));
        assert!(driver.closed);
    }

    #[tokio::test]
    async fn sheet_write_failure_reports_error_and_closes_browser() {
        let config = Config::for_tests(&[ROSES]);
        let store = MemorySheet {
            fail_writes_to: Some("Data".to_string()),
            ..store()
        };

        let (result, driver) =
            run_with(&config, calendar(false).with_page(ROSES, &["a"], None), &store).await;

        assert!(result.is_err());
        let status = last_status(&store);
        assert!(status.starts_with("ERROR"));
        assert!(status.contains("quota exceeded"));
        assert!(driver.closed);
    }

    #[tokio::test]
    async fn browser_that_fails_to_start_is_reported() {
        let config = Config::for_tests(&[ROSES]);
        let store = store();
        let launcher = FakeLauncher::unreachable();

        let mut session = Session::new(&config, &launcher, &store);
        let result = session.run().await;

        assert!(result.is_err());
        assert_eq!(session.stage(), Stage::Failed);
        assert!(session.into_driver().is_none());
        let statuses = statuses(&store);
        assert_eq!(statuses.len(), 2);
        assert!(statuses[0].starts_with("RUNNING"));
        assert!(statuses[1].starts_with("ERROR"));
        assert!(statuses[1].contains("Failed to start browser session"));
        assert!(store.writes_to("Data").is_empty());
    }

    #[tokio::test]
    async fn authentication_failure_writes_nothing() {
        let config = Config::for_tests(&[ROSES]);
        let launcher = FakeLauncher::new(calendar(false));
        let store = MemorySheet {
            fail_auth: true,
            ..MemorySheet::default()
        };

        let mut session = Session::new(&config, &launcher, &store);
        let result = session.run().await;

        assert!(result.is_err());
        assert_eq!(session.stage(), Stage::Failed);
        assert!(session.into_driver().is_none());
        assert!(store.ops().is_empty());
    }

    #[tokio::test]
    async fn empty_packing_date_is_an_error() {
        let config = Config::for_tests(&[ROSES]);
        let launcher = FakeLauncher::new(calendar(false));
        let store = MemorySheet::default();

        let result = Session::new(&config, &launcher, &store).run().await;

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScrapeError>(),
            Some(ScrapeError::EmptyPackingDate(_))
        ));
        assert!(last_status(&store).starts_with("ERROR"));
    }

    #[tokio::test]
    async fn rejected_login_is_an_error() {
        let config = Config::for_tests(&[ROSES]);
        let mut driver = calendar(false);
        driver.reject_login = true;
        let store = store();

        let (result, driver) = run_with(&config, driver, &store).await;

        assert!(result.is_err());
        assert!(last_status(&store).contains("login was rejected"));
        assert!(driver.closed);
    }
}
