use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

mod webdriver;
pub use webdriver::{WebDriverLauncher, WebDriverSession};

#[cfg(test)]
pub(crate) mod fake;

/// A product card as rendered in the live page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSnapshot {
    /// Outer HTML of the card element.
    pub html: String,
    /// Computed `background-color` of the card's color swatch, if it has one.
    pub color: Option<String>,
}

/// The browser capabilities the scraping pipeline consumes.
///
/// Selectors are CSS. Lookups that may legitimately miss return `Option` or
/// `bool`; commands against a missing element fail.
#[async_trait]
pub trait PageDriver: Send {
    async fn goto(&mut self, url: &str) -> Result<()>;
    async fn current_url(&mut self) -> Result<String>;
    async fn exists(&mut self, selector: &str) -> Result<bool>;
    async fn text(&mut self, selector: &str) -> Result<Option<String>>;
    async fn attr(&mut self, selector: &str, name: &str) -> Result<Option<String>>;
    async fn click(&mut self, selector: &str) -> Result<()>;
    async fn fill(&mut self, selector: &str, value: &str) -> Result<()>;
    /// Detach the first match from the DOM. `false` when nothing matched.
    async fn remove(&mut self, selector: &str) -> Result<bool>;
    /// Poll for `selector` up to `timeout`.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<bool>;
    /// Scroll to the bottom and report the resulting document height.
    async fn scroll_to_bottom(&mut self) -> Result<u64>;
    async fn count(&mut self, selector: &str) -> Result<usize>;
    async fn card_snapshot(&mut self, card: &str, index: usize, swatch: &str)
        -> Result<CardSnapshot>;
    /// Fixed UI settle delay.
    async fn settle(&mut self, delay: Duration);
    async fn close(&mut self) -> Result<()>;
}

/// Starts a browser session on demand, so the run can report status before
/// a browser exists.
#[async_trait]
pub trait DriverLauncher: Send + Sync {
    type Driver: PageDriver;

    async fn launch(&self) -> Result<Self::Driver>;
}
