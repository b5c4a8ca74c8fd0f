//! Scriptable in-memory `PageDriver` for pipeline tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use super::{CardSnapshot, DriverLauncher, PageDriver};
use crate::scraping::markup;

#[derive(Default)]
pub struct FakeCalendar {
    pub trigger: bool,
    pub open: bool,
    pub months: Vec<String>,
    pub current: usize,
    /// Day cell selector -> (month index, disabled).
    pub days: HashMap<String, (usize, bool)>,
    pub continue_button: bool,
}

#[derive(Default, Clone)]
pub struct FakePage {
    pub cards: Vec<std::result::Result<CardSnapshot, String>>,
    pub next: Option<String>,
    /// Document heights reported by successive scrolls; the last one repeats.
    pub heights: Vec<u64>,
}

#[derive(Default)]
pub struct FakeDriver {
    pub events: Vec<String>,
    pub calendar: FakeCalendar,
    pub pages: HashMap<String, FakePage>,
    pub overlays: HashSet<String>,
    pub failing_urls: HashSet<String>,
    pub reject_login: bool,
    /// Every command fails as if the browser had gone away.
    pub dead_session: bool,
    pub scrolls: usize,
    pub closed: bool,
    current: String,
    scroll_index: usize,
    logged_in: bool,
}

/// Hands out one prepared `FakeDriver`, or fails like an unreachable
/// WebDriver endpoint.
#[derive(Default)]
pub struct FakeLauncher {
    driver: Mutex<Option<FakeDriver>>,
    pub unreachable: bool,
}

impl FakeLauncher {
    pub fn new(driver: FakeDriver) -> Self {
        Self {
            driver: Mutex::new(Some(driver)),
            unreachable: false,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            driver: Mutex::new(None),
            unreachable: true,
        }
    }
}

#[async_trait]
impl DriverLauncher for FakeLauncher {
    type Driver = FakeDriver;

    async fn launch(&self) -> Result<FakeDriver> {
        if self.unreachable {
            return Err(anyhow!("connection refused by http://localhost:4444"));
        }
        self.driver
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| anyhow!("browser already launched"))
    }
}

pub fn card(name: &str) -> CardSnapshot {
    CardSnapshot {
        html: format!(
            r#"<div class="product-card"><h3 class="product-name">{}</h3></div>"#,
            name
        ),
        color: None,
    }
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calendar showing `months[0]` first, with the trigger icon present.
    pub fn with_calendar(mut self, months: &[&str]) -> Self {
        self.calendar.trigger = true;
        self.calendar.months = months.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_day(mut self, month: usize, label: &str, disabled: bool) -> Self {
        self.calendar
            .days
            .insert(markup::day_cell(label), (month, disabled));
        self
    }

    pub fn with_page(mut self, url: &str, names: &[&str], next: Option<&str>) -> Self {
        let page = FakePage {
            cards: names.iter().map(|n| Ok(card(n))).collect(),
            next: next.map(str::to_string),
            heights: vec![1000, 2000, 2000],
        };
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn clicked(&self, selector: &str) -> bool {
        self.events.iter().any(|e| e == &format!("click {}", selector))
    }

    pub fn visited(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| e.strip_prefix("goto ").map(str::to_string))
            .collect()
    }

    fn alive(&self) -> Result<()> {
        if self.dead_session {
            return Err(anyhow!("invalid session id"));
        }
        Ok(())
    }

    fn page(&self) -> Option<&FakePage> {
        self.pages.get(&self.current)
    }

    fn day(&self, selector: &str) -> Option<bool> {
        match self.calendar.days.get(selector) {
            Some((month, disabled)) if self.calendar.open && *month == self.calendar.current => {
                Some(*disabled)
            }
            _ => None,
        }
    }

    fn present(&self, selector: &str) -> bool {
        match selector {
            markup::LOGIN_PASSWORD => !self.logged_in || self.reject_login,
            markup::CALENDAR_TRIGGER => self.calendar.trigger,
            markup::CALENDAR_NEXT => {
                self.calendar.open && self.calendar.current + 1 < self.calendar.months.len()
            }
            markup::CALENDAR_CONTINUE => self.calendar.continue_button,
            other => self.day(other).is_some() || self.overlays.contains(other),
        }
    }
}

#[async_trait]
impl PageDriver for FakeDriver {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.alive()?;
        self.events.push(format!("goto {}", url));
        if self.failing_urls.contains(url) {
            return Err(anyhow!("navigation to {} timed out", url));
        }
        self.current = url.to_string();
        self.scroll_index = 0;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String> {
        Ok(self.current.clone())
    }

    async fn exists(&mut self, selector: &str) -> Result<bool> {
        self.alive()?;
        Ok(self.present(selector))
    }

    async fn text(&mut self, selector: &str) -> Result<Option<String>> {
        if selector == markup::CALENDAR_TITLE && self.calendar.open {
            return Ok(self.calendar.months.get(self.calendar.current).cloned());
        }
        Ok(None)
    }

    async fn attr(&mut self, selector: &str, name: &str) -> Result<Option<String>> {
        if let Some(disabled) = self.day(selector) {
            return Ok(match (name, disabled) {
                ("class", true) => Some("day disabled".to_string()),
                ("class", false) => Some("day".to_string()),
                _ => None,
            });
        }
        if selector == markup::NEXT_PAGE && name == "href" {
            return Ok(self.page().and_then(|p| p.next.clone()));
        }
        Ok(None)
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        self.alive()?;
        if !self.present(selector) && selector != markup::LOGIN_SUBMIT {
            return Err(anyhow!("element not found: {}", selector));
        }
        self.events.push(format!("click {}", selector));
        match selector {
            markup::CALENDAR_TRIGGER => self.calendar.open = true,
            markup::CALENDAR_NEXT => self.calendar.current += 1,
            markup::LOGIN_SUBMIT => self.logged_in = true,
            _ => {}
        }
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
        self.events.push(format!("fill {} {}", selector, value));
        Ok(())
    }

    async fn remove(&mut self, selector: &str) -> Result<bool> {
        self.alive()?;
        let removed = self.overlays.remove(selector);
        if removed {
            self.events.push(format!("remove {}", selector));
        }
        Ok(removed)
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> Result<bool> {
        Ok(self.present(selector))
    }

    async fn scroll_to_bottom(&mut self) -> Result<u64> {
        self.scrolls += 1;
        let heights = self.page().map(|p| p.heights.clone()).unwrap_or_default();
        let height = heights
            .get(self.scroll_index)
            .or_else(|| heights.last())
            .copied()
            .unwrap_or(0);
        self.scroll_index += 1;
        Ok(height)
    }

    async fn count(&mut self, selector: &str) -> Result<usize> {
        if selector == markup::PRODUCT_CARD {
            return Ok(self.page().map_or(0, |p| p.cards.len()));
        }
        Ok(0)
    }

    async fn card_snapshot(&mut self, _card: &str, index: usize, _swatch: &str) -> Result<CardSnapshot> {
        match self.page().and_then(|p| p.cards.get(index)) {
            Some(Ok(snapshot)) => Ok(snapshot.clone()),
            Some(Err(message)) => Err(anyhow!("{}", message)),
            None => Err(anyhow!("no card #{}", index)),
        }
    }

    async fn settle(&mut self, _delay: Duration) {}

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.events.push("close".to_string());
        Ok(())
    }
}
