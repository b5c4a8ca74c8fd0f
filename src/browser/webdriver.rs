use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{info, warn};

use super::{CardSnapshot, DriverLauncher, PageDriver};
use crate::config::Config;
use crate::error::ScrapeError;

const REMOVE_SCRIPT: &str = "const el = document.querySelector(arguments[0]); \
     if (el) { el.remove(); return true; } return false;";

const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight); \
     return document.body.scrollHeight;";

/// Connection settings for a WebDriver endpoint.
pub struct WebDriverLauncher {
    webdriver_url: String,
    headless: bool,
    page_timeout: Duration,
}

impl WebDriverLauncher {
    pub fn from_config(config: &Config) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            headless: config.headless,
            page_timeout: config.timings().page_timeout(),
        }
    }
}

#[async_trait]
impl DriverLauncher for WebDriverLauncher {
    type Driver = WebDriverSession;

    async fn launch(&self) -> Result<WebDriverSession> {
        WebDriverSession::connect(&self.webdriver_url, self.headless, self.page_timeout).await
    }
}

/// A live WebDriver session (chromedriver or geckodriver).
pub struct WebDriverSession {
    client: Option<Client>,
}

impl WebDriverSession {
    pub async fn connect(webdriver_url: &str, headless: bool, page_timeout: Duration) -> Result<Self> {
        let mut args = vec!["--window-size=1920,1080", "--disable-gpu"];
        if headless {
            args.push("--headless=new");
        }
        let mut caps = Map::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await
            .with_context(|| format!("Failed to connect to WebDriver at {}", webdriver_url))?;

        client
            .update_timeouts(TimeoutConfiguration::new(
                Some(page_timeout),
                Some(page_timeout),
                None,
            ))
            .await
            .context("Failed to set WebDriver timeouts")?;

        info!("WebDriver session started at {}", webdriver_url);
        Ok(Self { client: Some(client) })
    }

    fn client(&self) -> Result<&Client> {
        self.client
            .as_ref()
            .context("Browser session already closed")
    }

    async fn first(&self, selector: &str) -> Result<Option<Element>> {
        let mut found = self.client()?.find_all(Locator::Css(selector)).await?;
        Ok(if found.is_empty() { None } else { Some(found.remove(0)) })
    }

    async fn require(&self, selector: &str) -> Result<Element> {
        self.first(selector)
            .await?
            .ok_or_else(|| ScrapeError::MissingElement(selector.to_string()).into())
    }
}

#[async_trait]
impl PageDriver for WebDriverSession {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.client()?
            .goto(url)
            .await
            .with_context(|| format!("Failed to navigate to {}", url))
    }

    async fn current_url(&mut self) -> Result<String> {
        Ok(self.client()?.current_url().await?.to_string())
    }

    async fn exists(&mut self, selector: &str) -> Result<bool> {
        Ok(self.first(selector).await?.is_some())
    }

    async fn text(&mut self, selector: &str) -> Result<Option<String>> {
        match self.first(selector).await? {
            Some(element) => Ok(Some(element.text().await?)),
            None => Ok(None),
        }
    }

    async fn attr(&mut self, selector: &str, name: &str) -> Result<Option<String>> {
        match self.first(selector).await? {
            Some(element) => Ok(element.attr(name).await?),
            None => Ok(None),
        }
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        self.require(selector)
            .await?
            .click()
            .await
            .with_context(|| format!("Failed to click {}", selector))
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
        let element = self.require(selector).await?;
        element.clear().await?;
        element
            .send_keys(value)
            .await
            .with_context(|| format!("Failed to fill {}", selector))
    }

    async fn remove(&mut self, selector: &str) -> Result<bool> {
        let removed = self
            .client()?
            .execute(REMOVE_SCRIPT, vec![Value::String(selector.to_string())])
            .await?;
        Ok(removed.as_bool().unwrap_or(false))
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<bool> {
        match self
            .client()?
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_no_such_element() => Ok(false),
            Err(fantoccini::error::CmdError::WaitTimeout) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn scroll_to_bottom(&mut self) -> Result<u64> {
        let height = self.client()?.execute(SCROLL_SCRIPT, vec![]).await?;
        height
            .as_u64()
            .or_else(|| height.as_f64().map(|h| h as u64))
            .ok_or_else(|| ScrapeError::Script(format!("page height was {}", height)).into())
    }

    async fn count(&mut self, selector: &str) -> Result<usize> {
        Ok(self.client()?.find_all(Locator::Css(selector)).await?.len())
    }

    async fn card_snapshot(&mut self, card: &str, index: usize, swatch: &str) -> Result<CardSnapshot> {
        let cards = self.client()?.find_all(Locator::Css(card)).await?;
        let element = cards
            .get(index)
            .ok_or_else(|| ScrapeError::MissingElement(format!("{} #{}", card, index)))?;

        let html = element.html(false).await?;
        let swatches = element.find_all(Locator::Css(swatch)).await?;
        let color = match swatches.first() {
            Some(sw) => match sw.css_value("background-color").await {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Could not read swatch color of card {}: {}", index, e);
                    None
                }
            },
            None => None,
        };

        Ok(CardSnapshot { html, color })
    }

    async fn settle(&mut self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            info!("Closing browser session");
            client.close().await?;
        }
        Ok(())
    }
}
