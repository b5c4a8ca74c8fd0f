use anyhow::{Context, Result};
use tracing::{info, warn};

use super::markup;
use crate::browser::PageDriver;
use crate::config::Config;
use crate::error::ScrapeError;

/// Submit the portal login form.
///
/// With `verify_login` set, a password field still on screen after the
/// settle delay counts as a rejected login.
pub async fn login<D>(driver: &mut D, config: &Config) -> Result<()>
where
    D: PageDriver + ?Sized,
{
    let timings = config.timings();
    info!("Logging in to {} as {}", config.login_url, config.username);

    driver.goto(&config.login_url).await?;
    driver.settle(timings.settle()).await;
    dismiss_popups(driver).await?;

    driver
        .fill(markup::LOGIN_USERNAME, &config.username)
        .await
        .context("Login form has no username field")?;
    driver
        .fill(markup::LOGIN_PASSWORD, &config.password)
        .await
        .context("Login form has no password field")?;
    driver.click(markup::LOGIN_SUBMIT).await?;
    driver.settle(timings.login()).await;

    if config.verify_login && driver.exists(markup::LOGIN_PASSWORD).await? {
        return Err(ScrapeError::LoginRejected.into());
    }
    Ok(())
}

/// Remove cookie banners and modal popups. Returns how many were removed.
pub async fn dismiss_popups<D>(driver: &mut D) -> Result<usize>
where
    D: PageDriver + ?Sized,
{
    let mut removed = 0;
    for overlay in markup::OVERLAYS {
        if driver.remove(overlay).await? {
            removed += 1;
        }
    }
    if removed > 0 {
        warn!("Dismissed {} popup(s)", removed);
    }
    Ok(removed)
}
