//! Browser lifecycle management.
//!
//! Handles launching and shutting down chromiumoxide browser instances with
//! stealth launch arguments. The CDP event handler runs on a tracked tokio
//! task that MUST be aborted when the browser goes away, otherwise it runs
//! indefinitely after the Chrome process exits.

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{info, warn};

use crate::downloader::CHROME_USER_AGENT;

/// Wrapper for Browser and its event handler task
///
/// Ensures the handler is aborted when the browser is dropped and the
/// temporary profile directory is removed after Chrome releases its file
/// handles.
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    pub(crate) fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Close the browser process, wait for it to exit, remove the temp
    /// profile. Safe to call once; Drop covers the paths that skip it.
    pub(crate) async fn shutdown(&mut self) {
        info!("shutting down browser session");
        if let Err(e) = self.browser.close().await {
            warn!("failed to close browser cleanly: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            warn!("failed to wait for browser exit: {e}");
        }
        self.cleanup_temp_dir();
    }

    /// Remove the temp profile directory (blocking; also callable from Drop).
    ///
    /// MUST run after the Chrome process has exited, or Windows fails to
    /// remove locked files.
    fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take()
            && let Err(e) = std::fs::remove_dir_all(&path)
        {
            warn!(
                "failed to clean up temp profile {}: {e}. Manual cleanup may be required.",
                path.display()
            );
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();
        // Browser::drop kills the Chrome process if shutdown() never ran
        if self.user_data_dir.is_some() {
            warn!("browser dropped without explicit shutdown, removing temp profile in Drop");
            self.cleanup_temp_dir();
        }
    }
}

/// Launch a browser instance with stealth configuration
pub(crate) async fn launch_browser(headless: bool) -> Result<BrowserWrapper> {
    info!("launching browser (headless={headless})");

    // Unique temp profile per process avoids profile lock contention
    let user_data_dir = std::env::temp_dir().join(format!("pinscrape_chrome_{}", std::process::id()));
    std::fs::create_dir_all(&user_data_dir).context("failed to create user data directory")?;

    let headless_mode = if headless {
        HeadlessMode::default()
    } else {
        HeadlessMode::False
    };
    let config_builder = BrowserConfigBuilder::default()
        .headless_mode(headless_mode)
        .request_timeout(Duration::from_secs(30))
        .window_size(1920, 1080)
        .user_data_dir(user_data_dir.clone())
        .arg(format!("--user-agent={CHROME_USER_AGENT}"))
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-infobars")
        .arg("--disable-notifications")
        .arg("--disable-dev-shm-usage")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--no-sandbox")
        .arg("--disable-extensions")
        .arg("--disable-popup-blocking")
        .arg("--disable-background-networking")
        .arg("--disable-background-timer-throttling")
        .arg("--disable-hang-monitor")
        .arg("--metrics-recording-only")
        .arg("--password-store=basic")
        .arg("--use-mock-keychain")
        .arg("--hide-scrollbars")
        .arg("--mute-audio");

    let browser_config = config_builder
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("failed to launch browser")?;

    // Spawn handler with a tracked JoinHandle so it can be stopped
    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::error!("browser handler error: {e:?}");
            }
        }
        info!("browser event handler task completed");
    });

    Ok(BrowserWrapper::new(browser, handler_task, user_data_dir))
}
