//! Concrete `PageDriver` over a pin-board style discovery site.
//!
//! All DOM knowledge lives here: selectors, the in-page extraction scripts,
//! and the navigation strategy. The site renders its grid lazily via
//! JavaScript, so every view open waits for pin elements to actually appear
//! rather than trusting the navigation event.

use anyhow::{Context, Result, anyhow};
use chromiumoxide::page::Page;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::PageDriver;
use super::browser::{BrowserWrapper, launch_browser};
use crate::config::SortStrategy;
use crate::engine::identity::{parse_score_text, pin_id_from_url};
use crate::engine::types::ItemStub;

/// Search view base address
pub const SEARCH_URL: &str = "https://www.pinterest.com/search/pins/";

/// CSS selector for one pin card in a grid view
pub const PIN_SELECTOR: &str = "[data-test-id=\"pin\"]";

/// Maximum time to wait for pins to render after a view opens
const PIN_WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Bound on any single navigation operation
const NAV_TIMEOUT: Duration = Duration::from_secs(30);

/// Settle time after navigation for late dynamic content
const SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Scrolls issued per `load_more` call, with a pause between each
const SCROLLS_PER_LOAD: usize = 3;
const SCROLL_PAUSE: Duration = Duration::from_millis(600);

/// Extracts every visible pin card as `{id, url, image_url, image_url_hq,
/// title}`, deduplicated by image address. Grid thumbnails map to an
/// original-resolution variant by path substitution.
const EXTRACT_PINS_JS: &str = r#"
(() => {
    const pins = [];
    const seen = new Set();
    document.querySelectorAll('[data-test-id="pin"]').forEach((el) => {
        const link = el.querySelector('a[href*="/pin/"]');
        const img = el.querySelector('img');
        if (!link || !img) return;
        const imageUrl = img.src || img.dataset.src || '';
        if (!imageUrl || seen.has(imageUrl)) return;
        seen.add(imageUrl);
        const idMatch = link.href.match(/\/pin\/(\d+)/);
        let hq = null;
        for (const size of ['/236x/', '/474x/', '/736x/']) {
            if (imageUrl.includes(size)) {
                hq = imageUrl.replace(size, '/originals/');
                break;
            }
        }
        pins.push({
            id: idMatch ? idMatch[1] : null,
            url: link.href,
            image_url: imageUrl,
            image_url_hq: hq,
            title: img.alt || '',
        });
    });
    return pins;
})()
"#;

/// Collects every text token in the detail view that reads like a count
/// (plain digits or K/M/B suffixed). Parsing and plausibility filtering
/// happen on the Rust side.
const EXTRACT_COUNT_TOKENS_JS: &str = r#"
(() => {
    const tokens = [];
    const text = document.body.innerText || '';
    for (const line of text.split('\n')) {
        const cleaned = line.trim();
        if (/^[\d.,]+[KMB]?$/i.test(cleaned)) tokens.push(cleaned);
    }
    return tokens;
})()
"#;

/// Counts outside this range are UI noise (years, pixel dimensions), not
/// popularity scores.
const MIN_PLAUSIBLE_SCORE: u64 = 10;
const MAX_PLAUSIBLE_SCORE: u64 = 10_000_000;

/// Largest plausible count among the extracted tokens, 0 when none parse
fn best_score(tokens: &[String]) -> u64 {
    tokens
        .iter()
        .filter_map(|t| parse_score_text(t))
        .filter(|v| (MIN_PLAUSIBLE_SCORE..MAX_PLAUSIBLE_SCORE).contains(v))
        .max()
        .unwrap_or(0)
}

const COUNT_PINS_JS: &str =
    r#"document.querySelectorAll('[data-test-id="pin"]').length"#;

/// Raw pin shape as returned by the extraction script
#[derive(Debug, Deserialize)]
struct RawPin {
    id: Option<String>,
    url: Option<String>,
    image_url: Option<String>,
    image_url_hq: Option<String>,
    title: Option<String>,
}

/// chromiumoxide-backed page driver for the pin-board site
pub struct PinboardDriver {
    wrapper: BrowserWrapper,
    page: Page,
    headless: bool,
}

impl PinboardDriver {
    /// Launch a browser session and open a blank page
    pub async fn connect(headless: bool) -> Result<Self> {
        let wrapper = launch_browser(headless).await?;
        let page = wrapper
            .browser()
            .new_page("about:blank")
            .await
            .context("failed to create page")?;
        Ok(Self {
            wrapper,
            page,
            headless,
        })
    }

    /// Poll until pin elements exist in the DOM, like a human waiting for
    /// the grid to fill in. Navigation events fire before the client-side
    /// render finishes, so this is the only reliable readiness signal.
    async fn wait_for_pins(&self) -> Result<()> {
        let start = Instant::now();
        let poll_interval = Duration::from_millis(200);
        loop {
            if self.page.find_element(PIN_SELECTOR).await.is_ok() {
                debug!("pins rendered after {:.2}s", start.elapsed().as_secs_f64());
                return Ok(());
            }
            if start.elapsed() >= PIN_WAIT_TIMEOUT {
                let url = self.page.url().await.ok().flatten().unwrap_or_default();
                return Err(anyhow!(
                    "timeout waiting for pins to render (selector '{PIN_SELECTOR}', url {url})"
                ));
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    async fn count_visible(&self) -> Result<usize> {
        let count: usize = self
            .page
            .evaluate(COUNT_PINS_JS)
            .await
            .context("failed to count visible pins")?
            .into_value()
            .context("pin count was not a number")?;
        Ok(count)
    }

    async fn extract_pins(&self) -> Result<Vec<ItemStub>> {
        let raw: Vec<RawPin> = self
            .page
            .evaluate(EXTRACT_PINS_JS)
            .await
            .context("pin extraction script failed")?
            .into_value()
            .context("pin extraction returned unexpected shape")?;

        let mut seen_images = HashSet::new();
        let stubs = raw
            .into_iter()
            .filter_map(|p| {
                let url = p.url?;
                let image_url = p.image_url?;
                if url.is_empty() || image_url.is_empty() || !seen_images.insert(image_url.clone())
                {
                    return None;
                }
                Some(ItemStub {
                    id: p.id,
                    url,
                    image_url,
                    image_url_hq: p.image_url_hq,
                    title: p.title.unwrap_or_default(),
                })
            })
            .collect();
        Ok(stubs)
    }

    /// Click the pin card link if it is on the current view
    async fn navigate_by_click(&self, url: &str) -> Result<()> {
        let id = pin_id_from_url(url).ok_or_else(|| anyhow!("no pin id in url"))?;
        let selector = format!("a[href*=\"/pin/{id}\"]");
        let element = self
            .page
            .find_element(selector.as_str())
            .await
            .context("pin link not present on current view")?;
        element.click().await.context("click failed")?;
        self.page
            .wait_for_navigation()
            .await
            .context("navigation after click did not complete")?;
        Ok(())
    }

    async fn navigate_direct(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("direct navigation to {url} failed"))?;
        self.page
            .wait_for_navigation()
            .await
            .context("direct navigation did not complete")?;
        Ok(())
    }
}

impl PageDriver for PinboardDriver {
    async fn open_seed_view(&mut self, query: &str, sort: SortStrategy) -> Result<()> {
        let mut url = format!("{SEARCH_URL}?q={}", urlencoding::encode(query));
        if let Some(sort_value) = sort.as_query_value() {
            url.push_str("&sort=");
            url.push_str(sort_value);
        }
        info!("opening seed view: {url}");

        tokio::time::timeout(NAV_TIMEOUT, self.navigate_direct(&url))
            .await
            .map_err(|_| anyhow!("seed view navigation timed out"))??;
        self.wait_for_pins().await?;
        tokio::time::sleep(SETTLE_DELAY).await;
        Ok(())
    }

    async fn load_more(&mut self) -> Result<usize> {
        let before = self.count_visible().await?;
        for _ in 0..SCROLLS_PER_LOAD {
            self.page
                .evaluate("window.scrollBy(0, window.innerHeight)")
                .await
                .context("scroll failed")?;
            tokio::time::sleep(SCROLL_PAUSE).await;
        }
        tokio::time::sleep(SETTLE_DELAY).await;
        let after = self.count_visible().await?;
        let newly_visible = after.saturating_sub(before);
        debug!("load_more: {before} -> {after} visible pins");
        Ok(newly_visible)
    }

    async fn list_visible_items(&mut self) -> Result<Vec<ItemStub>> {
        let stubs = self.extract_pins().await?;
        info!("extracted {} unique pins from current view", stubs.len());
        Ok(stubs)
    }

    async fn navigate_to(&mut self, url: &str) -> Result<()> {
        let attempt = async {
            match self.navigate_by_click(url).await {
                Ok(()) => Ok(()),
                Err(click_err) => {
                    debug!("structured navigation failed ({click_err:#}), trying direct load");
                    self.navigate_direct(url).await
                }
            }
        };
        tokio::time::timeout(NAV_TIMEOUT, attempt)
            .await
            .map_err(|_| anyhow!("navigation to {url} timed out"))??;
        tokio::time::sleep(SETTLE_DELAY).await;
        Ok(())
    }

    async fn current_item_score(&mut self) -> Result<u64> {
        let tokens: Vec<String> = self
            .page
            .evaluate(EXTRACT_COUNT_TOKENS_JS)
            .await
            .context("count token extraction script failed")?
            .into_value()
            .context("count token extraction returned unexpected shape")?;
        let score = best_score(&tokens);
        debug!("extracted score {score} from {} count tokens", tokens.len());
        Ok(score)
    }

    async fn current_item_related_items(&mut self) -> Result<Vec<ItemStub>> {
        // Related pins render as the same card markup below the detail view
        let current = self.page.url().await.ok().flatten().unwrap_or_default();
        let mut stubs = self.extract_pins().await?;
        stubs.retain(|s| s.url != current);
        debug!("found {} related pins", stubs.len());
        Ok(stubs)
    }

    async fn restart_session(&mut self) -> Result<()> {
        warn!("restarting browser session");
        self.wrapper.shutdown().await;
        self.wrapper = launch_browser(self.headless).await?;
        self.page = self
            .wrapper
            .browser()
            .new_page("about:blank")
            .await
            .context("failed to create page after restart")?;
        Ok(())
    }

    async fn close_session(&mut self) -> Result<()> {
        self.wrapper.shutdown().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn best_score_picks_the_largest_plausible_count() {
        assert_eq!(best_score(&tokens(&["523", "1.2K", "3"])), 1200);
        assert_eq!(best_score(&tokens(&["2,341", "87"])), 2341);
    }

    #[test]
    fn best_score_drops_implausible_values() {
        // Below 10 and at or above 10M are page noise, not like counts.
        assert_eq!(best_score(&tokens(&["3", "25M", "1920"])), 1920);
        assert_eq!(best_score(&tokens(&["9", "10000000"])), 0);
    }

    #[test]
    fn best_score_is_zero_without_count_tokens() {
        assert_eq!(best_score(&[]), 0);
        assert_eq!(best_score(&tokens(&["likes", ""])), 0);
    }
}
