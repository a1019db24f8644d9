//! Short-lived browser sessions for scraping result pages
//!
//! A session opens one browser, loads one results page, waits for result
//! markup and takes a snapshot of the rendered HTML. The browser is released
//! before the session returns, on success and on every failure.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::page::Page;
use chromiumoxide_cdp::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use serde_json::json;
use tracing::{debug, info, warn};

use super::ScrapedArticle;
use super::extract::{CONTAINER_SELECTORS, FALLBACK_MARKERS, extract_articles};
use crate::browser::{BrowserError, BrowserResult, BrowserWrapper, launch_session_browser};
use crate::utils::constants::{SCRAPE_ACCEPT, SCRAPE_ACCEPT_LANGUAGE, SCRAPE_CACHE_CONTROL};
use crate::utils::{SourceError, SourceResult, Sleeper, pause, wait_for_any};
use crate::{BrowserConfig, ScrapingConfig};

/// A loaded tab that can be navigated and inspected
#[async_trait]
pub trait ResultsPage: Send + Sync {
    /// Navigate and wait for the load to settle, bounded by `timeout`
    async fn goto(&self, url: &str, timeout: Duration) -> BrowserResult<()>;

    /// Whether anything on the page matches `selector`
    async fn has_element(&self, selector: &str) -> bool;

    /// Rendered HTML of the whole document
    async fn content(&self) -> BrowserResult<String>;

    /// Close the page and release the browser behind it
    async fn release(self: Box<Self>);
}

/// Opens a fresh, isolated page for one session
#[async_trait]
pub trait PageLauncher: Send + Sync {
    async fn open(&self) -> BrowserResult<Box<dyn ResultsPage>>;
}

/// Launches a dedicated Chrome for every page
pub struct ChromeLauncher {
    config: BrowserConfig,
}

impl ChromeLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PageLauncher for ChromeLauncher {
    async fn open(&self) -> BrowserResult<Box<dyn ResultsPage>> {
        let wrapper = launch_session_browser(&self.config).await?;

        let page = match wrapper.new_page().await {
            Ok(page) => page,
            Err(e) => {
                wrapper.shutdown().await;
                return Err(e);
            }
        };

        if let Err(e) = apply_headers(&page).await {
            if let Err(close_err) = page.close().await {
                debug!("Failed to close results page: {}", close_err);
            }
            wrapper.shutdown().await;
            return Err(e);
        }

        Ok(Box::new(ChromePage { wrapper, page }))
    }
}

async fn apply_headers(page: &Page) -> BrowserResult<()> {
    let headers = Headers::new(json!({
        "Accept": SCRAPE_ACCEPT,
        "Accept-Language": SCRAPE_ACCEPT_LANGUAGE,
        "Cache-Control": SCRAPE_CACHE_CONTROL,
    }));
    page.execute(SetExtraHttpHeadersParams::new(headers))
        .await
        .map_err(|e| BrowserError::PageCreationFailed(format!("Failed to set headers: {e}")))?;
    Ok(())
}

struct ChromePage {
    wrapper: BrowserWrapper,
    page: Page,
}

#[async_trait]
impl ResultsPage for ChromePage {
    async fn goto(&self, url: &str, timeout: Duration) -> BrowserResult<()> {
        let navigation = async {
            self.page
                .goto(url)
                .await
                .map_err(|e| BrowserError::NavigationFailed(format!("{url}: {e}")))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| BrowserError::NavigationFailed(format!("{url}: {e}")))?;
            Ok::<(), BrowserError>(())
        };

        tokio::time::timeout(timeout, navigation)
            .await
            .map_err(|_| BrowserError::NavigationTimeout(timeout.as_millis() as u64))?
    }

    async fn has_element(&self, selector: &str) -> bool {
        self.page.find_element(selector).await.is_ok()
    }

    async fn content(&self) -> BrowserResult<String> {
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::ContentFailed(e.to_string()))
    }

    async fn release(self: Box<Self>) {
        let ChromePage { wrapper, page } = *self;
        if let Err(e) = page.close().await {
            debug!("Failed to close results page: {}", e);
        }
        wrapper.shutdown().await;
    }
}

/// One scraping run against a results URL
pub struct ScrapeSession<'a> {
    pub launcher: &'a dyn PageLauncher,
    pub sleeper: &'a dyn Sleeper,
    pub timing: &'a ScrapingConfig,
    /// Base for resolving relative result links
    pub base_url: &'a str,
}

impl ScrapeSession<'_> {
    /// Pause, open a page, scrape `url` and release the page
    pub async fn run(&self, url: &str, limit: usize) -> SourceResult<Vec<ScrapedArticle>> {
        pause(
            self.sleeper,
            Duration::from_millis(self.timing.min_delay_ms),
            Duration::from_millis(self.timing.max_delay_ms),
        )
        .await;

        let page = self.launcher.open().await?;
        let outcome = self.scrape(page.as_ref(), url, limit).await;
        page.release().await;
        outcome
    }

    async fn scrape(
        &self,
        page: &dyn ResultsPage,
        url: &str,
        limit: usize,
    ) -> SourceResult<Vec<ScrapedArticle>> {
        info!("Loading results page {}", url);
        page.goto(url, Duration::from_millis(self.timing.navigation_timeout_ms))
            .await?;

        let container = wait_for_any(
            CONTAINER_SELECTORS,
            Duration::from_millis(self.timing.selector_timeout_ms),
            self.sleeper,
            move |selector| page.has_element(selector),
        )
        .await;

        if container.is_none() {
            let mut marked = false;
            for marker in FALLBACK_MARKERS {
                if page.has_element(marker).await {
                    marked = true;
                    break;
                }
            }
            if !marked {
                warn!("No result containers on {}", url);
                return Err(SourceError::NoResults);
            }
            debug!("No known container, continuing on fallback markers");
        }

        let html = page.content().await?;
        Ok(extract_articles(&html, self.base_url, limit))
    }
}
