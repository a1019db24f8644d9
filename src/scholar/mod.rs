//! Google Scholar search through browser automation
//!
//! Scholar has no API. Each search launches its own headless browser,
//! loads the results page like a desktop visitor would and reads the
//! results out of the rendered markup.
//!
//! # Architecture
//! - `session` - Browser seam ([`PageLauncher`], [`ResultsPage`]) and the scraping run
//! - `extract` - Selector fallback chains over the page snapshot

pub mod extract;
pub mod session;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::utils::limits::{ARTICLE_LIMITS, clamp_limit};
use crate::utils::{Sleeper, tokio_sleeper};
use crate::{Config, ScrapingConfig};
pub use session::{ChromeLauncher, PageLauncher, ResultsPage, ScrapeSession};

/// One search result as scraped; every field but the title may be missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedArticle {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    /// Four-digit year
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citations: Option<u32>,
    /// Citation link text as shown, kept even when no count can be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Results URL for `query`
pub fn search_url(base_url: &str, query: &str) -> String {
    format!("{}?q={}&hl=en", base_url, urlencoding::encode(query))
}

pub struct ScholarClient {
    base_url: String,
    timing: ScrapingConfig,
    launcher: Arc<dyn PageLauncher>,
    sleeper: Arc<dyn Sleeper>,
}

impl ScholarClient {
    pub fn new(config: &Config) -> Self {
        Self::with_launcher(
            config,
            Arc::new(ChromeLauncher::new(config.browser.clone())),
            tokio_sleeper(),
        )
    }

    /// Client driving pages from `launcher`, pausing through `sleeper`
    pub fn with_launcher(
        config: &Config,
        launcher: Arc<dyn PageLauncher>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            base_url: config.endpoints.scholar.clone(),
            timing: config.scraping.clone(),
            launcher,
            sleeper,
        }
    }

    /// Search Scholar, returning at most `limit` results (1..=20)
    ///
    /// Every failure, from a missing Chrome to a changed page layout, yields
    /// an empty result.
    pub async fn search_scholar(&self, query: &str, limit: Option<usize>) -> Vec<ScrapedArticle> {
        let limit = clamp_limit(limit, ARTICLE_LIMITS);
        let url = search_url(&self.base_url, query);
        info!("Scraping Google Scholar for {:?} (limit {})", query, limit);

        let session = ScrapeSession {
            launcher: self.launcher.as_ref(),
            sleeper: self.sleeper.as_ref(),
            timing: &self.timing,
            base_url: &self.base_url,
        };

        match session.run(&url, limit).await {
            Ok(articles) => {
                info!("Scholar search returned {} result(s)", articles.len());
                articles
            }
            Err(e) => {
                warn!("Scholar search failed for {:?}: {}", query, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::session::testing::{FakeLauncher, FakeScript};
    use super::*;
    use crate::utils::delay::testing::RecordingSleeper;

    #[test]
    fn test_search_url_encodes_query() {
        assert_eq!(
            search_url("https://scholar.google.com/scholar", "aspirin & stroke"),
            "https://scholar.google.com/scholar?q=aspirin%20%26%20stroke&hl=en"
        );
    }

    #[tokio::test]
    async fn test_failed_session_is_empty_and_released() {
        let launcher = Arc::new(FakeLauncher::with(FakeScript::default()));
        let client = ScholarClient::with_launcher(
            &Config::default(),
            launcher.clone(),
            Arc::new(RecordingSleeper::default()),
        );

        let articles = client.search_scholar("aspirin", Some(5)).await;

        assert!(articles.is_empty());
        assert_eq!(launcher.released(), 1);
        let visited = launcher.visited.lock().unwrap().clone();
        assert_eq!(visited, ["https://scholar.google.com/scholar?q=aspirin&hl=en"]);
    }

    #[tokio::test]
    async fn test_limit_is_clamped() {
        let result = |i: usize| {
            format!(r#"<div class="gs_ri"><h3 class="gs_rt">Result title {i}</h3></div>"#)
        };
        let html: String = (0..30).map(result).collect();
        let launcher = Arc::new(FakeLauncher::with(FakeScript {
            present: vec![".gs_ri"],
            html,
            ..FakeScript::default()
        }));
        let client = ScholarClient::with_launcher(
            &Config::default(),
            launcher.clone(),
            Arc::new(RecordingSleeper::default()),
        );

        assert_eq!(client.search_scholar("x", Some(100)).await.len(), 20);
        assert_eq!(client.search_scholar("x", Some(0)).await.len(), 1);
        assert_eq!(launcher.opened(), 2);
        assert_eq!(launcher.released(), 2);
    }
}
