//! Resilient acquisition of medical records from uncooperative sources
//!
//! Drug labels and adverse-event reports come from openFDA, journal articles
//! from PubMed (two-phase E-utilities lookup) and Google Scholar (browser
//! automation, no API), health indicators from the WHO Global Health
//! Observatory and drug nomenclature from RxNav. Every source is normalized
//! into plain value records owned by the caller.
//!
//! Only the openFDA drug-label search reports failures to the caller; every
//! other operation logs and returns an empty sequence.

mod browser;
pub mod browser_setup;
pub mod fda;
pub mod pubmed;
pub mod rxnorm;
pub mod scholar;
mod sources;
pub mod utils;
pub mod who;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::utils::RetryConfig;
use crate::utils::constants::*;

static GLOBAL_CONFIG: OnceLock<Config> = OnceLock::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Identifying User-Agent sent to the JSON/XML APIs
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub endpoints: Endpoints,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub scraping: ScrapingConfig,
}

/// Base URLs of every source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_openfda")]
    pub openfda: String,

    #[serde(default = "default_pubmed")]
    pub pubmed: String,

    #[serde(default = "default_who")]
    pub who: String,

    #[serde(default = "default_rxnav")]
    pub rxnav: String,

    #[serde(default = "default_scholar")]
    pub scholar: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Time allowed until response headers arrive
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,

    /// Hard deadline for a whole request
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

/// Browser security and launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Disable web security features (Same-Origin Policy, etc.)
    /// WARNING: Only enable for trusted content
    #[serde(default = "default_disable_security")]
    pub disable_security: bool,

    /// Window dimensions
    #[serde(default)]
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: u32,

    #[serde(default = "default_window_height")]
    pub height: u32,
}

/// Timing of a scraping session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapingConfig {
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    #[serde(default = "default_selector_timeout_ms")]
    pub selector_timeout_ms: u64,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_openfda() -> String {
    OPENFDA_BASE_URL.to_string()
}
fn default_pubmed() -> String {
    PUBMED_BASE_URL.to_string()
}
fn default_who() -> String {
    WHO_GHO_BASE_URL.to_string()
}
fn default_rxnav() -> String {
    RXNAV_BASE_URL.to_string()
}
fn default_scholar() -> String {
    SCHOLAR_BASE_URL.to_string()
}
fn default_response_timeout_ms() -> u64 {
    RESPONSE_TIMEOUT_MS
}
fn default_deadline_ms() -> u64 {
    REQUEST_DEADLINE_MS
}

fn default_headless() -> bool {
    true
}

fn default_disable_security() -> bool {
    false  // SECURE BY DEFAULT
}

fn default_window_width() -> u32 {
    WINDOW_WIDTH
}

fn default_window_height() -> u32 {
    WINDOW_HEIGHT
}

fn default_min_delay_ms() -> u64 {
    SCRAPE_MIN_DELAY_MS
}
fn default_max_delay_ms() -> u64 {
    SCRAPE_MAX_DELAY_MS
}
fn default_navigation_timeout_ms() -> u64 {
    NAVIGATION_TIMEOUT_MS
}
fn default_selector_timeout_ms() -> u64 {
    SELECTOR_TIMEOUT_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            endpoints: Endpoints::default(),
            http: HttpConfig::default(),
            retry: RetryConfig::default(),
            browser: BrowserConfig::default(),
            scraping: ScrapingConfig::default(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            openfda: default_openfda(),
            pubmed: default_pubmed(),
            who: default_who(),
            rxnav: default_rxnav(),
            scholar: default_scholar(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            response_timeout_ms: default_response_timeout_ms(),
            deadline_ms: default_deadline_ms(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            disable_security: default_disable_security(),
            window: WindowConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            selector_timeout_ms: default_selector_timeout_ms(),
        }
    }
}

impl Config {
    /// Process-wide configuration, loaded once on first access
    ///
    /// Falls back to defaults if the YAML file cannot be read or parsed.
    pub fn global() -> &'static Config {
        GLOBAL_CONFIG.get_or_init(|| {
            load_yaml_config().unwrap_or_else(|e| {
                tracing::warn!("Invalid configuration, using defaults: {}", e);
                Config::default()
            })
        })
    }
}

/// Location of the YAML config: `MEDICAL_SOURCES_CONFIG` or config.yaml in package root
pub fn config_path() -> PathBuf {
    std::env::var_os("MEDICAL_SOURCES_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config.yaml"))
}

/// Load config from YAML, or defaults when the file does not exist
pub fn load_yaml_config() -> anyhow::Result<Config> {
    let config_path = config_path();

    if config_path.exists() {
        let contents = fs::read_to_string(&config_path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    } else {
        Ok(Config::default())
    }
}

pub use browser::{BrowserError, BrowserResult, BrowserWrapper};
pub use fda::{AdverseEventReport, DrugLabel, DrugSearchError, DrugSearchField, FdaClient};
pub use pubmed::{BibliographicArticle, PubMedClient};
pub use rxnorm::{RxNormClient, RxNormConcept};
pub use scholar::{ScholarClient, ScrapedArticle};
pub use sources::MedicalSources;
pub use utils::{SourceError, SourceResult};
pub use who::{HealthIndicatorPoint, WhoClient};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "retry:\n  max_retries: 5\nendpoints:\n  openfda: http://localhost:9000\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.base_delay_ms, DEFAULT_BASE_DELAY_MS);
        assert_eq!(config.endpoints.openfda, "http://localhost:9000");
        assert_eq!(config.endpoints.pubmed, PUBMED_BASE_URL);
        assert_eq!(config.http.response_timeout_ms, 30_000);
        assert_eq!(config.http.deadline_ms, 60_000);
        assert_eq!(config.scraping.selector_timeout_ms, 15_000);
        assert!(config.browser.headless);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.browser.window.width, WINDOW_WIDTH);
        assert_eq!(config.scraping.min_delay_ms, 1_000);
        assert_eq!(config.scraping.max_delay_ms, 3_000);
    }
}
