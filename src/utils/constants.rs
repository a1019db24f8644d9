//! Shared configuration constants for the acquisition layer
//!
//! Default endpoints, timeouts and the browser fingerprint used by the
//! scraping session. Anything a deployment may want to move lives in
//! [`crate::Config`]; these are only its defaults.

/// Chrome user agent string for stealth mode
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
///
/// Reference: https://chromiumdash.appspot.com/schedule
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Identifying header sent to the JSON/XML APIs
pub const DEFAULT_USER_AGENT: &str = "medical-sources/0.2 (+https://kodegen.ai)";

pub const OPENFDA_BASE_URL: &str = "https://api.fda.gov";
pub const PUBMED_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
pub const WHO_GHO_BASE_URL: &str = "https://ghoapi.azureedge.net/api";
pub const RXNAV_BASE_URL: &str = "https://rxnav.nlm.nih.gov/REST";
pub const SCHOLAR_BASE_URL: &str = "https://scholar.google.com/scholar";

/// Time to wait for response headers from a JSON/XML API
pub const RESPONSE_TIMEOUT_MS: u64 = 30_000;

/// Hard deadline for a whole request, body included
pub const REQUEST_DEADLINE_MS: u64 = 60_000;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;

/// Courtesy pause before a scraping session opens
pub const SCRAPE_MIN_DELAY_MS: u64 = 1_000;
pub const SCRAPE_MAX_DELAY_MS: u64 = 3_000;

pub const NAVIGATION_TIMEOUT_MS: u64 = 30_000;
pub const SELECTOR_TIMEOUT_MS: u64 = 15_000;

/// Desktop window the scraping browser pretends to have
pub const WINDOW_WIDTH: u32 = 1366;
pub const WINDOW_HEIGHT: u32 = 768;

/// Extra request headers applied to every scraping page
pub const SCRAPE_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
pub const SCRAPE_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
pub const SCRAPE_CACHE_CONTROL: &str = "no-cache";

/// Placeholders the bibliographic extractor falls back to
pub const NO_ABSTRACT: &str = "No abstract available";
pub const UNKNOWN_JOURNAL: &str = "Unknown Journal";
pub const UNKNOWN_DATE: &str = "Unknown Date";
