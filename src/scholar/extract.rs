//! Result extraction from a Google Scholar page snapshot
//!
//! Scholar changes its markup without notice, so every field is read
//! through an ordered chain of selectors and the first one that yields
//! text wins. Missing fields are simply absent; only the title decides
//! whether a result is kept.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::ScrapedArticle;
use crate::utils::{Capture, FallbackChain, Strategy};

/// Result containers, most specific first
pub const CONTAINER_SELECTORS: &[&str] = &[".gs_r.gs_or.gs_scl", ".gs_ri", ".gs_r", "[data-lid]"];

/// Present on result pages even when no known container matches
pub const FALLBACK_MARKERS: &[&str] = &[".gs_rt", ".gs_a"];

const TITLE_SELECTORS: &[&str] = &[".gs_rt a", ".gs_rt", "h3 a", "h3"];
const LINK_SELECTORS: &[&str] = &[".gs_rt a", "h3 a", ".gs_or_ggsm a"];
const AUTHOR_SELECTORS: &[&str] = &[".gs_a", ".gs_gray"];
const ABSTRACT_SELECTORS: &[&str] = &[".gs_rs", ".gs_snippet"];
const CITATION_SELECTORS: &[&str] = &[".gs_fl a", ".gs_ri a"];

/// Titles must be longer than this after trimming
const MIN_TITLE_CHARS: usize = 5;

static YEAR: Lazy<Capture> =
    Lazy::new(|| Capture(Regex::new(r"\b((?:19|20)\d{2})\b").expect("valid regex")));
static CITED_BY: Lazy<Regex> = Lazy::new(|| Regex::new(r"Cited by\s+(\d+)").expect("valid regex"));
static CITATION_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bcit\w*\D*\d").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Venue from the author line: the text after the last " - ", else after
/// the last ", ", else after " in "
static JOURNAL: Lazy<FallbackChain<Capture>> = Lazy::new(|| {
    [r"^.*\s-\s(.+)$", r"^.*,\s(.+)$", r"\sin\s(.+)$"]
    .iter()
    .map(|p| Capture(Regex::new(p).expect("valid regex")))
    .collect()
});

/// Year from the author line, then the title, then the snippet
static YEAR_SOURCES: Lazy<FallbackChain<fn(&RawFields) -> Option<String>>> = Lazy::new(|| {
    FallbackChain::new(vec![
        (|f: &RawFields| YEAR.attempt(f.authors.as_str())) as fn(&RawFields) -> Option<String>,
        |f: &RawFields| YEAR.attempt(f.title.as_str()),
        |f: &RawFields| YEAR.attempt(f.abstract_text.as_str()),
    ])
});

/// Text of the first descendant matching the selector
struct TextOf(Selector);

impl<'a> Strategy<ElementRef<'a>> for TextOf {
    type Output = String;

    fn attempt(&self, el: &ElementRef<'a>) -> Option<String> {
        el.select(&self.0)
            .map(element_text)
            .find(|text| !text.is_empty())
    }
}

/// `href` of the first descendant matching the selector
struct HrefOf(Selector);

impl<'a> Strategy<ElementRef<'a>> for HrefOf {
    type Output = String;

    fn attempt(&self, el: &ElementRef<'a>) -> Option<String> {
        el.select(&self.0)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .find(|href| !href.is_empty() && !href.starts_with("javascript:"))
            .map(str::to_string)
    }
}

/// Text of the first citation link, with the count when it reads "Cited by N"
struct CitationLink(Selector);

impl<'a> Strategy<ElementRef<'a>> for CitationLink {
    type Output = (String, Option<u32>);

    fn attempt(&self, el: &ElementRef<'a>) -> Option<(String, Option<u32>)> {
        let text = el
            .select(&self.0)
            .map(element_text)
            .find(|text| CITATION_WORD.is_match(text))?;
        let count = CITED_BY
            .captures(&text)
            .and_then(|c| c.get(1))
            .and_then(|n| n.as_str().parse().ok());
        Some((text, count))
    }
}

fn selectors(list: &[&str]) -> Vec<Selector> {
    list.iter()
        .filter_map(|s| match Selector::parse(s) {
            Ok(sel) => Some(sel),
            Err(e) => {
                debug!("Skipping unparsable selector {:?}: {:?}", s, e);
                None
            }
        })
        .collect()
}

fn chain<S>(list: &[&str], make: fn(Selector) -> S) -> FallbackChain<S> {
    selectors(list).into_iter().map(make).collect()
}

fn element_text(el: ElementRef<'_>) -> String {
    let text: String = el.text().collect();
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Field text as found, before interpretation
#[derive(Debug, Default)]
struct RawFields {
    title: String,
    authors: String,
    abstract_text: String,
}

/// Selector chains for one extraction pass
struct Extractor {
    title: FallbackChain<TextOf>,
    link: FallbackChain<HrefOf>,
    authors: FallbackChain<TextOf>,
    abstract_text: FallbackChain<TextOf>,
    citations: FallbackChain<CitationLink>,
    base_url: Option<Url>,
}

impl Extractor {
    fn new(base_url: &str) -> Self {
        Self {
            title: chain(TITLE_SELECTORS, TextOf),
            link: chain(LINK_SELECTORS, HrefOf),
            authors: chain(AUTHOR_SELECTORS, TextOf),
            abstract_text: chain(ABSTRACT_SELECTORS, TextOf),
            citations: chain(CITATION_SELECTORS, CitationLink),
            base_url: Url::parse(base_url).ok(),
        }
    }

    fn article(&self, container: ElementRef<'_>) -> Option<ScrapedArticle> {
        let raw = RawFields {
            title: self.title.resolve(&container).unwrap_or_default(),
            authors: self.authors.resolve(&container).unwrap_or_default(),
            abstract_text: self.abstract_text.resolve(&container).unwrap_or_default(),
        };

        if raw.title.chars().count() <= MIN_TITLE_CHARS {
            return None;
        }

        let year = YEAR_SOURCES.resolve(&raw);
        let journal = JOURNAL.resolve(raw.authors.as_str());
        let url = self.link.resolve(&container).map(|href| self.resolve_url(&href));
        let (citation_text, citations) = match self.citations.resolve(&container) {
            Some((text, count)) => (Some(text), count),
            None => (None, None),
        };

        Some(ScrapedArticle {
            title: raw.title,
            authors: non_empty(raw.authors),
            abstract_text: non_empty(raw.abstract_text),
            journal,
            year,
            citations,
            citation_text,
            url,
        })
    }

    fn resolve_url(&self, href: &str) -> String {
        self.base_url
            .as_ref()
            .and_then(|base| base.join(href).ok())
            .map(String::from)
            .unwrap_or_else(|| href.to_string())
    }
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

/// Containers from the first selector that matches anything
///
/// Falls back to the parents of bare result titles when no known container
/// selector matches.
fn containers<'a>(document: &'a Html) -> Vec<ElementRef<'a>> {
    for sel in selectors(CONTAINER_SELECTORS) {
        let found: Vec<ElementRef<'a>> = document.select(&sel).collect();
        if !found.is_empty() {
            debug!("{} result container(s) matched", found.len());
            return found;
        }
    }

    selectors(&FALLBACK_MARKERS[..1])
        .iter()
        .flat_map(|sel| document.select(sel))
        .filter_map(|title| title.parent().and_then(ElementRef::wrap))
        .collect()
}

/// Extract up to `limit` articles from a result page
pub fn extract_articles(html: &str, base_url: &str, limit: usize) -> Vec<ScrapedArticle> {
    let document = Html::parse_document(html);
    let extractor = Extractor::new(base_url);

    let found = containers(&document);
    let total = found.len();
    let articles: Vec<ScrapedArticle> = found
        .into_iter()
        .filter_map(|c| extractor.article(c))
        .take(limit)
        .collect();
    debug!("Kept {} of {} Scholar result(s)", articles.len(), total);
    articles
}
