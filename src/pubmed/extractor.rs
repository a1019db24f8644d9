//! Regex-driven extraction of articles from an efetch XML body
//!
//! The body is treated as text, not as a document: it is cut into blocks at
//! each `<PubmedArticle>` marker and every field is pulled out of its block
//! independently. A field that cannot be found falls back to a placeholder;
//! only a block without identifier or title is dropped. One malformed
//! article never costs the others.

use once_cell::sync::Lazy;
use regex::Regex;

use super::BibliographicArticle;
use crate::utils::constants::{NO_ABSTRACT, UNKNOWN_DATE, UNKNOWN_JOURNAL};
use crate::utils::{Capture, FallbackChain};

const ARTICLE_MARKER: &str = "<PubmedArticle>";

static PMID: Lazy<Regex> = Lazy::new(|| element(r"PMID"));
static ARTICLE_TITLE: Lazy<Regex> = Lazy::new(|| element(r"ArticleTitle"));
static ABSTRACT_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<AbstractText(\s[^>]*)?>(.*?)</AbstractText>").expect("valid regex")
});
static LABEL_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bLabel\s*=\s*"([^"]*)""#).expect("valid regex"));
static AUTHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<Author(?:\s[^>]*)?>(.*?)</Author>").expect("valid regex"));
static FORE_NAME: Lazy<Regex> = Lazy::new(|| element(r"ForeName"));
static LAST_NAME: Lazy<Regex> = Lazy::new(|| element(r"LastName"));
static COLLECTIVE_NAME: Lazy<Regex> = Lazy::new(|| element(r"CollectiveName"));
static JOURNAL_TITLE: Lazy<Regex> = Lazy::new(|| element(r"Title"));
static PUB_DATE: Lazy<Regex> = Lazy::new(|| element(r"PubDate"));
static YEAR: Lazy<Regex> = Lazy::new(|| element(r"Year"));
static MONTH: Lazy<Regex> = Lazy::new(|| element(r"Month"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Article id first, the electronic location id as a fallback
static DOI: Lazy<FallbackChain<Capture>> = Lazy::new(|| {
    [
        r#"(?s)<ArticleId\s+IdType="doi"\s*>(.*?)</ArticleId>"#,
        r#"(?s)<ELocationID\s+EIdType="doi"[^>]*>(.*?)</ELocationID>"#,
    ]
    .iter()
    .map(|p| Capture(Regex::new(p).expect("valid regex")))
    .collect()
});

/// `<name ...>content</name>`, capturing content; attributes allowed
fn element(name: &str) -> Regex {
    Regex::new(&format!(r"(?s)<{name}(?:\s[^>]*)?>(.*?)</{name}>")).expect("valid regex")
}

/// Strip inline markup, decode the predefined entities and collapse whitespace
pub fn clean_text(raw: &str) -> String {
    let stripped = TAG.replace_all(raw, "");
    let decoded = stripped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&");
    WHITESPACE.replace_all(decoded.trim(), " ").into_owned()
}

fn first(re: &Regex, text: &str) -> Option<String> {
    let cleaned = clean_text(re.captures(text)?.get(1)?.as_str());
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Parse every article block out of an efetch body
pub fn extract_articles(xml: &str) -> Vec<BibliographicArticle> {
    xml.split(ARTICLE_MARKER)
        .skip(1)
        .filter_map(parse_block)
        .collect()
}

fn parse_block(block: &str) -> Option<BibliographicArticle> {
    let pmid = first(&PMID, block)?;
    let title = first(&ARTICLE_TITLE, block)?;

    Some(BibliographicArticle {
        pmid,
        title,
        abstract_text: abstract_text(block),
        authors: authors(block),
        journal: first(&JOURNAL_TITLE, block).unwrap_or_else(|| UNKNOWN_JOURNAL.to_string()),
        publication_date: publication_date(block),
        doi: DOI.resolve(block).map(|d| clean_text(&d)),
    })
}

fn abstract_text(block: &str) -> String {
    let sections: Vec<String> = ABSTRACT_TEXT
        .captures_iter(block)
        .filter_map(|caps| {
            let text = clean_text(caps.get(2)?.as_str());
            if text.is_empty() {
                return None;
            }
            let label = caps
                .get(1)
                .and_then(|attrs| LABEL_ATTR.captures(attrs.as_str()))
                .and_then(|l| l.get(1))
                .map(|l| l.as_str().trim())
                .filter(|l| !l.is_empty());
            Some(match label {
                Some(label) => format!("{label}: {text}"),
                None => text,
            })
        })
        .collect();

    if sections.is_empty() {
        NO_ABSTRACT.to_string()
    } else {
        sections.join(" ")
    }
}

fn authors(block: &str) -> Vec<String> {
    AUTHOR
        .captures_iter(block)
        .filter_map(|caps| {
            let inner = caps.get(1)?.as_str();
            let name = match (first(&FORE_NAME, inner), first(&LAST_NAME, inner)) {
                (Some(given), Some(surname)) => format!("{given} {surname}"),
                (None, Some(surname)) => surname,
                _ => first(&COLLECTIVE_NAME, inner)?,
            };
            (!name.is_empty()).then_some(name)
        })
        .collect()
}

fn publication_date(block: &str) -> String {
    let Some(date) = PUB_DATE.captures(block).and_then(|c| c.get(1)) else {
        return UNKNOWN_DATE.to_string();
    };
    let date = date.as_str();
    match (first(&YEAR, date), first(&MONTH, date)) {
        (Some(year), Some(month)) => format!("{month} {year}"),
        (Some(year), None) => year,
        _ => UNKNOWN_DATE.to_string(),
    }
}
