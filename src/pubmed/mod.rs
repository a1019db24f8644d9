//! PubMed client over the NCBI E-utilities
//!
//! Two phases: `esearch` resolves a query to PMIDs, `efetch` returns the
//! articles as XML, which [`extractor`] turns into records.

pub mod extractor;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::utils::limits::{ARTICLE_LIMITS, clamp_limit};
use crate::utils::{SourceResult, http};
use crate::{Config, HttpConfig};

/// Publication types that mark an article as a clinical guideline
const GUIDELINE_FILTER: &str = "(guideline[pt] OR practice guideline[pt])";

/// One journal article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BibliographicArticle {
    pub pmid: String,
    pub title: String,
    /// Labelled sections are prefixed with their label and joined by a space
    pub abstract_text: String,
    pub authors: Vec<String>,
    pub journal: String,
    /// "Month Year", "Year" or a placeholder
    pub publication_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

pub struct PubMedClient {
    client: reqwest::Client,
    base_url: String,
    http: HttpConfig,
}

impl PubMedClient {
    pub fn new(config: &Config) -> SourceResult<Self> {
        Ok(Self {
            client: http::create_client(&config.user_agent, &config.http)?,
            base_url: config.endpoints.pubmed.trim_end_matches('/').to_string(),
            http: config.http.clone(),
        })
    }

    /// Search PubMed, returning at most `limit` articles (1..=20)
    pub async fn search_articles(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Vec<BibliographicArticle> {
        let limit = clamp_limit(limit, ARTICLE_LIMITS);
        info!("Searching PubMed for {:?} (limit {})", query, limit);
        self.search_term(query, limit).await
    }

    /// Like [`search_articles`](Self::search_articles), restricted to guideline publication types
    pub async fn search_clinical_guidelines(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Vec<BibliographicArticle> {
        let limit = clamp_limit(limit, ARTICLE_LIMITS);
        let term = guideline_term(query);
        info!("Searching PubMed guidelines: {}", term);
        self.search_term(&term, limit).await
    }

    async fn search_term(&self, term: &str, limit: usize) -> Vec<BibliographicArticle> {
        match self.fetch_articles(term, limit).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!("PubMed search failed for {:?}: {}", term, e);
                Vec::new()
            }
        }
    }

    async fn fetch_articles(&self, term: &str, limit: usize) -> SourceResult<Vec<BibliographicArticle>> {
        let ids = self.search_ids(term, limit).await?;
        if ids.is_empty() {
            debug!("PubMed returned no ids for {:?}", term);
            return Ok(Vec::new());
        }

        let url = format!("{}/efetch.fcgi", self.base_url);
        let query = [
            ("db", "pubmed".to_string()),
            ("id", ids.join(",")),
            ("retmode", "xml".to_string()),
        ];
        let xml = http::get_text(&self.client, &url, &query, &self.http).await?;
        let articles = extractor::extract_articles(&xml);
        debug!("Extracted {} of {} PubMed article(s)", articles.len(), ids.len());
        Ok(articles)
    }

    async fn search_ids(&self, term: &str, limit: usize) -> SourceResult<Vec<String>> {
        let url = format!("{}/esearch.fcgi", self.base_url);
        let query = [
            ("db", "pubmed".to_string()),
            ("term", term.to_string()),
            ("retmode", "json".to_string()),
            ("retmax", limit.to_string()),
        ];
        let response: ESearchResponse = http::get_json(&self.client, &url, &query, &self.http).await?;
        let mut ids = response.esearchresult.idlist;
        ids.truncate(limit);
        Ok(ids)
    }
}

fn guideline_term(query: &str) -> String {
    format!("({query}) AND {GUIDELINE_FILTER}")
}
