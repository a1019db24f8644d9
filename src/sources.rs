//! One handle over every source client

use crate::fda::{AdverseEventReport, DrugLabel, DrugSearchError, DrugSearchField, FdaClient};
use crate::pubmed::{BibliographicArticle, PubMedClient};
use crate::rxnorm::{RxNormClient, RxNormConcept};
use crate::scholar::{ScholarClient, ScrapedArticle};
use crate::utils::SourceResult;
use crate::who::{HealthIndicatorPoint, WhoClient};
use crate::Config;

/// Entry point for callers that want every source behind one value
///
/// Holds no state between calls beyond the HTTP connection pools.
pub struct MedicalSources {
    pub fda: FdaClient,
    pub pubmed: PubMedClient,
    pub who: WhoClient,
    pub rxnorm: RxNormClient,
    pub scholar: ScholarClient,
}

impl MedicalSources {
    pub fn new(config: &Config) -> SourceResult<Self> {
        Ok(Self {
            fda: FdaClient::new(config)?,
            pubmed: PubMedClient::new(config)?,
            who: WhoClient::new(config)?,
            rxnorm: RxNormClient::new(config)?,
            scholar: ScholarClient::new(config),
        })
    }

    /// Sources built from [`Config::global`]
    pub fn from_global_config() -> SourceResult<Self> {
        Self::new(Config::global())
    }

    pub async fn search_drug_labels(
        &self,
        query: &str,
        field: Option<DrugSearchField>,
        limit: Option<usize>,
    ) -> Result<Vec<DrugLabel>, DrugSearchError> {
        self.fda.search_drug_labels(query, field, limit).await
    }

    pub async fn get_drug_by_ndc(&self, ndc: &str) -> Option<DrugLabel> {
        self.fda.get_drug_by_ndc(ndc).await
    }

    pub async fn search_adverse_events(
        &self,
        drug: &str,
        limit: Option<usize>,
    ) -> Vec<AdverseEventReport> {
        self.fda.search_adverse_events(drug, limit).await
    }

    pub async fn search_articles(&self, query: &str, limit: Option<usize>) -> Vec<BibliographicArticle> {
        self.pubmed.search_articles(query, limit).await
    }

    pub async fn search_clinical_guidelines(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Vec<BibliographicArticle> {
        self.pubmed.search_clinical_guidelines(query, limit).await
    }

    pub async fn search_health_indicators(
        &self,
        indicator: &str,
        country: Option<&str>,
        limit: Option<usize>,
    ) -> Vec<HealthIndicatorPoint> {
        self.who.search_health_indicators(indicator, country, limit).await
    }

    pub async fn search_drug_nomenclature(&self, query: &str) -> Vec<RxNormConcept> {
        self.rxnorm.search_drug_nomenclature(query).await
    }

    pub async fn search_scholar(&self, query: &str, limit: Option<usize>) -> Vec<ScrapedArticle> {
        self.scholar.search_scholar(query, limit).await
    }
}
