//! openFDA client: drug labels and adverse-event reports
//!
//! The drug-label search is the one acquisition path that retries and
//! reports failures to the caller. Everything else here logs and returns
//! nothing.

mod types;

pub use types::{AdverseEventReport, DrugLabel, EventDrug, EventPatient, EventReaction};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::utils::limits::{OPENFDA_LIMITS, clamp_limit};
use crate::utils::{
    RetryConfig, SourceError, SourceResult, Sleeper, http, retry_with_backoff, tokio_sleeper,
};
use crate::{Config, HttpConfig};
use types::{FdaResponse, RawAdverseEvent, RawDrugLabel};

/// Label field a drug search can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum DrugSearchField {
    BrandName,
    GenericName,
    ActiveIngredient,
    Manufacturer,
    Interactions,
    Indications,
    Route,
    DosageForm,
}

impl DrugSearchField {
    pub const ALL: [DrugSearchField; 8] = [
        Self::BrandName,
        Self::GenericName,
        Self::ActiveIngredient,
        Self::Manufacturer,
        Self::Interactions,
        Self::Indications,
        Self::Route,
        Self::DosageForm,
    ];

    /// openFDA field path this selector searches
    pub fn field_path(self) -> &'static str {
        match self {
            Self::BrandName => "openfda.brand_name",
            Self::GenericName => "openfda.generic_name",
            Self::ActiveIngredient => "openfda.substance_name",
            Self::Manufacturer => "openfda.manufacturer_name",
            Self::Interactions => "drug_interactions",
            Self::Indications => "indications_and_usage",
            Self::Route => "openfda.route",
            Self::DosageForm => "openfda.dosage_form",
        }
    }
}

impl fmt::Display for DrugSearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_path())
    }
}

/// Build the openFDA `search` expression
///
/// With a field the query is quoted as a phrase; without one it passes
/// through untouched so callers can write their own expressions.
pub fn search_expression(query: &str, field: Option<DrugSearchField>) -> String {
    match field {
        Some(field) => format!("{}:\"{}\"", field.field_path(), query),
        None => query.to_string(),
    }
}

/// A drug-label search that could not be completed
#[derive(Error, Debug)]
#[error("Drug label search for {query:?} failed after {attempts} attempt(s): {source}")]
pub struct DrugSearchError {
    pub source: SourceError,
    pub query: String,
    pub field: Option<DrugSearchField>,
    /// The `search` expression sent to openFDA
    pub search: String,
    pub url: String,
    pub attempts: u32,
}

impl DrugSearchError {
    /// openFDA answers 404 when a search matches no label
    pub fn is_no_match(&self) -> bool {
        self.source.status() == Some(404)
    }

    pub fn status(&self) -> Option<u16> {
        self.source.status()
    }
}

pub struct FdaClient {
    client: reqwest::Client,
    base_url: String,
    http: HttpConfig,
    retry: RetryConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl FdaClient {
    pub fn new(config: &Config) -> SourceResult<Self> {
        Self::with_sleeper(config, tokio_sleeper())
    }

    /// Client whose retry waits go through `sleeper`
    pub fn with_sleeper(config: &Config, sleeper: Arc<dyn Sleeper>) -> SourceResult<Self> {
        Ok(Self {
            client: http::create_client(&config.user_agent, &config.http)?,
            base_url: config.endpoints.openfda.trim_end_matches('/').to_string(),
            http: config.http.clone(),
            retry: config.retry.clone(),
            sleeper,
        })
    }

    fn label_url(&self) -> String {
        format!("{}/drug/label.json", self.base_url)
    }

    async fn fetch_labels(&self, search: &str, limit: usize) -> SourceResult<Vec<DrugLabel>> {
        let query = [("search", search.to_string()), ("limit", limit.to_string())];
        let response: FdaResponse<RawDrugLabel> =
            http::get_json(&self.client, &self.label_url(), &query, &self.http).await?;
        Ok(response.results.into_iter().map(DrugLabel::from).collect())
    }

    /// Search drug labels, retrying transient failures
    ///
    /// # Arguments
    /// * `query` - Search text, or a raw openFDA expression when `field` is `None`
    /// * `field` - Restrict the search to one label field
    /// * `limit` - Maximum labels to return (clamped to 1..=100)
    ///
    /// # Errors
    /// Returns [`DrugSearchError`] once retries are exhausted or the failure is
    /// permanent. A search with no matching label is a 404 and fails too; see
    /// [`DrugSearchError::is_no_match`].
    pub async fn search_drug_labels(
        &self,
        query: &str,
        field: Option<DrugSearchField>,
        limit: Option<usize>,
    ) -> Result<Vec<DrugLabel>, DrugSearchError> {
        let limit = clamp_limit(limit, OPENFDA_LIMITS);
        let search = search_expression(query, field);
        info!("Searching openFDA drug labels: {} (limit {})", search, limit);

        let result = retry_with_backoff(&self.retry, self.sleeper.as_ref(), || {
            self.fetch_labels(&search, limit)
        })
        .await;

        match result {
            Ok(labels) => {
                debug!("openFDA returned {} label(s)", labels.len());
                Ok(labels)
            }
            Err(failure) => {
                let error = DrugSearchError {
                    source: failure.error,
                    query: query.to_string(),
                    field,
                    search,
                    url: self.label_url(),
                    attempts: failure.attempts,
                };
                warn!("{}", error);
                Err(error)
            }
        }
    }

    /// Look up a single label by product NDC
    pub async fn get_drug_by_ndc(&self, ndc: &str) -> Option<DrugLabel> {
        let search = format!("openfda.product_ndc:\"{}\"", ndc);
        match self.fetch_labels(&search, 1).await {
            Ok(labels) => labels.into_iter().next(),
            Err(e) => {
                warn!("openFDA NDC lookup failed for {}: {}", ndc, e);
                None
            }
        }
    }

    /// Adverse-event reports naming `drug` as a medicinal product
    pub async fn search_adverse_events(
        &self,
        drug: &str,
        limit: Option<usize>,
    ) -> Vec<AdverseEventReport> {
        let limit = clamp_limit(limit, OPENFDA_LIMITS);
        match self.fetch_adverse_events(drug, limit).await {
            Ok(reports) => reports,
            Err(e) => {
                warn!("openFDA adverse event search failed for {:?}: {}", drug, e);
                Vec::new()
            }
        }
    }

    async fn fetch_adverse_events(
        &self,
        drug: &str,
        limit: usize,
    ) -> SourceResult<Vec<AdverseEventReport>> {
        let url = format!("{}/drug/event.json", self.base_url);
        let query = [
            ("search", format!("patient.drug.medicinalproduct:\"{}\"", drug)),
            ("limit", limit.to_string()),
        ];
        let response: FdaResponse<RawAdverseEvent> =
            http::get_json(&self.client, &url, &query, &self.http).await?;
        Ok(response
            .results
            .into_iter()
            .filter_map(AdverseEventReport::from_raw)
            .collect())
    }
}
