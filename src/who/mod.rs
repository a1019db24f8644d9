//! WHO Global Health Observatory client

pub mod indicators;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::utils::limits::{INDICATOR_LIMITS, clamp_limit};
use crate::utils::{SourceResult, http};
use crate::{Config, HttpConfig};
use indicators::{ResolvedIndicator, country_name, resolve_indicator};

const SOURCE_TAG: &str = "WHO Global Health Observatory";

/// One observation of a health indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthIndicatorPoint {
    pub country: String,
    pub country_code: String,
    pub indicator: String,
    pub indicator_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Never null in returned points
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub source: String,
}

#[derive(Debug, Deserialize)]
struct GhoResponse {
    #[serde(default)]
    value: Vec<GhoFact>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GhoFact {
    #[serde(default)]
    indicator_code: Option<String>,
    #[serde(default)]
    spatial_dim: Option<String>,
    #[serde(default)]
    time_dim: Option<i32>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    numeric_value: Option<f64>,
}

pub struct WhoClient {
    client: reqwest::Client,
    base_url: String,
    http: HttpConfig,
}

impl WhoClient {
    pub fn new(config: &Config) -> SourceResult<Self> {
        Ok(Self {
            client: http::create_client(&config.user_agent, &config.http)?,
            base_url: config.endpoints.who.trim_end_matches('/').to_string(),
            http: config.http.clone(),
        })
    }

    /// Data points for an indicator, optionally restricted to one country
    ///
    /// # Arguments
    /// * `indicator` - Free-text name ("life expectancy") or a GHO code
    /// * `country` - ISO 3166 alpha-3 code such as "USA"
    /// * `limit` - Maximum points to return (clamped to 1..=50)
    ///
    /// Unknown indicators, malformed country codes and source failures all
    /// produce an empty result. Points without a numeric value are dropped.
    pub async fn search_health_indicators(
        &self,
        indicator: &str,
        country: Option<&str>,
        limit: Option<usize>,
    ) -> Vec<HealthIndicatorPoint> {
        let limit = clamp_limit(limit, INDICATOR_LIMITS);

        let Some(resolved) = resolve_indicator(indicator) else {
            info!("No WHO indicator code matches {:?}", indicator);
            return Vec::new();
        };

        let country = match country.map(normalize_country) {
            Some(Some(code)) => Some(code),
            Some(None) => {
                warn!("Ignoring WHO query with malformed country code {:?}", country);
                return Vec::new();
            }
            None => None,
        };

        info!(
            "Fetching WHO indicator {} ({}) for {}",
            resolved.code(),
            resolved.name(),
            country.as_deref().unwrap_or("all countries")
        );

        match self.fetch_points(&resolved, country.as_deref(), limit).await {
            Ok(points) => points,
            Err(e) => {
                warn!("WHO indicator search failed for {:?}: {}", indicator, e);
                Vec::new()
            }
        }
    }

    async fn fetch_points(
        &self,
        resolved: &ResolvedIndicator,
        country: Option<&str>,
        limit: usize,
    ) -> SourceResult<Vec<HealthIndicatorPoint>> {
        let url = format!("{}/{}", self.base_url, resolved.code());
        let mut query = vec![
            ("$top", limit.to_string()),
            ("$orderby", "TimeDim desc".to_string()),
        ];
        if let Some(code) = country {
            query.push(("$filter", format!("SpatialDim eq '{code}'")));
        }

        let response: GhoResponse = http::get_json(&self.client, &url, &query, &self.http).await?;
        let total = response.value.len();
        let points: Vec<HealthIndicatorPoint> = response
            .value
            .into_iter()
            .filter_map(|fact| to_point(fact, resolved))
            .take(limit)
            .collect();
        debug!("WHO returned {} fact(s), kept {}", total, points.len());
        Ok(points)
    }
}

/// Accept only three-letter codes; they are embedded in an OData filter
fn normalize_country(input: &str) -> Option<String> {
    let code = input.trim().to_ascii_uppercase();
    (code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())).then_some(code)
}

fn to_point(fact: GhoFact, resolved: &ResolvedIndicator) -> Option<HealthIndicatorPoint> {
    let value = fact.numeric_value?;
    let country_code = fact.spatial_dim.unwrap_or_default();
    Some(HealthIndicatorPoint {
        country: country_name(&country_code)
            .map(str::to_string)
            .unwrap_or_else(|| country_code.clone()),
        country_code,
        indicator: resolved.name().to_string(),
        indicator_code: fact
            .indicator_code
            .unwrap_or_else(|| resolved.code().to_string()),
        year: fact.time_dim,
        value: Some(value),
        display_value: fact.value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()),
        unit: resolved.unit().map(str::to_string),
        source: SOURCE_TAG.to_string(),
    })
}
