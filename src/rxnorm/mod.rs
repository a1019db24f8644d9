//! RxNorm drug nomenclature via the RxNav REST API

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::utils::{SourceResult, http};
use crate::{Config, HttpConfig};

/// One RxNorm concept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RxNormConcept {
    pub rxcui: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synonym: Option<String>,
    /// Term type such as SCD, SBD or BN
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppress: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DrugsResponse {
    #[serde(default)]
    drug_group: Option<DrugGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DrugGroup {
    #[serde(default)]
    concept_group: Option<Vec<ConceptGroup>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConceptGroup {
    #[serde(default)]
    concept_properties: Option<Vec<ConceptProperties>>,
}

#[derive(Debug, Deserialize)]
struct ConceptProperties {
    #[serde(default)]
    rxcui: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    synonym: Option<String>,
    #[serde(default)]
    tty: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    suppress: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ConceptProperties {
    fn into_concept(self) -> Option<RxNormConcept> {
        Some(RxNormConcept {
            rxcui: present(self.rxcui)?,
            name: present(self.name)?,
            synonym: present(self.synonym),
            term_type: present(self.tty),
            language: present(self.language),
            suppress: present(self.suppress),
        })
    }
}

/// Flatten every concept group, keeping source order
fn flatten(response: DrugsResponse) -> Vec<RxNormConcept> {
    response
        .drug_group
        .and_then(|group| group.concept_group)
        .unwrap_or_default()
        .into_iter()
        .flat_map(|g| g.concept_properties.unwrap_or_default())
        .filter_map(ConceptProperties::into_concept)
        .collect()
}

pub struct RxNormClient {
    client: reqwest::Client,
    base_url: String,
    http: HttpConfig,
}

impl RxNormClient {
    pub fn new(config: &Config) -> SourceResult<Self> {
        Ok(Self {
            client: http::create_client(&config.user_agent, &config.http)?,
            base_url: config.endpoints.rxnav.trim_end_matches('/').to_string(),
            http: config.http.clone(),
        })
    }

    /// Concepts whose names match `query`, as many as RxNav returns
    pub async fn search_drug_nomenclature(&self, query: &str) -> Vec<RxNormConcept> {
        info!("Searching RxNorm for {:?}", query);
        match self.fetch_concepts(query).await {
            Ok(concepts) => {
                debug!("RxNorm returned {} concept(s)", concepts.len());
                concepts
            }
            Err(e) => {
                warn!("RxNorm search failed for {:?}: {}", query, e);
                Vec::new()
            }
        }
    }

    async fn fetch_concepts(&self, query: &str) -> SourceResult<Vec<RxNormConcept>> {
        let url = format!("{}/drugs.json", self.base_url);
        let response: DrugsResponse =
            http::get_json(&self.client, &url, &[("name", query.to_string())], &self.http).await?;
        Ok(flatten(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_keeps_order_and_drops_incomplete() {
        let body = r#"{"drugGroup":{"name":null,"conceptGroup":[
            {"tty":"BPCK"},
            {"tty":"SBD","conceptProperties":[
                {"rxcui":"1191","name":"aspirin","synonym":"","tty":"IN","language":"ENG","suppress":"N","umlscui":""},
                {"rxcui":"","name":"nameless","tty":"SBD"}
            ]},
            {"tty":"SCD","conceptProperties":[
                {"rxcui":"198464","name":"aspirin 300 MG Rectal Suppository","tty":"SCD","language":"ENG","suppress":"N"}
            ]}
        ]}}"#;
        let concepts = flatten(serde_json::from_str(body).unwrap());

        let ids: Vec<&str> = concepts.iter().map(|c| c.rxcui.as_str()).collect();
        assert_eq!(ids, ["1191", "198464"]);
        assert_eq!(concepts[0].synonym, None);
        assert_eq!(concepts[0].term_type.as_deref(), Some("IN"));
    }

    #[test]
    fn test_empty_group() {
        let concepts = flatten(serde_json::from_str(r#"{"drugGroup":{"name":null}}"#).unwrap());
        assert!(concepts.is_empty());
        let concepts = flatten(serde_json::from_str("{}").unwrap());
        assert!(concepts.is_empty());
    }

    #[test]
    fn test_null_fields_drop_only_their_concept() {
        let body = r#"{"drugGroup":{"conceptGroup":[
            {"tty":"BN","conceptProperties":null},
            {"tty":"IN","conceptProperties":[
                {"rxcui":null,"name":"unidentified"},
                {"rxcui":"1191","name":null},
                {"rxcui":"1191","name":"aspirin","synonym":null,"tty":"IN"}
            ]}
        ]}}"#;
        let concepts = flatten(serde_json::from_str(body).unwrap());

        assert_eq!(concepts.len(), 1);
        assert_eq!(concepts[0].name, "aspirin");
        assert_eq!(concepts[0].synonym, None);
    }
}
