//! openFDA wire shapes and the normalized records built from them

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct FdaResponse<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawOpenFda {
    #[serde(default)]
    pub brand_name: Vec<String>,
    #[serde(default)]
    pub generic_name: Vec<String>,
    #[serde(default)]
    pub manufacturer_name: Vec<String>,
    #[serde(default)]
    pub route: Vec<String>,
    #[serde(default)]
    pub dosage_form: Vec<String>,
    #[serde(default)]
    pub substance_name: Vec<String>,
    #[serde(default)]
    pub product_ndc: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawDrugLabel {
    #[serde(default)]
    pub openfda: RawOpenFda,
    #[serde(default)]
    pub effective_time: String,
    #[serde(default)]
    pub set_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub purpose: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub boxed_warning: Vec<String>,
    #[serde(default)]
    pub drug_interactions: Vec<String>,
    #[serde(default)]
    pub indications_and_usage: Vec<String>,
    #[serde(default)]
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub dosage_and_administration: Vec<String>,
    #[serde(default)]
    pub adverse_reactions: Vec<String>,
    #[serde(default)]
    pub active_ingredient: Vec<String>,
    #[serde(default)]
    pub inactive_ingredient: Vec<String>,
    #[serde(default)]
    pub pregnancy: Vec<String>,
    #[serde(default)]
    pub overdosage: Vec<String>,
    #[serde(default)]
    pub storage_and_handling: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawAdverseEvent {
    #[serde(rename = "safetyreportid", default, deserialize_with = "lenient_string")]
    pub safety_report_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub serious: Option<String>,
    #[serde(rename = "seriousnessdeath", default, deserialize_with = "lenient_string")]
    pub seriousness_death: Option<String>,
    #[serde(
        rename = "seriousnesshospitalization",
        default,
        deserialize_with = "lenient_string"
    )]
    pub seriousness_hospitalization: Option<String>,
    #[serde(
        rename = "seriousnesslifethreatening",
        default,
        deserialize_with = "lenient_string"
    )]
    pub seriousness_life_threatening: Option<String>,
    #[serde(rename = "seriousnessdisabling", default, deserialize_with = "lenient_string")]
    pub seriousness_disabling: Option<String>,
    #[serde(rename = "occurcountry", default)]
    pub occur_country: Option<String>,
    #[serde(rename = "primarysourcecountry", default)]
    pub primary_source_country: Option<String>,
    #[serde(rename = "receivedate", default)]
    pub receive_date: Option<String>,
    #[serde(default)]
    pub patient: Option<RawPatient>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPatient {
    #[serde(rename = "patientonsetage", default, deserialize_with = "lenient_string")]
    pub age: Option<String>,
    #[serde(rename = "patientonsetageunit", default, deserialize_with = "lenient_string")]
    pub age_unit: Option<String>,
    #[serde(rename = "patientsex", default, deserialize_with = "lenient_string")]
    pub sex: Option<String>,
    #[serde(default)]
    pub drug: Vec<RawPatientDrug>,
    #[serde(default)]
    pub reaction: Vec<RawReaction>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPatientDrug {
    #[serde(rename = "medicinalproduct", default)]
    pub medicinal_product: Option<String>,
    #[serde(rename = "drugindication", default)]
    pub indication: Option<String>,
    #[serde(rename = "drugcharacterization", default, deserialize_with = "lenient_string")]
    pub characterization: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawReaction {
    #[serde(rename = "reactionmeddrapt", default)]
    pub term: Option<String>,
    #[serde(rename = "reactionoutcome", default, deserialize_with = "lenient_string")]
    pub outcome: Option<String>,
}

/// Accept a string, a number or null where openFDA documents a string
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => non_blank(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(if b { "1" } else { "0" }.to_string()),
        _ => None,
    })
}

// ============================================================================
// Normalized records
// ============================================================================

/// One drug label (package insert)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugLabel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_name: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer_name: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage_form: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substance_name: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_ndc: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boxed_warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_interactions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indications_and_usage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contraindications: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage_and_administration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adverse_reactions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_ingredient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive_ingredient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pregnancy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overdosage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_and_handling: Option<String>,

    pub effective_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// One individual case safety report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdverseEventReport {
    pub safety_report_id: String,
    /// "1" when serious; says nothing about which seriousness flags are set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serious: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seriousness_death: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seriousness_hospitalization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seriousness_life_threatening: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seriousness_disabling: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<EventPatient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPatient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    pub drugs: Vec<EventDrug>,
    pub reactions: Vec<EventReaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDrug {
    pub medicinal_product: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indication: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characterization: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventReaction {
    pub term: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

// ============================================================================
// Normalization
// ============================================================================

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == s.len() {
        Some(s)
    } else {
        Some(trimmed.to_string())
    }
}

/// Drop blank entries; an empty list becomes `None`
fn non_empty_list(values: Vec<String>) -> Option<Vec<String>> {
    let kept: Vec<String> = values.into_iter().filter_map(non_blank).collect();
    (!kept.is_empty()).then_some(kept)
}

/// Join the paragraphs of a label section
fn section(paragraphs: Vec<String>) -> Option<String> {
    non_empty_list(paragraphs).map(|p| p.join("\n"))
}

impl From<RawDrugLabel> for DrugLabel {
    fn from(raw: RawDrugLabel) -> Self {
        let openfda = raw.openfda;
        Self {
            brand_name: non_empty_list(openfda.brand_name),
            generic_name: non_empty_list(openfda.generic_name),
            manufacturer_name: non_empty_list(openfda.manufacturer_name),
            route: non_empty_list(openfda.route),
            dosage_form: non_empty_list(openfda.dosage_form),
            substance_name: non_empty_list(openfda.substance_name),
            product_ndc: non_empty_list(openfda.product_ndc),
            purpose: section(raw.purpose),
            warnings: section(raw.warnings),
            boxed_warning: section(raw.boxed_warning),
            drug_interactions: section(raw.drug_interactions),
            indications_and_usage: section(raw.indications_and_usage),
            contraindications: section(raw.contraindications),
            dosage_and_administration: section(raw.dosage_and_administration),
            adverse_reactions: section(raw.adverse_reactions),
            active_ingredient: section(raw.active_ingredient),
            inactive_ingredient: section(raw.inactive_ingredient),
            pregnancy: section(raw.pregnancy),
            overdosage: section(raw.overdosage),
            storage_and_handling: section(raw.storage_and_handling),
            effective_time: raw.effective_time,
            set_id: raw.set_id.and_then(non_blank),
            id: raw.id.and_then(non_blank),
        }
    }
}

impl From<RawPatient> for EventPatient {
    fn from(raw: RawPatient) -> Self {
        Self {
            age: raw.age,
            age_unit: raw.age_unit,
            sex: raw.sex,
            drugs: raw
                .drug
                .into_iter()
                .filter_map(|d| {
                    Some(EventDrug {
                        medicinal_product: d.medicinal_product.and_then(non_blank)?,
                        indication: d.indication.and_then(non_blank),
                        characterization: d.characterization,
                    })
                })
                .collect(),
            reactions: raw
                .reaction
                .into_iter()
                .filter_map(|r| {
                    Some(EventReaction {
                        term: r.term.and_then(non_blank)?,
                        outcome: r.outcome,
                    })
                })
                .collect(),
        }
    }
}

impl AdverseEventReport {
    /// Reports without a safety report id cannot be referenced and are dropped
    pub(crate) fn from_raw(raw: RawAdverseEvent) -> Option<Self> {
        Some(Self {
            safety_report_id: raw.safety_report_id?,
            serious: raw.serious,
            seriousness_death: raw.seriousness_death,
            seriousness_hospitalization: raw.seriousness_hospitalization,
            seriousness_life_threatening: raw.seriousness_life_threatening,
            seriousness_disabling: raw.seriousness_disabling,
            patient: raw.patient.map(EventPatient::from),
            country: raw
                .occur_country
                .or(raw.primary_source_country)
                .and_then(non_blank),
            receive_date: raw.receive_date.and_then(non_blank),
        })
    }
}
