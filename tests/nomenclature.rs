mod common;

use medical_sources::RxNormClient;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::config_for;

#[tokio::test]
async fn test_aspirin_concepts_have_ids_and_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drugs.json"))
        .and(query_param("name", "aspirin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "drugGroup": {
                "name": null,
                "conceptGroup": [
                    {"tty": "BPCK"},
                    {"tty": "SBD", "conceptProperties": [
                        {"rxcui": "211874", "name": "aspirin 81 MG Chewable Tablet [Bayer Aspirin]",
                         "synonym": "Bayer Aspirin 81 MG Chewable Tablet", "tty": "SBD",
                         "language": "ENG", "suppress": "N", "umlscui": ""}
                    ]},
                    {"tty": "SCD", "conceptProperties": [
                        {"rxcui": "243670", "name": "aspirin 81 MG Oral Tablet",
                         "synonym": "", "tty": "SCD", "language": "ENG", "suppress": "N", "umlscui": ""}
                    ]}
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let rxnorm = RxNormClient::new(&config_for(&server.uri())).unwrap();
    let concepts = rxnorm.search_drug_nomenclature("aspirin").await;

    assert!(!concepts.is_empty());
    assert!(
        concepts
            .iter()
            .all(|c| !c.rxcui.is_empty() && !c.name.is_empty())
    );
    assert_eq!(concepts[0].term_type.as_deref(), Some("SBD"));
    assert_eq!(concepts[1].synonym, None);
}

#[tokio::test]
async fn test_server_error_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drugs.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let rxnorm = RxNormClient::new(&config_for(&server.uri())).unwrap();
    assert!(rxnorm.search_drug_nomenclature("aspirin").await.is_empty());
}
