mod common;

use std::sync::Arc;
use std::time::Duration;

use medical_sources::{DrugSearchField, FdaClient};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{RecordingSleeper, config_for};

fn client(server: &MockServer, sleeper: Arc<RecordingSleeper>) -> FdaClient {
    FdaClient::with_sleeper(&config_for(&server.uri()), sleeper).unwrap()
}

#[tokio::test]
async fn test_not_found_is_attempted_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drug/label.json"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "NOT_FOUND", "message": "No matches found!"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let error = client(&server, sleeper.clone())
        .search_drug_labels("zzznotadrug", Some(DrugSearchField::BrandName), None)
        .await
        .unwrap_err();

    assert!(error.is_no_match());
    assert_eq!(error.attempts, 1);
    assert_eq!(error.query, "zzznotadrug");
    assert_eq!(error.field, Some(DrugSearchField::BrandName));
    assert_eq!(error.search, "openfda.brand_name:\"zzznotadrug\"");
    assert!(error.url.ends_with("/drug/label.json"));
    assert!(sleeper.recorded().is_empty());
}

#[tokio::test]
async fn test_server_errors_are_retried_until_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drug/label.json"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let error = client(&server, sleeper.clone())
        .search_drug_labels("ibuprofen", None, Some(5))
        .await
        .unwrap_err();

    assert_eq!(error.attempts, 3);
    assert_eq!(error.status(), Some(503));
    assert!(!error.is_no_match());
    assert_eq!(
        sleeper.recorded(),
        vec![Duration::from_millis(10), Duration::from_millis(20)]
    );
}

#[tokio::test]
async fn test_rate_limit_then_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drug/label.json"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/drug/label.json"))
        .and(query_param("search", "openfda.generic_name:\"ibuprofen\""))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"results": {"skip": 0, "limit": 100, "total": 1}},
            "results": [{
                "effective_time": "20231212",
                "set_id": "abc-123",
                "openfda": {
                    "brand_name": ["Advil"],
                    "generic_name": ["IBUPROFEN"],
                    "manufacturer_name": [],
                    "route": ["ORAL"]
                },
                "purpose": ["Pain reliever/fever reducer"]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let labels = client(&server, sleeper.clone())
        .search_drug_labels("ibuprofen", Some(DrugSearchField::GenericName), Some(500))
        .await
        .unwrap();

    assert_eq!(labels.len(), 1);
    let label = &labels[0];
    assert_eq!(label.brand_name.as_deref(), Some(&["Advil".to_string()][..]));
    assert_eq!(label.manufacturer_name, None);
    assert_eq!(label.purpose.as_deref(), Some("Pain reliever/fever reducer"));
    assert_eq!(label.set_id.as_deref(), Some("abc-123"));
    assert_eq!(sleeper.recorded(), vec![Duration::from_millis(10)]);
}

#[tokio::test]
async fn test_adverse_events_swallow_errors_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drug/event.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let reports = client(&server, sleeper)
        .search_adverse_events("aspirin", None)
        .await;

    assert!(reports.is_empty());
}

#[tokio::test]
async fn test_adverse_events_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drug/event.json"))
        .and(query_param("search", "patient.drug.medicinalproduct:\"aspirin\""))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "safetyreportid": "5801206-7",
                    "serious": "1",
                    "seriousnessdeath": "1",
                    "occurcountry": "GB",
                    "receivedate": "20080707",
                    "patient": {
                        "patientsex": "1",
                        "drug": [{"medicinalproduct": "ASPIRIN", "drugindication": "PROPHYLAXIS"}],
                        "reaction": [{"reactionmeddrapt": "Gastrointestinal haemorrhage", "reactionoutcome": "5"}]
                    }
                },
                {"serious": "2"}
            ]
        })))
        .mount(&server)
        .await;

    let reports = client(&server, Arc::new(RecordingSleeper::default()))
        .search_adverse_events("aspirin", Some(2))
        .await;

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.safety_report_id, "5801206-7");
    assert_eq!(report.seriousness_death.as_deref(), Some("1"));
    assert_eq!(report.seriousness_hospitalization, None);
    assert_eq!(report.country.as_deref(), Some("GB"));
    let patient = report.patient.as_ref().unwrap();
    assert_eq!(patient.drugs[0].indication.as_deref(), Some("PROPHYLAXIS"));
    assert_eq!(patient.reactions[0].outcome.as_deref(), Some("5"));
}

#[tokio::test]
async fn test_ndc_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drug/label.json"))
        .and(query_param("search", "openfda.product_ndc:\"0573-0164\""))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"effective_time": "20220101", "openfda": {"product_ndc": ["0573-0164"]}}]
        })))
        .mount(&server)
        .await;

    let fda = client(&server, Arc::new(RecordingSleeper::default()));
    let label = fda.get_drug_by_ndc("0573-0164").await.unwrap();
    assert_eq!(label.product_ndc, Some(vec!["0573-0164".to_string()]));

    assert!(fda.get_drug_by_ndc("9999-9999").await.is_none());
}
