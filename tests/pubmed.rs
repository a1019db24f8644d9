mod common;

use medical_sources::PubMedClient;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::config_for;

const EFETCH_BODY: &str = r#"<?xml version="1.0" ?>
<PubmedArticleSet>
<PubmedArticle>
  <MedlineCitation><PMID Version="1">111</PMID>
    <Article>
      <Journal><JournalIssue><PubDate><Year>2021</Year><Month>Mar</Month></PubDate></JournalIssue><Title>BMJ</Title></Journal>
      <ArticleTitle>Statins in the elderly</ArticleTitle>
      <Abstract><AbstractText>Short abstract.</AbstractText></Abstract>
      <AuthorList><Author><LastName>Ng</LastName><ForeName>Ada</ForeName></Author></AuthorList>
    </Article>
  </MedlineCitation>
</PubmedArticle>
<PubmedArticle>
  <MedlineCitation><PMID Version="1">222</PMID>
    <Article><ArticleTitle>Second article</ArticleTitle></Article>
  </MedlineCitation>
</PubmedArticle>
</PubmedArticleSet>"#;

#[tokio::test]
async fn test_zero_ids_skips_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "esearchresult": {"count": "0", "retmax": "0", "idlist": []}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_BODY))
        .expect(0)
        .mount(&server)
        .await;

    let pubmed = PubMedClient::new(&config_for(&server.uri())).unwrap();
    assert!(pubmed.search_articles("nothing matches this", None).await.is_empty());
}

#[tokio::test]
async fn test_two_phase_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("term", "statins"))
        .and(query_param("retmode", "json"))
        .and(query_param("retmax", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "esearchresult": {"count": "2", "idlist": ["111", "222"]}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", "111,222"))
        .and(query_param("retmode", "xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_BODY))
        .expect(1)
        .mount(&server)
        .await;

    let pubmed = PubMedClient::new(&config_for(&server.uri())).unwrap();
    let articles = pubmed.search_articles("statins", Some(50)).await;

    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].pmid, "111");
    assert_eq!(articles[0].authors, ["Ada Ng"]);
    assert_eq!(articles[0].journal, "BMJ");
    assert_eq!(articles[0].publication_date, "Mar 2021");
    assert_eq!(articles[1].abstract_text, "No abstract available");
    assert_eq!(articles[1].journal, "Unknown Journal");
    assert_eq!(articles[1].publication_date, "Unknown Date");
}

#[tokio::test]
async fn test_guidelines_add_publication_type_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param(
            "term",
            "(asthma) AND (guideline[pt] OR practice guideline[pt])",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "esearchresult": {"idlist": ["111"]}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", "111"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_BODY))
        .mount(&server)
        .await;

    let pubmed = PubMedClient::new(&config_for(&server.uri())).unwrap();
    let articles = pubmed.search_clinical_guidelines("asthma", Some(1)).await;
    assert!(!articles.is_empty());
}

#[tokio::test]
async fn test_fetch_failure_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "esearchresult": {"idlist": ["111"]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let pubmed = PubMedClient::new(&config_for(&server.uri())).unwrap();
    assert!(pubmed.search_articles("statins", None).await.is_empty());
}
