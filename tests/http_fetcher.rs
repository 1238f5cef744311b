use std::time::Duration;

use chrono::NaiveDate;
use mockito::{Matcher, Server};

use arxivharvest::{
    fetch::{Fetch, FetchError, HttpFetcher},
    HarvestConfig,
    HarvestError,
    Harvester
};

fn page(ids: &[&str], token: Option<&str>) -> String {
    let records = ids.iter()
        .map(|id| format!(
            concat!(
                "<record><header><identifier>oai:arXiv.org:{id}</identifier></header>",
                "<metadata><arXiv xmlns=\"http://arxiv.org/OAI/arXiv/\">",
                "<id>{id}</id><created>2018-02-01</created><title>Paper {id}</title>",
                "<categories>quant-ph</categories><abstract> About {id}. </abstract>",
                "</arXiv></metadata></record>"
            ),
            id = id
        ))
        .collect::<String>();
    let token = token
        .map(|t| format!("<resumptionToken>{}</resumptionToken>", t))
        .unwrap_or_default();
    format!(
        "<OAI-PMH xmlns=\"http://www.openarchives.org/OAI/2.0/\"><ListRecords>{}{}</ListRecords></OAI-PMH>",
        records, token
    )
}

fn fetcher() -> HttpFetcher {
    let config = HarvestConfig::default().with_request_timeout(Some(Duration::from_secs(10)));
    HttpFetcher::new(&config).unwrap()
}

#[test]
fn test_service_unavailable_maps_retry_after() {
    let mut server = Server::new();
    let mock = server.mock("GET", "/oai2")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_header("retry-after", "5")
        .create();

    let result = fetcher().get(&format!("{}/oai2?verb=ListRecords", server.url()));
    match result {
        Err(FetchError::RateLimited { retry_after }) => {
            assert_eq!(retry_after, Some(Duration::from_secs(5)));
        }
        other => panic!("expected rate limiting, got {:?}", other),
    }
    mock.assert();
}

#[test]
fn test_service_unavailable_without_header() {
    let mut server = Server::new();
    server.mock("GET", "/oai2")
        .match_query(Matcher::Any)
        .with_status(503)
        .create();

    let result = fetcher().get(&format!("{}/oai2?verb=ListRecords", server.url()));
    assert!(matches!(result, Err(FetchError::RateLimited { retry_after: None })));
}

#[test]
fn test_server_error_maps_to_status() {
    let mut server = Server::new();
    server.mock("GET", "/oai2")
        .match_query(Matcher::Any)
        .with_status(500)
        .create();

    let result = fetcher().get(&format!("{}/oai2?verb=ListRecords", server.url()));
    assert!(matches!(result, Err(FetchError::Status(500))));
}

#[test]
fn test_two_page_harvest() {
    let mut server = Server::new();
    let first = server.mock("GET", "/oai2")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("verb".into(), "ListRecords".into()),
            Matcher::UrlEncoded("from".into(), "2018-01-01".into()),
            Matcher::UrlEncoded("until".into(), "2018-06-01".into()),
            Matcher::UrlEncoded("metadataPrefix".into(), "arXiv".into()),
            Matcher::UrlEncoded("set".into(), "physics:quant-ph".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(page(&["1802.00001", "1802.00002"], Some("5531|1001")))
        .expect(1)
        .create();
    let second = server.mock("GET", "/oai2")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("verb".into(), "ListRecords".into()),
            Matcher::UrlEncoded("resumptionToken".into(), "5531|1001".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(page(&["1802.00003"], None))
        .expect(1)
        .create();

    let config = HarvestConfig::default().with_base_url(&format!("{}/oai2", server.url()));
    let harvester = Harvester::from_config(config).unwrap();
    let table = harvester
        .harvest(
            NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2018, 6, 1).unwrap()
        )
        .unwrap();

    first.assert();
    second.assert();
    let ids = table.iter().map(|r| r.arxiv_id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["1802.00001", "1802.00002", "1802.00003"]);
    assert_eq!(table.rows()[0].abstract_text, "About 1802.00001.");
    assert_eq!(table.rows()[0].doi, None);
}

#[test]
fn test_harvest_aborts_on_server_error() {
    let mut server = Server::new();
    server.mock("GET", "/oai2")
        .match_query(Matcher::Any)
        .with_status(500)
        .expect(1)
        .create();

    let config = HarvestConfig::default().with_base_url(&format!("{}/oai2", server.url()));
    let result = Harvester::from_config(config)
        .unwrap()
        .harvest(
            NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2018, 1, 2).unwrap()
        );
    assert!(matches!(result, Err(HarvestError::HttpStatus { status: 500, .. })));
}
