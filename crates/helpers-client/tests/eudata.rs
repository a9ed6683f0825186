//! data.europa.eu adapter against local mocks of the SPARQL endpoint, the
//! REST hub and a file host, with a real on-disk cache.

mod common;

use common::MockServer;
use helpers_client::eudata::DatasetQuery;
use helpers_client::EuDataClient;
use helpers_core::cache::ResponseCache;
use helpers_core::config::{CacheConfig, OpenDataConfig};
use helpers_core::error::AppError;
use helpers_core::models::{ContentBody, MetadataSource};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

const SPARQL: &str = "/sparql";
const REST: &str = "/api/hub/repo/datasets/";
const UUID: &str = "0a1b2c3d-4e5f-6789-abcd-ef0123456789";

struct Fixture {
    server: MockServer,
    cache_dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            server: MockServer::start(),
            cache_dir: TempDir::new().unwrap(),
        }
    }

    fn config(&self) -> OpenDataConfig {
        OpenDataConfig {
            sparql_endpoint: self.server.url(SPARQL),
            rest_api_base: self.server.url(REST),
            ..OpenDataConfig::default()
        }
    }

    fn client_with_ttl(&self, ttl: Duration) -> EuDataClient {
        let cache = CacheConfig {
            enabled: true,
            dir: self.cache_dir.path().join("cache"),
            ttl,
        };
        EuDataClient::with_cache_config(self.config(), &cache).unwrap()
    }

    fn client(&self) -> EuDataClient {
        self.client_with_ttl(Duration::from_secs(3600))
    }

    fn cache_files(&self) -> usize {
        count_json_files(&self.cache_dir.path().join("cache"))
    }
}

fn count_json_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
                .count()
        })
        .unwrap_or(0)
}

fn uri(value: &str) -> Value {
    json!({"type": "uri", "value": value})
}

fn lit(value: &str) -> Value {
    json!({"type": "literal", "value": value})
}

fn search_response(datasets: usize) -> Value {
    let mut rows = Vec::new();
    for i in 0..datasets {
        let dataset = format!("http://data.europa.eu/88u/dataset/air-{}", i);
        rows.push(json!({
            "dataset": uri(&dataset),
            "title": lit(&format!("Air quality {}", i)),
            "keywords": lit("air quality|no2"),
            "publisher": lit("European Environment Agency"),
            "modified": lit(&format!("2024-01-{:02}", 28 - i)),
            "dist": uri(&format!("{}/csv", dataset)),
            "format": lit("http://publications.europa.eu/resource/authority/file-type/CSV"),
            "downloadURL": uri(&format!("https://files.example/air-{}.csv", i))
        }));
        rows.push(json!({
            "dataset": uri(&dataset),
            "title": lit(&format!("Air quality {}", i)),
            "dist": uri(&format!("{}/json", dataset)),
            "mediaType": lit("application/json"),
            "accessURL": uri(&format!("https://files.example/air-{}.json", i))
        }));
    }
    json!({"head": {"vars": []}, "results": {"bindings": rows}})
}

fn dataset_uri() -> String {
    format!("http://data.europa.eu/88u/dataset/{}", UUID)
}

fn rest_path() -> String {
    format!("{}{}.jsonld", REST, UUID)
}

fn jsonld_document(download_url: &str) -> Value {
    json!({
        "@graph": [
            {"@id": dataset_uri(), "@type": "dcat:Dataset",
             "dct:title": {"@value": "Air quality e-reporting", "@language": "en"},
             "dct:publisher": "European Environment Agency",
             "dcat:keyword": ["air", "no2"],
             "dcat:distribution": ["http://ex/dist/1"]},
            {"@id": "http://ex/dist/1", "@type": "dcat:Distribution",
             "dcat:downloadURL": {"@id": download_url},
             "dct:format": "CSV"}
        ]
    })
}

fn with_modified(mut document: Value, modified: &str) -> Value {
    document["@graph"][0]["dct:modified"] = json!(modified);
    document
}

/// Serves both fallback sub-queries: the property rows have no distribution
/// and the distribution rows have no property.
fn sparql_metadata_response() -> Value {
    json!({"results": {"bindings": [
        {"prop": uri("http://purl.org/dc/terms/title"), "value": lit("Noise maps")},
        {"prop": uri("http://www.w3.org/ns/dcat#keyword"), "value": lit("noise")},
        {"dist": uri("http://ex/noise/dist"), "downloadURL": uri("https://files.example/noise.csv"), "format": lit("CSV")}
    ]}})
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_cold_search_is_one_call_and_one_write_then_warm_is_zero() {
    let fx = Fixture::new();
    fx.server.json(SPARQL, 200, search_response(5));
    let client = fx.client();

    let cold = client.search_datasets("air quality", 5).await.unwrap();
    assert_eq!(cold.len(), 5);
    assert_eq!(fx.server.hits(SPARQL), 1);
    assert_eq!(fx.cache_files(), 1);

    let warm = client.search_datasets("air quality", 5).await.unwrap();
    assert_eq!(fx.server.hits(SPARQL), 1);
    assert_eq!(warm, cold);

    // Normalized keyword hits the same entry.
    client.search_datasets("  AIR Quality ", 5).await.unwrap();
    assert_eq!(fx.server.hits(SPARQL), 1);
}

#[tokio::test]
async fn test_search_request_and_normalization() {
    let fx = Fixture::new();
    fx.server.json(SPARQL, 200, search_response(2));

    let results = fx.client().search_datasets("air quality", 2).await.unwrap();

    let request = fx.server.last_request(SPARQL).unwrap();
    assert_eq!(request.header("accept"), Some("application/sparql-results+json"));
    let query = request.query_param("query").unwrap();
    assert!(query.contains("FILTER REGEX(STR(?kw), \"air quality\", \"i\")"));
    assert!(query.contains("LIMIT 2"));

    let first = &results[0];
    assert_eq!(first.uri, "http://data.europa.eu/88u/dataset/air-0");
    assert_eq!(first.keywords, vec!["air quality", "no2"]);
    assert_eq!(first.distributions.len(), 2);
    let download = first.download.as_ref().unwrap();
    assert_eq!(download.url, "https://files.example/air-0.csv");
}

#[tokio::test]
async fn test_search_truncates_to_limit_in_catalog_order() {
    let fx = Fixture::new();
    fx.server.json(SPARQL, 200, search_response(8));

    let results = fx.client().search_datasets("air", 5).await.unwrap();

    let uris: Vec<&str> = results.iter().map(|r| r.uri.as_str()).collect();
    assert_eq!(
        uris,
        (0..5)
            .map(|i| format!("http://data.europa.eu/88u/dataset/air-{}", i))
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_expired_entry_falls_through_to_network() {
    let fx = Fixture::new();
    fx.server.json(SPARQL, 200, search_response(1));
    let client = fx.client_with_ttl(Duration::ZERO);

    client.search_datasets("air", 1).await.unwrap();
    client.search_datasets("air", 1).await.unwrap();

    assert_eq!(fx.server.hits(SPARQL), 2);
    assert_eq!(fx.cache_files(), 1);
}

#[tokio::test]
async fn test_fresh_search_skips_lookup_but_stores() {
    let fx = Fixture::new();
    fx.server.json(SPARQL, 200, search_response(1));
    let client = fx.client();
    let query = DatasetQuery::keyword("air").limit(1);

    client.search(&query).await.unwrap();
    client.search_fresh(&query).await.unwrap();
    assert_eq!(fx.server.hits(SPARQL), 2);

    client.search(&query).await.unwrap();
    assert_eq!(fx.server.hits(SPARQL), 2);
    assert_eq!(fx.cache_files(), 1);
}

#[tokio::test]
async fn test_different_arguments_use_different_entries() {
    let fx = Fixture::new();
    fx.server.json(SPARQL, 200, search_response(3));
    let client = fx.client();

    client.search_datasets("air", 3).await.unwrap();
    client.search_datasets("air", 2).await.unwrap();
    client.search_datasets("water", 3).await.unwrap();

    assert_eq!(fx.server.hits(SPARQL), 3);
    assert_eq!(fx.cache_files(), 3);
}

#[tokio::test]
async fn test_separators_in_keyword_do_not_share_an_entry() {
    let fx = Fixture::new();
    fx.server.json(SPARQL, 200, search_response(1));
    let client = fx.client();

    let smuggled = DatasetQuery::keyword("x&language=en").limit(1);
    let separate = DatasetQuery::keyword("x").language("en").limit(1);
    let question = DatasetQuery::keyword("x?language=en").limit(1);
    client.search(&smuggled).await.unwrap();
    client.search(&separate).await.unwrap();
    client.search(&question).await.unwrap();

    assert_eq!(fx.server.hits(SPARQL), 3);
    assert_eq!(fx.cache_files(), 3);
}

#[tokio::test]
async fn test_cache_write_failure_is_not_fatal() {
    let fx = Fixture::new();
    fx.server.json(SPARQL, 200, search_response(2));
    let client = fx.client();
    std::fs::remove_dir_all(fx.cache_dir.path().join("cache")).unwrap();

    let results = client.search_datasets("air", 2).await.unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn test_disabled_cache_always_fetches() {
    let fx = Fixture::new();
    fx.server.json(SPARQL, 200, search_response(1));
    let client = EuDataClient::new(fx.config(), ResponseCache::disabled()).unwrap();

    client.search_datasets("air", 1).await.unwrap();
    client.search_datasets("air", 1).await.unwrap();
    assert_eq!(fx.server.hits(SPARQL), 2);
}

#[tokio::test]
async fn test_invalid_search_arguments_make_no_calls() {
    let fx = Fixture::new();
    let client = fx.client();

    for (keyword, limit) in [("", 5), ("   ", 5), ("air", 0), ("air", 1001)] {
        let err = client.search_datasets(keyword, limit).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)), "{:?}", (keyword, limit));
    }
    assert_eq!(fx.server.total_hits(), 0);
}

#[tokio::test]
async fn test_search_upstream_error_is_not_cached() {
    let fx = Fixture::new();
    fx.server.json(SPARQL, 503, json!({"error": "maintenance"}));
    let client = fx.client();

    let err = client.search_datasets("air", 5).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(fx.cache_files(), 0);
}

// =============================================================================
// Metadata
// =============================================================================

#[tokio::test]
async fn test_metadata_from_rest_then_cached() {
    let fx = Fixture::new();
    fx.server.json(&rest_path(), 200, jsonld_document("https://files.example/air.csv"));
    let client = fx.client();

    let meta = client.get_dataset_metadata(&dataset_uri()).await.unwrap();
    assert_eq!(meta.source, MetadataSource::Rest);
    assert_eq!(meta.title.as_deref(), Some("Air quality e-reporting"));
    assert_eq!(meta.keywords, vec!["air", "no2"]);
    assert_eq!(meta.distributions.len(), 1);

    let request = fx.server.last_request(&rest_path()).unwrap();
    assert_eq!(request.query_param("useNormalizedId").as_deref(), Some("true"));
    assert_eq!(request.query_param("locale").as_deref(), Some("en"));
    assert!(request.header("accept").unwrap().contains("application/ld+json"));

    let again = client.get_dataset_metadata(&dataset_uri()).await.unwrap();
    assert_eq!(again, meta);
    assert_eq!(fx.server.hits(&rest_path()), 1);
    assert_eq!(fx.server.hits(SPARQL), 0);
}

#[tokio::test]
async fn test_metadata_falls_back_to_sparql_on_404() {
    let fx = Fixture::new();
    fx.server.json(SPARQL, 200, sparql_metadata_response());
    let client = fx.client();

    let meta = client.get_dataset_metadata(&dataset_uri()).await.unwrap();

    assert_eq!(meta.source, MetadataSource::Sparql);
    assert_eq!(meta.title.as_deref(), Some("Noise maps"));
    assert_eq!(meta.keywords, vec!["noise"]);
    assert_eq!(meta.distributions.len(), 1);
    assert_eq!(fx.server.hits(&rest_path()), 1);
    assert_eq!(fx.server.hits(SPARQL), 2);

    let again = client.get_dataset_metadata(&dataset_uri()).await.unwrap();
    assert_eq!(again, meta);
    assert_eq!(fx.server.hits(SPARQL), 2);
}

#[tokio::test]
async fn test_metadata_without_uuid_goes_straight_to_sparql() {
    let fx = Fixture::new();
    fx.server.json(SPARQL, 200, sparql_metadata_response());

    let meta = fx
        .client()
        .get_dataset_metadata("http://data.europa.eu/88u/dataset/noise-maps")
        .await
        .unwrap();

    assert_eq!(meta.source, MetadataSource::Sparql);
    assert_eq!(fx.server.hits(SPARQL), 2);
    let rest_hits: usize = fx
        .server
        .requests()
        .iter()
        .filter(|r| r.path.starts_with(REST))
        .count();
    assert_eq!(rest_hits, 0);
}

#[tokio::test]
async fn test_metadata_document_without_dataset_node_falls_back() {
    let fx = Fixture::new();
    fx.server.json(&rest_path(), 200, json!({"@graph": [{"@id": "x", "@type": "foaf:Agent"}]}));
    fx.server.json(SPARQL, 200, sparql_metadata_response());

    let meta = fx.client().get_dataset_metadata(&dataset_uri()).await.unwrap();
    assert_eq!(meta.source, MetadataSource::Sparql);
}

#[tokio::test]
async fn test_metadata_rest_server_error_propagates() {
    let fx = Fixture::new();
    fx.server.json(&rest_path(), 500, json!({"error": "boom"}));

    let err = fx.client().get_dataset_metadata(&dataset_uri()).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(fx.server.hits(SPARQL), 0);
    assert_eq!(fx.cache_files(), 0);
}

#[tokio::test]
async fn test_metadata_unknown_everywhere_is_not_found() {
    let fx = Fixture::new();
    fx.server.json(SPARQL, 200, json!({"results": {"bindings": []}}));

    let err = fx.client().get_dataset_metadata(&dataset_uri()).await.unwrap_err();
    assert!(matches!(err, AppError::DatasetNotFound(_)));
    assert_eq!(fx.cache_files(), 0);
}

#[tokio::test]
async fn test_metadata_rejects_unsafe_uri() {
    let fx = Fixture::new();
    let client = fx.client();

    for bad in ["", "not a uri", "ftp://example.org/x", "http://example.org/a>b"] {
        let err = client.get_dataset_metadata(bad).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)), "{}", bad);
    }
    assert_eq!(fx.server.total_hits(), 0);
}

#[tokio::test]
async fn test_fresh_metadata_refetches() {
    let fx = Fixture::new();
    fx.server.json(&rest_path(), 200, jsonld_document("https://files.example/air.csv"));
    let client = fx.client();

    client.get_dataset_metadata(&dataset_uri()).await.unwrap();
    client.get_dataset_metadata_fresh(&dataset_uri()).await.unwrap();
    assert_eq!(fx.server.hits(&rest_path()), 2);
}

#[tokio::test]
async fn test_distribution_formats() {
    let fx = Fixture::new();
    fx.server.json(&rest_path(), 200, jsonld_document("https://files.example/air.csv"));

    let dists = fx.client().get_distribution_formats(&dataset_uri()).await.unwrap();
    assert_eq!(dists.len(), 1);
    assert_eq!(dists[0].format.as_deref(), Some("CSV"));
}

#[tokio::test]
async fn test_clear_cache_for_one_dataset() {
    let fx = Fixture::new();
    fx.server.json(&rest_path(), 200, jsonld_document("https://files.example/air.csv"));
    fx.server.json(SPARQL, 200, search_response(1));
    let client = fx.client();

    client.get_dataset_metadata(&dataset_uri()).await.unwrap();
    client.search_datasets("air", 1).await.unwrap();
    assert_eq!(fx.cache_files(), 2);

    assert_eq!(client.clear_cache(Some(&dataset_uri())).unwrap(), 1);
    assert_eq!(fx.cache_files(), 1);
    client.get_dataset_metadata(&dataset_uri()).await.unwrap();
    assert_eq!(fx.server.hits(&rest_path()), 2);

    assert_eq!(client.clear_cache(None).unwrap(), 2);
    assert_eq!(fx.cache_files(), 0);
}

// =============================================================================
// Content
// =============================================================================

#[tokio::test]
async fn test_text_content_download() {
    let fx = Fixture::new();
    let file_url = fx.server.url("/files/air.csv");
    fx.server.json(&rest_path(), 200, jsonld_document(&file_url));
    fx.server.respond("/files/air.csv", 200, "text/csv; charset=utf-8", "station,no2\nA,12\n");

    let content = fx.client().get_dataset_content(&dataset_uri(), &[]).await.unwrap();

    assert_eq!(content.source_url, file_url);
    assert_eq!(content.format, "CSV");
    assert_eq!(content.content_type, "text/csv; charset=utf-8");
    assert_eq!(content.body, ContentBody::Text("station,no2\nA,12\n".to_string()));

    // One metadata entry and one content entry.
    assert_eq!(fx.cache_files(), 2);
}

#[tokio::test]
async fn test_warm_download_skips_file_host() {
    let fx = Fixture::new();
    let file_url = fx.server.url("/files/air.csv");
    fx.server.json(&rest_path(), 200, jsonld_document(&file_url));
    fx.server.respond("/files/air.csv", 200, "text/csv", "station,no2\nA,12\n");
    let client = fx.client();

    let cold = client.get_dataset_content(&dataset_uri(), &[]).await.unwrap();
    let warm = client.get_dataset_content(&dataset_uri(), &[]).await.unwrap();

    assert_eq!(warm, cold);
    assert_eq!(fx.server.hits("/files/air.csv"), 1);
    assert_eq!(fx.server.hits(&rest_path()), 1);
}

#[tokio::test]
async fn test_changed_modified_date_refetches_content() {
    let fx = Fixture::new();
    let file_url = fx.server.url("/files/air.csv");
    let document = jsonld_document(&file_url);
    fx.server.json(&rest_path(), 200, with_modified(document.clone(), "2024-01-01"));
    fx.server.respond("/files/air.csv", 200, "text/csv", "station,no2\nA,12\n");
    let client = fx.client();

    client.get_dataset_content(&dataset_uri(), &[]).await.unwrap();
    assert_eq!(fx.server.hits("/files/air.csv"), 1);

    fx.server.json(&rest_path(), 200, with_modified(document, "2024-02-01"));
    fx.server.respond("/files/air.csv", 200, "text/csv", "station,no2\nA,15\n");
    let meta = client.get_dataset_metadata_fresh(&dataset_uri()).await.unwrap();
    assert_eq!(meta.modified.as_deref(), Some("2024-02-01"));

    let content = client.get_dataset_content(&dataset_uri(), &[]).await.unwrap();
    assert_eq!(content.body, ContentBody::Text("station,no2\nA,15\n".to_string()));
    assert_eq!(fx.server.hits("/files/air.csv"), 2);

    client.get_dataset_content(&dataset_uri(), &[]).await.unwrap();
    assert_eq!(fx.server.hits("/files/air.csv"), 2);
}

#[tokio::test]
async fn test_expired_content_is_downloaded_again() {
    let fx = Fixture::new();
    let file_url = fx.server.url("/files/air.csv");
    fx.server.json(&rest_path(), 200, jsonld_document(&file_url));
    fx.server.respond("/files/air.csv", 200, "text/csv", "a\n");
    let client = fx.client_with_ttl(Duration::ZERO);

    client.get_dataset_content(&dataset_uri(), &[]).await.unwrap();
    client.get_dataset_content(&dataset_uri(), &[]).await.unwrap();
    assert_eq!(fx.server.hits("/files/air.csv"), 2);
}

#[tokio::test]
async fn test_fresh_download_skips_cached_content() {
    let fx = Fixture::new();
    let file_url = fx.server.url("/files/air.csv");
    fx.server.json(&rest_path(), 200, jsonld_document(&file_url));
    fx.server.respond("/files/air.csv", 200, "text/csv", "a\n");
    let client = fx.client();

    client.get_dataset_content(&dataset_uri(), &[]).await.unwrap();
    client.get_dataset_content_fresh(&dataset_uri(), &[]).await.unwrap();
    assert_eq!(fx.server.hits("/files/air.csv"), 2);
    assert_eq!(fx.server.hits(&rest_path()), 2);
}

#[tokio::test]
async fn test_clear_cache_for_one_dataset_removes_its_downloads() {
    let fx = Fixture::new();
    let file_url = fx.server.url("/files/air.csv");
    fx.server.json(&rest_path(), 200, jsonld_document(&file_url));
    fx.server.respond("/files/air.csv", 200, "text/csv", "a\n");
    let client = fx.client();

    client.get_dataset_content(&dataset_uri(), &[]).await.unwrap();
    assert_eq!(fx.cache_files(), 2);

    assert_eq!(client.clear_cache(Some(&dataset_uri())).unwrap(), 2);
    assert_eq!(fx.cache_files(), 0);
}

#[tokio::test]
async fn test_binary_content_download() {
    let fx = Fixture::new();
    let file_url = fx.server.url("/files/air.zip");
    fx.server.json(&rest_path(), 200, jsonld_document(&file_url));
    fx.server.respond("/files/air.zip", 200, "application/zip", "PK\u{3}\u{4}");

    let content = fx
        .client()
        .get_dataset_content(&dataset_uri(), &["ZIP".to_string()])
        .await
        .unwrap();

    assert_eq!(content.body, ContentBody::Binary(b"PK\x03\x04".to_vec()));
}

#[tokio::test]
async fn test_cached_binary_content_keeps_bytes() {
    let fx = Fixture::new();
    let file_url = fx.server.url("/files/air.zip");
    fx.server.json(&rest_path(), 200, jsonld_document(&file_url));
    fx.server.respond("/files/air.zip", 200, "application/zip", "PK\u{3}\u{4}");
    let client = fx.client();
    let zip = ["ZIP".to_string()];

    client.get_dataset_content(&dataset_uri(), &zip).await.unwrap();
    let cached = client.get_dataset_content(&dataset_uri(), &zip).await.unwrap();

    assert_eq!(cached.body, ContentBody::Binary(b"PK\x03\x04".to_vec()));
    assert_eq!(cached.content_type, "application/zip");
    assert_eq!(fx.server.hits("/files/air.zip"), 1);
}

#[tokio::test]
async fn test_content_without_distribution() {
    let fx = Fixture::new();
    fx.server.json(
        &rest_path(),
        200,
        json!({"@graph": [{"@id": dataset_uri(), "@type": "dcat:Dataset", "dct:title": "Empty"}]}),
    );

    let err = fx.client().get_dataset_content(&dataset_uri(), &[]).await.unwrap_err();
    assert!(matches!(err, AppError::NoDistribution(_)));
}

#[tokio::test]
async fn test_content_download_error_keeps_status() {
    let fx = Fixture::new();
    let file_url = fx.server.url("/files/gone.csv");
    fx.server.json(&rest_path(), 200, jsonld_document(&file_url));

    let err = fx.client().get_dataset_content(&dataset_uri(), &[]).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}
