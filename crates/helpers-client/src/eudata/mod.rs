//! data.europa.eu open-data adapter.
//!
//! Dataset search goes to the SPARQL endpoint. Metadata comes from the REST
//! hub's JSON-LD documents, with a SPARQL fallback when the dataset has no
//! UUID-style URI or the hub does not know it. Raw responses are kept in a
//! [`ResponseCache`] and reshaped by the same normalizers on every call, so a
//! cache hit returns exactly what a live call would.

mod jsonld;
mod sparql;

pub use sparql::{escape_literal, escape_regex, validate_iri};

use crate::http::{build_client, ensure_success, map_send_error, read_json};
use base64::{engine::general_purpose, Engine as _};
use chrono::NaiveDate;
use helpers_core::cache::{CacheKey, ResponseCache};
use helpers_core::config::{CacheConfig, HttpConfig, OpenDataConfig};
use helpers_core::error::AppError;
use helpers_core::formats::select_distribution;
use helpers_core::models::{
    ContentBody, DatasetContent, DatasetMetadata, DatasetSummary, Distribution,
};
use helpers_core::tool::{ToolDescriptor, ToolInput, ToolValueType};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// Largest page a single search may request.
pub const MAX_SEARCH_LIMIT: u32 = 1000;

const SPARQL_ACCEPT: &str = "application/sparql-results+json";
const JSONLD_ACCEPT: &str = "application/ld+json, application/json, */*";

/// Content-type fragments that mark a download as text.
const TEXT_CONTENT_TYPES: [&str; 10] = [
    "text",
    "json",
    "xml",
    "csv",
    "html",
    "rdf",
    "turtle",
    "n3",
    "sparql-results",
    "ld+json",
];

const SEARCH_OPERATION: &str = "search_datasets";
const METADATA_OPERATION: &str = "dataset_metadata";
const CONTENT_OPERATION: &str = "dataset_content";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    /// Latest `dct:modified` first (or last, ascending).
    #[default]
    Date,
    Title,
    /// Catalog order.
    None,
}

impl SortBy {
    /// Cache-key form.
    fn as_str(self) -> &'static str {
        match self {
            SortBy::Date => "date",
            SortBy::Title => "title",
            SortBy::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// A catalog search.
///
/// # Examples
///
/// ```
/// use helpers_client::eudata::{DatasetQuery, SortBy};
///
/// let query = DatasetQuery::keyword("air quality").limit(5).sort_by(SortBy::Title);
/// assert_eq!(query.limit, 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetQuery {
    pub keyword: Option<String>,
    pub publisher: Option<String>,
    /// Theme IRI, or a fragment of one (e.g. `ENVI`).
    pub topic: Option<String>,
    /// ISO 639-1 code.
    pub language: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub limit: u32,
    pub offset: u32,
    /// Formats used to pick each summary's download; the client default when unset.
    pub preferred_formats: Option<Vec<String>>,
}

impl Default for DatasetQuery {
    fn default() -> Self {
        Self {
            keyword: None,
            publisher: None,
            topic: None,
            language: None,
            date_from: None,
            date_to: None,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            limit: 10,
            offset: 0,
            preferred_formats: None,
        }
    }
}

impl DatasetQuery {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Self::default()
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Parses `YYYY-MM-DD` bounds.
    pub fn date_range(mut self, from: Option<&str>, to: Option<&str>) -> Result<Self, AppError> {
        self.date_from = from.map(parse_date).transpose()?;
        self.date_to = to.map(parse_date).transpose()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.limit == 0 || self.limit > MAX_SEARCH_LIMIT {
            return Err(AppError::ConfigError(format!(
                "limit must be between 1 and {}, got {}",
                MAX_SEARCH_LIMIT, self.limit
            )));
        }
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(AppError::ConfigError(format!(
                    "date_from {} is after date_to {}",
                    from, to
                )));
            }
        }
        Ok(())
    }

    /// Cache identity: the normalized filters. Preferred formats only affect
    /// post-processing, so they are not part of it.
    fn cache_key(&self) -> CacheKey {
        let trimmed = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        CacheKey::new(SEARCH_OPERATION)
            .arg_opt("keyword", trimmed(&self.keyword).map(|k| k.to_lowercase()))
            .arg_opt("publisher", trimmed(&self.publisher))
            .arg_opt("topic", trimmed(&self.topic))
            .arg_opt("language", trimmed(&self.language).map(|l| l.to_lowercase()))
            .arg_opt("date_from", self.date_from)
            .arg_opt("date_to", self.date_to)
            .arg("sort_by", self.sort_by.as_str())
            .arg("sort_order", self.sort_order.as_str())
            .arg("limit", self.limit)
            .arg("offset", self.offset)
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::ConfigError(format!("dates must be YYYY-MM-DD, got '{}'", raw)))
}

/// Client for the data.europa.eu catalog.
///
/// # Examples
///
/// ```no_run
/// use helpers_client::EuDataClient;
/// use helpers_core::config::{CacheConfig, OpenDataConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = EuDataClient::with_cache_config(OpenDataConfig::default(), &CacheConfig::default())?;
/// for dataset in client.search_datasets("air quality", 5).await? {
///     println!("{} {:?}", dataset.uri, dataset.title);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct EuDataClient {
    client: Client,
    sparql_endpoint: Url,
    config: OpenDataConfig,
    cache: ResponseCache,
}

impl EuDataClient {
    /// Creates a client that reads and writes `cache`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidUrl` if an endpoint is malformed.
    pub fn new(config: OpenDataConfig, cache: ResponseCache) -> Result<Self, AppError> {
        config.validate()?;
        let sparql_endpoint = Url::parse(&config.sparql_endpoint)
            .map_err(|e| AppError::InvalidUrl(format!("{}: {}", config.sparql_endpoint, e)))?;
        let client = build_client(&config.http)?;

        Ok(Self {
            client,
            sparql_endpoint,
            config,
            cache,
        })
    }

    /// Creates a client and opens the cache described by `cache`.
    pub fn with_cache_config(
        config: OpenDataConfig,
        cache: &CacheConfig,
    ) -> Result<Self, AppError> {
        Self::new(config, ResponseCache::new(cache)?)
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Searches datasets whose keywords match `keyword`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` for a blank keyword or a limit outside
    /// `1..=1000`.
    pub async fn search_datasets(
        &self,
        keyword: &str,
        limit: u32,
    ) -> Result<Vec<DatasetSummary>, AppError> {
        if keyword.trim().is_empty() {
            return Err(AppError::ConfigError("keyword must not be empty".to_string()));
        }
        self.search(&DatasetQuery::keyword(keyword).limit(limit)).await
    }

    /// Searches with the full set of filters.
    pub async fn search(&self, query: &DatasetQuery) -> Result<Vec<DatasetSummary>, AppError> {
        self.run_search(query, true).await
    }

    /// Like [`EuDataClient::search`] but skips the cache lookup. The result
    /// is still stored.
    pub async fn search_fresh(
        &self,
        query: &DatasetQuery,
    ) -> Result<Vec<DatasetSummary>, AppError> {
        self.run_search(query, false).await
    }

    async fn run_search(
        &self,
        query: &DatasetQuery,
        use_cache: bool,
    ) -> Result<Vec<DatasetSummary>, AppError> {
        query.validate()?;
        let preferred = query
            .preferred_formats
            .as_deref()
            .unwrap_or(&self.config.preferred_formats);
        let limit = query.limit as usize;
        let key = query.cache_key();

        if use_cache {
            if let Some(cached) = self.cache.get(&key) {
                match sparql::parse_results(&cached) {
                    Ok(results) => return Ok(sparql::summaries(&results, limit, preferred)),
                    Err(e) => warn!(
                        "Ignoring unreadable cached search {}: {}",
                        key.fingerprint(),
                        e
                    ),
                }
            }
        }

        let sparql_query = sparql::search_query(query, &self.config.locale)?;
        let raw = self.run_sparql(&sparql_query).await?;
        let results = sparql::parse_results(&raw)?;
        let summaries = sparql::summaries(&results, limit, preferred);
        info!(
            "Dataset search {} returned {} datasets",
            key.fingerprint(),
            summaries.len()
        );

        self.store(&key, &raw);
        Ok(summaries)
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Detailed metadata for one dataset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if `uri` is not an http(s) URL.
    /// Returns `AppError::DatasetNotFound` if neither source knows it.
    pub async fn get_dataset_metadata(&self, uri: &str) -> Result<DatasetMetadata, AppError> {
        self.metadata(uri, true).await
    }

    /// Like [`EuDataClient::get_dataset_metadata`] but skips the cache lookup.
    pub async fn get_dataset_metadata_fresh(&self, uri: &str) -> Result<DatasetMetadata, AppError> {
        self.metadata(uri, false).await
    }

    async fn metadata(&self, uri: &str, use_cache: bool) -> Result<DatasetMetadata, AppError> {
        let uri = uri.trim();
        validate_iri(uri)?;
        let locale = self.config.locale.as_str();
        let key = self.metadata_key(uri);

        if use_cache {
            if let Some(cached) = self.cache.get(&key) {
                match metadata_from_payload(uri, &cached, locale) {
                    Ok(metadata) => return Ok(metadata),
                    Err(e) => warn!("Ignoring unreadable cached metadata for {}: {}", uri, e),
                }
            }
        }

        let payload = self.fetch_metadata(uri).await?;
        let metadata = metadata_from_payload(uri, &payload, locale)?;
        self.store(&key, &payload);
        Ok(metadata)
    }

    /// Fetches the raw metadata payload: the REST document when it describes
    /// the dataset, the two SPARQL result sets otherwise.
    async fn fetch_metadata(&self, uri: &str) -> Result<Value, AppError> {
        let Some(uuid) = jsonld::extract_uuid(uri) else {
            info!("No dataset UUID in {}, querying SPARQL", uri);
            return self.fetch_sparql_metadata(uri).await;
        };

        match self.fetch_rest_document(uuid).await? {
            Some(document) => {
                if jsonld::normalize_document(&document, uri, &self.config.locale).is_some() {
                    Ok(json!({"source": "rest", "document": document}))
                } else {
                    warn!(
                        "REST document for {} has no dcat:Dataset node, falling back to SPARQL",
                        uri
                    );
                    self.fetch_sparql_metadata(uri).await
                }
            }
            None => {
                warn!("REST hub does not know {}, falling back to SPARQL", uri);
                self.fetch_sparql_metadata(uri).await
            }
        }
    }

    /// `None` when the hub answers 404.
    async fn fetch_rest_document(&self, uuid: &str) -> Result<Option<Value>, AppError> {
        let raw = format!("{}{}.jsonld", self.config.rest_api_base, uuid);
        let mut url =
            Url::parse(&raw).map_err(|e| AppError::InvalidUrl(format!("{}: {}", raw, e)))?;
        url.query_pairs_mut()
            .append_pair("useNormalizedId", "true")
            .append_pair("locale", &self.config.locale);
        debug!("REST metadata: {}", url);

        let resp = self
            .client
            .get(url)
            .header(ACCEPT, JSONLD_ACCEPT)
            .send()
            .await
            .map_err(|e| map_send_error(e, &self.config.http))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = ensure_success(resp).await?;
        read_json(resp).await.map(Some)
    }

    async fn fetch_sparql_metadata(&self, uri: &str) -> Result<Value, AppError> {
        let locale = &self.config.locale;
        let properties_query = sparql::metadata_properties_query(uri, locale);
        let distributions_query = sparql::metadata_distributions_query(uri, locale);
        let (properties, distributions) = futures::try_join!(
            self.run_sparql(&properties_query),
            self.run_sparql(&distributions_query)
        )?;
        Ok(json!({
            "source": "sparql",
            "properties": properties,
            "distributions": distributions,
        }))
    }

    /// Distributions of one dataset.
    pub async fn get_distribution_formats(&self, uri: &str) -> Result<Vec<Distribution>, AppError> {
        Ok(self.get_dataset_metadata(uri).await?.distributions)
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Downloads the best distribution of a dataset.
    ///
    /// `preferred` overrides the configured format preference when non-empty.
    /// Content is cached per download URL together with the dataset's
    /// `modified` date; an entry is stale once the TTL passes or the date
    /// changes.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NoDistribution` if the dataset has nothing to download.
    pub async fn get_dataset_content(
        &self,
        uri: &str,
        preferred: &[String],
    ) -> Result<DatasetContent, AppError> {
        self.content(uri, preferred, true).await
    }

    /// Like [`EuDataClient::get_dataset_content`] but skips the metadata and
    /// content cache lookups. Both are still stored.
    pub async fn get_dataset_content_fresh(
        &self,
        uri: &str,
        preferred: &[String],
    ) -> Result<DatasetContent, AppError> {
        self.content(uri, preferred, false).await
    }

    async fn content(
        &self,
        uri: &str,
        preferred: &[String],
        use_cache: bool,
    ) -> Result<DatasetContent, AppError> {
        let metadata = self.metadata(uri, use_cache).await?;
        let preferred = if preferred.is_empty() {
            self.config.preferred_formats.as_slice()
        } else {
            preferred
        };

        let (dist, format) = select_distribution(&metadata.distributions, preferred)
            .ok_or_else(|| AppError::NoDistribution(uri.to_string()))?;
        let source_url = dist
            .target_url()
            .ok_or_else(|| AppError::NoDistribution(uri.to_string()))?
            .to_string();
        let modified = metadata.modified.as_deref();
        let key = content_key(&source_url);

        if use_cache {
            if let Some(cached) = self.cache.get(&key) {
                match content_from_payload(&cached, modified) {
                    Ok(Some(content)) => {
                        debug!("Serving {} from cache", source_url);
                        return Ok(content);
                    }
                    Ok(None) => info!("{} was modified since {} was cached", uri, source_url),
                    Err(e) => warn!("Ignoring unreadable cached content for {}: {}", source_url, e),
                }
            }
        }

        let content = self.download(source_url, format).await?;
        info!("Downloaded {} for {}", content.source_url, uri);
        self.store(&key, &content_payload(&content, modified));
        Ok(content)
    }

    async fn download(
        &self,
        source_url: String,
        format: String,
    ) -> Result<DatasetContent, AppError> {
        let http = HttpConfig {
            timeout: self.config.http.timeout * 2,
            ..self.config.http.clone()
        };
        debug!("Downloading {} ({})", source_url, format);

        let resp = self
            .client
            .get(&source_url)
            .header(ACCEPT, JSONLD_ACCEPT)
            .timeout(http.timeout)
            .send()
            .await
            .map_err(|e| map_send_error(e, &http))?;
        let resp = ensure_success(resp).await?;

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();

        let body = if is_text_content(&content_type) {
            ContentBody::Text(resp.text().await.map_err(|e| map_send_error(e, &http))?)
        } else {
            ContentBody::Binary(
                resp.bytes()
                    .await
                    .map_err(|e| map_send_error(e, &http))?
                    .to_vec(),
            )
        };
        debug!("Downloaded {} units of {}", body.size(), content_type);

        Ok(DatasetContent {
            source_url,
            format,
            content_type,
            body,
        })
    }

    // =========================================================================
    // Cache
    // =========================================================================

    /// Removes the cached metadata and downloads of one dataset, or the
    /// whole cache.
    /// Returns the number of entries removed.
    pub fn clear_cache(&self, uri: Option<&str>) -> Result<usize, AppError> {
        match uri {
            Some(uri) => {
                let uri = uri.trim();
                let key = self.metadata_key(uri);
                let locale = self.config.locale.as_str();
                let mut removed = 0;
                if let Some(payload) = self.cache.get(&key) {
                    if let Ok(metadata) = metadata_from_payload(uri, &payload, locale) {
                        let dists = metadata.distributions.iter();
                        for url in dists.filter_map(Distribution::target_url) {
                            removed += usize::from(self.cache.remove(&content_key(url))?);
                        }
                    }
                }
                removed += usize::from(self.cache.remove(&key)?);
                info!("Cleared {} cache entries for {}", removed, uri);
                Ok(removed)
            }
            None => {
                let removed = self.cache.clear()?;
                info!(
                    "Cleared {} cache entries from {}",
                    removed,
                    self.cache.dir().display()
                );
                Ok(removed)
            }
        }
    }

    fn metadata_key(&self, uri: &str) -> CacheKey {
        CacheKey::new(METADATA_OPERATION)
            .arg("uri", uri)
            .arg("locale", &self.config.locale)
    }

    async fn run_sparql(&self, query: &str) -> Result<Value, AppError> {
        let mut url = self.sparql_endpoint.clone();
        url.query_pairs_mut().append_pair("query", query);
        debug!("SPARQL query ({} chars) to {}", query.len(), self.sparql_endpoint);

        let resp = self
            .client
            .get(url)
            .header(ACCEPT, SPARQL_ACCEPT)
            .send()
            .await
            .map_err(|e| map_send_error(e, &self.config.http))?;
        let resp = ensure_success(resp).await?;
        read_json(resp).await
    }

    /// Cache writes are best effort.
    fn store(&self, key: &CacheKey, payload: &Value) {
        if let Err(e) = self.cache.put(key, payload) {
            warn!("Failed to cache {}: {}", key.fingerprint(), e);
        }
    }

    /// Tool descriptors for agent frameworks.
    pub fn descriptors() -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor {
                name: "eu_data_search",
                description: "Search High-Value Datasets on data.europa.eu by keyword. Returns titles, publishers, distributions and the best download link.",
                inputs: vec![
                    ToolInput::required(
                        "keyword",
                        ToolValueType::String,
                        "Keyword to match against dataset keywords",
                    ),
                    ToolInput::optional(
                        "limit",
                        ToolValueType::Integer,
                        "Maximum number of datasets (1-1000)",
                        json!(10),
                    ),
                ],
                output_type: ToolValueType::Array,
            },
            ToolDescriptor {
                name: "eu_data_metadata",
                description:
                    "Get detailed metadata and distributions for a data.europa.eu dataset URI.",
                inputs: vec![ToolInput::required(
                    "dataset_uri",
                    ToolValueType::String,
                    "Dataset URI",
                )],
                output_type: ToolValueType::Object,
            },
            ToolDescriptor {
                name: "eu_data_content",
                description:
                    "Download the content of a data.europa.eu dataset in the best available format.",
                inputs: vec![
                    ToolInput::required("dataset_uri", ToolValueType::String, "Dataset URI"),
                    ToolInput::optional(
                        "preferred_formats",
                        ToolValueType::Array,
                        "Formats in order of preference",
                        json!(["CSV", "JSON", "XML", "RDF"]),
                    ),
                ],
                output_type: ToolValueType::Object,
            },
        ]
    }
}

/// Reshapes a raw metadata payload, live or cached.
fn metadata_from_payload(
    uri: &str,
    payload: &Value,
    locale: &str,
) -> Result<DatasetMetadata, AppError> {
    let section = |name: &str| payload.get(name).unwrap_or(&Value::Null);
    match payload.get("source").and_then(Value::as_str) {
        Some("rest") => {
            let document = section("document");
            jsonld::normalize_document(document, uri, locale).ok_or_else(|| {
                AppError::ParseError(format!("REST document for {} has no dataset node", uri))
            })
        }
        Some("sparql") => {
            let properties = sparql::parse_results(section("properties"))?;
            let distributions = sparql::parse_results(section("distributions"))?;
            let metadata = sparql::metadata_from_results(uri, &properties, &distributions, locale);
            if metadata.is_empty() {
                return Err(AppError::DatasetNotFound(uri.to_string()));
            }
            Ok(metadata)
        }
        other => Err(AppError::ParseError(format!(
            "Unknown metadata payload source {:?}",
            other
        ))),
    }
}

fn content_key(source_url: &str) -> CacheKey {
    CacheKey::new(CONTENT_OPERATION).arg("url", source_url)
}

/// Cached download. Binary bodies are stored base64-encoded.
#[derive(Deserialize, Debug)]
struct CachedContent {
    source_url: String,
    format: String,
    content_type: String,
    dataset_modified: Option<String>,
    kind: String,
    data: String,
}

fn content_payload(content: &DatasetContent, dataset_modified: Option<&str>) -> Value {
    let (kind, data) = match &content.body {
        ContentBody::Text(text) => ("text", text.clone()),
        ContentBody::Binary(bytes) => ("binary", general_purpose::STANDARD.encode(bytes)),
    };
    json!({
        "source_url": content.source_url,
        "format": content.format,
        "content_type": content.content_type,
        "dataset_modified": dataset_modified,
        "kind": kind,
        "data": data,
    })
}

/// `Ok(None)` when the dataset's `modified` date no longer matches the entry.
fn content_from_payload(
    payload: &Value,
    dataset_modified: Option<&str>,
) -> Result<Option<DatasetContent>, AppError> {
    let cached = CachedContent::deserialize(payload)
        .map_err(|e| AppError::ParseError(format!("cached content: {}", e)))?;
    if cached.dataset_modified.as_deref() != dataset_modified {
        return Ok(None);
    }
    let body = match cached.kind.as_str() {
        "text" => ContentBody::Text(cached.data),
        "binary" => ContentBody::Binary(
            general_purpose::STANDARD
                .decode(cached.data.as_bytes())
                .map_err(|e| AppError::ParseError(format!("cached content: {}", e)))?,
        ),
        other => {
            return Err(AppError::ParseError(format!(
                "cached content has unknown kind '{}'",
                other
            )))
        }
    };
    Ok(Some(DatasetContent {
        source_url: cached.source_url,
        format: cached.format,
        content_type: cached.content_type,
        body,
    }))
}

fn is_text_content(content_type: &str) -> bool {
    TEXT_CONTENT_TYPES.iter().any(|t| content_type.contains(t))
}
