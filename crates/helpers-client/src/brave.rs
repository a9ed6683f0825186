use crate::http::{build_client, ensure_success, map_send_error, read_json};
use helpers_core::config::{save_config, HelpersConfig, SearchConfig};
use helpers_core::error::AppError;
use helpers_core::models::SearchResult;
use helpers_core::tool::{ToolDescriptor, ToolInput, ToolValueType};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use tracing::{debug, info};

/// Largest `count` the Brave web search endpoint accepts.
pub const MAX_RESULTS: u32 = 20;

/// Default number of results.
pub const DEFAULT_RESULTS: u32 = 10;

/// Parameters of a single web search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub count: u32,
    pub country: Option<String>,
    pub search_lang: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            count: DEFAULT_RESULTS,
            country: None,
            search_lang: None,
        }
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn search_lang(mut self, lang: impl Into<String>) -> Self {
        self.search_lang = Some(lang.into());
        self
    }
}

/// Brave web search response. Only the fields we map are modelled.
///
/// API reference: <https://api-dashboard.search.brave.com/app/documentation/web-search/responses>
#[derive(Deserialize, Debug)]
struct BraveResponse {
    web: Option<WebResults>,
}

#[derive(Deserialize, Debug)]
struct WebResults {
    #[serde(default)]
    results: Vec<WebResult>,
}

#[derive(Deserialize, Debug)]
struct WebResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
}

impl From<WebResult> for SearchResult {
    fn from(item: WebResult) -> Self {
        SearchResult {
            title: item.title,
            url: item.url,
            snippet: item.description,
        }
    }
}

/// HTTP client for the Brave Search web API.
///
/// # Examples
///
/// ```no_run
/// use helpers_client::BraveSearchClient;
/// use helpers_core::config::SearchConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SearchConfig {
///     api_key: Some("BSA-your-key".to_string()),
///     ..SearchConfig::default()
/// };
/// let client = BraveSearchClient::new(config)?;
/// for hit in client.query("open source agents", 3).await? {
///     println!("{} - {}", hit.title, hit.url);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BraveSearchClient {
    client: Client,
    endpoint: Url,
    api_key: String,
    config: SearchConfig,
}

impl BraveSearchClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if no API key is configured.
    /// Returns `AppError::InvalidUrl` if the endpoint is malformed.
    pub fn new(config: SearchConfig) -> Result<Self, AppError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::ConfigError("Brave Search API key not configured".to_string())
            })?;

        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| AppError::InvalidUrl(format!("{}: {}", config.endpoint, e)))?;
        let client = build_client(&config.http)?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            config,
        })
    }

    /// Searches the web and returns up to `count` results in provider order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` for a blank query or a zero count.
    /// Returns `AppError::UpstreamError` for a non-2xx response.
    /// Returns `AppError::ParseError` if the body is not the expected JSON.
    pub async fn query(&self, text: &str, count: u32) -> Result<Vec<SearchResult>, AppError> {
        self.query_with(&SearchRequest::new(text).count(count)).await
    }

    /// Searches with explicit country and language.
    pub async fn query_with(&self, request: &SearchRequest) -> Result<Vec<SearchResult>, AppError> {
        let url = self.build_url(request)?;
        debug!("Brave search: {}", url);

        let resp = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .send()
            .await
            .map_err(|e| map_send_error(e, &self.config.http))?;

        let resp = ensure_success(resp).await?;
        let body: BraveResponse = read_json(resp).await?;
        let results = normalize(body);

        info!("Brave search '{}' returned {} results", request.query, results.len());
        Ok(results)
    }

    fn build_url(&self, request: &SearchRequest) -> Result<Url, AppError> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(AppError::ConfigError("search query must not be empty".to_string()));
        }
        if request.count == 0 {
            return Err(AppError::ConfigError("count must be at least 1".to_string()));
        }
        let count = request.count.min(MAX_RESULTS);

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("count", &count.to_string())
            .append_pair(
                "country",
                request.country.as_deref().unwrap_or(&self.config.country),
            )
            .append_pair(
                "search_lang",
                request
                    .search_lang
                    .as_deref()
                    .unwrap_or(&self.config.search_lang),
            );
        Ok(url)
    }

    /// Persists `api_key` to the configuration file at `path`, keeping the
    /// other settings in it.
    pub fn configure(path: &Path, api_key: &str) -> Result<(), AppError> {
        if api_key.trim().is_empty() {
            return Err(AppError::ConfigError("API key must not be empty".to_string()));
        }
        let mut config: HelpersConfig = helpers_core::config::load_config(path)?;
        config.search.api_key = Some(api_key.trim().to_string());
        save_config(path, &config)
    }

    /// Tool descriptor for agent frameworks.
    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: "brave_search",
            description: "Search the web using Brave Search API. Useful for finding current information on topics, people, or events.",
            inputs: vec![
                ToolInput::required("query", ToolValueType::String, "The search query text"),
                ToolInput::optional(
                    "count",
                    ToolValueType::Integer,
                    "Number of results to return (max 20)",
                    json!(DEFAULT_RESULTS),
                ),
                ToolInput::optional(
                    "country",
                    ToolValueType::String,
                    "Country code for search results",
                    json!("US"),
                ),
                ToolInput::optional(
                    "search_lang",
                    ToolValueType::String,
                    "Language for search results",
                    json!("en"),
                ),
            ],
            output_type: ToolValueType::Array,
        }
    }
}

fn normalize(body: BraveResponse) -> Vec<SearchResult> {
    body.web
        .map(|web| web.results.into_iter().map(SearchResult::from).collect())
        .unwrap_or_default()
}
