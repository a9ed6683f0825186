//! SPARQL query construction and result normalization for the data.europa.eu
//! catalog.
//!
//! Every user-supplied value that ends up in a query goes through
//! [`escape_literal`] or [`escape_regex`], and IRIs are validated before they
//! are wrapped in `<...>`.

use super::{DatasetQuery, SortBy, SortOrder};
use helpers_core::error::AppError;
use helpers_core::formats::best_download;
use helpers_core::models::{DatasetMetadata, DatasetSummary, Distribution, MetadataSource};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

const PREFIXES: &str = "PREFIX dcat: <http://www.w3.org/ns/dcat#>
PREFIX dct: <http://purl.org/dc/terms/>
PREFIX foaf: <http://xmlns.com/foaf/0.1/>
PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>
";

const LANGUAGE_AUTHORITY: &str = "http://publications.europa.eu/resource/authority/language/";
const KEYWORD_SEPARATOR: char = '|';

const DCT: &str = "http://purl.org/dc/terms/";
const DCAT: &str = "http://www.w3.org/ns/dcat#";

/// Rows returned per metadata sub-query.
const METADATA_ROW_LIMIT: u32 = 500;
const DISTRIBUTION_ROW_LIMIT: u32 = 200;

// =============================================================================
// SPARQL JSON results
// =============================================================================

/// `application/sparql-results+json` document.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SparqlResults {
    #[serde(default)]
    pub results: Bindings,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Bindings {
    #[serde(default)]
    pub bindings: Vec<HashMap<String, Term>>,
}

/// One bound RDF term.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Term {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub value: String,
    #[serde(rename = "xml:lang")]
    pub lang: Option<String>,
}

impl Term {
    fn is_iri(&self) -> bool {
        self.kind == "uri"
    }
}

/// Decodes a raw SPARQL response (live or cached).
pub(crate) fn parse_results(raw: &Value) -> Result<SparqlResults, AppError> {
    SparqlResults::deserialize(raw)
        .map_err(|e| AppError::ParseError(format!("Unexpected SPARQL result shape: {}", e)))
}

fn bound<'a>(row: &'a HashMap<String, Term>, var: &str) -> Option<&'a str> {
    row.get(var)
        .map(|term| term.value.as_str())
        .filter(|value| !value.is_empty())
}

fn bound_owned(row: &HashMap<String, Term>, var: &str) -> Option<String> {
    bound(row, var).map(str::to_string)
}

// =============================================================================
// Escaping and validation
// =============================================================================

/// Escapes `raw` for use inside a double- or single-quoted SPARQL literal.
pub fn escape_literal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes regex metacharacters, then escapes the result as a literal, so
/// `raw` is matched as plain text by `REGEX()`.
pub fn escape_regex(raw: &str) -> String {
    let mut pattern = String::with_capacity(raw.len());
    for c in raw.chars() {
        if "\\.^$|?*+()[]{}".contains(c) {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    escape_literal(&pattern)
}

/// Checks that `uri` is an absolute http(s) URL that can be embedded in a
/// query as `<uri>`.
pub fn validate_iri(uri: &str) -> Result<(), AppError> {
    if uri.is_empty() {
        return Err(AppError::ConfigError("dataset URI must not be empty".to_string()));
    }
    if let Some(c) = uri
        .chars()
        .find(|c| c.is_whitespace() || "<>\"{}|\\^`".contains(*c))
    {
        return Err(AppError::ConfigError(format!(
            "URI contains an invalid character {:?}: {}",
            c, uri
        )));
    }
    let parsed = url::Url::parse(uri)
        .map_err(|e| AppError::ConfigError(format!("Invalid URI {}: {}", uri, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AppError::ConfigError(format!(
            "URI must use http or https, got {}: {}",
            other, uri
        ))),
    }
}

fn validate_language_code(code: &str) -> Result<String, AppError> {
    let code = code.trim();
    if code.is_empty() || code.len() > 8 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::ConfigError(format!(
            "language must be an ISO 639 code, got '{}'",
            code
        )));
    }
    Ok(code.to_ascii_uppercase())
}

fn lang_filter(var: &str, locale: &str) -> String {
    format!(
        "FILTER(LANGMATCHES(LANG({var}), \"{locale}\") || LANG({var}) = \"\")",
        var = var,
        locale = escape_literal(locale)
    )
}

// =============================================================================
// Search
// =============================================================================

/// Builds the single search query: an aggregated sub-select that picks one
/// page of datasets, joined with their distributions.
pub(crate) fn search_query(query: &DatasetQuery, locale: &str) -> Result<String, AppError> {
    let mut filters = String::new();

    match query.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        Some(keyword) => {
            filters.push_str("      ?dataset dcat:keyword ?kw .\n");
            let _ = writeln!(
                filters,
                "      FILTER REGEX(STR(?kw), \"{}\", \"i\")",
                escape_regex(keyword)
            );
        }
        None => filters.push_str("      OPTIONAL { ?dataset dcat:keyword ?kw . }\n"),
    }

    if let Some(publisher) = query.publisher.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        let _ = writeln!(
            filters,
            "      FILTER EXISTS {{ ?dataset dct:publisher ?pubCheck . ?pubCheck foaf:name ?pubCheckName . FILTER REGEX(STR(?pubCheckName), \"{}\", \"i\") }}",
            escape_regex(publisher)
        );
    }

    if let Some(topic) = query.topic.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        if topic.starts_with("http://") || topic.starts_with("https://") {
            validate_iri(topic)?;
            let _ = writeln!(filters, "      ?dataset dcat:theme <{}> .", topic);
        } else {
            let _ = writeln!(
                filters,
                "      FILTER EXISTS {{ ?dataset dcat:theme ?themeUri . FILTER CONTAINS(STR(?themeUri), \"{}\") }}",
                escape_literal(topic)
            );
        }
    }

    if let Some(language) = query.language.as_deref().filter(|l| !l.trim().is_empty()) {
        let code = validate_language_code(language)?;
        let _ = writeln!(filters, "      ?dataset dct:language <{}{}> .", LANGUAGE_AUTHORITY, code);
    }

    if let Some(from) = query.date_from {
        let _ = writeln!(
            filters,
            "      FILTER((BOUND(?iss) && ?iss >= \"{d}\"^^xsd:date) || (BOUND(?mod) && ?mod >= \"{d}\"^^xsd:date))",
            d = from.format("%Y-%m-%d")
        );
    }
    if let Some(to) = query.date_to {
        let _ = writeln!(
            filters,
            "      FILTER((BOUND(?iss) && ?iss <= \"{d}\"^^xsd:date) || (BOUND(?mod) && ?mod <= \"{d}\"^^xsd:date))",
            d = to.format("%Y-%m-%d")
        );
    }

    let direction = match query.sort_order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    let (inner_order, outer_order) = match query.sort_by {
        SortBy::Date => (
            format!("    ORDER BY {}(MAX(?mod)) ?dataset\n", direction),
            format!("ORDER BY {}(?modified) ?dataset\n", direction),
        ),
        SortBy::Title => (
            format!("    ORDER BY {}(SAMPLE(?t)) ?dataset\n", direction),
            format!("ORDER BY {}(?title) ?dataset\n", direction),
        ),
        SortBy::None => (String::new(), String::new()),
    };

    let mut sparql = String::from(PREFIXES);
    sparql.push_str(
        "SELECT ?dataset ?title ?keywords ?publisher ?modified ?dist ?format ?downloadURL ?accessURL ?mediaType ?byteSize\n",
    );
    sparql.push_str("WHERE {\n  {\n");
    let _ = writeln!(
        sparql,
        "    SELECT ?dataset (SAMPLE(?t) AS ?title) (GROUP_CONCAT(DISTINCT ?kw; SEPARATOR=\"{}\") AS ?keywords) (SAMPLE(?pubName) AS ?publisher) (MAX(?mod) AS ?modified)",
        KEYWORD_SEPARATOR
    );
    sparql.push_str("    WHERE {\n");
    sparql.push_str("      ?dataset a dcat:Dataset .\n");
    let _ = writeln!(
        sparql,
        "      OPTIONAL {{ ?dataset dct:title ?t . {} }}",
        lang_filter("?t", locale)
    );
    sparql.push_str(
        "      OPTIONAL { ?dataset dct:publisher ?pubURI . ?pubURI foaf:name ?pubName . }\n",
    );
    sparql.push_str("      OPTIONAL { ?dataset dct:modified ?mod . }\n");
    sparql.push_str("      OPTIONAL { ?dataset dct:issued ?iss . }\n");
    sparql.push_str(&filters);
    sparql.push_str("    }\n    GROUP BY ?dataset\n");
    sparql.push_str(&inner_order);
    let _ = writeln!(sparql, "    LIMIT {}", query.limit);
    if query.offset > 0 {
        let _ = writeln!(sparql, "    OFFSET {}", query.offset);
    }
    sparql.push_str("  }\n");
    sparql.push_str("  OPTIONAL {\n");
    sparql.push_str("    ?dataset dcat:distribution ?dist .\n");
    sparql.push_str(
        "    OPTIONAL { ?dist dct:format ?formatURI . BIND(STR(?formatURI) AS ?format) }\n",
    );
    sparql.push_str("    OPTIONAL { ?dist dcat:downloadURL ?downloadURL . }\n");
    sparql.push_str("    OPTIONAL { ?dist dcat:accessURL ?accessURL . }\n");
    sparql.push_str("    OPTIONAL { ?dist dcat:mediaType ?mediaType . }\n");
    sparql.push_str("    OPTIONAL { ?dist dcat:byteSize ?byteSize . }\n");
    sparql.push_str("  }\n}\n");
    sparql.push_str(&outer_order);
    Ok(sparql)
}

/// Groups joined rows into one summary per dataset, in first-appearance
/// order, and keeps at most `limit` of them.
pub(crate) fn summaries<S: AsRef<str>>(
    results: &SparqlResults,
    limit: usize,
    preferred: &[S],
) -> Vec<DatasetSummary> {
    let mut order: Vec<DatasetSummary> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut seen_dists: Vec<HashSet<String>> = Vec::new();

    for row in &results.results.bindings {
        let Some(uri) = bound(row, "dataset") else {
            continue;
        };

        let position = match index.get(uri) {
            Some(&position) => position,
            None => {
                let keywords = bound(row, "keywords")
                    .map(split_keywords)
                    .unwrap_or_default();
                order.push(DatasetSummary {
                    uri: uri.to_string(),
                    title: bound_owned(row, "title"),
                    publisher: bound_owned(row, "publisher"),
                    keywords,
                    modified: bound_owned(row, "modified"),
                    distributions: Vec::new(),
                    download: None,
                });
                seen_dists.push(HashSet::new());
                index.insert(uri.to_string(), order.len() - 1);
                order.len() - 1
            }
        };

        if let Some(dist_uri) = bound(row, "dist") {
            if seen_dists[position].insert(dist_uri.to_string()) {
                order[position].distributions.push(Distribution {
                    uri: Some(dist_uri.to_string()),
                    format: bound_owned(row, "format"),
                    download_url: bound_owned(row, "downloadURL"),
                    access_url: bound_owned(row, "accessURL"),
                    media_type: bound_owned(row, "mediaType"),
                    byte_size: bound_owned(row, "byteSize"),
                    ..Distribution::default()
                });
            }
        }
    }

    order.truncate(limit);
    for summary in &mut order {
        summary.download = best_download(&summary.distributions, preferred);
    }
    order
}

fn split_keywords(raw: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for keyword in raw.split(KEYWORD_SEPARATOR).map(str::trim) {
        if !keyword.is_empty() && !keywords.iter().any(|k| k == keyword) {
            keywords.push(keyword.to_string());
        }
    }
    keywords
}

// =============================================================================
// Metadata fallback
// =============================================================================

/// Dataset properties, one row per value, with a `foaf:name` label for IRIs
/// that have one.
pub(crate) fn metadata_properties_query(uri: &str, locale: &str) -> String {
    format!(
        "{prefixes}SELECT ?prop ?value ?label
WHERE {{
  VALUES ?prop {{ dct:title dct:description dct:publisher dct:modified dct:issued dcat:keyword dcat:theme dct:language dct:license }}
  <{uri}> ?prop ?value .
  OPTIONAL {{ ?value foaf:name ?label . }}
  FILTER(!ISLITERAL(?value) || LANG(?value) = \"\" || LANGMATCHES(LANG(?value), \"{locale}\"))
}}
LIMIT {limit}
",
        prefixes = PREFIXES,
        uri = uri,
        locale = escape_literal(locale),
        limit = METADATA_ROW_LIMIT
    )
}

/// Distributions of one dataset.
pub(crate) fn metadata_distributions_query(uri: &str, locale: &str) -> String {
    format!(
        "{prefixes}SELECT DISTINCT ?dist ?distTitle ?format ?downloadURL ?accessURL ?mediaType ?byteSize ?modified ?license
WHERE {{
  <{uri}> dcat:distribution ?dist .
  OPTIONAL {{ ?dist dct:title ?distTitle . {title_filter} }}
  OPTIONAL {{ ?dist dct:format ?formatURI . BIND(STR(?formatURI) AS ?format) }}
  OPTIONAL {{ ?dist dcat:downloadURL ?downloadURL . }}
  OPTIONAL {{ ?dist dcat:accessURL ?accessURL . }}
  OPTIONAL {{ ?dist dcat:mediaType ?mediaType . }}
  OPTIONAL {{ ?dist dcat:byteSize ?byteSize . }}
  OPTIONAL {{ ?dist dct:modified ?modified . }}
  OPTIONAL {{ ?dist dct:license ?license . }}
}}
ORDER BY ?dist
LIMIT {limit}
",
        prefixes = PREFIXES,
        uri = uri,
        title_filter = lang_filter("?distTitle", locale),
        limit = DISTRIBUTION_ROW_LIMIT
    )
}

/// Builds a metadata record from the two fallback result sets.
pub(crate) fn metadata_from_results(
    uri: &str,
    properties: &SparqlResults,
    distributions: &SparqlResults,
    locale: &str,
) -> DatasetMetadata {
    let mut meta = DatasetMetadata::empty(uri, MetadataSource::Sparql);
    let mut title: Option<&Term> = None;
    let mut description: Option<&Term> = None;

    for row in &properties.results.bindings {
        let (Some(prop), Some(value)) = (bound(row, "prop"), row.get("value")) else {
            continue;
        };
        if value.value.is_empty() {
            continue;
        }
        let label = bound_owned(row, "label");

        match prop.strip_prefix(DCT).or_else(|| prop.strip_prefix(DCAT)) {
            Some("title") => title = prefer_locale(title, value, locale),
            Some("description") => description = prefer_locale(description, value, locale),
            Some("modified") => set_once(&mut meta.modified, &value.value),
            Some("issued") => set_once(&mut meta.issued, &value.value),
            Some("publisher") => {
                if value.is_iri() {
                    set_once(&mut meta.publisher_uri, &value.value);
                    if let Some(label) = label {
                        set_once(&mut meta.publisher, &label);
                    }
                } else {
                    set_once(&mut meta.publisher, &value.value);
                }
            }
            Some("keyword") => push_unique(&mut meta.keywords, &value.value),
            Some("theme") => push_unique(&mut meta.themes, &value.value),
            Some("language") => push_unique(&mut meta.languages, &value.value),
            Some("license") => push_unique(&mut meta.licenses, &value.value),
            _ => {}
        }
    }
    meta.title = title.map(|t| t.value.clone());
    meta.description = description.map(|t| t.value.clone());

    let mut seen = HashSet::new();
    for row in &distributions.results.bindings {
        let dist_uri = bound_owned(row, "dist");
        if let Some(id) = &dist_uri {
            if !seen.insert(id.clone()) {
                continue;
            }
        }
        let dist = Distribution {
            uri: dist_uri,
            title: bound_owned(row, "distTitle"),
            download_url: bound_owned(row, "downloadURL"),
            access_url: bound_owned(row, "accessURL"),
            format: bound_owned(row, "format"),
            media_type: bound_owned(row, "mediaType"),
            byte_size: bound_owned(row, "byteSize"),
            modified: bound_owned(row, "modified"),
            license: bound_owned(row, "license"),
            ..Distribution::default()
        };
        if dist.is_useful() {
            meta.distributions.push(dist);
        }
    }

    meta
}

fn prefer_locale<'a>(
    current: Option<&'a Term>,
    candidate: &'a Term,
    locale: &str,
) -> Option<&'a Term> {
    match current {
        None => Some(candidate),
        Some(existing)
            if existing.lang.as_deref() != Some(locale)
                && candidate.lang.as_deref() == Some(locale) =>
        {
            Some(candidate)
        }
        Some(existing) => Some(existing),
    }
}

fn set_once(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = Some(value.to_string());
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}
