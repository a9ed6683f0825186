//! Reading dataset metadata out of the REST hub's JSON-LD documents.

use helpers_core::models::{DatasetMetadata, Distribution, MetadataSource};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static DATASET_PATH_UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:datasets|dataset|set/data)/([0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12})")
        .expect("dataset uuid regex must compile")
});

static SET_UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/set/([0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12})(?:/|$)")
        .expect("set uuid regex must compile")
});

/// Extracts the dataset UUID from the URI shapes the portal uses:
/// `/datasets/{uuid}`, `/dataset/{uuid}`, `/set/data/{uuid}` and
/// `/set/{uuid}/...`.
pub(crate) fn extract_uuid(uri: &str) -> Option<&str> {
    DATASET_PATH_UUID
        .captures(uri)
        .or_else(|| SET_UUID.captures(uri))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

type Node = Map<String, Value>;

/// Normalizes a JSON-LD document into a metadata record.
///
/// Returns `None` when the document has no `@graph` or no `dcat:Dataset`
/// node, so the caller can try another source.
pub(crate) fn normalize_document(
    document: &Value,
    uri: &str,
    locale: &str,
) -> Option<DatasetMetadata> {
    let graph: Vec<&Node> = document
        .get("@graph")?
        .as_array()?
        .iter()
        .filter_map(Value::as_object)
        .collect();

    let nodes_by_id: HashMap<&str, &Node> = graph
        .iter()
        .filter_map(|node| node_id(node).map(|id| (id, *node)))
        .collect();

    let uuid = extract_uuid(uri);
    let datasets = || graph.iter().copied().filter(|node| has_type(node, "dcat:Dataset"));
    let dataset = datasets()
        .find(|node| {
            node_id(node).is_some_and(|id| id == uri || uuid.is_some_and(|uuid| id.contains(uuid)))
        })
        .or_else(|| datasets().next())?;

    let mut meta = DatasetMetadata::empty(node_id(dataset).unwrap_or(uri), MetadataSource::Rest);
    meta.title = value(dataset, "dct:title", locale);
    meta.description = value(dataset, "dct:description", locale);
    meta.modified = value(dataset, "dct:modified", locale);
    meta.issued =
        value(dataset, "dct:issued", locale).or_else(|| value(dataset, "dct:created", locale));
    meta.keywords = values(dataset, "dcat:keyword");
    meta.themes = values(dataset, "dcat:theme");
    meta.languages = values(dataset, "dct:language");
    meta.licenses = values(dataset, "dct:license");

    let (publisher, publisher_uri) = publisher_of(dataset, &nodes_by_id, locale);
    meta.publisher = publisher;
    meta.publisher_uri = publisher_uri;

    let mut seen = HashSet::new();
    for dist_node in distribution_nodes(dataset, &nodes_by_id) {
        if let Some(id) = node_id(dist_node) {
            if !seen.insert(id) {
                continue;
            }
        }
        let dist = distribution(dist_node, &nodes_by_id, locale);
        if dist.is_useful() {
            meta.distributions.push(dist);
        }
    }

    Some(meta)
}

fn node_id(node: &Node) -> Option<&str> {
    node.get("@id").and_then(Value::as_str)
}

/// `@type` may be a single string or an array.
fn has_type(node: &Node, ty: &str) -> bool {
    match node.get("@type") {
        Some(Value::String(s)) => s == ty,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(ty)),
        _ => false,
    }
}

/// Flattens a property into `(value, language)` pairs. Objects contribute
/// their `@value`, or their `@id` for references.
fn literals<'a>(node: &'a Node, property: &str) -> Vec<(String, Option<&'a str>)> {
    let items: Vec<&Value> = match node.get(property) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(item) => vec![item],
        None => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(obj) => {
                let lang = obj.get("@language").and_then(Value::as_str);
                obj.get("@value")
                    .or_else(|| obj.get("@id"))
                    .and_then(scalar_text)
                    .map(|v| (v, lang))
            }
            other => scalar_text(other).map(|v| (v, None)),
        })
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Single value: the first one tagged with `locale`, else the first one.
fn value(node: &Node, property: &str, locale: &str) -> Option<String> {
    let mut all = literals(node, property);
    if all.is_empty() {
        return None;
    }
    let index = all
        .iter()
        .position(|(_, lang)| *lang == Some(locale))
        .unwrap_or(0);
    Some(all.swap_remove(index).0).filter(|v| !v.is_empty())
}

/// Every value, deduplicated, in document order.
fn values(node: &Node, property: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for (v, _) in literals(node, property) {
        if !v.is_empty() && !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

fn label(node: &Node, locale: &str) -> Option<String> {
    value(node, "foaf:name", locale)
        .or_else(|| value(node, "skos:prefLabel", locale))
        .or_else(|| value(node, "rdfs:label", locale))
}

/// Publisher name and IRI. The reference may point at another graph node, be
/// embedded, or be a plain name.
fn publisher_of(
    dataset: &Node,
    nodes: &HashMap<&str, &Node>,
    locale: &str,
) -> (Option<String>, Option<String>) {
    match dataset.get("dct:publisher") {
        Some(Value::Object(embedded)) if embedded.len() > 1 || !embedded.contains_key("@id") => {
            (label(embedded, locale), node_id(embedded).map(str::to_string))
        }
        Some(_) => {
            let Some(reference) = value(dataset, "dct:publisher", locale) else {
                return (None, None);
            };
            match nodes.get(reference.as_str()) {
                Some(node) => (label(node, locale), Some(reference)),
                None if reference.starts_with("http") => (None, Some(reference)),
                None => (Some(reference), None),
            }
        }
        None => (None, None),
    }
}

fn distribution_nodes<'a>(dataset: &'a Node, nodes: &HashMap<&str, &'a Node>) -> Vec<&'a Node> {
    let items: Vec<&Value> = match dataset.get("dcat:distribution") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(item) => vec![item],
        None => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(id) => nodes.get(id.as_str()).copied(),
            Value::Object(obj) if has_type(obj, "dcat:Distribution") => Some(obj),
            Value::Object(obj) => node_id(obj).and_then(|id| nodes.get(id).copied()),
            _ => None,
        })
        .filter(|node| has_type(node, "dcat:Distribution"))
        .collect()
}

fn distribution(node: &Node, nodes: &HashMap<&str, &Node>, locale: &str) -> Distribution {
    let format = value(node, "dct:format", locale);
    let media_type = value(node, "dcat:mediaType", locale);
    let linked_label = |reference: &Option<String>| {
        reference
            .as_deref()
            .filter(|r| r.starts_with("http"))
            .and_then(|r| nodes.get(r))
            .and_then(|n| {
                value(n, "skos:prefLabel", locale).or_else(|| value(n, "rdfs:label", locale))
            })
    };

    Distribution {
        uri: node_id(node).map(str::to_string),
        title: value(node, "dct:title", locale),
        download_url: value(node, "dcat:downloadURL", locale),
        access_url: value(node, "dcat:accessURL", locale),
        format_label: linked_label(&format),
        media_type_label: linked_label(&media_type),
        format,
        media_type,
        byte_size: value(node, "dcat:byteSize", locale),
        modified: value(node, "dct:modified", locale),
        issued: value(node, "dct:issued", locale),
        license: value(node, "dct:license", locale),
        description: value(node, "dct:description", locale),
    }
}
