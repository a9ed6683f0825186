//! Records produced by the adapters.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Web search
// =============================================================================

/// One web search hit, in the order the provider returned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

// =============================================================================
// Language model
// =============================================================================

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };
        f.write_str(name)
    }
}

/// A chat message sent to or received from the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

impl From<&str> for Message {
    /// Plain strings are user turns.
    fn from(content: &str) -> Self {
        Message::user(content)
    }
}

/// Per-call generation settings. Unset fields use the server or config default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateOptions {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub num_predict: Option<u32>,
    pub seed: Option<i64>,
    pub stop: Vec<String>,
    /// Prepended as a system message.
    pub system: Option<String>,
}

impl GenerateOptions {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

// =============================================================================
// Open data
// =============================================================================

/// A DCAT distribution: one downloadable representation of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_url: Option<String>,
    /// Format URI or literal (e.g. `http://publications.europa.eu/resource/authority/file-type/CSV`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Distribution {
    /// The download URL, or the access URL when no direct download exists.
    pub fn target_url(&self) -> Option<&str> {
        self.download_url
            .as_deref()
            .or(self.access_url.as_deref())
            .filter(|url| !url.is_empty())
    }

    /// A distribution is worth keeping when it can be identified or fetched.
    pub fn is_useful(&self) -> bool {
        self.uri.is_some() || self.target_url().is_some()
    }
}

/// The distribution picked for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOption {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_size: Option<String>,
}

/// One dataset returned by a catalog search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub uri: String,
    pub title: Option<String>,
    pub publisher: Option<String>,
    pub keywords: Vec<String>,
    pub modified: Option<String>,
    pub distributions: Vec<Distribution>,
    pub download: Option<DownloadOption>,
}

/// Which catalog interface produced a metadata record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataSource {
    /// JSON-LD document from the REST hub.
    Rest,
    /// Property queries against the SPARQL endpoint.
    Sparql,
}

/// Detailed metadata for a single dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub uri: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub modified: Option<String>,
    pub issued: Option<String>,
    pub publisher: Option<String>,
    pub publisher_uri: Option<String>,
    pub keywords: Vec<String>,
    pub themes: Vec<String>,
    pub languages: Vec<String>,
    pub licenses: Vec<String>,
    pub distributions: Vec<Distribution>,
    pub source: MetadataSource,
}

impl DatasetMetadata {
    /// An empty record for `uri`, to be filled in by a normalizer.
    pub fn empty(uri: impl Into<String>, source: MetadataSource) -> Self {
        Self {
            uri: uri.into(),
            title: None,
            description: None,
            modified: None,
            issued: None,
            publisher: None,
            publisher_uri: None,
            keywords: Vec::new(),
            themes: Vec::new(),
            languages: Vec::new(),
            licenses: Vec::new(),
            distributions: Vec::new(),
            source,
        }
    }

    /// True when nothing beyond the URI was found.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.modified.is_none()
            && self.issued.is_none()
            && self.publisher.is_none()
            && self.publisher_uri.is_none()
            && self.keywords.is_empty()
            && self.themes.is_empty()
            && self.languages.is_empty()
            && self.licenses.is_empty()
            && self.distributions.is_empty()
    }
}

/// Body of a downloaded distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum ContentBody {
    Text(String),
    Binary(Vec<u8>),
}

impl ContentBody {
    /// Characters for text, bytes for binary.
    pub fn size(&self) -> usize {
        match self {
            ContentBody::Text(text) => text.chars().count(),
            ContentBody::Binary(bytes) => bytes.len(),
        }
    }
}

/// Downloaded dataset content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetContent {
    pub source_url: String,
    pub format: String,
    pub content_type: String,
    pub body: ContentBody,
}
