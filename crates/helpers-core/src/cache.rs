//! File-backed response cache with a time-to-live.
//!
//! Each entry lives in its own JSON file named after a SHA-256 digest of the
//! request fingerprint. Expiration is evaluated lazily: an entry older than the
//! TTL is reported as absent but stays on disk until it is overwritten or the
//! cache is cleared.

use crate::config::CacheConfig;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};
use url::form_urlencoded;

/// Hex characters of the digest kept in the file name.
const KEY_DIGEST_LEN: usize = 32;

/// Deterministic identity of a cacheable request.
///
/// Arguments are sorted by name, so the order in which they are added never
/// changes the key. Callers normalize argument values (trimming, lowercasing)
/// before adding them.
///
/// # Examples
///
/// ```
/// use helpers_core::cache::CacheKey;
///
/// let a = CacheKey::new("search_datasets").arg("keyword", "air quality").arg("limit", 5);
/// let b = CacheKey::new("search_datasets").arg("limit", 5).arg("keyword", "air quality");
/// assert_eq!(a, b);
/// assert_eq!(a.fingerprint(), "search_datasets?keyword=air+quality&limit=5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: String,
    args: Vec<(String, String)>,
}

impl CacheKey {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            args: Vec::new(),
        }
    }

    /// Adds a named argument.
    pub fn arg(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        let name = name.into();
        let position = self
            .args
            .binary_search_by(|(existing, _)| existing.as_str().cmp(name.as_str()))
            .unwrap_or_else(|pos| pos);
        self.args.insert(position, (name, value.to_string()));
        self
    }

    /// Adds a named argument only when it is present.
    pub fn arg_opt(self, name: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.arg(name, value),
            None => self,
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Canonical text form: `operation?name=value&name=value`, with names
    /// and values form-urlencoded so that `&`, `=` and `?` inside a value
    /// cannot imitate another argument list.
    pub fn fingerprint(&self) -> String {
        let operation = encode(&self.operation);
        if self.args.is_empty() {
            return operation;
        }
        let args: Vec<String> = self
            .args
            .iter()
            .map(|(name, value)| format!("{}={}", encode(name), encode(value)))
            .collect();
        format!("{}?{}", operation, args.join("&"))
    }

    /// Filesystem-safe file name for this key.
    pub fn file_name(&self) -> String {
        let digest = format!("{:x}", Sha256::digest(self.fingerprint().as_bytes()));
        format!(
            "{}_{}.json",
            sanitize_component(&self.operation),
            &digest[..KEY_DIGEST_LEN]
        )
    }
}

fn encode(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .take(64)
        .collect();
    if cleaned.is_empty() {
        "entry".to_string()
    } else {
        cleaned
    }
}

/// What is written to disk for each key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub stored_at: DateTime<Utc>,
    pub payload: Value,
}

impl CacheEntry {
    /// An entry is expired once its age reaches the TTL. Entries stamped in the
    /// future (clock skew) count as fresh.
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match now.signed_duration_since(self.stored_at).to_std() {
            Ok(age) => age >= ttl,
            Err(_) => false,
        }
    }
}

/// Key-to-file JSON cache.
///
/// Single-process, best effort: concurrent writers for the same key race and
/// the last rename wins.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    ttl: Duration,
    enabled: bool,
}

impl ResponseCache {
    /// Opens (and creates, when enabled) the cache directory.
    pub fn new(config: &CacheConfig) -> Result<Self, AppError> {
        if config.enabled {
            fs::create_dir_all(&config.dir).map_err(|e| {
                AppError::CacheError(format!(
                    "Failed to create cache directory {}: {}",
                    config.dir.display(),
                    e
                ))
            })?;
            debug!("Response cache enabled at {}", config.dir.display());
        }
        Ok(Self {
            dir: config.dir.clone(),
            ttl: config.ttl,
            enabled: config.enabled,
        })
    }

    /// A cache that never hits and ignores writes.
    pub fn disabled() -> Self {
        Self {
            dir: PathBuf::new(),
            ttl: Duration::ZERO,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Returns the cached payload, or `None` when absent, expired or unreadable.
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        self.get_at(key, Utc::now())
    }

    fn get_at(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<Value> {
        if !self.enabled {
            return None;
        }
        let path = self.path_for(key);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Cache miss: {}", key.fingerprint());
                return None;
            }
            Err(e) => {
                warn!("Cache read error for {}: {}", path.display(), e);
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&contents) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(
                    "Corrupted cache file {}: {}. Removing it.",
                    path.display(),
                    e
                );
                if let Err(e) = fs::remove_file(&path) {
                    warn!("Could not remove {}: {}", path.display(), e);
                }
                return None;
            }
        };

        if entry.key != key.fingerprint() {
            debug!(
                "Cache file {} holds a different key ({}), ignoring",
                path.display(),
                entry.key
            );
            return None;
        }

        if entry.is_expired(self.ttl, now) {
            debug!("Cache expired: {}", key.fingerprint());
            return None;
        }

        debug!("Cache hit: {}", key.fingerprint());
        Some(entry.payload)
    }

    /// Stores `payload` under `key`, replacing any previous entry.
    pub fn put(&self, key: &CacheKey, payload: &Value) -> Result<(), AppError> {
        self.put_at(key, payload, Utc::now())
    }

    fn put_at(&self, key: &CacheKey, payload: &Value, now: DateTime<Utc>) -> Result<(), AppError> {
        if !self.enabled {
            return Ok(());
        }
        let entry = CacheEntry {
            key: key.fingerprint(),
            stored_at: now,
            payload: payload.clone(),
        };
        let serialized = serde_json::to_string(&entry)?;

        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, serialized).map_err(|e| {
            AppError::CacheError(format!("Failed to write {}: {}", temp_path.display(), e))
        })?;
        fs::rename(&temp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            AppError::CacheError(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        debug!("Cached {} at {}", key.fingerprint(), path.display());
        Ok(())
    }

    /// Deletes the entry for `key`. Returns whether a file was removed.
    pub fn remove(&self, key: &CacheKey) -> Result<bool, AppError> {
        if !self.enabled {
            return Ok(false);
        }
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::CacheError(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Deletes every entry file. Returns the number of files removed.
    pub fn clear(&self) -> Result<usize, AppError> {
        if !self.enabled {
            return Ok(0);
        }
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(AppError::CacheError(format!(
                    "Failed to list {}: {}",
                    self.dir.display(),
                    e
                )))
            }
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            let is_cache_file = path
                .extension()
                .is_some_and(|ext| ext == "json" || ext == "tmp");
            if !path.is_file() || !is_cache_file {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to delete {}: {}", path.display(), e),
            }
        }
        debug!("Removed {} cache files from {}", removed, self.dir.display());
        Ok(removed)
    }
}
