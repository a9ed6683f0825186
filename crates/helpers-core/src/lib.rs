//! Helpers Core - Domain types, error handling, configuration and caching.

pub mod cache;
pub mod config;
pub mod error;
pub mod formats;
pub mod models;
pub mod tool;

pub use cache::{CacheEntry, CacheKey, ResponseCache};
pub use config::{
    default_config_path, load_config, save_config, CacheConfig, HelpersConfig, HttpConfig,
    ModelConfig, OpenDataConfig, SearchConfig,
};
pub use error::AppError;
pub use models::{
    ContentBody, DatasetContent, DatasetMetadata, DatasetSummary, Distribution, DownloadOption,
    GenerateOptions, Message, MetadataSource, Role, SearchResult,
};
pub use tool::{ToolDescriptor, ToolInput, ToolValueType};
