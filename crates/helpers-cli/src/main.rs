use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use serde_json::json;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use helpers_cli::{Command, Config};
use helpers_client::brave::SearchRequest;
use helpers_client::eudata::DatasetQuery;
use helpers_client::{BraveSearchClient, EuDataClient, OllamaClient};
use helpers_core::{
    default_config_path, load_config, AppError, CacheConfig, ContentBody, DatasetContent,
    GenerateOptions, HelpersConfig, ModelConfig, OpenDataConfig, SearchConfig,
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv().ok();

    // Parse command line arguments
    let config = Config::parse();

    // Setup logging (stderr to keep stdout clean for JSON output)
    let level = if config.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if let Err(e) = run(config).await {
        let message = match e.downcast_ref::<AppError>() {
            Some(app_error) => app_error.user_message(),
            None => format!("{:#}", e),
        };
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let config_path = config.config.clone().or_else(default_config_path);
    let file = match &config_path {
        Some(path) => load_config(path)?,
        None => HelpersConfig::default(),
    };

    match config.command {
        Command::WebSearch {
            query,
            count,
            country,
            lang,
            api_key,
        } => {
            let client = BraveSearchClient::new(SearchConfig::resolve(&file, api_key.as_deref()))?;
            let mut request = SearchRequest::new(query).count(count);
            if let Some(country) = country {
                request = request.country(country);
            }
            if let Some(lang) = lang {
                request = request.search_lang(lang);
            }
            let results = client.query_with(&request).await?;
            print_json(&results)?;
        }
        Command::Generate {
            prompt,
            model,
            temperature,
            system,
            blocking,
        } => {
            let mut model_config = ModelConfig::resolve(&file);
            if let Some(model) = model {
                model_config.model = model;
            }
            let mut options = GenerateOptions::default();
            if let Some(temperature) = temperature {
                options = options.with_temperature(temperature);
            }
            if let Some(system) = system {
                options = options.with_system(system);
            }
            generate(OllamaClient::new(model_config)?, prompt, options, blocking).await?;
        }
        Command::Datasets {
            keyword,
            limit,
            offset,
            publisher,
            topic,
            language,
            from,
            to,
            sort,
            order,
            refresh,
        } => {
            let client = open_data_client(&file, config.cache_dir, config.no_cache)?;
            let mut query = DatasetQuery::keyword(keyword)
                .limit(limit)
                .offset(offset)
                .sort_by(sort.into())
                .sort_order(order.into())
                .date_range(from.as_deref(), to.as_deref())?;
            if let Some(publisher) = publisher {
                query = query.publisher(publisher);
            }
            if let Some(language) = language {
                query = query.language(language);
            }
            query.topic = topic;

            let datasets = if refresh {
                client.search_fresh(&query).await?
            } else {
                client.search(&query).await?
            };
            info!("Found {} datasets", datasets.len());
            print_json(&datasets)?;
        }
        Command::Metadata { uri, refresh } => {
            let client = open_data_client(&file, config.cache_dir, config.no_cache)?;
            let metadata = if refresh {
                client.get_dataset_metadata_fresh(&uri).await?
            } else {
                client.get_dataset_metadata(&uri).await?
            };
            print_json(&metadata)?;
        }
        Command::Formats { uri } => {
            let client = open_data_client(&file, config.cache_dir, config.no_cache)?;
            let distributions = client.get_distribution_formats(&uri).await?;
            print_json(&distributions)?;
        }
        Command::Download {
            uri,
            formats,
            output,
            refresh,
        } => {
            let client = open_data_client(&file, config.cache_dir, config.no_cache)?;
            let content = if refresh {
                client.get_dataset_content_fresh(&uri, &formats).await?
            } else {
                client.get_dataset_content(&uri, &formats).await?
            };
            download(content, output.as_deref())?;
        }
        Command::ConfigureSearch { api_key } => {
            let path = config_path.context("No configuration directory available; pass --config")?;
            BraveSearchClient::configure(&path, &api_key)?;
            print_json(&json!({"configured": true, "path": path}))?;
        }
        Command::ClearCache { uri } => {
            let client = open_data_client(&file, config.cache_dir, config.no_cache)?;
            let removed = client.clear_cache(uri.as_deref())?;
            info!("Removed {} cache entries from {}", removed, client.cache().dir().display());
            print_json(&json!({"removed": removed}))?;
        }
        Command::Tools => {
            let mut tools = vec![BraveSearchClient::descriptor()];
            tools.extend(EuDataClient::descriptors());
            print_json(&tools)?;
        }
    }

    Ok(())
}

/// Builds the open-data client; `--cache-dir` and `--no-cache` override the
/// environment and config file.
fn open_data_client(
    file: &HelpersConfig,
    cache_dir: Option<PathBuf>,
    no_cache: bool,
) -> anyhow::Result<EuDataClient> {
    let mut cache = CacheConfig::resolve(file)?;
    if let Some(dir) = cache_dir {
        cache.dir = dir;
    }
    if no_cache {
        cache.enabled = false;
    }
    Ok(EuDataClient::with_cache_config(OpenDataConfig::resolve(file), &cache)?)
}

async fn generate(
    client: OllamaClient,
    prompt: String,
    options: GenerateOptions,
    blocking: bool,
) -> anyhow::Result<()> {
    info!("Generating with {}", client.model());
    let reply = if blocking {
        tokio::task::spawn_blocking(move || client.generate_blocking(&prompt, &options))
            .await
            .context("Blocking generation task failed")??
    } else {
        client.generate(&prompt, &options).await?
    };
    print_json(&reply)
}

fn download(content: DatasetContent, output: Option<&Path>) -> anyhow::Result<()> {
    let size = content.body.size();
    match (output, &content.body) {
        (Some(path), body) => {
            let bytes = match body {
                ContentBody::Text(text) => text.as_bytes(),
                ContentBody::Binary(bytes) => bytes.as_slice(),
            };
            std::fs::write(path, bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} to {}", content.source_url, path.display());
            print_json(&json!({
                "source_url": content.source_url,
                "format": content.format,
                "content_type": content.content_type,
                "size": size,
                "path": path,
            }))
        }
        (None, ContentBody::Text(_)) => print_json(&content),
        (None, ContentBody::Binary(_)) => {
            warn!("Binary content not printed; pass --output to save it");
            print_json(&json!({
                "source_url": content.source_url,
                "format": content.format,
                "content_type": content.content_type,
                "kind": "binary",
                "size": size,
            }))
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
