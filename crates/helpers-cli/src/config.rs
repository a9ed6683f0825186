use clap::{Parser, Subcommand, ValueEnum};
use helpers_client::eudata::{SortBy, SortOrder};
use std::path::PathBuf;

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "helpers")]
#[command(
    author,
    version,
    about = "Web search, local LLM and EU open-data helpers for agents"
)]
#[command(after_help = "Examples:
  helpers web-search \"open source agents\" --count 3
  helpers generate \"Why is the sky blue?\" --model llama3.2
  helpers datasets \"air quality\" --limit 5
  helpers metadata http://data.europa.eu/88u/dataset/<uuid>
  helpers download http://data.europa.eu/88u/dataset/<uuid> --format CSV --output air.csv")]
pub struct Config {
    /// Path to the TOML configuration file
    #[arg(long, global = true, env = "AGENT_HELPERS_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug details (requests, cache hits and misses) to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory of the open-data response cache
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Do not read or write the open-data response cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search the web with Brave Search
    #[command(
        after_help = "Example: helpers web-search \"rust async runtimes\" --count 5 --country DE"
    )]
    WebSearch {
        /// Search query text
        query: String,
        /// Number of results (at most 20)
        #[arg(short = 'n', long, default_value = "10")]
        count: u32,
        /// Country code for results
        #[arg(long)]
        country: Option<String>,
        /// Language of results
        #[arg(long)]
        lang: Option<String>,
        /// Brave Search API key (overrides BRAVE_SEARCH_API_KEY and the config file)
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Generate a reply with a local Ollama model
    #[command(
        after_help = "Example: helpers generate \"Summarize DCAT in one line\" --system \"Be terse.\""
    )]
    Generate {
        /// Prompt text
        prompt: String,
        /// Model name (overrides OLLAMA_MODEL and the config file)
        #[arg(short, long)]
        model: Option<String>,
        /// Sampling temperature
        #[arg(short, long)]
        temperature: Option<f32>,
        /// System message prepended to the conversation
        #[arg(short, long)]
        system: Option<String>,
        /// Use the blocking call path
        #[arg(long)]
        blocking: bool,
    },
    /// Search datasets on data.europa.eu
    #[command(after_help = "Examples:
  helpers datasets \"air quality\" --limit 5
  helpers datasets energy --publisher Eurostat --from 2023-01-01 --sort title --order asc")]
    Datasets {
        /// Keyword matched against dataset keywords
        keyword: String,
        /// Maximum number of datasets (1-1000)
        #[arg(short, long, default_value = "10")]
        limit: u32,
        /// Number of datasets to skip
        #[arg(long, default_value = "0")]
        offset: u32,
        /// Publisher name pattern
        #[arg(short, long)]
        publisher: Option<String>,
        /// Theme IRI or fragment (e.g. ENVI)
        #[arg(long)]
        topic: Option<String>,
        /// ISO 639-1 language code
        #[arg(long)]
        language: Option<String>,
        /// Modified or issued on or after (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        from: Option<String>,
        /// Modified or issued on or before (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        to: Option<String>,
        /// Sort field
        #[arg(long, default_value = "date")]
        sort: SortField,
        /// Sort direction
        #[arg(long, default_value = "desc")]
        order: SortDirection,
        /// Skip the cache lookup
        #[arg(long)]
        refresh: bool,
    },
    /// Show metadata of a data.europa.eu dataset
    Metadata {
        /// Dataset URI
        uri: String,
        /// Skip the cache lookup
        #[arg(long)]
        refresh: bool,
    },
    /// List the distributions of a dataset
    Formats {
        /// Dataset URI
        uri: String,
    },
    /// Download the best distribution of a dataset
    Download {
        /// Dataset URI
        uri: String,
        /// Preferred format, repeatable, in order of preference
        #[arg(short, long = "format", value_name = "FORMAT")]
        formats: Vec<String>,
        /// Write the content to this file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Skip the cached metadata and download
        #[arg(long)]
        refresh: bool,
    },
    /// Store the Brave Search API key in the config file
    ConfigureSearch {
        /// API key to store
        api_key: String,
    },
    /// Remove cached open-data responses
    ClearCache {
        /// Only remove the cached metadata and downloads of this dataset
        #[arg(long)]
        uri: Option<String>,
    },
    /// Print the tool descriptors for agent frameworks
    Tools,
}

/// Dataset sort field
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortField {
    /// Last modification date
    Date,
    /// Title
    Title,
    /// Catalog order
    None,
}

impl From<SortField> for SortBy {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Date => SortBy::Date,
            SortField::Title => SortBy::Title,
            SortField::None => SortBy::None,
        }
    }
}

/// Dataset sort direction
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl From<SortDirection> for SortOrder {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => SortOrder::Asc,
            SortDirection::Desc => SortOrder::Desc,
        }
    }
}
