use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::models::Audience;
use crate::pipeline::citation::{CitationFilter, SourceKind};
use crate::upstream::provider::{UpstreamConfig, BAICHUAN_ENDPOINT, DEEPSEEK_ENDPOINT};

/// Application-level constants
pub const APP_NAME: &str = "Medcite";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Metadata cache entries kept before least-recently-touched eviction.
pub const METADATA_CACHE_CAPACITY: usize = 200;
/// Hard deadline for fetching a citation page.
pub const PAGE_FETCH_TIMEOUT_SECS: u64 = 7;
/// A stream that yields no text within this window is abandoned.
pub const STREAM_FIRST_DELTA_TIMEOUT_SECS: u64 = 15;
pub const UPSTREAM_MAX_ATTEMPTS: u32 = 3;
pub const UPSTREAM_BASE_BACKOFF_MS: u64 = 200;
pub const UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "medcite_lib=info,tower_http=info"
}

/// Get the application data directory
/// ~/.medcite/ (falls back to the working directory without a home)
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".medcite")
}

/// Default location of the persisted client state.
pub fn client_state_path() -> PathBuf {
    app_data_dir().join("client_state.json")
}

/// Deployment environment. Missing credentials are fatal only in
/// production; development serves a canned reply instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// Medcite - citation-aware medical chat gateway
#[derive(Parser, Debug, Clone)]
#[command(name = "medcite", version)]
#[command(about = "Citation-aware medical chat gateway and client")]
pub struct Cli {
    /// Deployment environment
    #[arg(long, env = "MEDCITE_ENV", value_enum, default_value_t = Environment::Development, global = true)]
    pub env: Environment,

    #[command(flatten)]
    pub upstream: UpstreamArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Provider endpoints and credentials
#[derive(Args, Debug, Clone)]
pub struct UpstreamArgs {
    /// Baichuan API key
    #[arg(long, env = "BAICHUAN_API_KEY", hide_env_values = true, global = true)]
    pub baichuan_api_key: Option<String>,

    /// DeepSeek API key
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true, global = true)]
    pub deepseek_api_key: Option<String>,

    /// Baichuan chat-completion endpoint
    #[arg(long, env = "MEDCITE_BAICHUAN_ENDPOINT", default_value = BAICHUAN_ENDPOINT, global = true)]
    pub baichuan_endpoint: String,

    /// DeepSeek chat-completion endpoint
    #[arg(long, env = "MEDCITE_DEEPSEEK_ENDPOINT", default_value = DEEPSEEK_ENDPOINT, global = true)]
    pub deepseek_endpoint: String,
}

impl UpstreamArgs {
    pub fn to_config(&self) -> UpstreamConfig {
        UpstreamConfig {
            baichuan_endpoint: self.baichuan_endpoint.clone(),
            deepseek_endpoint: self.deepseek_endpoint.clone(),
            baichuan_api_key: self.baichuan_api_key.clone(),
            deepseek_api_key: self.deepseek_api_key.clone(),
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the HTTP API
    Serve(ServeArgs),
    /// Ask one question and print the checked answer
    Ask(AskArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "MEDCITE_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,
}

#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    /// Question to send
    pub question: String,

    /// Model override (stored in the client state)
    #[arg(long)]
    pub model: Option<String>,

    /// Audience mode: doctor or patient
    #[arg(long, default_value_t = Audience::Patient)]
    pub audience: Audience,

    /// Lower temperature and allow a longer answer
    #[arg(long)]
    pub detailed: bool,

    /// Request a non-streamed answer
    #[arg(long)]
    pub no_stream: bool,

    /// Write a printable HTML document of the answer here
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Write a printable HTML document of the whole session here
    #[arg(long)]
    pub export_session: Option<PathBuf>,

    /// Only list citations of this kind (Guideline, Agency, Journal, Meta, PubMed, Source)
    #[arg(long, value_parser = parse_source_kind)]
    pub source_kind: Option<SourceKind>,

    /// Only list citations whose title carries this year or later
    #[arg(long)]
    pub min_year: Option<u16>,

    /// Start a new conversation instead of continuing the stored one
    #[arg(long)]
    pub reset: bool,

    /// Client state file
    #[arg(long, env = "MEDCITE_STATE_FILE")]
    pub state_file: Option<PathBuf>,
}

impl AskArgs {
    pub fn state_path(&self) -> PathBuf {
        self.state_file.clone().unwrap_or_else(client_state_path)
    }

    pub fn citation_filter(&self) -> CitationFilter {
        CitationFilter {
            kind: self.source_kind,
            min_year: self.min_year,
        }
    }
}

fn parse_source_kind(raw: &str) -> Result<SourceKind, String> {
    [
        SourceKind::Guideline,
        SourceKind::Agency,
        SourceKind::Journal,
        SourceKind::Meta,
        SourceKind::PubMed,
        SourceKind::Source,
    ]
    .into_iter()
    .find(|k| k.as_str().eq_ignore_ascii_case(raw.trim()))
    .ok_or_else(|| format!("unknown source kind: {raw}"))
}
