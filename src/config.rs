use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::aggregator::CacheTtls;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_BIND: &str = "0.0.0.0";
const DEFAULT_SEARCH_TTL_SECS: u64 = 5 * 60;
const DEFAULT_FREE_BOOKS_TTL_SECS: u64 = 30 * 60;
const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 6;

/// Optional config file shape. Every field falls back to the built-in
/// default, and environment variables override the file.
#[derive(Debug, Deserialize, Clone, Default)]
struct FileConfig {
    #[serde(default)]
    bind: Option<String>,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    search_ttl_secs: Option<u64>,
    #[serde(default)]
    free_books_ttl_secs: Option<u64>,
    #[serde(default)]
    source_timeout_secs: Option<u64>,
    #[serde(default)]
    ai_api_key: Option<String>,
}

/// Runtime configuration: defaults, overlaid by an optional TOML file,
/// overlaid by `BOOKVAULT_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub ttls: CacheTtls,
    pub source_timeout: Duration,
    /// Optional key for the AI-enhancement path. Absence never changes core
    /// behavior; it is only reported by the health endpoint.
    pub ai_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            ttls: CacheTtls {
                search: Duration::from_secs(DEFAULT_SEARCH_TTL_SECS),
                free_books: Duration::from_secs(DEFAULT_FREE_BOOKS_TTL_SECS),
            },
            source_timeout: Duration::from_secs(DEFAULT_SOURCE_TIMEOUT_SECS),
            ai_api_key: None,
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_var(name).and_then(|v| v.parse().ok())
}

impl Config {
    /// Environment-only configuration.
    pub fn from_env() -> Self {
        Self::default().overlay_env()
    }

    /// File plus environment; the file must parse if it exists.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            let file: FileConfig = toml::from_str(&raw)
                .with_context(|| format!("parsing config file {}", path.display()))?;
            config = config.overlay_file(file);
        }
        Ok(config.overlay_env())
    }

    fn overlay_file(mut self, file: FileConfig) -> Self {
        if let Some(bind) = file.bind {
            self.bind = bind;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(secs) = file.search_ttl_secs {
            self.ttls.search = Duration::from_secs(secs);
        }
        if let Some(secs) = file.free_books_ttl_secs {
            self.ttls.free_books = Duration::from_secs(secs);
        }
        if let Some(secs) = file.source_timeout_secs {
            self.source_timeout = Duration::from_secs(secs);
        }
        if file.ai_api_key.is_some() {
            self.ai_api_key = file.ai_api_key;
        }
        self
    }

    fn overlay_env(mut self) -> Self {
        if let Some(bind) = env_var("BOOKVAULT_BIND") {
            self.bind = bind;
        }
        if let Some(port) = env_parse("BOOKVAULT_PORT") {
            self.port = port;
        }
        if let Some(secs) = env_parse("BOOKVAULT_SEARCH_TTL_SECS") {
            self.ttls.search = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse("BOOKVAULT_FREE_BOOKS_TTL_SECS") {
            self.ttls.free_books = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse("BOOKVAULT_SOURCE_TIMEOUT_SECS") {
            self.source_timeout = Duration::from_secs(secs);
        }
        if let Some(key) = env_var("BOOKVAULT_AI_API_KEY") {
            self.ai_api_key = Some(key);
        }
        self
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
