//! Service configuration.
//!
//! Every setting can come from a flag or an environment variable; `main`
//! loads a `.env` file first so local development needs neither.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};

use crate::consts::{DEFAULT_API_BASE_URL, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODEL, DEMO_API_KEY};
use crate::generator::GenerationOptions;
use crate::generator::retry::RetryPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "finreport",
    version,
    about = "Generates financial reports with a hosted language model."
)]
pub struct Settings {
    /// Address the HTTP listener binds to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Report database (sqlite:///relative.db, sqlite:////abs.db, a bare path, or :memory:)
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:///./financial_reports.db"
    )]
    pub database_url: String,

    /// Gemini API key. Without one the service runs in demo mode.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model variant
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Gemini API base URL
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Upper bound on generated output, in tokens
    #[arg(long, env = "GEMINI_MAX_OUTPUT_TOKENS", default_value_t = DEFAULT_MAX_OUTPUT_TOKENS)]
    pub max_output_tokens: u32,

    /// Per-attempt timeout for a generation call, in seconds
    #[arg(
        long,
        env = "GENERATION_TIMEOUT_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub generation_timeout: u64,

    /// Total attempts for a generation call that fails transiently
    #[arg(
        long,
        env = "GENERATION_MAX_ATTEMPTS",
        default_value_t = 2,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_attempts: u32,

    /// Base delay before retrying, in milliseconds (doubles each attempt)
    #[arg(long, env = "GENERATION_RETRY_BACKOFF_MS", default_value_t = 500)]
    pub retry_backoff_ms: u64,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Settings {
    /// The configured API key, unless it is blank or the sample placeholder.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != DEMO_API_KEY)
    }

    /// Filesystem path (or `:memory:`) for the SQLite database.
    pub fn database_path(&self) -> Result<String> {
        sqlite_path(&self.database_url)
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            model: self.model.clone(),
            max_output_tokens: self.max_output_tokens,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            timeout: Duration::from_secs(self.generation_timeout),
            base_delay: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

/// Turn a SQLAlchemy-style `sqlite://` URL (or a bare path) into a path
/// rusqlite can open.
pub fn sqlite_path(url: &str) -> Result<String> {
    let url = url.trim();
    if url.is_empty() {
        bail!("database URL is empty");
    }
    if url == ":memory:" {
        return Ok(url.to_string());
    }

    let path = if let Some(rest) = url.strip_prefix("sqlite:///") {
        // sqlite:///relative and sqlite:////absolute
        rest
    } else if let Some(rest) = url.strip_prefix("sqlite://") {
        rest
    } else if let Some(rest) = url.strip_prefix("sqlite:") {
        rest
    } else if let Some((scheme, _)) = url.split_once("://") {
        bail!("unsupported database scheme '{scheme}': only sqlite is available");
    } else {
        url
    };

    if path.is_empty() {
        bail!("database URL '{url}' has no path");
    }
    Ok(path.to_string())
}
