use crate::scoring::ScoringConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_PERSONA: &str = "default";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where amenities and district statistics come from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceConfig>,

    /// Persona used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_persona: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring: Option<ScoringConfig>,
}

/// Data source settings. `api_url` and `dataset` are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Base URL of the LifeQual API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Path to a static JSON dataset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<PathBuf>,

    /// HTTP request timeout, e.g. "10s"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// How long district statistics stay cached, e.g. "24h"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_ttl: Option<String>,
}

/// Resolved choice of data source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceKind {
    Api(String),
    Dataset(PathBuf),
}

impl SourceConfig {
    pub fn kind(&self) -> Result<SourceKind> {
        match (&self.api_url, &self.dataset) {
            (Some(_), Some(_)) => {
                anyhow::bail!("source.api_url and source.dataset cannot both be set")
            }
            (None, Some(path)) => Ok(SourceKind::Dataset(path.clone())),
            (Some(url), None) => Ok(SourceKind::Api(url.clone())),
            (None, None) => Ok(SourceKind::Api(DEFAULT_API_URL.to_string())),
        }
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.timeout.as_deref(), DEFAULT_TIMEOUT, "source.timeout")
    }

    pub fn cache_ttl(&self) -> Result<Duration> {
        parse_duration(
            self.cache_ttl.as_deref(),
            crate::source::cache::DEFAULT_CACHE_TTL,
            "source.cache_ttl",
        )
    }
}

fn parse_duration(value: Option<&str>, default: Duration, field: &str) -> Result<Duration> {
    match value {
        None => Ok(default),
        Some(s) => humantime::parse_duration(s.trim())
            .with_context(|| format!("{}: invalid duration '{}'", field, s)),
    }
}

impl Config {
    pub fn source(&self) -> SourceConfig {
        self.source.clone().unwrap_or_default()
    }

    pub fn default_persona(&self) -> &str {
        self.default_persona.as_deref().unwrap_or(DEFAULT_PERSONA)
    }

    pub fn scoring(&self) -> ScoringConfig {
        self.scoring.clone().unwrap_or_default()
    }
}
