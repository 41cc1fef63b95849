use std::{path::Path, time::Duration};

use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use docs_lookup_client::{ApiKey, ClientConfig, DEFAULT_USER_AGENT, SERPER_URL};
use serde::Deserialize;

use crate::error::ConfigError;

/// Prefix for environment overrides, e.g. `DOCS_LOOKUP_FETCH_CONCURRENCY`.
pub const ENV_PREFIX: &str = "DOCS_LOOKUP";
/// Credential variable consulted when no `api_key` is configured.
pub const API_KEY_ENV: &str = "SERPER_API_KEY";

pub const DEFAULT_RESULT_COUNT: usize = 2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_FETCH_CONCURRENCY: usize = 2;

/// Runtime settings for a [`DocsLookup`](crate::DocsLookup).
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub api_key: ApiKey,
    pub search_endpoint: String,
    pub result_count: usize,
    pub search_timeout: Duration,
    pub fetch_timeout: Duration,
    pub fetch_concurrency: usize,
    pub user_agent: String,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    api_key: Option<String>,
    search_endpoint: String,
    result_count: usize,
    search_timeout_secs: u64,
    fetch_timeout_secs: u64,
    fetch_concurrency: usize,
    user_agent: String,
}

impl LookupConfig {
    /// Defaults for everything but the credential.
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            search_endpoint: SERPER_URL.to_string(),
            result_count: DEFAULT_RESULT_COUNT,
            search_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Layer defaults, an optional TOML file and `DOCS_LOOKUP_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Self::builder()?;
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Self::from_settings(settings, std::env::var(API_KEY_ENV).ok())
    }

    pub(crate) fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("search_endpoint", SERPER_URL)?
            .set_default("result_count", default_value(DEFAULT_RESULT_COUNT))?
            .set_default("search_timeout_secs", default_value(DEFAULT_TIMEOUT_SECS))?
            .set_default("fetch_timeout_secs", default_value(DEFAULT_TIMEOUT_SECS))?
            .set_default("fetch_concurrency", default_value(DEFAULT_FETCH_CONCURRENCY))?
            .set_default("user_agent", DEFAULT_USER_AGENT)?)
    }

    pub(crate) fn from_settings(
        settings: Config,
        fallback_api_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let raw: RawConfig = settings.try_deserialize()?;

        // A blank configured key falls through to the fallback variable.
        let api_key = [raw.api_key, fallback_api_key]
            .into_iter()
            .flatten()
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
            .ok_or(ConfigError::MissingCredential)?;

        let config = Self {
            api_key: ApiKey::new(api_key),
            search_endpoint: raw.search_endpoint,
            result_count: raw.result_count,
            search_timeout: Duration::from_secs(raw.search_timeout_secs),
            fetch_timeout: Duration::from_secs(raw.fetch_timeout_secs),
            fetch_concurrency: raw.fetch_concurrency,
            user_agent: raw.user_agent,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject a blank credential and zero limits or timeouts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.expose().trim().is_empty() {
            return Err(ConfigError::MissingCredential);
        }
        for (name, value) in [
            ("result_count", self.result_count),
            ("fetch_concurrency", self.fetch_concurrency),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be at least 1")));
            }
        }
        for (name, value) in [
            ("search_timeout_secs", self.search_timeout),
            ("fetch_timeout_secs", self.fetch_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::Invalid(format!("{name} must be at least 1")));
            }
        }
        Ok(())
    }

    pub fn search_client_config(&self) -> ClientConfig {
        ClientConfig {
            user_agent: self.user_agent.clone(),
            timeout: self.search_timeout,
        }
    }

    pub fn fetch_client_config(&self) -> ClientConfig {
        ClientConfig {
            user_agent: self.user_agent.clone(),
            timeout: self.fetch_timeout,
        }
    }
}

fn default_value(value: impl TryInto<i64>) -> i64 {
    value.try_into().unwrap_or(i64::MAX)
}
