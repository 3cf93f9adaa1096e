use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::cadastre::{Endpoints, ParcelFetcher, NSW_QUERY_URL, QLD_QUERY_URL};
use crate::error::ConfigError;
use crate::models::StyleConfig;

/// Settings loaded from a TOML file. Every section is optional.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub endpoints: EndpointConfig,
    pub style: StyleConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EndpointConfig {
    pub queensland: String,
    pub new_south_wales: String,
    pub user_agent: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            queensland: QLD_QUERY_URL.to_string(),
            new_south_wales: NSW_QUERY_URL.to_string(),
            user_agent: concat!("parcelkit/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn endpoints(&self) -> Result<Endpoints, ConfigError> {
        Endpoints::new(&self.endpoints.queensland, &self.endpoints.new_south_wales)
    }

    /// Fetcher for the configured endpoints and user agent
    pub fn fetcher(&self) -> Result<ParcelFetcher, ConfigError> {
        let endpoints = self.endpoints()?;
        Ok(ParcelFetcher::with_user_agent(endpoints, &self.endpoints.user_agent)?)
    }
}
