use crate::model::ConfigError;
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Filesystem path or http(s) URL of the price list CSV.
    pub price_list: String,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Keys accepted in the `X-API-Key` header for the inbox and refresh routes.
    #[serde(default)]
    pub inbox_api_keys: Vec<String>,
    #[serde(default)]
    pub refresh_interval_seconds: Option<u64>,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_database_path() -> String {
    "data.db".to_string()
}

fn default_http_timeout() -> u64 {
    10
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    Ok(config)
}
