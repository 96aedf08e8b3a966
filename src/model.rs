use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// One row of the price list. Text columns are already normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceEntry {
    pub description: String,
    pub container: String,
    /// `None` when the source cell was not a number.
    pub mass: Option<f64>,
    pub average_price: Option<f64>,
}

/// Result of comparing two crops, formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub label1: String,
    pub ratio1: String,
    pub label2: String,
    pub ratio2: String,
    pub price1: String,
    pub price2: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub id: i64,
    pub name: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Message from {}", self.name.as_deref().unwrap_or("Anonymous"))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureUsage {
    pub id: i64,
    pub feature_name: String,
    pub details: Option<String>,
    pub used_at: DateTime<Utc>,
}

impl fmt::Display for FeatureUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}",
            self.feature_name,
            self.details.as_deref().unwrap_or("None"),
            self.used_at.to_rfc3339()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCount {
    pub feature_name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InboxReport {
    pub messages: Vec<Feedback>,
    pub total_usage: u64,
    pub feature_counts: Vec<FeatureCount>,
    pub daily_counts: Vec<DailyCount>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("price list responded with status {0}")]
    Status(u16),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("price list is missing column {0}")]
    MissingColumn(String),

    #[error("price list is not valid UTF-8")]
    Encoding,
}

/// Why a price could not be produced for a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("Crop not found on list.")]
    NotFound,

    #[error("Error computing price.")]
    Compute,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
