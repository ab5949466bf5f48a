use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted news analysis row. `url` carries a unique constraint so the
/// pipeline can re-run without producing duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NewsAnalysis {
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub url: String,
    pub published_date: NaiveDate,
    pub score: i32,
    pub tickers: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// The pipeline's output shape, before persistence assigns an id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsEntity {
    pub title: String,
    pub summary: String,
    pub url: String,
    pub published_date: NaiveDate,
    pub score: i32,
    #[serde(default)]
    pub tickers: Vec<String>,
}
