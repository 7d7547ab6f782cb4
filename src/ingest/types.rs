// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::article::Category;

/// One candidate article as handed over by a provider, already normalized.
/// `link` is the deduplication key; optional provider fields default to
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ArticleCandidate {
    pub headline: String,
    pub link: String,
    pub description: String,
    pub image_url: String,
    pub authors: Vec<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// The external provider boundary: a pure read, one category per call.
/// An empty result is not an error.
#[async_trait::async_trait]
pub trait NewsProvider: Send + Sync {
    async fn top_headlines(
        &self,
        category: Category,
        country: &str,
    ) -> Result<Vec<ArticleCandidate>>;
    fn name(&self) -> &'static str;
}
