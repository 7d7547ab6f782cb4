// src/config.rs
// Ingestion configuration consumed by the ingest pipeline, scheduler, and
// NewsAPI provider. The field set and types below are exactly those the
// existing code reads (see `crate::ingest`, `crate::ingest::scheduler`, and
// `crate::ingest::providers::newsapi`); no loader is wired up yet.

use crate::article::Category;

/// Configuration for one ingestion deployment.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Categories visited on each ingestion cycle.
    pub categories: Vec<Category>,
    /// Country code passed to the provider.
    pub country: String,
    /// Seconds between ingestion cycles.
    pub interval_secs: u64,
    /// Per-request HTTP timeout, in seconds.
    pub http_timeout_secs: u64,
    /// Base URL of the NewsAPI-style endpoint.
    pub base_url: String,
    /// Provider API key.
    pub api_key: String,
    /// Language code passed to the provider.
    pub language: String,
}
