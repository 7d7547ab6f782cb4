// src/ingest/providers/newsapi.rs
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::article::Category;
use crate::config::IngestConfig;
use crate::ingest::normalize_text;
use crate::ingest::types::{ArticleCandidate, NewsProvider};

#[derive(Debug, Deserialize)]
struct HeadlinesResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    published_at: Option<String>,
    url_to_image: Option<String>,
    #[serde(default)]
    authors: Vec<AuthorRef>,
}

#[derive(Debug, Deserialize)]
struct AuthorRef {
    name: String,
}

fn parse_rfc3339_to_utc(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a top-headlines response body into candidates. Entries without a
/// title or url are dropped; missing optional fields default to empty.
pub fn parse_headlines(body: &str) -> Result<Vec<ArticleCandidate>> {
    let resp: HeadlinesResponse =
        serde_json::from_str(body).context("parsing top-headlines response")?;
    if !resp.status.is_empty() && resp.status != "ok" {
        bail!("provider returned status {:?}", resp.status);
    }

    let mut out = Vec::with_capacity(resp.articles.len());
    for raw in resp.articles {
        let (Some(title), Some(url)) = (raw.title, raw.url) else {
            continue;
        };
        let headline = normalize_text(&title);
        if headline.is_empty() || url.is_empty() {
            continue;
        }
        out.push(ArticleCandidate {
            headline,
            link: url,
            description: raw
                .description
                .as_deref()
                .map(normalize_text)
                .unwrap_or_default(),
            image_url: raw.url_to_image.unwrap_or_default(),
            authors: raw.authors.into_iter().map(|a| a.name).collect(),
            published_at: raw.published_at.as_deref().and_then(parse_rfc3339_to_utc),
        });
    }
    Ok(out)
}

/// HTTP client for a NewsAPI-style `/top-headlines` endpoint. The request
/// timeout is bounded by configuration; a slow provider costs at most one
/// category, not the whole cycle.
pub struct NewsApiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl NewsApiProvider {
    pub fn new(cfg: &IngestConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs.max(1)))
            .build()
            .context("building provider http client")?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            language: cfg.language.clone(),
        })
    }
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    async fn top_headlines(
        &self,
        category: Category,
        country: &str,
    ) -> Result<Vec<ArticleCandidate>> {
        let t0 = std::time::Instant::now();

        let url = format!("{}/top-headlines", self.base_url);
        let body = self
            .client
            .get(&url)
            .query(&[
                ("category", category.as_str()),
                ("country", country),
                ("language", self.language.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("requesting top headlines for {category}"))?
            .error_for_status()
            .context("top headlines request rejected")?
            .text()
            .await
            .context("reading top headlines body")?;

        let candidates = parse_headlines(&body)?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_fetch_ms").record(ms);
        counter!("ingest_candidates_total").increment(candidates.len() as u64);

        Ok(candidates)
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_without_title_or_url_are_dropped() {
        let body = r#"{
            "status": "ok",
            "articles": [
                {"title": "Kept", "url": "https://example.test/a"},
                {"url": "https://example.test/no-title"},
                {"title": "No url"}
            ]
        }"#;
        let out = parse_headlines(body).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].headline, "Kept");
    }

    #[test]
    fn error_status_is_an_error() {
        let body = r#"{"status": "error", "articles": []}"#;
        assert!(parse_headlines(body).is_err());
    }

    #[test]
    fn optional_fields_default_to_empty() {
        let body = r#"{
            "status": "ok",
            "articles": [{"title": "T", "url": "https://example.test/t"}]
        }"#;
        let out = parse_headlines(body).unwrap();
        assert_eq!(out[0].description, "");
        assert_eq!(out[0].image_url, "");
        assert!(out[0].authors.is_empty());
        assert!(out[0].published_at.is_none());
    }

    #[test]
    fn published_at_parses_rfc3339() {
        let body = r#"{
            "status": "ok",
            "articles": [{
                "title": "T",
                "url": "https://example.test/t",
                "publishedAt": "2026-08-01T06:30:00Z",
                "authors": [{"name": "A. Writer"}, {"name": "B. Reporter"}]
            }]
        }"#;
        let out = parse_headlines(body).unwrap();
        let ts = out[0].published_at.expect("timestamp parsed");
        assert_eq!(ts.to_rfc3339(), "2026-08-01T06:30:00+00:00");
        assert_eq!(out[0].authors, vec!["A. Writer", "B. Reporter"]);
    }
}
