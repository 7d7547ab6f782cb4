// src/ingest/mod.rs
pub mod providers;
pub mod scheduler;
pub mod types;

use anyhow::{Context, Result};
use chrono::Utc;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::article::Category;
use crate::config::IngestConfig;
use crate::ingest::types::{ArticleCandidate, NewsProvider};
use crate::store::NewsStore;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_candidates_total",
            "Candidate articles returned by the provider."
        );
        describe_counter!(
            "ingest_articles_inserted_total",
            "New articles committed to the store."
        );
        describe_counter!(
            "ingest_duplicates_skipped_total",
            "Candidates skipped because their link already exists."
        );
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/parse errors (category skipped)."
        );
        describe_counter!(
            "ingest_store_errors_total",
            "Store errors during a category batch (category skipped)."
        );
        describe_counter!("ingest_runs_total", "Completed ingestion cycles.");
        describe_histogram!("ingest_fetch_ms", "Provider fetch+parse time in milliseconds.");
        describe_gauge!(
            "ingest_last_run_ts",
            "Unix ts when the last ingestion cycle finished."
        );
    });
}

/// Normalize provider text: decode HTML entities, strip tags, collapse
/// whitespace.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub inserted: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestRunSummary {
    pub inserted: usize,
    pub skipped: usize,
    pub failed_categories: usize,
}

/// Dedup writer: commit one category's candidates as a single batch.
/// A candidate whose link already exists is a silent no-op. The lookup runs
/// inside the batch transaction, so repeated links within one payload are
/// also caught; the UNIQUE constraint on `link` backs both cases.
pub async fn store_candidates(
    store: &NewsStore,
    category: Category,
    candidates: Vec<ArticleCandidate>,
) -> Result<IngestStats> {
    let mut stats = IngestStats::default();
    let now = Utc::now();

    let mut tx = store
        .pool()
        .begin()
        .await
        .context("beginning ingest batch")?;

    for cand in candidates {
        let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM news WHERE link = ?")
            .bind(&cand.link)
            .fetch_optional(&mut *tx)
            .await
            .context("looking up candidate by link")?;
        if existing.is_some() {
            debug!(target: "ingest", link = %cand.link, "skipping duplicate article");
            stats.skipped += 1;
            continue;
        }

        sqlx::query(
            "INSERT INTO news \
             (category, headline, authors, link, image_url, short_description, date, last_accessed) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(category.as_str())
        .bind(&cand.headline)
        .bind(cand.authors.join(", "))
        .bind(&cand.link)
        .bind(&cand.image_url)
        .bind(&cand.description)
        .bind(cand.published_at.unwrap_or(now))
        .bind(now)
        .execute(&mut *tx)
        .await
        .context("inserting article")?;
        stats.inserted += 1;
    }

    tx.commit().await.context("committing ingest batch")?;

    counter!("ingest_articles_inserted_total").increment(stats.inserted as u64);
    counter!("ingest_duplicates_skipped_total").increment(stats.skipped as u64);

    Ok(stats)
}

/// Run one ingestion cycle over all configured categories. A failing
/// category is logged and skipped; the cycle always visits the rest.
pub async fn run_once(
    store: &NewsStore,
    provider: &dyn NewsProvider,
    cfg: &IngestConfig,
) -> IngestRunSummary {
    ensure_metrics_described();

    let mut summary = IngestRunSummary::default();

    for &category in &cfg.categories {
        let candidates = match provider.top_headlines(category, &cfg.country).await {
            Ok(c) => c,
            Err(e) => {
                warn!(
                    target: "ingest",
                    error = ?e,
                    provider = provider.name(),
                    category = %category,
                    "provider fetch failed, skipping category"
                );
                counter!("ingest_provider_errors_total").increment(1);
                summary.failed_categories += 1;
                continue;
            }
        };

        if candidates.is_empty() {
            debug!(target: "ingest", category = %category, "no articles for category");
            continue;
        }

        match store_candidates(store, category, candidates).await {
            Ok(stats) => {
                summary.inserted += stats.inserted;
                summary.skipped += stats.skipped;
            }
            Err(e) => {
                warn!(
                    target: "ingest",
                    error = ?e,
                    category = %category,
                    "storing candidates failed, skipping category"
                );
                counter!("ingest_store_errors_total").increment(1);
                summary.failed_categories += 1;
            }
        }
    }

    counter!("ingest_runs_total").increment(1);
    gauge!("ingest_last_run_ts").set(Utc::now().timestamp().max(0) as f64);

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_decodes_and_collapses() {
        let s = "  <b>Hello&nbsp;&nbsp;world</b>  again ";
        assert_eq!(normalize_text(s), "Hello world again");
    }

    #[test]
    fn normalize_text_strips_multiline_tags() {
        let s = "Before <a\nhref=\"x\">link</a> after";
        assert_eq!(normalize_text(s), "Before link after");
    }

    #[test]
    fn normalize_text_empty_stays_empty() {
        assert_eq!(normalize_text("  \n "), "");
    }
}
