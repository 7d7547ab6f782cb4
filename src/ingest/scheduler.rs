// src/ingest/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;

use crate::config::IngestConfig;
use crate::ingest::types::NewsProvider;
use crate::store::NewsStore;

/// How often the loop checks whether a cycle is due.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Spawn the ingestion scheduler: one cycle immediately, then one per
/// configured period. The next cycle is scheduled only after the current
/// one completes, so cycles never overlap, and a failing category never
/// stops the loop.
pub fn spawn_ingest_scheduler(
    store: NewsStore,
    provider: Arc<dyn NewsProvider>,
    cfg: IngestConfig,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_secs(cfg.interval_secs.max(1));
        let mut next_due = Instant::now();

        loop {
            if Instant::now() >= next_due {
                let summary = crate::ingest::run_once(&store, provider.as_ref(), &cfg).await;
                info!(
                    target: "ingest",
                    inserted = summary.inserted,
                    skipped = summary.skipped,
                    failed_categories = summary.failed_categories,
                    "ingest cycle finished"
                );
                next_due = Instant::now() + period;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    })
}
