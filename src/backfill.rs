//! Historical backfill pagination.
//!
//! Walks `[from_block, head)` in consecutive half-open windows of fixed
//! size, querying one event kind per window in strictly increasing block
//! order. Head is read once at invocation time; blocks arriving afterwards
//! are not revisited. A provider failure on one window is logged with its
//! kind and range, the window is skipped, and the run continues — skipped
//! windows are never retried (known completeness gap, exposed through
//! [`BackfillStats`]). A fixed delay separates windows to respect upstream
//! rate limits; this serialization is deliberate.

use crate::chain::ChainClient;
use crate::error::IndexerError;
use crate::events::{EventKind, RawEvent};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

/// Deployment block of the EigenLayer core contracts on mainnet.
pub const DEFAULT_FROM_BLOCK: u64 = 19_492_759;
/// Window size the original service used against its provider quota.
pub const DEFAULT_WINDOW_SIZE: u64 = 20_000;
/// Fixed pause between windows.
pub const DEFAULT_WINDOW_DELAY: Duration = Duration::from_millis(1000);

/// Outcome of one backfill run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillStats {
    pub windows_total: u64,
    pub windows_failed: u64,
    pub events: u64,
}

pub struct BackfillPaginator {
    client: Arc<dyn ChainClient>,
    window_size: u64,
    window_delay: Duration,
}

impl BackfillPaginator {
    pub fn new(client: Arc<dyn ChainClient>, window_size: u64, window_delay: Duration) -> Self {
        Self {
            client,
            window_size,
            window_delay,
        }
    }

    /// Run one backfill for `kind`, invoking `visit` for every event in
    /// block order. Fails only if the head block cannot be read; window
    /// failures are absorbed into the stats.
    pub async fn run(
        &self,
        kind: EventKind,
        from_block: u64,
        mut visit: impl FnMut(&RawEvent) + Send,
    ) -> Result<BackfillStats, IndexerError> {
        let head = self.client.head_block().await?;
        let mut stats = BackfillStats::default();
        let mut start = from_block;

        info!(
            "🧱 [Backfill] {} from block {} to head {} in windows of {}",
            kind, from_block, head, self.window_size
        );

        while start < head {
            let end = (start + self.window_size).min(head);
            stats.windows_total += 1;

            match self.client.query_range(kind, start, end).await {
                Ok(events) => {
                    stats.events += events.len() as u64;
                    for event in &events {
                        visit(event);
                    }
                }
                Err(e) => {
                    stats.windows_failed += 1;
                    warn!(
                        "⚠️ [Backfill] Skipping {} window [{},{}): {}",
                        kind, start, end, e
                    );
                }
            }

            start = end;
            if start < head {
                tokio::time::sleep(self.window_delay).await;
            }
        }

        info!(
            "🧱 [Backfill] {} done: {} events, {}/{} windows failed",
            kind, stats.events, stats.windows_failed, stats.windows_total
        );
        Ok(stats)
    }
}
