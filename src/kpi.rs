//! Periodic KPI aggregation.
//!
//! Orchestrates one snapshot: TVL scrape, AVS-registration backfill with
//! dual-key dedup, operator-registration backfill (plain count), and
//! deposit backfill with staker dedup, then persists the assembled
//! [`KpiSnapshot`]. Every step is isolated — a failed sub-fetch logs,
//! contributes its fallback value (sentinel TVL, zero count), and the
//! snapshot is still assembled and persisted. A partial snapshot beats no
//! snapshot.

use crate::backfill::BackfillPaginator;
use crate::dedup::{AvsDedup, StakerDedup};
use crate::error::IndexerError;
use crate::events::{EventKind, KpiSnapshot};
use crate::sink::EventSink;
use crate::tvl::{TvlSource, TVL_SENTINEL};
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

pub struct KpiAggregator {
    paginator: BackfillPaginator,
    tvl: Arc<dyn TvlSource>,
    sink: Arc<dyn EventSink>,
    from_block: u64,
}

impl KpiAggregator {
    pub fn new(
        paginator: BackfillPaginator,
        tvl: Arc<dyn TvlSource>,
        sink: Arc<dyn EventSink>,
        from_block: u64,
    ) -> Self {
        Self {
            paginator,
            tvl,
            sink,
            from_block,
        }
    }

    /// Compute one snapshot. Never fails wholesale: each metric falls back
    /// independently.
    pub async fn snapshot(&self) -> KpiSnapshot {
        let tvl_eth = match self.tvl.fetch_tvl().await {
            Ok(tvl) => tvl,
            Err(e) => {
                warn!("⚠️ [KPI] TVL scrape failed, recording sentinel: {}", e);
                TVL_SENTINEL.to_string()
            }
        };

        let number_avs = self.count_avs().await;
        let number_operator = self.count_operators().await;
        let number_staker = self.count_stakers().await;

        KpiSnapshot {
            recorded_at: Utc::now(),
            tvl_eth,
            number_avs,
            number_operator,
            number_staker,
        }
    }

    /// Compute and persist one snapshot.
    pub async fn run_once(&self) -> Result<(), IndexerError> {
        let snapshot = self.snapshot().await;
        info!(
            "📊 [KPI] tvl={} avs={} operators={} stakers={}",
            snapshot.tvl_eth, snapshot.number_avs, snapshot.number_operator, snapshot.number_staker
        );
        self.sink.append_snapshot(&snapshot).await
    }

    /// AVS count: dual-key dedup over AVSMetadataURIUpdated — a registration
    /// counts only when both the address and the metadata URI are unseen.
    async fn count_avs(&self) -> i64 {
        let mut dedup = AvsDedup::new();
        let run = self
            .paginator
            .run(EventKind::AvsMetadataUriUpdated, self.from_block, |event| {
                if let (Some(avs), Some(uri)) =
                    (event.string_value("avs"), event.string_value("metadataURI"))
                {
                    dedup.accept(&avs, &uri);
                }
            })
            .await;
        match run {
            Ok(_) => dedup.accepted() as i64,
            Err(e) => {
                warn!("⚠️ [KPI] AVS backfill failed: {}", e);
                0
            }
        }
    }

    /// Operator count: plain event count of OperatorRegistered, no dedup.
    async fn count_operators(&self) -> i64 {
        let mut count = 0i64;
        let run = self
            .paginator
            .run(EventKind::OperatorRegistered, self.from_block, |_| count += 1)
            .await;
        match run {
            Ok(_) => count,
            Err(e) => {
                warn!("⚠️ [KPI] Operator backfill failed: {}", e);
                0
            }
        }
    }

    /// Staker count: distinct depositor addresses across all deposit windows.
    async fn count_stakers(&self) -> i64 {
        let mut dedup = StakerDedup::new();
        let run = self
            .paginator
            .run(EventKind::Deposit, self.from_block, |event| {
                if let Some(staker) = event.string_value("staker") {
                    dedup.note(&staker);
                }
            })
            .await;
        match run {
            Ok(_) => dedup.len() as i64,
            Err(e) => {
                warn!("⚠️ [KPI] Staker backfill failed: {}", e);
                0
            }
        }
    }
}
