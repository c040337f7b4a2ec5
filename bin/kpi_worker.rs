//! # KPI Worker
//!
//! Periodic process that assembles and persists ecosystem KPI snapshots:
//! TVL (scraped), AVS count (dual-key dedup), operator count, staker count
//! (address dedup over deposit backfill).
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin kpi_worker
//! ```
//!
//! Runs one snapshot per `kpi_interval_seconds` (default hourly). Each
//! sub-fetch fails independently; a snapshot is persisted even when some
//! metrics fall back.

use anyhow::{ensure, Result};
use eigenscan_indexer::chain::eigen::EigenConnector;
use eigenscan_indexer::chain::ChainConnector;
use eigenscan_indexer::tvl::TvlScraper;
use eigenscan_indexer::{BackfillPaginator, KpiAggregator, PostgresSink, Settings};
use log::{error, info};
use std::sync::Arc;
use tokio::time::interval;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let settings = Settings::load()?;
    ensure!(!settings.rpc_http_url.is_empty(), "EIGENSCAN_RPC_HTTP_URL must be set");
    ensure!(!settings.rpc_ws_url.is_empty(), "EIGENSCAN_RPC_WS_URL must be set");
    ensure!(!settings.database_url.is_empty(), "EIGENSCAN_DATABASE_URL must be set");

    let sink = Arc::new(PostgresSink::connect(&settings.database_url).await?);
    let connector = EigenConnector::new(
        settings.rpc_http_url.clone(),
        settings.rpc_ws_url.clone(),
    );

    let mut ticker = interval(settings.kpi_interval());
    info!(
        "🚀 [KpiWorker] Snapshot every {:?}, backfill from block {}",
        settings.kpi_interval(),
        settings.backfill.from_block
    );

    loop {
        ticker.tick().await;

        // Fresh transport and dedup state per run.
        let client = match connector.connect().await {
            Ok(client) => client,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                error!("❌ [KpiWorker] Node connect failed, skipping cycle: {}", e);
                continue;
            }
        };

        let aggregator = KpiAggregator::new(
            BackfillPaginator::new(
                client,
                settings.backfill.window_size,
                settings.backfill.window_delay(),
            ),
            Arc::new(TvlScraper::new(settings.tvl_url.clone())),
            sink.clone(),
            settings.backfill.from_block,
        );

        match aggregator.run_once().await {
            Ok(()) => info!("✅ [KpiWorker] Snapshot persisted"),
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => error!("❌ [KpiWorker] Snapshot write lost: {}", e),
        }
    }
}
