//! # Live Ingestion Worker
//!
//! Long-running process that keeps one live subscription open per tracked
//! EigenLayer event kind and persists every delivered event.
//!
//! ## Overview
//!
//! - Authorizes against the datastore first; a credential rejection is fatal
//!   and no subscription is ever registered.
//! - Runs the subscription manager's supervision loop: per-subscription
//!   ordered queues, normalize → idempotent insert, automatic re-registration
//!   of the full listener set on transport drop.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin live_ingest
//! ```

use anyhow::{ensure, Result};
use eigenscan_indexer::chain::eigen::EigenConnector;
use eigenscan_indexer::{PostgresSink, Settings, SubscriptionManager};
use log::info;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let settings = Settings::load()?;
    ensure!(!settings.rpc_ws_url.is_empty(), "EIGENSCAN_RPC_WS_URL must be set");
    ensure!(!settings.database_url.is_empty(), "EIGENSCAN_DATABASE_URL must be set");

    // Fatal on credential rejection: no subscriptions before the datastore
    // accepts us.
    let sink = Arc::new(PostgresSink::connect(&settings.database_url).await?);
    info!("🚀 [LiveIngest] Registering listeners on Ethereum Mainnet...");

    let connector = Arc::new(EigenConnector::new(
        settings.rpc_http_url.clone(),
        settings.rpc_ws_url.clone(),
    ));
    let manager = SubscriptionManager::new(
        connector,
        sink,
        settings.queue_capacity,
        settings.reconnect_delay(),
    );

    // Returns only on a fatal error; there is no graceful-shutdown protocol.
    manager.run().await?;
    Ok(())
}
