//! # EigenScan Indexer
//!
//! Event ingestion and KPI aggregation pipeline for the EigenLayer restaking
//! ecosystem. The library ingests core-contract events from an Ethereum node
//! — live over websocket subscriptions and historically via paginated
//! block-range backfill — normalizes and deduplicates them, and persists
//! event rows and periodic ecosystem KPI snapshots to Postgres.
//!
//! ## Architecture
//!
//! Two independent workers share this library and no mutable state:
//!
//! ### Live ingestion (`live_ingest`)
//! [`subscription::SubscriptionManager`] owns one live subscription per
//! [`events::EventKind`], each feeding a bounded ordered queue drained by a
//! single consumer running normalize → sink. Transport drops coalesce into
//! exactly one reconnect that re-registers the full listener set.
//!
//! ### KPI aggregation (`kpi_worker`)
//! [`kpi::KpiAggregator`] orchestrates the TVL scrape and three historical
//! backfills ([`backfill::BackfillPaginator`] + [`dedup`]) into an
//! append-only [`events::KpiSnapshot`]; every sub-fetch fails independently.
//!
//! ## Error policy
//!
//! All failures are typed [`error::IndexerError`] values; only `Auth` is
//! fatal. See `error` module docs for the full policy table.

/// Typed errors and the supervision policy.
pub mod error;
/// Event kinds, raw and normalized records, KPI snapshot.
pub mod events;
/// Raw event → persistence-ready record conversion.
pub mod normalizer;
/// Postgres sink with idempotent event insert.
pub mod sink;
/// Per-run staker and AVS deduplication.
pub mod dedup;
/// Chain-client collaborator traits and the ethers implementation.
pub mod chain;
/// Live subscription management and reconnection.
pub mod subscription;
/// Historical block-range pagination.
pub mod backfill;
/// KPI snapshot orchestration.
pub mod kpi;
/// TVL page scrape.
pub mod tvl;
/// Configuration management.
pub mod settings;

// Re-exports for convenience
pub use backfill::BackfillPaginator;
pub use error::IndexerError;
pub use events::{EventKind, EventRecord, KpiSnapshot};
pub use kpi::KpiAggregator;
pub use settings::Settings;
pub use sink::{EventSink, PostgresSink};
pub use subscription::SubscriptionManager;
