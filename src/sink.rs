//! Persistence sink for event records and KPI snapshots.
//!
//! `eigenevents` holds normalized event rows with a unique index on the
//! identity key `(transaction_hash, event, block_number)`, so re-delivery
//! after a reconnect lands on `ON CONFLICT DO NOTHING` instead of creating a
//! duplicate row. The key carries no log index; same-kind events inside one
//! transaction collapse to one row (known limitation, kept as-is).
//! `eigendata` is plain append-only: snapshots are always new.
//!
//! Durability is best-effort: a rejected write surfaces as a `Persistence`
//! error the caller logs, and the pipeline moves on.

use crate::error::IndexerError;
use crate::events::{EventRecord, KpiSnapshot};
use async_trait::async_trait;
use log::info;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;

/// Append-only datastore surface the pipeline writes through.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Idempotent insert keyed by the record identity. Returns the
    /// server-assigned row id for a new row, `None` for a redelivered
    /// duplicate.
    async fn append(&self, record: &EventRecord) -> Result<Option<i64>, IndexerError>;

    /// Append a KPI snapshot. No idempotency key; snapshots are always new.
    async fn append_snapshot(&self, snapshot: &KpiSnapshot) -> Result<(), IndexerError>;
}

/// Postgres-backed sink.
pub struct PostgresSink {
    pool: PgPool,
}

impl PostgresSink {
    /// Connect and bootstrap the schema. A connection or credential failure
    /// here is fatal (`Auth`): the process must not register subscriptions
    /// against a datastore it cannot write to.
    pub async fn connect(database_url: &str) -> Result<Self, IndexerError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await
            .map_err(|e| IndexerError::Auth(format!("datastore sign-in failed: {}", e)))?;

        let sink = Self { pool };
        sink.init_schema().await?;
        info!("✅ [Sink] Datastore authorized, schema ready");
        Ok(sink)
    }

    async fn init_schema(&self) -> Result<(), IndexerError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS eigenevents (
                id BIGSERIAL PRIMARY KEY,
                transaction_hash TEXT NOT NULL,
                block_number BIGINT NOT NULL,
                event TEXT NOT NULL,
                return_values JSONB NOT NULL,
                message TEXT NOT NULL,
                ingested_at TIMESTAMPTZ NOT NULL,
                UNIQUE (transaction_hash, event, block_number)
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| IndexerError::Auth(format!("schema bootstrap failed: {}", e)))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS eigendata (
                id BIGSERIAL PRIMARY KEY,
                tvl_eth TEXT NOT NULL,
                number_avs BIGINT NOT NULL,
                number_operator BIGINT NOT NULL,
                number_staker BIGINT NOT NULL,
                recorded_at TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| IndexerError::Auth(format!("schema bootstrap failed: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl EventSink for PostgresSink {
    async fn append(&self, record: &EventRecord) -> Result<Option<i64>, IndexerError> {
        let row = sqlx::query(
            "INSERT INTO eigenevents
                 (transaction_hash, block_number, event, return_values, message, ingested_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (transaction_hash, event, block_number) DO NOTHING
             RETURNING id",
        )
        .bind(&record.transaction_hash)
        .bind(record.block_number as i64)
        .bind(record.event.as_str())
        .bind(&record.return_values)
        .bind(&record.message)
        .bind(record.ingested_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| IndexerError::persistence(record.identity(), e))?;

        Ok(row.map(|r| r.get::<i64, _>("id")))
    }

    async fn append_snapshot(&self, snapshot: &KpiSnapshot) -> Result<(), IndexerError> {
        sqlx::query(
            "INSERT INTO eigendata
                 (tvl_eth, number_avs, number_operator, number_staker, recorded_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&snapshot.tvl_eth)
        .bind(snapshot.number_avs)
        .bind(snapshot.number_operator)
        .bind(snapshot.number_staker)
        .bind(snapshot.recorded_at)
        .execute(&self.pool)
        .await
        .map_err(|e| IndexerError::persistence("kpi snapshot", e))?;

        Ok(())
    }
}
