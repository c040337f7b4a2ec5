//! Chain-client collaborator seam.
//!
//! The pipeline core talks to the node through [`ChainClient`] and obtains
//! fresh transports through [`ChainConnector`]; the ethers-backed
//! implementation lives in [`eigen`]. Keeping the seam as traits lets the
//! integration tests drive the subscription manager, paginator, and KPI
//! aggregator with scripted mock nodes.

pub mod eigen;

use crate::error::IndexerError;
use crate::events::{EventKind, RawEvent};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// One item on a live subscription queue. Transport failures travel the same
/// ordered queue as events so the consumer observes them in delivery order.
#[derive(Debug)]
pub enum LiveDelivery {
    Event(RawEvent),
    TransportError(String),
}

/// Access to one established node transport.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current head block number.
    async fn head_block(&self) -> Result<u64, IndexerError>;

    /// Historical events of one kind for the closed-open range
    /// `[from_block, to_block)`, in block order.
    async fn query_range(
        &self,
        kind: EventKind,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawEvent>, IndexerError>;

    /// Open a live subscription for one kind. Matching events are pushed
    /// into the returned bounded queue in node emission order; a transport
    /// failure is delivered as [`LiveDelivery::TransportError`] and ends the
    /// stream.
    async fn subscribe(
        &self,
        kind: EventKind,
        queue_capacity: usize,
    ) -> Result<mpsc::Receiver<LiveDelivery>, IndexerError>;
}

/// Establishes transports. The subscription manager asks for a fresh one on
/// every reconnect and never reuses a discarded transport.
#[async_trait]
pub trait ChainConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn ChainClient>, IndexerError>;
}
