//! Live subscription management with reconnection.
//!
//! One generation = one transport + one live subscription per [`EventKind`].
//! Each subscription feeds a bounded ordered queue drained by its own
//! consumer task, which runs the normalize → sink path; per-subscription
//! delivery order is preserved, and cross-subscription interleaving is
//! unordered (safe under the sink's idempotent insert).
//!
//! Disconnect handling: consumers forward the first transport error into a
//! capacity-1 channel with `try_send`, so any number of simultaneous
//! transport failures coalesce into exactly one reconnect. The supervision
//! loop then aborts every consumer of the old generation, discards the
//! transport, connects a fresh one, and registers the full kind set again —
//! no duplicate subscriptions survive across generations, and re-running the
//! registration while already connected is safe because each generation is
//! built from scratch.

use crate::chain::{ChainClient, ChainConnector, LiveDelivery};
use crate::error::IndexerError;
use crate::events::EventKind;
use crate::normalizer;
use crate::sink::EventSink;
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct SubscriptionManager {
    connector: Arc<dyn ChainConnector>,
    sink: Arc<dyn EventSink>,
    queue_capacity: usize,
    reconnect_delay: Duration,
}

impl SubscriptionManager {
    pub fn new(
        connector: Arc<dyn ChainConnector>,
        sink: Arc<dyn EventSink>,
        queue_capacity: usize,
        reconnect_delay: Duration,
    ) -> Self {
        Self {
            connector,
            sink,
            queue_capacity,
            reconnect_delay,
        }
    }

    /// Supervision loop. Returns only on a fatal error; every non-fatal
    /// failure reconnects after the configured delay.
    pub async fn run(&self) -> Result<(), IndexerError> {
        loop {
            let client = match self.connector.connect().await {
                Ok(client) => client,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(
                        "⚠️ [Subscriptions] Connect failed: {}. Retrying in {:?}...",
                        e, self.reconnect_delay
                    );
                    tokio::time::sleep(self.reconnect_delay).await;
                    continue;
                }
            };

            match self.register_all(client).await {
                Ok(generation) => {
                    generation.supervise().await;
                    warn!("⚠️ [Subscriptions] Transport lost, re-registering all listeners...");
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("⚠️ [Subscriptions] Registration failed: {}", e);
                }
            }

            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    /// Open one live subscription per kind on the given transport and spawn
    /// its consumer. On any registration failure the partial generation is
    /// torn down before the error is returned, so no stray subscriptions
    /// leak into the next attempt.
    pub async fn register_all(
        &self,
        client: Arc<dyn ChainClient>,
    ) -> Result<Generation, IndexerError> {
        let (disconnect_tx, disconnect_rx) = mpsc::channel::<String>(1);
        let mut consumers = Vec::with_capacity(EventKind::ALL.len());

        for kind in EventKind::ALL {
            let queue = match client.subscribe(kind, self.queue_capacity).await {
                Ok(queue) => queue,
                Err(e) => {
                    let generation = Generation {
                        consumers,
                        disconnect_rx,
                    };
                    generation.teardown();
                    return Err(e);
                }
            };
            consumers.push(tokio::spawn(consume_subscription(
                kind,
                queue,
                self.sink.clone(),
                disconnect_tx.clone(),
            )));
        }

        info!(
            "📡 [Subscriptions] Registered {} live listeners",
            consumers.len()
        );
        Ok(Generation {
            consumers,
            disconnect_rx,
        })
    }
}

/// One connected generation of subscriptions.
pub struct Generation {
    consumers: Vec<JoinHandle<()>>,
    disconnect_rx: mpsc::Receiver<String>,
}

impl Generation {
    /// Block until the generation's transport reports a disconnect, then
    /// tear everything down. The capacity-1 disconnect channel means this
    /// fires once per disconnect event no matter how many subscriptions
    /// observed it.
    async fn supervise(mut self) {
        if let Some(reason) = self.disconnect_rx.recv().await {
            warn!("⚠️ [Subscriptions] Disconnect: {}", reason);
        }
        self.teardown();
    }

    fn teardown(&self) {
        for consumer in &self.consumers {
            consumer.abort();
        }
    }
}

/// Single consumer for one subscription queue: preserves delivery order,
/// survives per-event failures, and reports the first transport error.
async fn consume_subscription(
    kind: EventKind,
    mut queue: mpsc::Receiver<LiveDelivery>,
    sink: Arc<dyn EventSink>,
    disconnect_tx: mpsc::Sender<String>,
) {
    while let Some(delivery) = queue.recv().await {
        match delivery {
            LiveDelivery::Event(raw) => match normalizer::normalize(&raw) {
                Ok(record) => match sink.append(&record).await {
                    Ok(Some(id)) => info!("✅ [Subscriptions] Stored {} as row {}", record.identity(), id),
                    Ok(None) => info!(
                        "🔁 [Subscriptions] Duplicate delivery ignored: {}",
                        record.identity()
                    ),
                    Err(e) => error!("❌ [Subscriptions] Write lost for {}: {}", record.identity(), e),
                },
                Err(e) => error!("❌ [Subscriptions] Dropping {} event: {}", kind, e),
            },
            LiveDelivery::TransportError(reason) => {
                // try_send: first reporter wins, the rest coalesce.
                let _ = disconnect_tx.try_send(reason);
                return;
            }
        }
    }
    // Queue closed without an explicit error still means the transport side
    // is gone.
    let _ = disconnect_tx.try_send(format!("{} subscription queue closed", kind));
}
