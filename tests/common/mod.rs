//! Shared mock collaborators for the integration tests: a scriptable chain
//! client/connector, an in-memory sink enforcing the identity-key contract,
//! and a stubbed TVL source.
#![allow(dead_code)]

use async_trait::async_trait;
use eigenscan_indexer::chain::{ChainClient, ChainConnector, LiveDelivery};
use eigenscan_indexer::error::IndexerError;
use eigenscan_indexer::events::{EventKind, EventRecord, KpiSnapshot, RawEvent, RawValue};
use ethers::types::{Address, U256};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Build a raw event with the given named values.
pub fn raw_event(
    kind: EventKind,
    tx_hash: &str,
    block: u64,
    values: Vec<(&str, RawValue)>,
) -> RawEvent {
    RawEvent {
        transaction_hash: tx_hash.to_string(),
        block_number: block,
        kind,
        return_values: values
            .into_iter()
            .map(|(n, v)| (n.to_string(), v))
            .collect(),
        message: kind.message().to_string(),
    }
}

pub fn addr(byte: u8) -> RawValue {
    RawValue::Address(Address::from([byte; 20]))
}

pub fn deposit_event(tx_hash: &str, block: u64, staker: u8) -> RawEvent {
    raw_event(
        EventKind::Deposit,
        tx_hash,
        block,
        vec![
            ("staker", addr(staker)),
            ("token", addr(0xee)),
            ("strategy", addr(0xff)),
            ("shares", RawValue::Uint(U256::from(1_000_000u64))),
        ],
    )
}

pub fn avs_event(tx_hash: &str, block: u64, avs: u8, uri: &str) -> RawEvent {
    raw_event(
        EventKind::AvsMetadataUriUpdated,
        tx_hash,
        block,
        vec![
            ("avs", addr(avs)),
            ("metadataURI", RawValue::String(uri.to_string())),
        ],
    )
}

/// Scriptable node transport. Historical events are served from a fixed
/// list filtered by block range; live subscriptions hand the test a sender
/// to push deliveries through.
#[derive(Default)]
pub struct MockChainClient {
    pub head: u64,
    pub historical: Mutex<Vec<RawEvent>>,
    /// Window start blocks whose queries fail with a provider error.
    pub failing_from_blocks: Mutex<HashSet<u64>>,
    /// Every `query_range` call, in order.
    pub queries: Mutex<Vec<(EventKind, u64, u64)>>,
    /// Live senders by kind, in registration order.
    pub live: Mutex<Vec<(EventKind, mpsc::Sender<LiveDelivery>)>>,
}

impl MockChainClient {
    pub fn with_head(head: u64) -> Self {
        Self {
            head,
            ..Default::default()
        }
    }

    pub fn add_historical(&self, events: Vec<RawEvent>) {
        self.historical.lock().unwrap().extend(events);
    }

    pub fn fail_window_at(&self, from_block: u64) {
        self.failing_from_blocks.lock().unwrap().insert(from_block);
    }

    pub fn subscribed_kinds(&self) -> Vec<EventKind> {
        self.live.lock().unwrap().iter().map(|(k, _)| *k).collect()
    }

    pub fn live_sender(&self, kind: EventKind) -> Option<mpsc::Sender<LiveDelivery>> {
        self.live
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, tx)| tx.clone())
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn head_block(&self) -> Result<u64, IndexerError> {
        Ok(self.head)
    }

    async fn query_range(
        &self,
        kind: EventKind,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawEvent>, IndexerError> {
        self.queries.lock().unwrap().push((kind, from_block, to_block));
        if self.failing_from_blocks.lock().unwrap().contains(&from_block) {
            return Err(IndexerError::provider(
                format!("{} blocks [{},{})", kind, from_block, to_block),
                "scripted provider failure",
            ));
        }
        Ok(self
            .historical
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind == kind && e.block_number >= from_block && e.block_number < to_block)
            .cloned()
            .collect())
    }

    async fn subscribe(
        &self,
        kind: EventKind,
        queue_capacity: usize,
    ) -> Result<mpsc::Receiver<LiveDelivery>, IndexerError> {
        let (tx, rx) = mpsc::channel(queue_capacity);
        self.live.lock().unwrap().push((kind, tx));
        Ok(rx)
    }
}

/// Hands out one fresh [`MockChainClient`] per connect and keeps every
/// generation around for inspection.
#[derive(Default)]
pub struct MockConnector {
    pub generations: Mutex<Vec<Arc<MockChainClient>>>,
}

impl MockConnector {
    pub fn generation_count(&self) -> usize {
        self.generations.lock().unwrap().len()
    }

    pub fn generation(&self, index: usize) -> Arc<MockChainClient> {
        self.generations.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl ChainConnector for MockConnector {
    async fn connect(&self) -> Result<Arc<dyn ChainClient>, IndexerError> {
        let client = Arc::new(MockChainClient::with_head(0));
        self.generations.lock().unwrap().push(client.clone());
        Ok(client)
    }
}

/// In-memory sink enforcing the identity-key contract: one row per
/// `(transaction_hash, event, block_number)`, duplicates reported as `None`.
#[derive(Default)]
pub struct MemorySink {
    rows: Mutex<HashMap<(String, String, u64), (i64, EventRecord)>>,
    pub snapshots: Mutex<Vec<KpiSnapshot>>,
}

impl MemorySink {
    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    pub fn last_snapshot(&self) -> Option<KpiSnapshot> {
        self.snapshots.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl eigenscan_indexer::EventSink for MemorySink {
    async fn append(&self, record: &EventRecord) -> Result<Option<i64>, IndexerError> {
        let mut rows = self.rows.lock().unwrap();
        let key = (
            record.transaction_hash.clone(),
            record.event.as_str().to_string(),
            record.block_number,
        );
        if rows.contains_key(&key) {
            return Ok(None);
        }
        let id = rows.len() as i64 + 1;
        rows.insert(key, (id, record.clone()));
        Ok(Some(id))
    }

    async fn append_snapshot(&self, snapshot: &KpiSnapshot) -> Result<(), IndexerError> {
        self.snapshots.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}

/// TVL source returning either a fixed figure or a scripted failure.
pub struct MockTvl {
    pub result: Result<String, String>,
}

#[async_trait]
impl eigenscan_indexer::tvl::TvlSource for MockTvl {
    async fn fetch_tvl(&self) -> Result<String, IndexerError> {
        match &self.result {
            Ok(tvl) => Ok(tvl.clone()),
            Err(reason) => Err(IndexerError::provider("tvl scrape", reason)),
        }
    }
}
