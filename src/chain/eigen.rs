//! Ethers-backed chain client for the EigenLayer core contracts.
//!
//! Historical queries and head-block reads go over HTTP; live subscriptions
//! go over a websocket `subscribe_logs` filtered by contract address and
//! event topic0. Decoding uses the human-readable ABI signatures attached to
//! each [`EventKind`], producing named return values. A log that fails to
//! decode is logged and skipped; it never ends a subscription or a window.

use crate::chain::{ChainClient, ChainConnector, LiveDelivery};
use crate::error::IndexerError;
use crate::events::{EventKind, RawEvent, RawValue};
use async_trait::async_trait;
use ethers::abi::{self, HumanReadableParser, RawLog, Token};
use ethers::providers::{Http, Middleware, Provider, Ws};
use ethers::types::{Address, Filter, Log};
use futures_util::StreamExt;
use log::{info, warn};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Parsed ABI event + emitting contract address per kind. The signatures are
/// compile-time constants, so a parse failure here is a programming error.
static ABI_EVENTS: Lazy<HashMap<EventKind, (Address, abi::Event)>> = Lazy::new(|| {
    EventKind::ALL
        .iter()
        .map(|kind| {
            let address = Address::from_str(kind.contract().address())
                .expect("static contract address");
            let event =
                HumanReadableParser::parse_event(kind.abi()).expect("static ABI signature");
            (*kind, (address, event))
        })
        .collect()
});

fn abi_event(kind: EventKind) -> &'static (Address, abi::Event) {
    // ALL is the map's key set, so the lookup cannot miss.
    ABI_EVENTS.get(&kind).expect("every kind has an ABI entry")
}

fn token_to_raw(token: Token) -> RawValue {
    match token {
        Token::Address(a) => RawValue::Address(a),
        Token::Uint(u) => RawValue::Uint(u),
        Token::Int(i) => RawValue::Int(i),
        Token::Bool(b) => RawValue::Bool(b),
        Token::String(s) => RawValue::String(s),
        Token::Bytes(b) => RawValue::Bytes(b),
        Token::FixedBytes(b) => RawValue::FixedBytes(b),
        Token::Array(items) | Token::FixedArray(items) => {
            RawValue::Array(items.into_iter().map(token_to_raw).collect())
        }
        Token::Tuple(items) => RawValue::Tuple(items.into_iter().map(token_to_raw).collect()),
    }
}

/// Decode one log into a [`RawEvent`]. Fails on missing receipt fields or an
/// ABI mismatch; callers log and skip.
fn decode_log(kind: EventKind, log: &Log) -> Result<RawEvent, String> {
    let tx_hash = log
        .transaction_hash
        .ok_or_else(|| "log without transaction hash".to_string())?;
    let block_number = log
        .block_number
        .ok_or_else(|| "log without block number".to_string())?
        .as_u64();

    let (_, event) = abi_event(kind);
    let decoded = event
        .parse_log(RawLog {
            topics: log.topics.clone(),
            data: log.data.to_vec(),
        })
        .map_err(|e| format!("abi decode failed: {}", e))?;

    let return_values = decoded
        .params
        .into_iter()
        .map(|p| (p.name, token_to_raw(p.value)))
        .collect();

    Ok(RawEvent {
        transaction_hash: format!("{:?}", tx_hash),
        block_number,
        kind,
        return_values,
        message: kind.message().to_string(),
    })
}

fn kind_filter(kind: EventKind) -> Filter {
    let (address, event) = abi_event(kind);
    Filter::new().address(*address).topic0(event.signature())
}

/// Chain client over one HTTP provider (historical) and one websocket
/// provider (live). Discarded wholesale on reconnect; the connector builds a
/// replacement.
pub struct EigenChainClient {
    http: Provider<Http>,
    ws: Provider<Ws>,
}

#[async_trait]
impl ChainClient for EigenChainClient {
    async fn head_block(&self) -> Result<u64, IndexerError> {
        self.http
            .get_block_number()
            .await
            .map(|n| n.as_u64())
            .map_err(|e| IndexerError::provider("head block", e))
    }

    async fn query_range(
        &self,
        kind: EventKind,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawEvent>, IndexerError> {
        if to_block <= from_block {
            return Ok(Vec::new());
        }
        // eth_getLogs takes an inclusive upper bound; the trait contract is
        // closed-open.
        let filter = kind_filter(kind)
            .from_block(from_block)
            .to_block(to_block - 1);
        let logs = self.http.get_logs(&filter).await.map_err(|e| {
            IndexerError::provider(format!("{} blocks [{},{})", kind, from_block, to_block), e)
        })?;

        let mut events = Vec::with_capacity(logs.len());
        for log in &logs {
            match decode_log(kind, log) {
                Ok(event) => events.push(event),
                Err(reason) => {
                    warn!("⚠️ [EigenChain] Dropping undecodable {} log: {}", kind, reason)
                }
            }
        }
        Ok(events)
    }

    async fn subscribe(
        &self,
        kind: EventKind,
        queue_capacity: usize,
    ) -> Result<mpsc::Receiver<LiveDelivery>, IndexerError> {
        let (tx, rx) = mpsc::channel(queue_capacity);
        let ws = self.ws.clone();

        tokio::spawn(async move {
            let filter = kind_filter(kind);
            let mut stream = match ws.subscribe_logs(&filter).await {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = tx
                        .send(LiveDelivery::TransportError(format!(
                            "{} subscription failed: {}",
                            kind, e
                        )))
                        .await;
                    return;
                }
            };

            while let Some(log) = stream.next().await {
                match decode_log(kind, &log) {
                    Ok(event) => {
                        // Bounded send: backpressure on a slow consumer
                        // instead of unbounded buffering.
                        if tx.send(LiveDelivery::Event(event)).await.is_err() {
                            return; // consumer gone, generation torn down
                        }
                    }
                    Err(reason) => {
                        warn!("⚠️ [EigenChain] Dropping undecodable {} log: {}", kind, reason)
                    }
                }
            }

            let _ = tx
                .send(LiveDelivery::TransportError(format!(
                    "{} log stream ended",
                    kind
                )))
                .await;
        });

        Ok(rx)
    }
}

/// Builds a fresh [`EigenChainClient`] per call.
pub struct EigenConnector {
    http_url: String,
    ws_url: String,
}

impl EigenConnector {
    pub fn new(http_url: String, ws_url: String) -> Self {
        Self { http_url, ws_url }
    }
}

#[async_trait]
impl ChainConnector for EigenConnector {
    async fn connect(&self) -> Result<Arc<dyn ChainClient>, IndexerError> {
        let http = Provider::<Http>::try_from(self.http_url.as_str())
            .map_err(|e| IndexerError::Connection(format!("bad RPC url: {}", e)))?;
        let ws = Provider::<Ws>::connect(self.ws_url.as_str())
            .await
            .map_err(|e| IndexerError::Connection(format!("websocket connect failed: {}", e)))?;
        info!("🔌 [EigenChain] Connected to node (http + ws)");
        Ok(Arc::new(EigenChainClient { http, ws }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EigenContract;

    #[test]
    fn all_abi_signatures_parse() {
        for kind in EventKind::ALL {
            let (address, event) = abi_event(kind);
            assert!(!address.is_zero(), "{} has a real address", kind);
            assert_eq!(event.name, kind.as_str());
        }
    }

    #[test]
    fn kinds_on_one_contract_share_an_address() {
        let (deposit_addr, _) = abi_event(EventKind::Deposit);
        let (whitelist_addr, _) = abi_event(EventKind::StrategyAddedToDepositWhitelist);
        assert_eq!(deposit_addr, whitelist_addr);
        assert_eq!(
            format!("{:?}", deposit_addr),
            EigenContract::StrategyManager.address().to_lowercase()
        );
    }
}
