//! KPI aggregation: dedup counts, sentinel fallback, and snapshot persistence.

mod common;

use common::{avs_event, deposit_event, raw_event, MemorySink, MockChainClient, MockTvl};
use eigenscan_indexer::events::{EventKind, RawValue};
use eigenscan_indexer::tvl::TVL_SENTINEL;
use eigenscan_indexer::{BackfillPaginator, KpiAggregator};
use std::sync::Arc;
use std::time::Duration;

fn operator_event(tx_hash: &str, block: u64, operator: u8) -> eigenscan_indexer::events::RawEvent {
    raw_event(
        EventKind::OperatorRegistered,
        tx_hash,
        block,
        vec![("operator", common::addr(operator))],
    )
}

fn aggregator(
    client: Arc<MockChainClient>,
    tvl: MockTvl,
    sink: Arc<MemorySink>,
) -> KpiAggregator {
    KpiAggregator::new(
        BackfillPaginator::new(client, 1000, Duration::ZERO),
        Arc::new(tvl),
        sink,
        0,
    )
}

fn scripted_client() -> Arc<MockChainClient> {
    let client = Arc::new(MockChainClient::with_head(2500));
    // Stakers A, B, A, C, B across windows: 3 distinct.
    client.add_historical(vec![
        deposit_event("0x01", 10, 0xa1),
        deposit_event("0x02", 20, 0xb1),
        deposit_event("0x03", 1200, 0xa1),
        deposit_event("0x04", 1300, 0xc1),
        deposit_event("0x05", 2400, 0xb1),
    ]);
    // AVS (A1,U1) then (A1,U2): dual-key dedup accepts exactly one.
    client.add_historical(vec![
        avs_event("0x06", 50, 0xd1, "ipfs://u1"),
        avs_event("0x07", 60, 0xd1, "ipfs://u2"),
    ]);
    // Operators: plain count, duplicates included.
    client.add_historical(vec![
        operator_event("0x08", 70, 0xe1),
        operator_event("0x09", 80, 0xe2),
        operator_event("0x0a", 90, 0xe1),
    ]);
    client
}

#[tokio::test]
async fn snapshot_counts_with_dedup_policies() {
    let sink = Arc::new(MemorySink::default());
    let agg = aggregator(
        scripted_client(),
        MockTvl {
            result: Ok("3,421,009.12".into()),
        },
        sink.clone(),
    );

    agg.run_once().await.unwrap();

    let snapshot = sink.last_snapshot().unwrap();
    assert_eq!(snapshot.tvl_eth, "3,421,009.12");
    assert_eq!(snapshot.number_avs, 1);
    assert_eq!(snapshot.number_operator, 3);
    assert_eq!(snapshot.number_staker, 3);
}

#[tokio::test]
async fn tvl_failure_yields_sentinel_but_snapshot_still_persists() {
    let sink = Arc::new(MemorySink::default());
    let agg = aggregator(
        scripted_client(),
        MockTvl {
            result: Err("browser crashed".into()),
        },
        sink.clone(),
    );

    agg.run_once().await.unwrap();

    let snapshot = sink.last_snapshot().unwrap();
    assert_eq!(snapshot.tvl_eth, TVL_SENTINEL);
    // The other metrics are unaffected by the TVL failure.
    assert_eq!(snapshot.number_avs, 1);
    assert_eq!(snapshot.number_operator, 3);
    assert_eq!(snapshot.number_staker, 3);
    assert_eq!(sink.snapshot_count(), 1);
}

#[tokio::test]
async fn failed_deposit_window_loses_only_that_windows_stakers() {
    let client = scripted_client();
    client.fail_window_at(1000); // loses the A (dup) and C deposits

    let sink = Arc::new(MemorySink::default());
    let agg = aggregator(
        client,
        MockTvl {
            result: Ok("1.0".into()),
        },
        sink.clone(),
    );

    agg.run_once().await.unwrap();

    let snapshot = sink.last_snapshot().unwrap();
    // A and B from the surviving windows; C fell in the skipped window.
    assert_eq!(snapshot.number_staker, 2);
    // AVS and operator events sit in window [0,1000) and are unaffected.
    assert_eq!(snapshot.number_avs, 1);
    assert_eq!(snapshot.number_operator, 3);
}

#[tokio::test]
async fn events_missing_expected_fields_are_not_counted() {
    let client = Arc::new(MockChainClient::with_head(100));
    client.add_historical(vec![raw_event(
        EventKind::Deposit,
        "0x01",
        10,
        vec![("shares", RawValue::Uint(7u64.into()))], // no staker field
    )]);

    let sink = Arc::new(MemorySink::default());
    let agg = aggregator(
        client,
        MockTvl {
            result: Ok("1.0".into()),
        },
        sink.clone(),
    );

    agg.run_once().await.unwrap();
    assert_eq!(sink.last_snapshot().unwrap().number_staker, 0);
}
