//! Per-run deduplication state for the KPI backfills.
//!
//! Both trackers are grow-only within a run: once an identifier is seen it
//! stays seen until the run's state is dropped.

use std::collections::HashSet;

/// Distinct staker addresses observed across the deposit-event windows of a
/// run. Final cardinality is the staker-count KPI.
#[derive(Debug, Default)]
pub struct StakerDedup {
    seen: HashSet<String>,
}

impl StakerDedup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note(&mut self, staker: &str) {
        self.seen.insert(staker.to_string());
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Dual-key AVS registration dedup: an event counts as a new registration
/// only when both the AVS address and the metadata URI are unseen; on
/// acceptance both are marked. A metadata update for an address that already
/// registered under a different URI is therefore never recounted — this is
/// the historical policy, kept deliberately.
#[derive(Debug, Default)]
pub struct AvsDedup {
    seen_addresses: HashSet<String>,
    seen_uris: HashSet<String>,
}

impl AvsDedup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true and marks both keys iff neither has been seen.
    pub fn accept(&mut self, avs: &str, metadata_uri: &str) -> bool {
        if self.seen_addresses.contains(avs) || self.seen_uris.contains(metadata_uri) {
            return false;
        }
        self.seen_addresses.insert(avs.to_string());
        self.seen_uris.insert(metadata_uri.to_string());
        true
    }

    pub fn accepted(&self) -> usize {
        self.seen_addresses.len()
    }
}
