//! Core event and snapshot types.
//!
//! [`EventKind`] enumerates the 26 EigenLayer event categories the indexer
//! tracks, together with the contract each is emitted from, its ABI
//! signature, and a short human-readable message. [`RawEvent`] is what the
//! chain client delivers; [`EventRecord`] is the normalized, persistence-ready
//! form produced by the normalizer.

use chrono::{DateTime, Utc};
use ethers::types::U256;
use serde::{Deserialize, Serialize};

/// EigenLayer mainnet core contracts that emit the tracked events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EigenContract {
    DelegationManager,
    StrategyManager,
    EigenPodManager,
    AvsDirectory,
}

impl EigenContract {
    /// Mainnet deployment address (hex, checksummed).
    pub fn address(&self) -> &'static str {
        match self {
            EigenContract::DelegationManager => "0x39053D51B77DC0d36036Fc1fCc8Cb819df8Ef37A",
            EigenContract::StrategyManager => "0x858646372CC42E1A627fcE94aa7A7033e7CF075A",
            EigenContract::EigenPodManager => "0x91E677b07F7AF907ec9a428aafA9fc14a0d3A338",
            EigenContract::AvsDirectory => "0x135DDa560e946695d6f155dACaFC6f1F25C1F5AF",
        }
    }
}

/// The tracked event categories: operator lifecycle, staker delegation,
/// withdrawal lifecycle, strategy whitelist changes, beacon-chain deposits
/// and withdrawals, pod lifecycle, and AVS registration/metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    OperatorRegistered,
    OperatorMetadataUriUpdated,
    MinWithdrawalDelayBlocksSet,
    OperatorDetailsModified,
    OperatorSharesDecreased,
    OperatorSharesIncreased,
    StakerDelegated,
    StakerForceUndelegated,
    StakerUndelegated,
    StrategyWithdrawalDelayBlocksSet,
    WithdrawalCompleted,
    WithdrawalMigrated,
    WithdrawalQueued,
    Deposit,
    OwnershipTransferred,
    StrategyAddedToDepositWhitelist,
    StrategyRemovedFromDepositWhitelist,
    StrategyWhitelisterChanged,
    UpdatedThirdPartyTransfersForbidden,
    BeaconChainEthDeposited,
    BeaconChainEthWithdrawalCompleted,
    BeaconOracleUpdated,
    PodDeployed,
    PodSharesUpdated,
    OperatorAvsRegistrationStatusUpdated,
    AvsMetadataUriUpdated,
}

impl EventKind {
    /// Every tracked kind, in registration order.
    pub const ALL: [EventKind; 26] = [
        EventKind::OperatorRegistered,
        EventKind::OperatorMetadataUriUpdated,
        EventKind::MinWithdrawalDelayBlocksSet,
        EventKind::OperatorDetailsModified,
        EventKind::OperatorSharesDecreased,
        EventKind::OperatorSharesIncreased,
        EventKind::StakerDelegated,
        EventKind::StakerForceUndelegated,
        EventKind::StakerUndelegated,
        EventKind::StrategyWithdrawalDelayBlocksSet,
        EventKind::WithdrawalCompleted,
        EventKind::WithdrawalMigrated,
        EventKind::WithdrawalQueued,
        EventKind::Deposit,
        EventKind::OwnershipTransferred,
        EventKind::StrategyAddedToDepositWhitelist,
        EventKind::StrategyRemovedFromDepositWhitelist,
        EventKind::StrategyWhitelisterChanged,
        EventKind::UpdatedThirdPartyTransfersForbidden,
        EventKind::BeaconChainEthDeposited,
        EventKind::BeaconChainEthWithdrawalCompleted,
        EventKind::BeaconOracleUpdated,
        EventKind::PodDeployed,
        EventKind::PodSharesUpdated,
        EventKind::OperatorAvsRegistrationStatusUpdated,
        EventKind::AvsMetadataUriUpdated,
    ];

    /// Wire name as emitted by the contract and stored in the `event` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::OperatorRegistered => "OperatorRegistered",
            EventKind::OperatorMetadataUriUpdated => "OperatorMetadataURIUpdated",
            EventKind::MinWithdrawalDelayBlocksSet => "MinWithdrawalDelayBlocksSet",
            EventKind::OperatorDetailsModified => "OperatorDetailsModified",
            EventKind::OperatorSharesDecreased => "OperatorSharesDecreased",
            EventKind::OperatorSharesIncreased => "OperatorSharesIncreased",
            EventKind::StakerDelegated => "StakerDelegated",
            EventKind::StakerForceUndelegated => "StakerForceUndelegated",
            EventKind::StakerUndelegated => "StakerUndelegated",
            EventKind::StrategyWithdrawalDelayBlocksSet => "StrategyWithdrawalDelayBlocksSet",
            EventKind::WithdrawalCompleted => "WithdrawalCompleted",
            EventKind::WithdrawalMigrated => "WithdrawalMigrated",
            EventKind::WithdrawalQueued => "WithdrawalQueued",
            EventKind::Deposit => "Deposit",
            EventKind::OwnershipTransferred => "OwnershipTransferred",
            EventKind::StrategyAddedToDepositWhitelist => "StrategyAddedToDepositWhitelist",
            EventKind::StrategyRemovedFromDepositWhitelist => {
                "StrategyRemovedFromDepositWhitelist"
            }
            EventKind::StrategyWhitelisterChanged => "StrategyWhitelisterChanged",
            EventKind::UpdatedThirdPartyTransfersForbidden => {
                "UpdatedThirdPartyTransfersForbidden"
            }
            EventKind::BeaconChainEthDeposited => "BeaconChainETHDeposited",
            EventKind::BeaconChainEthWithdrawalCompleted => "BeaconChainETHWithdrawalCompleted",
            EventKind::BeaconOracleUpdated => "BeaconOracleUpdated",
            EventKind::PodDeployed => "PodDeployed",
            EventKind::PodSharesUpdated => "PodSharesUpdated",
            EventKind::OperatorAvsRegistrationStatusUpdated => {
                "OperatorAVSRegistrationStatusUpdated"
            }
            EventKind::AvsMetadataUriUpdated => "AVSMetadataURIUpdated",
        }
    }

    /// Contract the event is emitted from.
    pub fn contract(&self) -> EigenContract {
        use EventKind::*;
        match self {
            OperatorRegistered | OperatorMetadataUriUpdated | MinWithdrawalDelayBlocksSet
            | OperatorDetailsModified | OperatorSharesDecreased | OperatorSharesIncreased
            | StakerDelegated | StakerForceUndelegated | StakerUndelegated
            | StrategyWithdrawalDelayBlocksSet | WithdrawalCompleted | WithdrawalMigrated
            | WithdrawalQueued => EigenContract::DelegationManager,
            Deposit | OwnershipTransferred | StrategyAddedToDepositWhitelist
            | StrategyRemovedFromDepositWhitelist | StrategyWhitelisterChanged
            | UpdatedThirdPartyTransfersForbidden => EigenContract::StrategyManager,
            BeaconChainEthDeposited | BeaconChainEthWithdrawalCompleted | BeaconOracleUpdated
            | PodDeployed | PodSharesUpdated => EigenContract::EigenPodManager,
            OperatorAvsRegistrationStatusUpdated | AvsMetadataUriUpdated => {
                EigenContract::AvsDirectory
            }
        }
    }

    /// Human-readable ABI signature used to decode named parameters.
    pub fn abi(&self) -> &'static str {
        use EventKind::*;
        match self {
            OperatorRegistered => {
                "event OperatorRegistered(address indexed operator, (address, address, uint32) operatorDetails)"
            }
            OperatorMetadataUriUpdated => {
                "event OperatorMetadataURIUpdated(address indexed operator, string metadataURI)"
            }
            MinWithdrawalDelayBlocksSet => {
                "event MinWithdrawalDelayBlocksSet(uint256 previousValue, uint256 newValue)"
            }
            OperatorDetailsModified => {
                "event OperatorDetailsModified(address indexed operator, (address, address, uint32) newOperatorDetails)"
            }
            OperatorSharesDecreased => {
                "event OperatorSharesDecreased(address indexed operator, address staker, address strategy, uint256 shares)"
            }
            OperatorSharesIncreased => {
                "event OperatorSharesIncreased(address indexed operator, address staker, address strategy, uint256 shares)"
            }
            StakerDelegated => {
                "event StakerDelegated(address indexed staker, address indexed operator)"
            }
            StakerForceUndelegated => {
                "event StakerForceUndelegated(address indexed staker, address indexed operator)"
            }
            StakerUndelegated => {
                "event StakerUndelegated(address indexed staker, address indexed operator)"
            }
            StrategyWithdrawalDelayBlocksSet => {
                "event StrategyWithdrawalDelayBlocksSet(address strategy, uint256 previousValue, uint256 newValue)"
            }
            WithdrawalCompleted => "event WithdrawalCompleted(bytes32 withdrawalRoot)",
            WithdrawalMigrated => {
                "event WithdrawalMigrated(bytes32 oldWithdrawalRoot, bytes32 newWithdrawalRoot)"
            }
            WithdrawalQueued => {
                "event WithdrawalQueued(bytes32 withdrawalRoot, (address, address, address, uint256, uint32, address[], uint256[]) withdrawal)"
            }
            Deposit => {
                "event Deposit(address staker, address token, address strategy, uint256 shares)"
            }
            OwnershipTransferred => {
                "event OwnershipTransferred(address indexed previousOwner, address indexed newOwner)"
            }
            StrategyAddedToDepositWhitelist => {
                "event StrategyAddedToDepositWhitelist(address strategy)"
            }
            StrategyRemovedFromDepositWhitelist => {
                "event StrategyRemovedFromDepositWhitelist(address strategy)"
            }
            StrategyWhitelisterChanged => {
                "event StrategyWhitelisterChanged(address previousAddress, address newAddress)"
            }
            UpdatedThirdPartyTransfersForbidden => {
                "event UpdatedThirdPartyTransfersForbidden(address strategy, bool value)"
            }
            BeaconChainEthDeposited => {
                "event BeaconChainETHDeposited(address indexed podOwner, uint256 amount)"
            }
            BeaconChainEthWithdrawalCompleted => {
                "event BeaconChainETHWithdrawalCompleted(address indexed podOwner, uint256 shares, uint96 nonce, address delegatedAddress, address withdrawer, bytes32 withdrawalRoot)"
            }
            BeaconOracleUpdated => "event BeaconOracleUpdated(address indexed newOracleAddress)",
            PodDeployed => {
                "event PodDeployed(address indexed eigenPod, address indexed podOwner)"
            }
            PodSharesUpdated => {
                "event PodSharesUpdated(address indexed podOwner, int256 sharesDelta)"
            }
            OperatorAvsRegistrationStatusUpdated => {
                "event OperatorAVSRegistrationStatusUpdated(address indexed operator, address indexed avs, uint8 status)"
            }
            AvsMetadataUriUpdated => {
                "event AVSMetadataURIUpdated(address indexed avs, string metadataURI)"
            }
        }
    }

    /// One-line message stored alongside the record.
    pub fn message(&self) -> &'static str {
        use EventKind::*;
        match self {
            OperatorRegistered => "Operator registered to EigenLayer",
            OperatorMetadataUriUpdated => "Operator metadata URI updated",
            MinWithdrawalDelayBlocksSet => "Minimum withdrawal delay blocks set",
            OperatorDetailsModified => "Operator details modified",
            OperatorSharesDecreased => "Operator shares decreased",
            OperatorSharesIncreased => "Operator shares increased",
            StakerDelegated => "Staker delegated to operator",
            StakerForceUndelegated => "Staker force-undelegated from operator",
            StakerUndelegated => "Staker undelegated from operator",
            StrategyWithdrawalDelayBlocksSet => "Strategy withdrawal delay blocks set",
            WithdrawalCompleted => "Withdrawal completed",
            WithdrawalMigrated => "Withdrawal migrated",
            WithdrawalQueued => "Withdrawal queued",
            Deposit => "Staker deposited into strategy",
            OwnershipTransferred => "Contract ownership transferred",
            StrategyAddedToDepositWhitelist => "Strategy added to deposit whitelist",
            StrategyRemovedFromDepositWhitelist => "Strategy removed from deposit whitelist",
            StrategyWhitelisterChanged => "Strategy whitelister changed",
            UpdatedThirdPartyTransfersForbidden => "Third-party transfers setting updated",
            BeaconChainEthDeposited => "Beacon chain ETH deposited",
            BeaconChainEthWithdrawalCompleted => "Beacon chain ETH withdrawal completed",
            BeaconOracleUpdated => "Beacon oracle updated",
            PodDeployed => "EigenPod deployed",
            PodSharesUpdated => "EigenPod shares updated",
            OperatorAvsRegistrationStatusUpdated => "Operator AVS registration status updated",
            AvsMetadataUriUpdated => "AVS metadata URI updated",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded return value, mirroring the ABI token kinds the contracts emit.
/// Integers keep their full 256-bit width; `Int` holds the raw two's-complement
/// word and is reinterpreted as signed during normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Address(ethers::types::Address),
    Uint(U256),
    Int(U256),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    FixedBytes(Vec<u8>),
    Array(Vec<RawValue>),
    Tuple(Vec<RawValue>),
    /// A token kind the decoder cannot represent losslessly. Normalization
    /// rejects the whole record rather than coercing it.
    Unsupported(&'static str),
}

/// An event as delivered by the chain client, before normalization.
/// Return values keep their decode order.
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub transaction_hash: String,
    pub block_number: u64,
    pub kind: EventKind,
    pub return_values: Vec<(String, RawValue)>,
    pub message: String,
}

impl RawEvent {
    /// Look up a named return value rendered as a string (addresses as hex,
    /// strings as-is). Used by the KPI dedup paths.
    pub fn string_value(&self, name: &str) -> Option<String> {
        self.return_values.iter().find(|(n, _)| n == name).and_then(|(_, v)| match v {
            RawValue::Address(a) => Some(format!("{:?}", a)),
            RawValue::String(s) => Some(s.clone()),
            _ => None,
        })
    }
}

/// Normalized, persistence-ready event record. Immutable once created.
///
/// Identity key: `(transaction_hash, event name, block_number)`. The key
/// carries no log index, so multiple same-kind events inside one transaction
/// collapse to a single row. Known limitation, kept as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub transaction_hash: String,
    pub block_number: u64,
    pub event: EventKind,
    /// Named return values with every integer as an exact base-10 string.
    pub return_values: serde_json::Value,
    pub message: String,
    pub ingested_at: DateTime<Utc>,
}

impl EventRecord {
    /// Identity key rendered for logs and error context.
    pub fn identity(&self) -> String {
        format!(
            "{}/{}/{}",
            self.transaction_hash,
            self.event.as_str(),
            self.block_number
        )
    }
}

/// Point-in-time ecosystem KPI aggregate. Append-only; all four metric
/// fields are always populated (`tvl_eth` may hold the scrape sentinel).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiSnapshot {
    pub recorded_at: DateTime<Utc>,
    pub tvl_eth: String,
    pub number_avs: i64,
    pub number_operator: i64,
    pub number_staker: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_kinds_have_distinct_wire_names() {
        let mut names: Vec<&str> = EventKind::ALL.iter().map(|k| k.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), EventKind::ALL.len());
    }

    #[test]
    fn abi_signatures_name_their_event() {
        for kind in EventKind::ALL {
            assert!(
                kind.abi().contains(kind.as_str()),
                "{} signature mismatch",
                kind
            );
        }
    }

    #[test]
    fn contracts_cover_all_kinds() {
        // 13 delegation, 6 strategy, 5 pod, 2 AVS directory
        let count = |c: EigenContract| {
            EventKind::ALL.iter().filter(|k| k.contract() == c).count()
        };
        assert_eq!(count(EigenContract::DelegationManager), 13);
        assert_eq!(count(EigenContract::StrategyManager), 6);
        assert_eq!(count(EigenContract::EigenPodManager), 5);
        assert_eq!(count(EigenContract::AvsDirectory), 2);
    }
}
