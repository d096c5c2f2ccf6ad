use crate::domain::asset::{AssetId, Chain};
use crate::domain::pipeline::DepositObservation;
use crate::domain::registration::ReferenceRegistration;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolStatus {
    Available,
    Staged,
    Suspended,
    Unknown,
}

impl PoolStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "Available" => PoolStatus::Available,
            "Staged" => PoolStatus::Staged,
            "Suspended" => PoolStatus::Suspended,
            _ => PoolStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoolInfo {
    pub asset: AssetId,
    pub status: PoolStatus,
}

/// Current deposit address + dust threshold for one source chain.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundAddress {
    pub chain: Chain,
    pub address: String,
    /// Raw units, in the chain's own decimal convention.
    pub dust_threshold_raw: u64,
    pub halted: bool,
}

/// Server-side re-derivation of a candidate encoded amount.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoCheckResult {
    pub valid: bool,
    pub decoded_reference: Option<String>,
}

/// Network observation API consumed by the workflow and the tracker.
///
/// Lookup calls return `Ok(None)` while the network has nothing yet; an
/// empty poll is not an error.
#[async_trait]
pub trait ThornodeApi: Send + Sync {
    async fn pools(&self) -> Result<Vec<PoolInfo>>;
    async fn inbound_addresses(&self) -> Result<Vec<InboundAddress>>;
    async fn memo_lookup(&self, tx_hash: &str) -> Result<Option<ReferenceRegistration>>;
    async fn memo_check(&self, asset: &AssetId, raw_amount: &str) -> Result<MemoCheckResult>;
    async fn last_block_height(&self) -> Result<u64>;
    async fn observed_tx(&self, hash: &str) -> Result<Option<DepositObservation>>;
}

/// Signing collaborator that broadcasts the registration transaction.
///
/// Deposit-type messages are the only kind in the system allowed to carry a
/// zero amount, and the registration step relies on exactly that; the
/// value-transfer path keeps rejecting zero. The asymmetry is intentional.
#[async_trait]
pub trait DepositBroadcaster: Send + Sync {
    async fn broadcast_deposit(&self, asset: &AssetId, amount: &str, memo: &str)
    -> Result<String>;
}

pub type ApiHandle = Arc<dyn ThornodeApi>;
pub type BroadcasterHandle = Arc<dyn DepositBroadcaster>;
