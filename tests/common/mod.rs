//! Scripted network doubles shared by the integration suites.

use async_trait::async_trait;
use memoless::domain::asset::{AssetId, Chain};
use memoless::domain::pipeline::DepositObservation;
use memoless::domain::ports::{
    DepositBroadcaster, InboundAddress, MemoCheckResult, PoolInfo, PoolStatus, ThornodeApi,
};
use memoless::domain::registration::ReferenceRegistration;
use memoless::error::{MemolessError, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

pub fn btc() -> AssetId {
    "BTC.BTC".parse().unwrap()
}

pub fn registration(reference_id: &str) -> ReferenceRegistration {
    ReferenceRegistration {
        asset: btc(),
        raw_memo: "savings".to_string(),
        registration_tx_hash: "REGTX".to_string(),
        reference_id: reference_id.to_string(),
        registered_at_height: 100,
        expiry_height: 1000,
        usage_count: 0,
        max_use: 10,
    }
}

/// Hand-scripted `ThornodeApi`: fixed answers for the registration flow and
/// a consumable queue of observation responses for the tracker.
pub struct MockApi {
    pub registration: Mutex<Option<ReferenceRegistration>>,
    /// Number of lookups that return empty before the registration appears.
    pub not_ready_polls: Mutex<u32>,
    pub height: Mutex<u64>,
    pub inbound: Mutex<Vec<InboundAddress>>,
    pub memo_check: Mutex<MemoCheckResult>,
    pub pools: Mutex<Vec<PoolInfo>>,
    pub observations: Mutex<VecDeque<Result<Option<DepositObservation>>>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            registration: Mutex::new(Some(registration("00042"))),
            not_ready_polls: Mutex::new(0),
            height: Mutex::new(500),
            inbound: Mutex::new(vec![InboundAddress {
                chain: Chain::Btc,
                address: "bc1qmock".to_string(),
                dust_threshold_raw: 10_000,
                halted: false,
            }]),
            memo_check: Mutex::new(MemoCheckResult {
                valid: true,
                decoded_reference: Some("00042".to_string()),
            }),
            pools: Mutex::new(vec![PoolInfo {
                asset: btc(),
                status: PoolStatus::Available,
            }]),
            observations: Mutex::new(VecDeque::new()),
        }
    }

    pub fn set_height(&self, height: u64) {
        *self.height.lock().unwrap() = height;
    }

    pub fn set_memo_check(&self, valid: bool, decoded: Option<&str>) {
        *self.memo_check.lock().unwrap() = MemoCheckResult {
            valid,
            decoded_reference: decoded.map(str::to_string),
        };
    }

    pub fn push_observation(&self, response: Result<Option<DepositObservation>>) {
        self.observations.lock().unwrap().push_back(response);
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ThornodeApi for MockApi {
    async fn pools(&self) -> Result<Vec<PoolInfo>> {
        Ok(self.pools.lock().unwrap().clone())
    }

    async fn inbound_addresses(&self) -> Result<Vec<InboundAddress>> {
        Ok(self.inbound.lock().unwrap().clone())
    }

    async fn memo_lookup(&self, _tx_hash: &str) -> Result<Option<ReferenceRegistration>> {
        let mut pending = self.not_ready_polls.lock().unwrap();
        if *pending > 0 {
            *pending -= 1;
            return Ok(None);
        }
        Ok(self.registration.lock().unwrap().clone())
    }

    async fn memo_check(&self, _asset: &AssetId, _raw_amount: &str) -> Result<MemoCheckResult> {
        Ok(self.memo_check.lock().unwrap().clone())
    }

    async fn last_block_height(&self) -> Result<u64> {
        Ok(*self.height.lock().unwrap())
    }

    async fn observed_tx(&self, _hash: &str) -> Result<Option<DepositObservation>> {
        match self.observations.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(None),
        }
    }
}

/// Records broadcast calls; optionally refuses them.
pub struct MockBroadcaster {
    pub fail: bool,
    pub calls: Mutex<Vec<(AssetId, String, String)>>,
}

impl MockBroadcaster {
    pub fn ok() -> Self {
        Self {
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DepositBroadcaster for MockBroadcaster {
    async fn broadcast_deposit(
        &self,
        asset: &AssetId,
        amount: &str,
        memo: &str,
    ) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((asset.clone(), amount.to_string(), memo.to_string()));
        if self.fail {
            Err(MemolessError::BroadcastFailed("node rejected tx".to_string()))
        } else {
            Ok("REGTX".to_string())
        }
    }
}
