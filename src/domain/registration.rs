use crate::domain::asset::{AssetId, Chain};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A memo registered on-chain and the reference ID the network assigned it.
///
/// Snapshots of server state: usage and expiry are only ever updated by
/// re-fetching, never incremented locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRegistration {
    pub asset: AssetId,
    pub raw_memo: String,
    pub registration_tx_hash: String,
    /// Decimal-digit string; leading zeros are significant.
    pub reference_id: String,
    pub registered_at_height: u64,
    pub expiry_height: u64,
    pub usage_count: u32,
    pub max_use: u32,
}

impl ReferenceRegistration {
    pub fn is_expired(&self, current_height: u64) -> bool {
        current_height > self.expiry_height
    }

    pub fn is_exhausted(&self) -> bool {
        self.usage_count >= self.max_use
    }

    pub fn is_usable(&self, current_height: u64) -> bool {
        !self.is_expired(current_height) && !self.is_exhausted()
    }

    pub fn blocks_remaining(&self, current_height: u64) -> u64 {
        self.expiry_height.saturating_sub(current_height)
    }

    /// Human time estimate until expiry, from the home chain's block pace.
    pub fn estimated_time_remaining(&self, current_height: u64) -> Duration {
        Duration::from_secs(
            self.blocks_remaining(current_height) * Chain::Thor.average_block_time_secs(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> ReferenceRegistration {
        ReferenceRegistration {
            asset: "BTC.BTC".parse().unwrap(),
            raw_memo: "my-deposit".to_string(),
            registration_tx_hash: "ABC123".to_string(),
            reference_id: "00042".to_string(),
            registered_at_height: 100,
            expiry_height: 1100,
            usage_count: 0,
            max_use: 10,
        }
    }

    #[test]
    fn test_expiry_is_strict() {
        let reg = registration();
        assert!(!reg.is_expired(1100));
        assert!(reg.is_expired(1101));
    }

    #[test]
    fn test_exhaustion() {
        let mut reg = registration();
        assert!(!reg.is_exhausted());
        reg.usage_count = 10;
        assert!(reg.is_exhausted());
        assert!(!reg.is_usable(500));
    }

    #[test]
    fn test_time_estimate_scales_with_blocks() {
        let reg = registration();
        let estimate = reg.estimated_time_remaining(1000);
        assert_eq!(estimate, Duration::from_secs(100 * 6));
        assert_eq!(reg.estimated_time_remaining(2000), Duration::ZERO);
    }
}
