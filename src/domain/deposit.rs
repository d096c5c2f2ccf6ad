use crate::domain::asset::AssetId;
use serde::{Deserialize, Serialize};

/// Everything a user needs to make the memo-free deposit.
///
/// Immutable once built: a changed amount or a refreshed inbound address
/// invalidates the whole instruction and the caller must construct a new
/// one, never patch fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositInstruction {
    pub asset: AssetId,
    pub inbound_address: String,
    pub dust_threshold_raw: u64,
    pub final_amount: String,
    pub qr_payload: String,
}

impl DepositInstruction {
    pub fn new(
        asset: AssetId,
        inbound_address: impl Into<String>,
        dust_threshold_raw: u64,
        final_amount: impl Into<String>,
        qr_payload: impl Into<String>,
    ) -> Self {
        Self {
            asset,
            inbound_address: inbound_address.into(),
            dust_threshold_raw,
            final_amount: final_amount.into(),
            qr_payload: qr_payload.into(),
        }
    }
}
