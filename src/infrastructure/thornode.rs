//! HTTP adapter for the network's public REST endpoints.
//!
//! Each endpoint gets its own closed response type; nothing here leaks
//! `serde_json::Value` upwards. The observation payload keeps the
//! absent-versus-null distinction the stage derivation relies on.

use crate::domain::asset::{AssetId, Chain};
use crate::domain::pipeline::{DepositObservation, Field};
use crate::domain::ports::{
    InboundAddress, MemoCheckResult, PoolInfo, PoolStatus, ThornodeApi,
};
use crate::domain::registration::ReferenceRegistration;
use crate::error::{MemolessError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use url::Url;

pub const MAINNET_URL: &str = "https://thornode.ninerealms.com";
pub const STAGENET_URL: &str = "https://stagenet-thornode.ninerealms.com";

#[derive(Clone)]
pub struct ThornodeClient {
    base: Url,
    http: reqwest::Client,
}

impl ThornodeClient {
    /// `base` like `https://thornode.ninerealms.com`. Network selection
    /// (mainnet/stagenet) is the caller's concern.
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { base, http })
    }

    pub fn mainnet() -> Result<Self> {
        Self::new(MAINNET_URL)
    }

    async fn get_json<T>(&self, path: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = self.base.join(path)?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MemolessError::Malformed(format!("{path}: HTTP {status}")));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| MemolessError::Malformed(format!("{path}: {err}")))
    }

    /// Like [`get_json`](Self::get_json) but maps 404 to `Ok(None)`:
    /// lookups that the network has not indexed yet are empty polls, not
    /// failures.
    async fn get_json_optional<T>(&self, path: &str) -> Result<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = self.base.join(path)?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(MemolessError::Malformed(format!("{path}: HTTP {status}")));
        }
        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|err| MemolessError::Malformed(format!("{path}: {err}")))
    }
}

fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
struct PoolDto {
    asset: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct InboundAddressDto {
    chain: String,
    address: String,
    dust_threshold: String,
    #[serde(default)]
    halted: bool,
}

#[derive(Debug, Deserialize)]
struct MemoLookupDto {
    asset: String,
    memo: String,
    reference_id: String,
    registered_height: u64,
    expiry_height: u64,
    usage_count: u32,
    max_use: u32,
}

#[derive(Debug, Deserialize)]
struct MemoCheckDto {
    valid: bool,
    #[serde(default)]
    reference_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LastBlockDto {
    thorchain: u64,
}

#[derive(Debug, Deserialize)]
struct TxStatusDto {
    #[serde(default)]
    observed_tx: Option<ObservedTxDto>,
}

#[derive(Debug, Deserialize)]
struct ObservedTxDto {
    #[serde(default, deserialize_with = "double_option")]
    block_height: Option<Option<u64>>,
    #[serde(default, deserialize_with = "double_option")]
    finalise_height: Option<Option<u64>>,
    #[serde(default)]
    out_hashes: Option<Vec<String>>,
}

#[async_trait]
impl ThornodeApi for ThornodeClient {
    async fn pools(&self) -> Result<Vec<PoolInfo>> {
        let pools: Vec<PoolDto> = self.get_json("/thorchain/pools").await?;
        // Pools on chains outside the supported set are simply not offered.
        Ok(pools
            .into_iter()
            .filter_map(|dto| match dto.asset.parse::<AssetId>() {
                Ok(asset) => Some(PoolInfo {
                    asset,
                    status: PoolStatus::parse(&dto.status),
                }),
                Err(_) => {
                    tracing::debug!(target: "memoless", asset = %dto.asset, "skipping unsupported pool");
                    None
                }
            })
            .collect())
    }

    async fn inbound_addresses(&self) -> Result<Vec<InboundAddress>> {
        let entries: Vec<InboundAddressDto> =
            self.get_json("/thorchain/inbound_addresses").await?;
        entries
            .into_iter()
            .filter_map(|dto| {
                let chain = dto.chain.parse::<Chain>().ok()?;
                Some((chain, dto))
            })
            .map(|(chain, dto)| {
                Ok(InboundAddress {
                    chain,
                    address: dto.address,
                    dust_threshold_raw: dto.dust_threshold.parse().map_err(|_| {
                        MemolessError::Malformed(format!(
                            "dust threshold {}",
                            dto.dust_threshold
                        ))
                    })?,
                    halted: dto.halted,
                })
            })
            .collect()
    }

    async fn memo_lookup(&self, tx_hash: &str) -> Result<Option<ReferenceRegistration>> {
        let path = format!("/thorchain/memo/{tx_hash}");
        let Some(dto) = self.get_json_optional::<MemoLookupDto>(&path).await? else {
            return Ok(None);
        };
        Ok(Some(ReferenceRegistration {
            asset: dto.asset.parse::<AssetId>().map_err(|err| {
                MemolessError::Malformed(format!("memo asset {}: {err}", dto.asset))
            })?,
            raw_memo: dto.memo,
            registration_tx_hash: tx_hash.to_string(),
            reference_id: dto.reference_id,
            registered_at_height: dto.registered_height,
            expiry_height: dto.expiry_height,
            usage_count: dto.usage_count,
            max_use: dto.max_use,
        }))
    }

    async fn memo_check(&self, asset: &AssetId, raw_amount: &str) -> Result<MemoCheckResult> {
        let path = format!("/thorchain/memo/check/{asset}/{raw_amount}");
        let dto: MemoCheckDto = self.get_json(&path).await?;
        Ok(MemoCheckResult {
            valid: dto.valid,
            decoded_reference: dto.reference_id,
        })
    }

    async fn last_block_height(&self) -> Result<u64> {
        let blocks: Vec<LastBlockDto> = self.get_json("/thorchain/lastblock/THORCHAIN").await?;
        blocks
            .first()
            .map(|block| block.thorchain)
            .ok_or_else(|| MemolessError::Malformed("lastblock: empty response".to_string()))
    }

    async fn observed_tx(&self, hash: &str) -> Result<Option<DepositObservation>> {
        let path = format!("/thorchain/tx/{hash}");
        let Some(dto) = self.get_json_optional::<TxStatusDto>(&path).await? else {
            return Ok(None);
        };
        let Some(observed) = dto.observed_tx else {
            return Ok(None);
        };
        Ok(Some(DepositObservation {
            status_present: true,
            block_height: Field::from_double(observed.block_height),
            finalise_height: Field::from_double(observed.finalise_height),
            out_tx_count: observed.out_hashes.map(|hashes| hashes.len()).unwrap_or(0),
        }))
    }
}
