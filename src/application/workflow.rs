//! Registration-to-deposit state machine.
//!
//! The workflow owns an immutable [`WorkflowState`] snapshot and every
//! operation replaces it; callers read clones and feed changes back through
//! the operations, never by mutating a snapshot.

use crate::application::retry::RetryPolicy;
use crate::application::tracker::DepositTracker;
use crate::domain::asset::AssetId;
use crate::domain::decimal;
use crate::domain::deposit::DepositInstruction;
use crate::domain::encoding::{self, AmountEncoding, InputMode};
use crate::domain::ports::{ApiHandle, BroadcasterHandle, PoolStatus};
use crate::domain::registration::ReferenceRegistration;
use crate::error::{MemolessError, Result};
use crate::interfaces::qr;
use std::time::Duration;

/// Per-chain context fetched alongside the reference.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositContext {
    pub inbound_address: String,
    pub dust_threshold_raw: u64,
    pub asset_decimals: u32,
    pub current_height: u64,
    /// Human estimate of time until the registration expires.
    pub expiry_estimate: Duration,
}

#[derive(Debug, Clone)]
pub enum WorkflowState {
    Draft,
    Registering {
        asset: AssetId,
        memo: String,
    },
    AwaitingReference {
        asset: AssetId,
        registration_tx_hash: String,
    },
    ReferenceObtained {
        registration: ReferenceRegistration,
        context: DepositContext,
    },
    AmountConfiguring {
        registration: ReferenceRegistration,
        context: DepositContext,
        encoding: Option<AmountEncoding>,
    },
    AmountValidated {
        registration: ReferenceRegistration,
        context: DepositContext,
        encoding: AmountEncoding,
    },
    DepositPending {
        registration: ReferenceRegistration,
        context: DepositContext,
        instruction: DepositInstruction,
    },
    Completed {
        deposit_hash: String,
    },
    Expired,
    Failed {
        reason: String,
    },
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Draft => "Draft",
            WorkflowState::Registering { .. } => "Registering",
            WorkflowState::AwaitingReference { .. } => "AwaitingReference",
            WorkflowState::ReferenceObtained { .. } => "ReferenceObtained",
            WorkflowState::AmountConfiguring { .. } => "AmountConfiguring",
            WorkflowState::AmountValidated { .. } => "AmountValidated",
            WorkflowState::DepositPending { .. } => "DepositPending",
            WorkflowState::Completed { .. } => "Completed",
            WorkflowState::Expired => "Expired",
            WorkflowState::Failed { .. } => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowState::Completed { .. } | WorkflowState::Expired | WorkflowState::Failed { .. }
        )
    }
}

/// One registration attempt for one `(asset, memo)` pair. Keeping a single
/// live workflow per (wallet, asset, memo) tuple is the caller's
/// responsibility; instances share nothing.
pub struct MemolessWorkflow {
    api: ApiHandle,
    broadcaster: BroadcasterHandle,
    retry: RetryPolicy,
    settle_delay: Duration,
    state: WorkflowState,
}

impl MemolessWorkflow {
    pub fn new(api: ApiHandle, broadcaster: BroadcasterHandle) -> Self {
        Self {
            api,
            broadcaster,
            retry: RetryPolicy::default(),
            // ~1 home-chain block between broadcast and the first lookup.
            settle_delay: Duration::from_secs(6),
            state: WorkflowState::Draft,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn current_state(&self) -> WorkflowState {
        self.state.clone()
    }

    /// Assets a memoless deposit can target: pools that are live, excluding
    /// the home chain's native asset and token sub-assets.
    pub async fn eligible_assets(&self) -> Result<Vec<AssetId>> {
        let pools = self.api.pools().await?;
        Ok(pools
            .into_iter()
            .filter(|pool| pool.status == PoolStatus::Available)
            .map(|pool| pool.asset)
            .filter(|asset| !asset.is_native_rune() && !asset.is_token())
            .collect())
    }

    /// Broadcast the zero-amount registration transaction and poll until the
    /// network hands back a reference ID, then fetch the deposit context.
    pub async fn start_registration(
        &mut self,
        asset: AssetId,
        memo: &str,
    ) -> Result<WorkflowState> {
        self.expect_state("Draft", |state| matches!(state, WorkflowState::Draft))?;
        self.state = WorkflowState::Registering {
            asset: asset.clone(),
            memo: memo.to_string(),
        };

        let registration_memo = format!("REFERENCE:{asset}:{memo}");
        let broadcast = self
            .broadcaster
            .broadcast_deposit(&asset, "0", &registration_memo)
            .await;
        let tx_hash = match broadcast {
            Ok(hash) => hash,
            Err(err) => {
                let reason = err.to_string();
                self.state = WorkflowState::Failed {
                    reason: reason.clone(),
                };
                return Err(MemolessError::BroadcastFailed(reason));
            }
        };
        tracing::info!(target: "memoless", tx_hash = %tx_hash, asset = %asset, "registration broadcast");
        self.state = WorkflowState::AwaitingReference {
            asset: asset.clone(),
            registration_tx_hash: tx_hash.clone(),
        };

        tokio::time::sleep(self.settle_delay).await;
        let retry = self.retry;
        let api = self.api.clone();
        let lookup_hash = tx_hash.clone();
        let lookup = retry
            .run("reference lookup", move || {
                let api = api.clone();
                let hash = lookup_hash.clone();
                async move { api.memo_lookup(&hash).await }
            })
            .await;
        let registration = match lookup {
            Ok(registration) => registration,
            Err(err) => {
                self.state = WorkflowState::Failed {
                    reason: err.to_string(),
                };
                return Err(err);
            }
        };

        let finished = self.finish_registration(registration).await;
        match finished {
            Ok(state) => Ok(state),
            Err(err) => {
                if !matches!(self.state, WorkflowState::Expired) {
                    self.state = WorkflowState::Failed {
                        reason: err.to_string(),
                    };
                }
                Err(err)
            }
        }
    }

    async fn finish_registration(
        &mut self,
        registration: ReferenceRegistration,
    ) -> Result<WorkflowState> {
        let current_height = self.api.last_block_height().await?;
        if !registration.is_usable(current_height) {
            self.state = WorkflowState::Expired;
            return Err(MemolessError::Expired);
        }

        let chain = registration.asset.chain;
        let inbound = self
            .api
            .inbound_addresses()
            .await?
            .into_iter()
            .find(|entry| entry.chain == chain)
            .ok_or_else(|| {
                MemolessError::Malformed(format!("no inbound address published for {chain}"))
            })?;
        if inbound.halted {
            return Err(MemolessError::Malformed(format!(
                "inbound observation halted for {chain}"
            )));
        }

        let context = DepositContext {
            inbound_address: inbound.address,
            dust_threshold_raw: inbound.dust_threshold_raw,
            asset_decimals: chain.native_decimals(),
            current_height,
            expiry_estimate: registration.estimated_time_remaining(current_height),
        };
        tracing::info!(
            target: "memoless",
            reference_id = %registration.reference_id,
            expiry_height = registration.expiry_height,
            "reference obtained"
        );
        self.state = WorkflowState::ReferenceObtained {
            registration,
            context,
        };
        Ok(self.current_state())
    }

    /// Re-encode the user's amount input. Input problems surface inside the
    /// returned snapshot's encoding; a server disagreement surfaces as a
    /// recoverable [`MemolessError::EncodingMismatch`] with the state parked
    /// in `AmountConfiguring`.
    pub async fn configure_amount(
        &mut self,
        user_input: &str,
        input_mode: InputMode,
        asset_price_usd: Option<f64>,
    ) -> Result<WorkflowState> {
        let (registration, context) = match &self.state {
            WorkflowState::ReferenceObtained {
                registration,
                context,
            }
            | WorkflowState::AmountConfiguring {
                registration,
                context,
                ..
            }
            | WorkflowState::AmountValidated {
                registration,
                context,
                ..
            } => (registration.clone(), context.clone()),
            other => {
                return Err(MemolessError::InvalidState {
                    expected: "ReferenceObtained",
                    actual: other.name(),
                });
            }
        };

        let registration = self.refresh_registration(registration).await?;

        let mut enc = encoding::encode(
            user_input,
            input_mode,
            &registration.reference_id,
            context.asset_decimals,
            asset_price_usd,
        );
        if enc.is_valid()
            && !encoding::validate_dust_threshold(
                &enc.final_amount,
                context.dust_threshold_raw,
                context.asset_decimals,
            )
        {
            enc.errors.push(format!(
                "amount must exceed the chain dust threshold of {}",
                decimal::format_raw(
                    u128::from(context.dust_threshold_raw),
                    context.asset_decimals
                )
            ));
        }

        if !enc.is_valid() {
            self.state = WorkflowState::AmountConfiguring {
                registration,
                context,
                encoding: Some(enc),
            };
            return Ok(self.current_state());
        }

        // Park in the editing state before the network call so a transport
        // failure leaves the machine somewhere recoverable.
        self.state = WorkflowState::AmountConfiguring {
            registration: registration.clone(),
            context: context.clone(),
            encoding: Some(enc.clone()),
        };

        let raw_amount = decimal::shift_to_integer(&enc.final_amount, context.asset_decimals)?;
        let check = self
            .api
            .memo_check(&registration.asset, &raw_amount)
            .await?;
        let agrees = check.valid
            && check.decoded_reference.as_deref() == Some(registration.reference_id.as_str());
        if !agrees {
            return Err(MemolessError::EncodingMismatch {
                local: registration.reference_id.clone(),
                remote: check
                    .decoded_reference
                    .unwrap_or_else(|| "<none>".to_string()),
            });
        }

        self.state = WorkflowState::AmountValidated {
            registration,
            context,
            encoding: enc,
        };
        Ok(self.current_state())
    }

    /// Re-fetch server-side registration state (usage is never incremented
    /// locally) and apply the expiry rule.
    async fn refresh_registration(
        &mut self,
        previous: ReferenceRegistration,
    ) -> Result<ReferenceRegistration> {
        let current_height = self.api.last_block_height().await?;
        let fresh = self.api.memo_lookup(&previous.registration_tx_hash).await?;
        let registration = match fresh {
            Some(fresh) => fresh,
            // Observer lag; keep the last snapshot we saw.
            None => previous,
        };
        if !registration.is_usable(current_height) {
            self.state = WorkflowState::Expired;
            return Err(MemolessError::Expired);
        }
        Ok(registration)
    }

    /// Freeze the validated amount into a deposit instruction.
    pub fn build_deposit_instruction(&mut self) -> Result<WorkflowState> {
        let (registration, context, enc) = match &self.state {
            WorkflowState::AmountValidated {
                registration,
                context,
                encoding,
            } => (registration.clone(), context.clone(), encoding.clone()),
            other => {
                return Err(MemolessError::InvalidState {
                    expected: "AmountValidated",
                    actual: other.name(),
                });
            }
        };

        let payload = qr::payload(
            registration.asset.chain,
            &context.inbound_address,
            &enc.final_amount,
        );
        let instruction = DepositInstruction::new(
            registration.asset.clone(),
            context.inbound_address.clone(),
            context.dust_threshold_raw,
            enc.final_amount.clone(),
            payload,
        );
        self.state = WorkflowState::DepositPending {
            registration,
            context,
            instruction,
        };
        Ok(self.current_state())
    }

    pub fn instruction(&self) -> Option<&DepositInstruction> {
        match &self.state {
            WorkflowState::DepositPending { instruction, .. } => Some(instruction),
            _ => None,
        }
    }

    /// The user broadcast the deposit externally; record its hash. The hash
    /// is what gets handed to the tracker.
    pub fn submit_deposit(&mut self, deposit_hash: &str) -> Result<WorkflowState> {
        self.expect_state("DepositPending", |state| {
            matches!(state, WorkflowState::DepositPending { .. })
        })?;
        self.state = WorkflowState::Completed {
            deposit_hash: deposit_hash.to_string(),
        };
        Ok(self.current_state())
    }

    /// Tracker for the submitted deposit, sharing this workflow's API handle.
    pub fn track_deposit(&self) -> Result<DepositTracker> {
        match &self.state {
            WorkflowState::Completed { deposit_hash } => {
                Ok(DepositTracker::new(self.api.clone(), deposit_hash.clone()))
            }
            other => Err(MemolessError::InvalidState {
                expected: "Completed",
                actual: other.name(),
            }),
        }
    }

    fn expect_state(
        &self,
        expected: &'static str,
        check: impl Fn(&WorkflowState) -> bool,
    ) -> Result<()> {
        if check(&self.state) {
            Ok(())
        } else {
            Err(MemolessError::InvalidState {
                expected,
                actual: self.state.name(),
            })
        }
    }
}
