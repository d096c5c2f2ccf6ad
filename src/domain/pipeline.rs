//! Observation-pipeline model for a submitted deposit: the ordered stages,
//! the monotone progress merge, and the snapshot handed to callers.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// JSON field state. Stage derivation depends on "absent" versus "null"
/// being distinguishable, so the wire adapters decode into this instead of
/// collapsing both into `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field<T> {
    #[default]
    Absent,
    Null,
    Present(T),
}

impl<T> Field<T> {
    /// From serde's double-`Option` idiom: missing field -> `None`,
    /// explicit null -> `Some(None)`, value -> `Some(Some(v))`.
    pub fn from_double(value: Option<Option<T>>) -> Self {
        match value {
            None => Field::Absent,
            Some(None) => Field::Null,
            Some(Some(v)) => Field::Present(v),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Present(v) => Some(v),
            _ => None,
        }
    }
}

/// One poll's worth of observation data, already lifted out of the wire
/// format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositObservation {
    /// The status payload itself was present in the response.
    pub status_present: bool,
    pub block_height: Field<u64>,
    pub finalise_height: Field<u64>,
    pub out_tx_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PipelineStage {
    InboundObserved,
    Processing,
    OutboundSent,
    Finalized,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 4] = [
        PipelineStage::InboundObserved,
        PipelineStage::Processing,
        PipelineStage::OutboundSent,
        PipelineStage::Finalized,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::InboundObserved => "Inbound Observed",
            PipelineStage::Processing => "Processing",
            PipelineStage::OutboundSent => "Outbound Sent",
            PipelineStage::Finalized => "Finalized",
        }
    }
}

/// High-water mark over the pipeline stages.
///
/// Merging only ever sets flags, so a later poll carrying fewer populated
/// fields than an earlier one (observer lag) can never walk user-visible
/// progress backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageProgress {
    pub inbound_observed: bool,
    pub processing: bool,
    pub outbound_sent: bool,
    pub finalized: bool,
}

impl StageProgress {
    pub fn from_observation(obs: &DepositObservation) -> Self {
        Self {
            inbound_observed: obs.status_present,
            processing: obs.block_height.is_present(),
            outbound_sent: obs.out_tx_count > 0,
            finalized: obs.finalise_height.is_present(),
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            inbound_observed: self.inbound_observed || other.inbound_observed,
            processing: self.processing || other.processing,
            outbound_sent: self.outbound_sent || other.outbound_sent,
            finalized: self.finalized || other.finalized,
        }
    }

    pub fn reached(&self, stage: PipelineStage) -> bool {
        match stage {
            PipelineStage::InboundObserved => self.inbound_observed,
            PipelineStage::Processing => self.processing,
            PipelineStage::OutboundSent => self.outbound_sent,
            PipelineStage::Finalized => self.finalized,
        }
    }

    /// Most advanced stage reached so far, if any.
    pub fn current(&self) -> Option<PipelineStage> {
        PipelineStage::ALL
            .into_iter()
            .rev()
            .find(|stage| self.reached(*stage))
    }

    /// Ordered stage report for display.
    pub fn stages(&self) -> Vec<(PipelineStage, bool)> {
        PipelineStage::ALL
            .into_iter()
            .map(|stage| (stage, self.reached(stage)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackingStatus {
    Polling,
    Completed,
    TimedOut,
    Error,
}

impl TrackingStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TrackingStatus::Polling)
    }
}

/// Snapshot of a tracked deposit, handed out per poll.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedDeposit {
    pub hash: String,
    pub progress: StageProgress,
    pub status: TrackingStatus,
    pub attempts: u32,
    pub last_polled_at: Option<SystemTime>,
}

impl TrackedDeposit {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            progress: StageProgress::default(),
            status: TrackingStatus::Polling,
            attempts: 0,
            last_polled_at: None,
        }
    }

    pub fn stages(&self) -> Vec<(PipelineStage, bool)> {
        self.progress.stages()
    }
}
