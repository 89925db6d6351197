use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("unparseable date text: {0:?}")]
    UnparseableDate(String),

    #[error("rejected low-quality content: {0}")]
    RejectedLowQuality(String),

    #[error("malformed range: end precedes start")]
    MalformedRange,

    #[error("invalid identity input: missing {0}")]
    InvalidIdentityInput(&'static str),

    #[error("unknown source: {0}")]
    UnknownSource(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink error: {0}")]
    Sink(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Per-candidate rejection reasons tallied in the run summary.
///
/// These mirror the recoverable arm of the error taxonomy: every variant
/// here drops exactly one candidate and lets the batch continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    UnparseableDate,
    LowQuality,
    MalformedRange,
    InvalidIdentity,
}

impl PipelineError {
    /// The rejection bucket for this error, if it is a per-candidate drop
    /// rather than a run-level failure.
    pub fn rejection_reason(&self) -> Option<RejectionReason> {
        match self {
            PipelineError::UnparseableDate(_) => Some(RejectionReason::UnparseableDate),
            PipelineError::RejectedLowQuality(_) => Some(RejectionReason::LowQuality),
            PipelineError::MalformedRange => Some(RejectionReason::MalformedRange),
            PipelineError::InvalidIdentityInput(_) => Some(RejectionReason::InvalidIdentity),
            _ => None,
        }
    }
}
