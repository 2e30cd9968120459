use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplitwardenError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid domain {domain:?}: {reason}")]
    InvalidDomain { domain: String, reason: String },
    #[error("unknown policy direction: {0}")]
    UnknownDirection(String),
}

/// Failure reported by a device command executor.
///
/// Executors never panic into the reconciler; every way a command batch can
/// go wrong ends up as one of these variants.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ExecutorFailure {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("authentication failure: {0}")]
    Auth(String),
    #[error("orchestrator returned errors: {0}")]
    Envelope(String),
    #[error("device output rejected: {0}")]
    Rejected(String),
    #[error("malformed reply: {0}")]
    MalformedReply(String),
}

impl ExecutorFailure {
    /// True when the device could not be reached or the orchestrator refused
    /// our credentials. Anything else means the device (or the orchestrator on
    /// its behalf) answered, just not with usable output.
    pub fn is_transport(&self) -> bool {
        matches!(self, ExecutorFailure::Transport(_) | ExecutorFailure::Auth(_))
    }
}
