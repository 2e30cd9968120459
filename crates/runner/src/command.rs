//! Wire format of the orchestrator's `exec any` live-status action.

use serde::{Deserialize, Serialize};

use splitwarden_core::error::ExecutorFailure;
use splitwarden_core::types::CommandBatch;

pub const CONTENT_TYPE: &str = "application/yang-data+json";
const OUTPUT_KEY: &str = "tailf-ned-cisco-asa-stats:output";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecRequest {
    pub input: ExecInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecInput {
    /// Command lines joined with `\n`
    pub args: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ExecReply {
    #[serde(rename = "tailf-ned-cisco-asa-stats:output")]
    output: Option<ExecOutput>,
    errors: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct ExecOutput {
    result: Option<String>,
}

impl ExecRequest {
    pub fn from_batch(batch: &CommandBatch) -> Self {
        Self {
            input: ExecInput {
                args: batch.payload(),
            },
        }
    }
}

/// Extracts the device text from a reply body.
///
/// An `errors` member wins over any output. When the device text contains one
/// of `failure_markers` the reply is rejected even though the orchestrator
/// reported success.
pub fn parse_reply(body: &str, failure_markers: &[String]) -> Result<String, ExecutorFailure> {
    let reply: ExecReply = serde_json::from_str(body)
        .map_err(|err| ExecutorFailure::MalformedReply(format!("invalid JSON: {err}")))?;

    if let Some(errors) = reply.errors {
        return Err(ExecutorFailure::Envelope(errors.to_string()));
    }

    let output = reply
        .output
        .and_then(|output| output.result)
        .ok_or_else(|| ExecutorFailure::MalformedReply(format!("missing {OUTPUT_KEY}.result")))?;

    if let Some(marker) = failure_markers
        .iter()
        .find(|marker| !marker.is_empty() && output.contains(marker.as_str()))
    {
        return Err(ExecutorFailure::Rejected(marker.clone()));
    }

    Ok(output)
}
