use std::collections::BTreeSet;

use splitwarden_core::config::ChunkingConfig;
use splitwarden_core::types::{CommandBatch, PolicyDiff, PolicyDirection, PolicySnapshot};

pub mod chunker;
pub mod commands;
pub mod diff;
pub mod objects;
pub mod parser;
pub mod rules;

pub use chunker::{chunk_domains, oversized_domains};
pub use diff::diff_domains;
pub use objects::PolicyObjects;
pub use parser::parse_snapshot;

/// Pure reconciliation logic for FQDN split-tunnel policies.
///
/// Holds only the device limits it was built with; every method is a pure
/// function of its inputs.
#[derive(Debug, Clone, Copy)]
pub struct PolicyEngine {
    max_segment_length: usize,
}

impl PolicyEngine {
    pub fn new(chunking: ChunkingConfig) -> Self {
        Self {
            max_segment_length: chunking.max_segment_length,
        }
    }

    pub fn max_segment_length(&self) -> usize {
        self.max_segment_length
    }

    /// Command that reads the running configuration for a direction
    pub fn audit_batch(&self, direction: PolicyDirection) -> CommandBatch {
        commands::audit_batch(direction)
    }

    /// Parses the device's answer to [`PolicyEngine::audit_batch`]
    pub fn read_snapshot(
        &self,
        raw_output: &str,
        direction: PolicyDirection,
        group_policy: &str,
    ) -> PolicySnapshot {
        parse_snapshot(raw_output, direction, group_policy)
    }

    pub fn diff(&self, desired: &BTreeSet<String>, snapshot: &PolicySnapshot) -> PolicyDiff {
        diff_domains(desired, &snapshot.domains)
    }

    pub fn configure_batch(
        &self,
        group_policy: &str,
        direction: PolicyDirection,
        domains: &BTreeSet<String>,
    ) -> CommandBatch {
        commands::configure_batch(group_policy, direction, domains, self.max_segment_length)
    }

    pub fn clear_batch(&self, group_policy: &str, direction: PolicyDirection) -> CommandBatch {
        commands::clear_batch(group_policy, direction)
    }

    /// Domains that will overrun the device line budget on their own
    pub fn oversized<'a>(&self, domains: &'a BTreeSet<String>) -> Vec<&'a str> {
        oversized_domains(domains, self.max_segment_length)
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}
