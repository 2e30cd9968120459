use splitwarden_core::types::{PolicyDirection, PolicySnapshot};

use crate::objects::PolicyObjects;
use crate::rules::LINE_RULES;

/// Builds a snapshot of one direction from raw device output.
///
/// Accepts `\r\n`, `\n` or bare `\r` line endings. Output that mentions none
/// of the policy objects yields an empty snapshot; that is a finding, not an
/// error.
pub fn parse_snapshot(raw: &str, direction: PolicyDirection, group_policy: &str) -> PolicySnapshot {
    let objects = PolicyObjects::new(group_policy, direction);
    let mut snapshot = PolicySnapshot::empty();

    for line in split_lines(raw) {
        for rule in LINE_RULES {
            rule.evaluate(&objects, line, &mut snapshot);
        }
    }

    snapshot
}

fn split_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c| c == '\r' || c == '\n')
        .filter(|line| !line.trim().is_empty())
}
