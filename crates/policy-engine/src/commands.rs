//! CLI transactions for reading, writing and removing a split-tunnel policy.

use std::collections::BTreeSet;

use splitwarden_core::types::{CommandBatch, PolicyDirection};

use crate::chunker::chunk_domains;
use crate::objects::PolicyObjects;

/// Read-only command whose output feeds the parser.
pub fn audit_batch(direction: PolicyDirection) -> CommandBatch {
    let mut batch = CommandBatch::new();
    batch.push(format!("show run | include {}", direction.keyword()));
    batch
}

/// Declares the attribute, writes the domains in chunks and binds the group
/// policy to the data object. An empty domain set still declares and binds.
pub fn configure_batch(
    group_policy: &str,
    direction: PolicyDirection,
    domains: &BTreeSet<String>,
    max_segment_length: usize,
) -> CommandBatch {
    let objects = PolicyObjects::new(group_policy, direction);
    let mut batch = CommandBatch::new();

    batch.push("config t");
    batch.push("webvpn");
    batch.push(format!(
        "{} description FQDN split tunneling {}",
        objects.attribute_declaration(),
        direction
    ));
    batch.push("exit");

    for segment in chunk_domains(domains, max_segment_length) {
        batch.push(format!(
            "{} {} {}",
            objects.data_prefix(),
            objects.data_object(),
            segment
        ));
    }

    batch.push(format!("group-policy {} attributes", objects.group_policy));
    batch.push(format!("{} {}", objects.binding_prefix(), objects.data_object()));
    batch.push("exit");
    batch.push("write");
    batch
}

/// Unbinds the attribute from the group policy and drops the data object.
pub fn clear_batch(group_policy: &str, direction: PolicyDirection) -> CommandBatch {
    let objects = PolicyObjects::new(group_policy, direction);
    let mut batch = CommandBatch::new();

    batch.push("config t");
    batch.push(format!("group-policy {} attributes", objects.group_policy));
    batch.push(format!("no anyconnect-custom {}", objects.keyword()));
    batch.push("exit");
    batch.push(format!(
        "no {} {}",
        objects.data_prefix(),
        objects.data_object()
    ));
    batch.push("write");
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_snapshot;

    fn set(domains: &[&str]) -> BTreeSet<String> {
        domains.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_audit_command() {
        let batch = audit_batch(PolicyDirection::Include);
        assert_eq!(batch.lines(), ["show run | include dynamic-split-include-domains"]);
    }

    #[test]
    fn test_configure_lines() {
        let batch = configure_batch(
            "Group1",
            PolicyDirection::Exclude,
            &set(&["webex.com", "netflix.com"]),
            421,
        );
        assert_eq!(
            batch.lines(),
            [
                "config t",
                "webvpn",
                "anyconnect-custom-attr dynamic-split-exclude-domains description FQDN split tunneling exclude",
                "exit",
                "anyconnect-custom-data dynamic-split-exclude-domains group1_exclude netflix.com,webex.com,",
                "group-policy Group1 attributes",
                "anyconnect-custom dynamic-split-exclude-domains value group1_exclude",
                "exit",
                "write",
            ]
        );
    }

    #[test]
    fn test_configure_chunks_large_lists() {
        let domains: BTreeSet<String> = (0..100).map(|i| format!("site{i:03}.example.org")).collect();
        let batch = configure_batch("Group1", PolicyDirection::Include, &domains, 64);
        let data_lines: Vec<&String> = batch
            .lines()
            .iter()
            .filter(|line| line.starts_with("anyconnect-custom-data"))
            .collect();
        assert!(data_lines.len() > 1);

        let snapshot = parse_snapshot(&batch.payload(), PolicyDirection::Include, "Group1");
        assert_eq!(snapshot.domains, domains);
    }

    #[test]
    fn test_configure_empty_still_declares() {
        let batch = configure_batch("Group1", PolicyDirection::Include, &BTreeSet::new(), 421);
        assert_eq!(batch.len(), 8);
        assert!(!batch.lines().iter().any(|line| line.starts_with("anyconnect-custom-data")));
    }

    #[test]
    fn test_clear_lines() {
        let batch = clear_batch("DEFAULT_GROUP_POLICY", PolicyDirection::Include);
        assert_eq!(
            batch.lines(),
            [
                "config t",
                "group-policy DEFAULT_GROUP_POLICY attributes",
                "no anyconnect-custom dynamic-split-include-domains",
                "exit",
                "no anyconnect-custom-data dynamic-split-include-domains default_group_policy_include",
                "write",
            ]
        );
    }

    #[test]
    fn test_clear_then_configure_empty_is_declared_policy() {
        let clear = clear_batch("Group1", PolicyDirection::Exclude);
        let configure = configure_batch("Group1", PolicyDirection::Exclude, &BTreeSet::new(), 421);
        let echoed = format!("{}\r\n{}", clear.payload(), configure.payload());

        let snapshot = parse_snapshot(&echoed, PolicyDirection::Exclude, "Group1");
        assert!(snapshot.webvpn_declared);
        assert!(snapshot.group_policy_bound);
        assert!(snapshot.domains.is_empty());
    }
}
