use std::collections::BTreeSet;

use splitwarden_core::types::PolicyDiff;

/// Compares desired domains with what the device holds. Both sides come out
/// lexically sorted.
pub fn diff_domains(desired: &BTreeSet<String>, observed: &BTreeSet<String>) -> PolicyDiff {
    PolicyDiff {
        missing: desired.difference(observed).cloned().collect(),
        extra: observed.difference(desired).cloned().collect(),
    }
}
