//! Names of the device objects that make up one split-tunnel policy.

use splitwarden_core::types::PolicyDirection;

/// Device-side names for one (group policy, direction) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyObjects {
    pub direction: PolicyDirection,
    pub group_policy: String,
    data_object: String,
}

impl PolicyObjects {
    pub fn new(group_policy: &str, direction: PolicyDirection) -> Self {
        let group_policy = group_policy.trim().to_string();
        let data_object = format!("{}_{}", group_policy.to_lowercase(), direction.as_str());
        Self {
            direction,
            group_policy,
            data_object,
        }
    }

    pub fn keyword(&self) -> &'static str {
        self.direction.keyword()
    }

    /// Data object holding the domains, e.g. `group1_exclude`.
    pub fn data_object(&self) -> &str {
        &self.data_object
    }

    /// `anyconnect-custom-attr <keyword>`
    pub fn attribute_declaration(&self) -> String {
        format!("anyconnect-custom-attr {}", self.keyword())
    }

    /// `anyconnect-custom <keyword> value`, followed on the device by the object name
    pub fn binding_prefix(&self) -> String {
        format!("anyconnect-custom {} value", self.keyword())
    }

    /// `anyconnect-custom-data <keyword>`, followed on the device by the object name
    pub fn data_prefix(&self) -> String {
        format!("anyconnect-custom-data {}", self.keyword())
    }
}

/// True when `prefix` occurs in `line` and the next whitespace-delimited token
/// equals `name`, ignoring ASCII case.
pub(crate) fn names_object(line: &str, prefix: &str, name: &str) -> bool {
    line.match_indices(prefix).any(|(idx, _)| {
        let rest = &line[idx + prefix.len()..];
        if !rest.starts_with(char::is_whitespace) {
            return false;
        }
        rest.split_whitespace()
            .next()
            .map(|token| token.eq_ignore_ascii_case(name))
            .unwrap_or(false)
    })
}
