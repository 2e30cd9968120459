use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SplitwardenError;

/// Whether a domain list is tunneled (include) or bypasses the tunnel (exclude).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PolicyDirection {
    Include,
    Exclude,
}

impl PolicyDirection {
    /// Order in which directions are processed for one device.
    pub const ALL: [PolicyDirection; 2] = [PolicyDirection::Include, PolicyDirection::Exclude];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyDirection::Include => "include",
            PolicyDirection::Exclude => "exclude",
        }
    }

    /// Custom attribute keyword, e.g. `dynamic-split-exclude-domains`.
    pub fn keyword(&self) -> &'static str {
        match self {
            PolicyDirection::Include => "dynamic-split-include-domains",
            PolicyDirection::Exclude => "dynamic-split-exclude-domains",
        }
    }
}

impl FromStr for PolicyDirection {
    type Err = SplitwardenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "include" => Ok(PolicyDirection::Include),
            "exclude" => Ok(PolicyDirection::Exclude),
            _ => Err(SplitwardenError::UnknownDirection(value.to_string())),
        }
    }
}

impl fmt::Display for PolicyDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Split-tunnel state of one direction as read back from a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    /// The webvpn custom attribute for the direction is declared
    pub webvpn_declared: bool,
    /// The group policy binds the attribute to the expected data object
    pub group_policy_bound: bool,
    /// Domains held by the data object(s)
    pub domains: BTreeSet<String>,
}

impl PolicySnapshot {
    /// Snapshot of a device with nothing configured for the direction.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_configured(&self) -> bool {
        self.webvpn_declared || self.group_policy_bound || !self.domains.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDiff {
    /// Desired but absent on the device
    pub missing: Vec<String>,
    /// Present on the device but not desired
    pub extra: Vec<String>,
}

impl PolicyDiff {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// Ordered CLI lines sent to a device as one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandBatch {
    lines: Vec<String>,
}

impl CommandBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Newline-joined payload handed to the orchestration service.
    pub fn payload(&self) -> String {
        self.lines.join("\n")
    }
}

impl From<Vec<String>> for CommandBatch {
    fn from(lines: Vec<String>) -> Self {
        Self { lines }
    }
}

impl<S: Into<String>> FromIterator<S> for CommandBatch {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CommandBatch {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse() {
        assert_eq!("include".parse::<PolicyDirection>().unwrap(), PolicyDirection::Include);
        assert_eq!(" Exclude ".parse::<PolicyDirection>().unwrap(), PolicyDirection::Exclude);
        assert!("both".parse::<PolicyDirection>().is_err());
    }

    #[test]
    fn test_direction_keyword() {
        assert_eq!(PolicyDirection::Exclude.keyword(), "dynamic-split-exclude-domains");
        assert_eq!(PolicyDirection::Include.to_string(), "include");
    }

    #[test]
    fn test_batch_payload() {
        let batch: CommandBatch = ["config t", "write"].into_iter().collect();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.payload(), "config t\nwrite");
        assert_eq!(CommandBatch::new().payload(), "");
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = PolicySnapshot::empty();
        assert!(!snapshot.is_configured());
        assert!(!snapshot.webvpn_declared);
        assert!(snapshot.domains.is_empty());
    }
}
