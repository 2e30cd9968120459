use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use splitwarden_core::types::{PolicyDiff, PolicyDirection, PolicySnapshot};

/// Terminal state of one direction on one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum Outcome<T> {
    Success(T),
    Failed { reason: String },
    Skipped,
}

impl<T> Outcome<T> {
    pub fn failed(reason: impl Into<String>) -> Self {
        Outcome::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::Failed { .. } => "failed",
            Outcome::Skipped => "skipped",
        }
    }
}

impl<T> Default for Outcome<T> {
    fn default() -> Self {
        Outcome::Skipped
    }
}

/// Both directions of one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceOutcome<T> {
    pub exclude: Outcome<T>,
    pub include: Outcome<T>,
}

impl<T> Default for DeviceOutcome<T> {
    fn default() -> Self {
        Self {
            exclude: Outcome::Skipped,
            include: Outcome::Skipped,
        }
    }
}

impl<T> DeviceOutcome<T> {
    pub fn get(&self, direction: PolicyDirection) -> &Outcome<T> {
        match direction {
            PolicyDirection::Exclude => &self.exclude,
            PolicyDirection::Include => &self.include,
        }
    }

    pub fn set(&mut self, direction: PolicyDirection, outcome: Outcome<T>) {
        match direction {
            PolicyDirection::Exclude => self.exclude = outcome,
            PolicyDirection::Include => self.include = outcome,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.exclude.is_failed() || self.include.is_failed()
    }

    /// Both directions succeeded; what a clear needs.
    pub fn fully_succeeded(&self) -> bool {
        self.exclude.is_success() && self.include.is_success()
    }
}

/// Audit result of one direction: device flags, what it holds, and the diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionAudit {
    pub webvpn_declared: bool,
    pub group_policy_bound: bool,
    /// Domains found on the device, sorted
    pub domains: Vec<String>,
    pub missing: Vec<String>,
    pub extra: Vec<String>,
}

impl DirectionAudit {
    pub fn new(snapshot: PolicySnapshot, diff: PolicyDiff) -> Self {
        Self {
            webvpn_declared: snapshot.webvpn_declared,
            group_policy_bound: snapshot.group_policy_bound,
            domains: snapshot.domains.into_iter().collect(),
            missing: diff.missing,
            extra: diff.extra,
        }
    }

    /// Device matches the desired policy exactly.
    pub fn in_sync(&self) -> bool {
        self.webvpn_declared && self.group_policy_bound && self.missing.is_empty() && self.extra.is_empty()
    }
}

pub type AuditReport = BTreeMap<String, DeviceOutcome<DirectionAudit>>;
pub type UpdateReport = BTreeMap<String, DeviceOutcome<()>>;
pub type ClearReport = BTreeMap<String, DeviceOutcome<()>>;

/// Devices with at least one failed direction.
pub fn failed_devices<T>(report: &BTreeMap<String, DeviceOutcome<T>>) -> Vec<&str> {
    report
        .iter()
        .filter(|(_, outcome)| outcome.has_failures())
        .map(|(device, _)| device.as_str())
        .collect()
}
