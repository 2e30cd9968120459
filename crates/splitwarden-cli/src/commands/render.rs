use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;

use reconciler::{failed_devices, AuditReport, DeviceOutcome, DirectionAudit, Outcome};
use runner::RecordedBatch;
use splitwarden_core::types::PolicyDirection;

pub fn audit_lines(report: &AuditReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (device, outcome) in report {
        for direction in PolicyDirection::ALL {
            let detail = match outcome.get(direction) {
                Outcome::Success(audit) => describe_audit(audit),
                Outcome::Failed { reason } => format!("failed: {reason}"),
                Outcome::Skipped => "skipped".to_string(),
            };
            lines.push(format!("{device} {direction}: {detail}"));
        }
    }
    lines
}

fn describe_audit(audit: &DirectionAudit) -> String {
    if audit.in_sync() {
        return format!("in sync ({} domains)", audit.domains.len());
    }
    format!(
        "drift; declared={} bound={} missing=[{}] extra=[{}]",
        yes_no(audit.webvpn_declared),
        yes_no(audit.group_policy_bound),
        audit.missing.join(", "),
        audit.extra.join(", ")
    )
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

pub fn action_lines<T>(report: &BTreeMap<String, DeviceOutcome<T>>) -> Vec<String> {
    let mut lines = Vec::new();
    for (device, outcome) in report {
        for direction in PolicyDirection::ALL {
            let line = match outcome.get(direction) {
                Outcome::Failed { reason } => format!("{device} {direction}: failed: {reason}"),
                other => format!("{device} {direction}: {}", other.label()),
            };
            lines.push(line);
        }
    }
    lines
}

pub fn batch_lines(recorded: &[RecordedBatch]) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in recorded {
        lines.push(format!("# {} ({} lines)", entry.device, entry.batch.len()));
        lines.extend(entry.batch.lines().iter().cloned());
    }
    lines
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value).context("render report JSON")?;
    println!("{output}");
    Ok(())
}

/// Turns any failed device slot into a non-zero exit.
pub fn ensure_no_failures<T>(report: &BTreeMap<String, DeviceOutcome<T>>) -> Result<()> {
    let failed = failed_devices(report);
    if failed.is_empty() {
        return Ok(());
    }
    Err(anyhow::anyhow!(
        "{} of {} devices failed: {}",
        failed.len(),
        report.len(),
        failed.join(", ")
    ))
}
