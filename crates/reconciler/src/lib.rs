//! Drives audits, updates and clears of split-tunnel policies across devices.
//!
//! Each device is handled independently on a bounded worker pool; each
//! direction of a device is its own transaction. Failures stay in the slot of
//! the device and direction they belong to, so every call returns a complete
//! report for every requested device.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use policy_engine::PolicyEngine;
use runner::CommandExecutor;
use splitwarden_core::config::{normalize_domains, validate_domain, Config};
use splitwarden_core::events::{EventLevel, EventSink, NoopSink, ReconcileEvent};
use splitwarden_core::ids::RunId;
use splitwarden_core::types::{CommandBatch, PolicyDirection, PolicySnapshot};

pub mod outcome;
pub mod pool;

pub use outcome::{
    failed_devices, AuditReport, ClearReport, DeviceOutcome, DirectionAudit, Outcome, UpdateReport,
};

const DEFAULT_WORKERS: usize = 8;

pub struct Reconciler {
    engine: PolicyEngine,
    executor: Arc<dyn CommandExecutor>,
    sink: Arc<dyn EventSink>,
    workers: usize,
}

/// Desired domains for both directions of one run.
///
/// A direction whose list holds a domain the device cannot store (a comma or
/// whitespace inside it) carries the rejection reason instead of a set.
#[derive(Debug, Clone)]
pub struct DesiredDomains {
    pub exclude: Result<BTreeSet<String>, String>,
    pub include: Result<BTreeSet<String>, String>,
}

impl DesiredDomains {
    pub fn new<S: AsRef<str>>(exclude_domains: &[S], include_domains: &[S]) -> Self {
        Self {
            exclude: checked_domains(exclude_domains),
            include: checked_domains(include_domains),
        }
    }

    pub fn get(&self, direction: PolicyDirection) -> Result<&BTreeSet<String>, &str> {
        let domains = match direction {
            PolicyDirection::Exclude => &self.exclude,
            PolicyDirection::Include => &self.include,
        };
        domains.as_ref().map_err(String::as_str)
    }
}

/// Blank entries are dropped; anything else must pass [`validate_domain`].
fn checked_domains<S: AsRef<str>>(domains: &[S]) -> Result<BTreeSet<String>, String> {
    for domain in domains {
        let domain = domain.as_ref();
        if domain.trim().is_empty() {
            continue;
        }
        validate_domain(domain).map_err(|err| err.to_string())?;
    }
    Ok(normalize_domains(domains))
}

struct RunContext<'a> {
    run_id: RunId,
    group_policy: &'a str,
}

impl Reconciler {
    pub fn new(engine: PolicyEngine, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            engine,
            executor,
            sink: Arc::new(NoopSink),
            workers: DEFAULT_WORKERS,
        }
    }

    pub fn from_config(config: &Config, executor: Arc<dyn CommandExecutor>) -> Self {
        Self::new(PolicyEngine::new(config.chunking), executor).with_workers(config.fanout.workers)
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn engine(&self) -> &PolicyEngine {
        &self.engine
    }

    /// Reads each requested direction and diffs it against the desired
    /// domains. A direction with no desired domains is skipped.
    pub fn audit_devices<S: AsRef<str>>(
        &self,
        devices: &[S],
        group_policy: &str,
        exclude_domains: &[S],
        include_domains: &[S],
    ) -> AuditReport {
        let desired = DesiredDomains::new(exclude_domains, include_domains);
        let ctx = self.start_run("audit", group_policy);
        let devices = self.unique_devices(&ctx, devices);
        let report = pool::fan_out(&devices, self.workers, |device| {
            self.audit_device(&ctx, device, &desired)
        });
        self.finish_run(&ctx, "audit", failed_devices(&report).len(), report.len());
        report
    }

    /// Writes the desired domains for each requested direction. Success means
    /// the executor answered without a failure, even with empty text; the
    /// device is not read back. Older tooling counted an empty reply as a
    /// failed update; audit afterwards when that distinction matters.
    pub fn update_devices<S: AsRef<str>>(
        &self,
        devices: &[S],
        group_policy: &str,
        exclude_domains: &[S],
        include_domains: &[S],
    ) -> UpdateReport {
        let desired = DesiredDomains::new(exclude_domains, include_domains);
        let ctx = self.start_run("update", group_policy);
        let devices = self.unique_devices(&ctx, devices);
        let report = pool::fan_out(&devices, self.workers, |device| {
            self.update_device(&ctx, device, &desired)
        });
        self.finish_run(&ctx, "update", failed_devices(&report).len(), report.len());
        report
    }

    /// Removes both directions from every device.
    pub fn clear_devices<S: AsRef<str>>(&self, devices: &[S], group_policy: &str) -> ClearReport {
        let ctx = self.start_run("clear", group_policy);
        let devices = self.unique_devices(&ctx, devices);
        let report = pool::fan_out(&devices, self.workers, |device| self.clear_device(&ctx, device));
        let failed = report
            .values()
            .filter(|outcome| !outcome.fully_succeeded())
            .count();
        self.finish_run(&ctx, "clear", failed, report.len());
        report
    }

    fn audit_device(
        &self,
        ctx: &RunContext<'_>,
        device: &str,
        desired: &DesiredDomains,
    ) -> DeviceOutcome<DirectionAudit> {
        let mut outcome = DeviceOutcome::default();
        for direction in PolicyDirection::ALL {
            let Some(domains) = self.desired_for(ctx, device, direction, desired, &mut outcome)
            else {
                continue;
            };
            self.emit(ctx, EventLevel::Info, device, direction, "auditing domains");
            outcome.set(direction, self.audit_direction(ctx, device, direction, domains));
        }
        outcome
    }

    fn audit_direction(
        &self,
        ctx: &RunContext<'_>,
        device: &str,
        direction: PolicyDirection,
        desired: &BTreeSet<String>,
    ) -> Outcome<DirectionAudit> {
        let batch = self.engine.audit_batch(direction);
        let snapshot = match self.executor.execute(device, &batch) {
            Ok(raw) => self.engine.read_snapshot(&raw, direction, ctx.group_policy),
            Err(failure) if failure.is_transport() => {
                self.emit(ctx, EventLevel::Error, device, direction, failure.to_string());
                return Outcome::failed(failure.to_string());
            }
            Err(failure) => {
                self.emit(
                    ctx,
                    EventLevel::Warning,
                    device,
                    direction,
                    format!("no usable output ({failure}); treating policy as not configured"),
                );
                PolicySnapshot::empty()
            }
        };
        let diff = self.engine.diff(desired, &snapshot);
        Outcome::Success(DirectionAudit::new(snapshot, diff))
    }

    fn update_device(
        &self,
        ctx: &RunContext<'_>,
        device: &str,
        desired: &DesiredDomains,
    ) -> DeviceOutcome<()> {
        let mut outcome = DeviceOutcome::default();
        for direction in PolicyDirection::ALL {
            let Some(domains) = self.desired_for(ctx, device, direction, desired, &mut outcome)
            else {
                continue;
            };
            self.emit(ctx, EventLevel::Info, device, direction, "updating domains");
            for domain in self.engine.oversized(domains) {
                self.emit(
                    ctx,
                    EventLevel::Warning,
                    device,
                    direction,
                    format!(
                        "domain {domain} ({} bytes) exceeds the {}-byte segment limit; sending it alone",
                        domain.len(),
                        self.engine.max_segment_length()
                    ),
                );
            }
            let batch = self.engine.configure_batch(ctx.group_policy, direction, domains);
            outcome.set(direction, self.send(ctx, device, direction, &batch));
        }
        outcome
    }

    /// Domains to act on for one direction. `None` leaves the slot skipped for
    /// an empty list or marks it failed for a rejected one.
    fn desired_for<'d, T>(
        &self,
        ctx: &RunContext<'_>,
        device: &str,
        direction: PolicyDirection,
        desired: &'d DesiredDomains,
        outcome: &mut DeviceOutcome<T>,
    ) -> Option<&'d BTreeSet<String>> {
        match desired.get(direction) {
            Ok(domains) if domains.is_empty() => None,
            Ok(domains) => Some(domains),
            Err(reason) => {
                self.emit(ctx, EventLevel::Error, device, direction, reason);
                outcome.set(direction, Outcome::failed(reason));
                None
            }
        }
    }

    fn clear_device(&self, ctx: &RunContext<'_>, device: &str) -> DeviceOutcome<()> {
        let mut outcome = DeviceOutcome::default();
        for direction in PolicyDirection::ALL {
            self.emit(ctx, EventLevel::Info, device, direction, "clearing domains");
            let batch = self.engine.clear_batch(ctx.group_policy, direction);
            outcome.set(direction, self.send(ctx, device, direction, &batch));
        }
        outcome
    }

    fn send(
        &self,
        ctx: &RunContext<'_>,
        device: &str,
        direction: PolicyDirection,
        batch: &CommandBatch,
    ) -> Outcome<()> {
        self.emit(
            ctx,
            EventLevel::Info,
            device,
            direction,
            format!("sending {} command lines", batch.len()),
        );
        match self.executor.execute(device, batch) {
            Ok(_) => Outcome::Success(()),
            Err(failure) => {
                self.emit(ctx, EventLevel::Error, device, direction, failure.to_string());
                Outcome::failed(failure.to_string())
            }
        }
    }

    fn unique_devices<S: AsRef<str>>(&self, ctx: &RunContext<'_>, devices: &[S]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for device in devices {
            let device = device.as_ref().trim();
            if device.is_empty() {
                continue;
            }
            if seen.insert(device.to_string()) {
                unique.push(device.to_string());
            } else {
                self.sink.record(
                    ReconcileEvent::new(ctx.run_id, EventLevel::Warning, "duplicate device ignored")
                        .device(device),
                );
            }
        }
        unique
    }

    fn start_run<'a>(&self, operation: &str, group_policy: &'a str) -> RunContext<'a> {
        let ctx = RunContext {
            run_id: RunId::new(),
            group_policy: group_policy.trim(),
        };
        self.sink.record(ReconcileEvent::new(
            ctx.run_id,
            EventLevel::Info,
            format!("{operation} started for group policy {}", ctx.group_policy),
        ));
        ctx
    }

    fn finish_run(&self, ctx: &RunContext<'_>, operation: &str, failed: usize, total: usize) {
        let level = if failed == 0 {
            EventLevel::Info
        } else {
            EventLevel::Warning
        };
        self.sink.record(ReconcileEvent::new(
            ctx.run_id,
            level,
            format!("{operation} finished: {failed} of {total} devices failed"),
        ));
    }

    fn emit(
        &self,
        ctx: &RunContext<'_>,
        level: EventLevel,
        device: &str,
        direction: PolicyDirection,
        message: impl Into<String>,
    ) {
        self.sink.record(
            ReconcileEvent::new(ctx.run_id, level, message)
                .device(device)
                .direction(direction),
        );
    }
}
