use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use reconciler::UpdateReport;
use runner::{RecordedBatch, RecordingExecutor};

use super::render;
use super::session::Session;

pub struct UpdateInputs {
    pub config_path: Option<PathBuf>,
    pub devices: Vec<String>,
    pub json: bool,
    pub dry_run: bool,
}

#[derive(Serialize)]
struct DryRunOutput<'a> {
    report: &'a UpdateReport,
    batches: Vec<DryRunBatch<'a>>,
}

#[derive(Serialize)]
struct DryRunBatch<'a> {
    device: &'a str,
    lines: &'a [String],
}

pub fn execute(inputs: UpdateInputs) -> Result<()> {
    let session = Session::open(inputs.config_path, inputs.devices)?;
    let policy = &session.config.policy;

    if inputs.dry_run {
        let recorder = Arc::new(RecordingExecutor::new());
        let report = session.reconciler(recorder.clone()).update_devices(
            &session.devices,
            &policy.group_policy,
            &policy.exclude_domains,
            &policy.include_domains,
        );
        let recorded = recorder.recorded();
        print_dry_run(&report, &recorded, inputs.json)?;
        return render::ensure_no_failures(&report);
    }

    let report = session.reconciler(session.live_executor()?).update_devices(
        &session.devices,
        &policy.group_policy,
        &policy.exclude_domains,
        &policy.include_domains,
    );
    if inputs.json {
        render::print_json(&report)?;
    } else {
        render::print_lines(&render::action_lines(&report));
    }
    render::ensure_no_failures(&report)
}

/// Shared by `update --dry-run` and `clear --dry-run`.
pub fn print_dry_run(report: &UpdateReport, recorded: &[RecordedBatch], json: bool) -> Result<()> {
    if json {
        let output = DryRunOutput {
            report,
            batches: recorded
                .iter()
                .map(|entry| DryRunBatch {
                    device: &entry.device,
                    lines: entry.batch.lines(),
                })
                .collect(),
        };
        return render::print_json(&output);
    }
    render::print_lines(&render::batch_lines(recorded));
    render::print_lines(&render::action_lines(report));
    Ok(())
}
