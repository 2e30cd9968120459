use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use runner::RecordingExecutor;

use super::render;
use super::session::Session;
use super::update::print_dry_run;

pub struct ClearInputs {
    pub config_path: Option<PathBuf>,
    pub devices: Vec<String>,
    pub json: bool,
    pub dry_run: bool,
}

pub fn execute(inputs: ClearInputs) -> Result<()> {
    let session = Session::open(inputs.config_path, inputs.devices)?;
    let group_policy = &session.config.policy.group_policy;

    if inputs.dry_run {
        let recorder = Arc::new(RecordingExecutor::new());
        let report = session
            .reconciler(recorder.clone())
            .clear_devices(&session.devices, group_policy);
        print_dry_run(&report, &recorder.recorded(), inputs.json)?;
        return render::ensure_no_failures(&report);
    }

    let report = session
        .reconciler(session.live_executor()?)
        .clear_devices(&session.devices, group_policy);
    if inputs.json {
        render::print_json(&report)?;
    } else {
        render::print_lines(&render::action_lines(&report));
    }
    render::ensure_no_failures(&report)
}
