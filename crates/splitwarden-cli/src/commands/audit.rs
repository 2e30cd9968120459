use std::path::PathBuf;

use anyhow::Result;

use super::render;
use super::session::Session;

pub fn execute(config_path: Option<PathBuf>, devices: Vec<String>, json: bool) -> Result<()> {
    let session = Session::open(config_path, devices)?;
    let reconciler = session.reconciler(session.live_executor()?);
    let policy = &session.config.policy;
    let report = reconciler.audit_devices(
        &session.devices,
        &policy.group_policy,
        &policy.exclude_domains,
        &policy.include_domains,
    );

    if json {
        render::print_json(&report)?;
    } else {
        render::print_lines(&render::audit_lines(&report));
    }
    render::ensure_no_failures(&report)
}
