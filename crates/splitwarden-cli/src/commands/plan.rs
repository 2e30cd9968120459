use std::path::PathBuf;

use anyhow::Result;

use policy_engine::PolicyEngine;
use splitwarden_core::config::{normalize_domains, Config};
use splitwarden_core::types::{CommandBatch, PolicyDirection};

use super::render;
use super::session::load_config;

pub enum PlanAction {
    Update { devices: Vec<String> },
    Clear { devices: Vec<String> },
}

pub fn execute(config_path: Option<PathBuf>, action: PlanAction) -> Result<()> {
    let (_, config) = load_config(config_path)?;
    let (devices, batches) = match action {
        PlanAction::Update { devices } => (devices, update_plan(&config)),
        PlanAction::Clear { devices } => (devices, clear_plan(&config)),
    };
    let devices = if devices.is_empty() {
        config.inventory.devices.clone()
    } else {
        devices
    };

    println!("# devices: {}", devices.join(", "));
    for (direction, batch) in &batches {
        println!("# {direction} ({} lines)", batch.len());
        render::print_lines(batch.lines());
    }
    Ok(())
}

/// Batches an update sends to every device, in send order.
fn update_plan(config: &Config) -> Vec<(PolicyDirection, CommandBatch)> {
    let engine = PolicyEngine::new(config.chunking);
    PolicyDirection::ALL
        .into_iter()
        .filter_map(|direction| {
            let configured = match direction {
                PolicyDirection::Exclude => &config.policy.exclude_domains,
                PolicyDirection::Include => &config.policy.include_domains,
            };
            let domains = normalize_domains(configured);
            if domains.is_empty() {
                return None;
            }
            let batch = engine.configure_batch(&config.policy.group_policy, direction, &domains);
            Some((direction, batch))
        })
        .collect()
}

fn clear_plan(config: &Config) -> Vec<(PolicyDirection, CommandBatch)> {
    let engine = PolicyEngine::new(config.chunking);
    PolicyDirection::ALL
        .into_iter()
        .map(|direction| {
            (
                direction,
                engine.clear_batch(&config.policy.group_policy, direction),
            )
        })
        .collect()
}
