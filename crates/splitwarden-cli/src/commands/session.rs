use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use reconciler::Reconciler;
use runner::{CommandExecutor, NsoExecutor};
use splitwarden_core::config::{Config, ConfigPaths};
use splitwarden_core::events::{EventLevel, EventSink, FanoutSink, JsonlSink, StderrSink};

/// Effective config, event sinks and target devices for one command.
pub struct Session {
    pub config: Config,
    pub devices: Vec<String>,
    sink: Arc<dyn EventSink>,
}

pub fn load_config(config_path: Option<PathBuf>) -> Result<(ConfigPaths, Config)> {
    let paths = ConfigPaths::resolve()?;
    let config_path = config_path.unwrap_or_else(|| paths.config_path.clone());
    let config = Config::load(&config_path).with_context(|| {
        format!(
            "load config at {} (run `splitwarden init` if missing)",
            config_path.display()
        )
    })?;
    Ok((paths, config))
}

impl Session {
    /// `devices` overrides the inventory when non-empty.
    pub fn open(config_path: Option<PathBuf>, devices: Vec<String>) -> Result<Self> {
        let (paths, config) = load_config(config_path)?;
        let devices = if devices.is_empty() {
            config.inventory.devices.clone()
        } else {
            devices
        };
        if devices.iter().all(|device| device.trim().is_empty()) {
            return Err(anyhow::anyhow!(
                "no devices to target (set inventory.devices or pass --device)"
            ));
        }

        let mut sinks = FanoutSink::new();
        if config.events.stderr {
            sinks.push(Arc::new(StderrSink::new(EventLevel::Warning)));
        }
        if config.events.jsonl {
            sinks.push(Arc::new(JsonlSink::open(&paths.event_log_path)?));
        }

        Ok(Self {
            config,
            devices,
            sink: Arc::new(sinks),
        })
    }

    pub fn live_executor(&self) -> Result<Arc<dyn CommandExecutor>> {
        let executor =
            NsoExecutor::from_config(&self.config.orchestrator, self.config.resolve_password())
                .context("build orchestrator client")?;
        Ok(Arc::new(executor))
    }

    pub fn reconciler(&self, executor: Arc<dyn CommandExecutor>) -> Reconciler {
        Reconciler::from_config(&self.config, executor).with_sink(self.sink.clone())
    }
}
