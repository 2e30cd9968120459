//! Reconciliation events and the sinks that receive them.
//!
//! The reconciler never writes to a global logger. Whoever builds it hands
//! in an [`EventSink`]; the CLI wires stderr and a JSON-lines event log, tests
//! use [`MemorySink`].

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ids::RunId;
use crate::types::PolicyDirection;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileEvent {
    pub timestamp: OffsetDateTime,
    pub run_id: RunId,
    pub level: EventLevel,
    pub device: Option<String>,
    pub direction: Option<PolicyDirection>,
    pub message: String,
}

impl ReconcileEvent {
    pub fn new(run_id: RunId, level: EventLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc(),
            run_id,
            level,
            device: None,
            direction: None,
            message: message.into(),
        }
    }

    pub fn device(mut self, device: &str) -> Self {
        self.device = Some(device.to_string());
        self
    }

    pub fn direction(mut self, direction: PolicyDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    /// One-line rendering used by the stderr sink.
    pub fn human_line(&self) -> String {
        let level = match self.level {
            EventLevel::Info => "info",
            EventLevel::Warning => "warn",
            EventLevel::Error => "error",
        };
        let mut scope = String::new();
        if let Some(device) = &self.device {
            scope.push_str(device);
        }
        if let Some(direction) = self.direction {
            if !scope.is_empty() {
                scope.push('/');
            }
            scope.push_str(direction.as_str());
        }
        if scope.is_empty() {
            format!("[{level}] {}", self.message)
        } else {
            format!("[{level}] {scope}: {}", self.message)
        }
    }
}

pub trait EventSink: Send + Sync {
    fn record(&self, event: ReconcileEvent);
}

pub struct NoopSink;

impl EventSink for NoopSink {
    fn record(&self, _event: ReconcileEvent) {}
}

/// Prints events at or above `min_level` to stderr.
pub struct StderrSink {
    min_level: EventLevel,
}

impl StderrSink {
    pub fn new(min_level: EventLevel) -> Self {
        Self { min_level }
    }
}

impl EventSink for StderrSink {
    fn record(&self, event: ReconcileEvent) {
        if event.level >= self.min_level {
            eprintln!("{}", event.human_line());
        }
    }
}

/// Appends one JSON object per event to a file.
pub struct JsonlSink {
    writer: Mutex<BufWriter<File>>,
}

impl JsonlSink {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create event log dir {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open event log {}", path.display()))?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl EventSink for JsonlSink {
    fn record(&self, event: ReconcileEvent) {
        let Ok(line) = serde_json::to_string(&event) else {
            return;
        };
        let mut writer = lock(&self.writer);
        // A broken event log must not fail reconciliation.
        let _ = writeln!(writer, "{line}").and_then(|_| writer.flush());
    }
}

/// Keeps every event in memory.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<ReconcileEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReconcileEvent> {
        lock(&self.events).clone()
    }

    pub fn count_level(&self, level: EventLevel) -> usize {
        lock(&self.events)
            .iter()
            .filter(|event| event.level == level)
            .count()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: ReconcileEvent) {
        lock(&self.events).push(event);
    }
}

/// Forwards each event to several sinks.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for FanoutSink {
    fn record(&self, event: ReconcileEvent) {
        for sink in &self.sinks {
            sink.record(event.clone());
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
