use std::sync::{Mutex, MutexGuard};

use splitwarden_core::error::ExecutorFailure;
use splitwarden_core::types::CommandBatch;

use crate::CommandExecutor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedBatch {
    pub device: String,
    pub batch: CommandBatch,
}

/// Accepts every batch without contacting a device and remembers it.
///
/// Backs `--dry-run`: the reconciler runs unchanged and the caller prints what
/// would have been sent.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    reply: String,
    recorded: Mutex<Vec<RecordedBatch>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every batch with `reply`
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            recorded: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded(&self) -> Vec<RecordedBatch> {
        self.lock().clone()
    }

    pub fn recorded_for(&self, device: &str) -> Vec<CommandBatch> {
        self.lock()
            .iter()
            .filter(|entry| entry.device == device)
            .map(|entry| entry.batch.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedBatch>> {
        self.recorded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CommandExecutor for RecordingExecutor {
    fn execute(&self, device: &str, batch: &CommandBatch) -> Result<String, ExecutorFailure> {
        self.lock().push(RecordedBatch {
            device: device.to_string(),
            batch: batch.clone(),
        });
        Ok(self.reply.clone())
    }
}
