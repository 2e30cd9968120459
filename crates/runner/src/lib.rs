use std::sync::Arc;

use splitwarden_core::error::ExecutorFailure;
use splitwarden_core::types::CommandBatch;

pub mod command;
pub mod nso;
pub mod recording;

pub use nso::NsoExecutor;
pub use recording::{RecordedBatch, RecordingExecutor};

/// Sends one command batch to one device and returns the device's raw text.
///
/// Implementations own transport concerns: timeouts, credentials and
/// recognising error replies. They report failure through
/// [`ExecutorFailure`] and never panic.
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, device: &str, batch: &CommandBatch) -> Result<String, ExecutorFailure>;
}

impl<T: CommandExecutor + ?Sized> CommandExecutor for Arc<T> {
    fn execute(&self, device: &str, batch: &CommandBatch) -> Result<String, ExecutorFailure> {
        (**self).execute(device, batch)
    }
}

impl<T: CommandExecutor + ?Sized> CommandExecutor for &T {
    fn execute(&self, device: &str, batch: &CommandBatch) -> Result<String, ExecutorFailure> {
        (**self).execute(device, batch)
    }
}
