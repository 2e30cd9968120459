pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod types;

pub use config::{Config, ConfigPaths};
pub use error::{ExecutorFailure, SplitwardenError};
pub use events::{EventLevel, EventSink, ReconcileEvent};
pub use ids::RunId;
pub use types::{CommandBatch, PolicyDiff, PolicyDirection, PolicySnapshot};
