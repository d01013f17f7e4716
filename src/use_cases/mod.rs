// Use cases layer: snapshot processing workflow and the engine task.

pub mod engine;
pub mod processor;
pub mod types;

pub use engine::{EngineSettings, engine_task};
pub use processor::SnapshotProcessor;
pub use types::{DerivedView, IngestEvent, PlayerRecord};
