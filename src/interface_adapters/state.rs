use crate::use_cases::{DerivedView, IngestEvent};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

// Shared application state for the HTTP handlers.
pub struct AppState {
    // Snapshots flowing into the single engine task.
    pub ingest_tx: mpsc::Sender<IngestEvent>,
    // Latest derived view published by the engine after each tick.
    pub view_tx: watch::Sender<Arc<DerivedView>>,
}

impl AppState {
    pub fn latest_view(&self) -> Arc<DerivedView> {
        Arc::clone(&self.view_tx.borrow())
    }
}
