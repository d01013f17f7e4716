// Sequential engine task: the only writer of derived state.

use super::processor::SnapshotProcessor;
use super::types::{DerivedView, IngestEvent};
use crate::domain::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// Warn when no snapshot arrived for this long.
    pub stale_after: Duration,
    /// How often the staleness check runs.
    pub stale_check_interval: Duration,
}

/// Apply snapshots in arrival order and publish an immutable view after each.
pub async fn engine_task<C: Clock>(
    mut ingest_rx: mpsc::Receiver<IngestEvent>,
    view_tx: watch::Sender<Arc<DerivedView>>,
    mut processor: SnapshotProcessor,
    clock: C,
    settings: EngineSettings,
) {
    let mut stale_check = tokio::time::interval(settings.stale_check_interval);
    stale_check.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_received: Option<Instant> = None;

    loop {
        tokio::select! {
            event = ingest_rx.recv() => {
                let Some(event) = event else {
                    info!("ingest channel closed, stopping engine");
                    break;
                };
                match event {
                    IngestEvent::Snapshot(snapshot) => {
                        last_received = Some(Instant::now());
                        processor.process(&snapshot, clock.now_epoch_millis());
                        // Readers only ever see a finished tick.
                        view_tx.send_replace(Arc::new(processor.view()));
                    }
                }
            }
            _ = stale_check.tick() => {
                if is_stale(last_received, Instant::now(), settings.stale_after) {
                    warn!(
                        stale_after_secs = settings.stale_after.as_secs(),
                        "no game state received within the stale window"
                    );
                    // Warn once per silence; the next snapshot re-arms it.
                    last_received = None;
                }
            }
        }
    }
}

fn is_stale(last_received: Option<Instant>, now: Instant, stale_after: Duration) -> bool {
    last_received.is_some_and(|at| now.saturating_duration_since(at) > stale_after)
}
