//! Application state.

use std::sync::Arc;

use cucina_core::controls::SharedControls;
use cucina_core::producer::SnapshotProducer;
use cucina_core::snapshot::Snapshot;
use tracing::error;

use crate::registry::ConnectionRegistry;

/// Application state shared across handlers and the broadcast loop.
#[derive(Clone)]
pub struct AppState {
    pub producer: Arc<dyn SnapshotProducer>,
    pub controls: SharedControls,
    pub registry: Arc<ConnectionRegistry>,
}

impl AppState {
    pub fn new(producer: Arc<dyn SnapshotProducer>, controls: SharedControls) -> Self {
        Self {
            producer,
            controls,
            registry: Arc::new(ConnectionRegistry::new()),
        }
    }

    /// Fetch the current frame from the producer.
    ///
    /// A producer failure yields a degraded frame instead of an error:
    /// the broadcast loop keeps ticking and clients see the `error` field.
    pub async fn current_frame(&self) -> Snapshot {
        match self.producer.current_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!(error = %err, "snapshot producer failed");
                Snapshot::degraded(err.to_string(), *self.controls.read().await)
            }
        }
    }
}
