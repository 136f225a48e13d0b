//! Seam between the broadcast loop and whatever computes metrics.

use async_trait::async_trait;

use crate::error::CucinaResult;
use crate::snapshot::Snapshot;

/// A source of per-tick metrics snapshots.
///
/// Implementors read the shared control state themselves; the returned
/// snapshot already carries the controls it was produced under.
#[async_trait]
pub trait SnapshotProducer: Send + Sync {
    /// Produce the current snapshot.
    async fn current_snapshot(&self) -> CucinaResult<Snapshot>;
}
