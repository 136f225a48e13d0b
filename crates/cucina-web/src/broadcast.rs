//! Periodic broadcast driver.
//!
//! Each tick fetches one snapshot, serializes it exactly once and hands
//! the shared payload to every registered connection. A connection that
//! cannot accept the frame within the send timeout is unregistered and
//! the tick moves on; one dead or slow client never stalls the rest.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, error, warn};

use crate::registry::{ConnectionRegistry, FramePayload};
use crate::state::AppState;

/// Broadcast loop timing knobs.
#[derive(Debug, Clone, Copy)]
pub struct BroadcastConfig {
    /// Tick cadence; matches the snapshot refresh rate.
    pub interval: Duration,
    /// Bounded wait per connection before it is dropped.
    pub send_timeout: Duration,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            send_timeout: Duration::from_secs(1),
        }
    }
}

/// Drive broadcast ticks forever. Spawned next to the HTTP server.
pub async fn run_broadcast_loop(state: AppState, config: BroadcastConfig) {
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        broadcast_tick(&state, config.send_timeout).await;
    }
}

/// One tick: fetch, serialize once, deliver to all.
pub(crate) async fn broadcast_tick(state: &AppState, send_timeout: Duration) {
    if state.registry.is_empty() {
        // No serialization work when nobody is listening.
        return;
    }

    let frame = state.current_frame().await;
    let payload: FramePayload = match serde_json::to_string(&frame) {
        Ok(json) => json.into(),
        Err(err) => {
            error!(error = %err, "failed to serialize snapshot frame");
            return;
        }
    };

    deliver(&state.registry, payload, send_timeout).await;
}

/// Push one payload to every registered connection, dropping the ones
/// that fail. Iterates a membership snapshot, so connections closing
/// mid-tick are tolerated.
pub(crate) async fn deliver(
    registry: &ConnectionRegistry,
    payload: FramePayload,
    send_timeout: Duration,
) {
    for handle in registry.handles() {
        match handle.send_timeout(payload.clone(), send_timeout).await {
            Ok(()) => {}
            Err(reason) => {
                registry.unregister(handle.id());
                warn!(
                    connection = %handle.id(),
                    %reason,
                    send_errors = handle.send_errors(),
                    "dropping unresponsive dashboard client"
                );
            }
        }
    }
    debug!(clients = registry.len(), "broadcast tick delivered");
}
