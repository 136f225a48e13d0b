//! Inbound control-command handling.
//!
//! Messages from one connection are handled in arrival order by that
//! connection's receive loop. Parse and validation failures are dropped
//! where they happen; the sender gets no reply either way, and the
//! effect of an applied command only becomes visible to clients on the
//! next broadcast tick.

use cucina_core::controls::{ClientMessage, SharedControls};
use tracing::{debug, info};

/// Handle one raw inbound text frame from a client.
///
/// Returns whether a command was applied, for callers that track it.
/// Malformed frames, unknown actions and invalid values leave the control
/// state untouched and the connection open.
pub async fn handle_client_message(controls: &SharedControls, raw: &str) -> bool {
    let message: ClientMessage = match serde_json::from_str(raw) {
        Ok(message) => message,
        Err(err) => {
            debug!(error = %err, "discarding malformed control frame");
            return false;
        }
    };

    let ClientMessage::Control(command) = message;

    // Single critical section per command: concurrent commands serialize
    // here and never interleave partial updates.
    let mut guard = controls.write().await;
    match guard.apply(&command) {
        Ok(()) => {
            let applied = *guard;
            info!(action = ?command.action, controls = ?applied, "control command applied");
            true
        }
        Err(err) => {
            debug!(error = %err, "discarding invalid control command");
            false
        }
    }
}
