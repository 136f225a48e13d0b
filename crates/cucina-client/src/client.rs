//! Reconnecting dashboard client.
//!
//! One background task owns the socket and the retry schedule. Status
//! changes and snapshots flow out over a channel; control commands flow
//! in through a fire-and-forget handle that silently drops anything sent
//! while the connection is not open.

use cucina_core::controls::{ClientMessage, ControlCommand};
use cucina_core::snapshot::Snapshot;
use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use crate::reconnect::{ConnectionPhase, ReconnectPolicy, ReconnectState, RetryDecision};

/// Commands buffered while an open connection drains them.
const COMMAND_BUFFER: usize = 16;

/// Events buffered toward the consumer.
const EVENT_BUFFER: usize = 32;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL, e.g. `ws://127.0.0.1:3030/ws`.
    pub url: String,
    pub policy: ReconnectPolicy,
}

/// Events surfaced to the consumer.
#[derive(Debug)]
pub enum ClientEvent {
    /// The connection phase changed.
    Status(ConnectionPhase),
    /// A full snapshot arrived; treat it as authoritative.
    Snapshot(Box<Snapshot>),
}

/// Fire-and-forget command sender.
///
/// Commands are never queued across disconnects: sending while the
/// connection is not open is a silent no-op.
#[derive(Clone)]
pub struct CommandHandle {
    phase: watch::Receiver<ConnectionPhase>,
    tx: mpsc::Sender<ControlCommand>,
}

impl CommandHandle {
    /// Send a command if the connection is open. Returns whether it was
    /// handed to the connection.
    pub fn send(&self, command: ControlCommand) -> bool {
        if *self.phase.borrow() != ConnectionPhase::Open {
            debug!(?command, "dropping command, connection not open");
            return false;
        }
        self.tx.try_send(command).is_ok()
    }

    /// Current connection phase.
    pub fn phase(&self) -> ConnectionPhase {
        *self.phase.borrow()
    }
}

/// Handle to the running client task.
pub struct DashboardClient {
    events: mpsc::Receiver<ClientEvent>,
    commands: CommandHandle,
    task: JoinHandle<()>,
}

impl DashboardClient {
    /// Spawn the connection loop.
    pub fn connect(config: ClientConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let (phase_tx, phase_rx) = watch::channel(ConnectionPhase::Connecting);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);

        let task = tokio::spawn(run_loop(config, event_tx, phase_tx, command_rx));

        Self {
            events: event_rx,
            commands: CommandHandle {
                phase: phase_rx,
                tx: command_tx,
            },
            task,
        }
    }

    /// Next status change or snapshot. `None` once the loop has reached
    /// the terminal failed state and drained.
    pub async fn next_event(&mut self) -> Option<ClientEvent> {
        self.events.recv().await
    }

    pub fn commands(&self) -> CommandHandle {
        self.commands.clone()
    }

    /// Tear the connection down immediately.
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for DashboardClient {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_loop(
    config: ClientConfig,
    events: mpsc::Sender<ClientEvent>,
    phase: watch::Sender<ConnectionPhase>,
    mut commands: mpsc::Receiver<ControlCommand>,
) {
    let mut state = ReconnectState::new(config.policy);

    loop {
        state.on_connecting();
        announce(&events, &phase, state.phase()).await;

        match connect_async(config.url.as_str()).await {
            Ok((ws, _response)) => {
                state.on_open();
                announce(&events, &phase, state.phase()).await;
                run_session(ws, &events, &mut commands).await;
            }
            Err(err) => {
                warn!(error = %err, url = %config.url, "dashboard connect failed");
            }
        }

        // Whatever was queued belongs to the connection that just died;
        // commands are never replayed onto the next one.
        while commands.try_recv().is_ok() {}

        match state.on_close() {
            RetryDecision::RetryAfter(delay) => {
                announce(&events, &phase, state.phase()).await;
                tokio::time::sleep(delay).await;
            }
            RetryDecision::GiveUp => {
                announce(&events, &phase, state.phase()).await;
                warn!(url = %config.url, "retry budget spent, giving up");
                return;
            }
        }
    }
}

/// Pump one open connection until it ends, in either direction.
async fn run_session(
    ws: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    events: &mpsc::Sender<ClientEvent>,
    commands: &mut mpsc::Receiver<ControlCommand>,
) {
    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<Snapshot>(text.as_str()) {
                            Ok(snapshot) => {
                                let _ = events
                                    .send(ClientEvent::Snapshot(Box::new(snapshot)))
                                    .await;
                            }
                            Err(err) => {
                                debug!(error = %err, "ignoring unparseable frame");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            command = commands.recv() => {
                let Some(command) = command else { break };
                let frame = match serde_json::to_string(&ClientMessage::Control(command)) {
                    Ok(frame) => frame,
                    Err(err) => {
                        debug!(error = %err, "failed to serialize command");
                        continue;
                    }
                };
                if sink.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    let _ = sink.close().await;
}

async fn announce(
    events: &mpsc::Sender<ClientEvent>,
    phase: &watch::Sender<ConnectionPhase>,
    current: ConnectionPhase,
) {
    let _ = phase.send(current);
    let _ = events.send(ClientEvent::Status(current)).await;
}
