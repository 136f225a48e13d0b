//! Client reconnection behavior against a scripted server.

use std::time::Duration;

use cucina_client::{
    ClientConfig, ClientEvent, ConnectionPhase, DashboardClient, ReconnectPolicy,
};
use cucina_core::controls::{ControlAction, ControlCommand, SimulationControls};
use cucina_core::snapshot::Snapshot;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

const EVENT_DEADLINE: Duration = Duration::from_secs(5);

fn policy(max_attempts: u32) -> ReconnectPolicy {
    ReconnectPolicy {
        max_attempts,
        retry_delay: Duration::from_millis(50),
    }
}

fn test_frame() -> String {
    let snapshot = Snapshot::new(
        Default::default(),
        vec![],
        vec![],
        SimulationControls::default(),
    );
    serde_json::to_string(&snapshot).unwrap()
}

async fn accept_client(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = listener.accept().await.unwrap();
    accept_async(stream).await.unwrap()
}

async fn next_event(client: &mut DashboardClient) -> Option<ClientEvent> {
    tokio::time::timeout(EVENT_DEADLINE, client.next_event())
        .await
        .expect("timed out waiting for a client event")
}

/// Skip forward to the next status event.
async fn next_status(client: &mut DashboardClient) -> ConnectionPhase {
    loop {
        match next_event(client).await {
            Some(ClientEvent::Status(phase)) => return phase,
            Some(ClientEvent::Snapshot(_)) => continue,
            None => panic!("event stream ended while waiting for a status"),
        }
    }
}

#[tokio::test]
async fn test_connects_and_receives_snapshots() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        let mut ws = accept_client(&listener).await;
        ws.send(Message::Text(test_frame().into())).await.unwrap();
        // Hold the connection open until the test is done with it.
        while ws.next().await.is_some() {}
    });

    let mut client = DashboardClient::connect(ClientConfig {
        url,
        policy: policy(3),
    });

    assert_eq!(next_status(&mut client).await, ConnectionPhase::Connecting);
    assert_eq!(next_status(&mut client).await, ConnectionPhase::Open);

    match next_event(&mut client).await {
        Some(ClientEvent::Snapshot(snapshot)) => {
            assert_eq!(snapshot.simulation_controls, SimulationControls::default());
        }
        other => panic!("expected a snapshot, got {other:?}"),
    }

    client.shutdown();
    server.abort();
}

#[tokio::test]
async fn test_reconnects_after_server_drops_the_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        // First session: accept, then hang up immediately.
        let ws = accept_client(&listener).await;
        drop(ws);

        // Second session: stay up.
        let mut ws = accept_client(&listener).await;
        ws.send(Message::Text(test_frame().into())).await.unwrap();
        while ws.next().await.is_some() {}
    });

    let mut client = DashboardClient::connect(ClientConfig {
        url,
        policy: policy(5),
    });

    assert_eq!(next_status(&mut client).await, ConnectionPhase::Connecting);
    assert_eq!(next_status(&mut client).await, ConnectionPhase::Open);
    assert_eq!(
        next_status(&mut client).await,
        ConnectionPhase::ClosedRetrying { attempt: 1 }
    );
    assert_eq!(next_status(&mut client).await, ConnectionPhase::Connecting);
    assert_eq!(next_status(&mut client).await, ConnectionPhase::Open);

    client.shutdown();
    server.abort();
}

#[tokio::test]
async fn test_gives_up_after_exactly_max_attempts() {
    // Bind then drop, so the port refuses connections.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    drop(listener);

    let mut client = DashboardClient::connect(ClientConfig {
        url,
        policy: policy(3),
    });

    assert_eq!(next_status(&mut client).await, ConnectionPhase::Connecting);
    assert_eq!(
        next_status(&mut client).await,
        ConnectionPhase::ClosedRetrying { attempt: 1 }
    );
    assert_eq!(next_status(&mut client).await, ConnectionPhase::Connecting);
    assert_eq!(
        next_status(&mut client).await,
        ConnectionPhase::ClosedRetrying { attempt: 2 }
    );
    assert_eq!(next_status(&mut client).await, ConnectionPhase::Connecting);
    assert_eq!(next_status(&mut client).await, ConnectionPhase::ClosedFailed);

    // Terminal: the loop ends and the event stream closes; no retry is
    // ever scheduled again.
    assert!(next_event(&mut client).await.is_none());
}

#[tokio::test]
async fn test_commands_are_fire_and_forget() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let (received_tx, mut received_rx) = tokio::sync::mpsc::channel::<String>(4);
    let (accept_tx, accept_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        // Hold the handshake until the test has exercised the
        // not-yet-open path.
        accept_rx.await.unwrap();
        let mut ws = accept_client(&listener).await;
        ws.send(Message::Text(test_frame().into())).await.unwrap();
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Text(text) = msg {
                let _ = received_tx.send(text.to_string()).await;
            }
        }
    });

    let mut client = DashboardClient::connect(ClientConfig {
        url,
        policy: policy(3),
    });
    let commands = client.commands();

    // Not open yet: dropped, not queued.
    assert!(!commands.send(ControlCommand::toggle(ControlAction::ToggleRushMode)));
    accept_tx.send(()).unwrap();

    while next_status(&mut client).await != ConnectionPhase::Open {}
    assert!(commands.send(ControlCommand::toggle(ControlAction::ToggleRushMode)));

    let raw = tokio::time::timeout(EVENT_DEADLINE, received_rx.recv())
        .await
        .expect("timed out waiting for the command")
        .expect("server task ended");
    assert_eq!(raw, r#"{"type":"control","action":"toggle_rush_mode"}"#);

    client.shutdown();
    server.abort();
}
