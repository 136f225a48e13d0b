//! Connection registry for broadcast fan-out.
//!
//! The registry owns every open dashboard connection for its whole
//! lifetime. Registration and removal are O(1); iteration works on a
//! membership snapshot, so it is safe against concurrent register and
//! unregister calls and guarantees nothing about visit order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use uuid::Uuid;

/// Token handed back at registration; used to unregister.
pub type ConnectionId = Uuid;

/// One serialized frame, shared across all per-connection sends.
pub type FramePayload = Arc<str>;

/// Why a delivery attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendFailure {
    /// The connection's outbound buffer stayed full past the timeout.
    Timeout,
    /// The receiving side is gone.
    Closed,
}

impl std::fmt::Display for SendFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "send timed out"),
            Self::Closed => write!(f, "connection closed"),
        }
    }
}

/// Outbound handle for one open connection.
#[derive(Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    tx: mpsc::Sender<FramePayload>,
    send_errors: Arc<AtomicU32>,
}

impl ConnectionHandle {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Deliveries that failed on this connection so far.
    pub fn send_errors(&self) -> u32 {
        self.send_errors.load(Ordering::Relaxed)
    }

    /// Queue a frame, waiting at most `timeout` for buffer space.
    ///
    /// Failures bump the error counter; the caller decides whether the
    /// connection survives.
    pub async fn send_timeout(
        &self,
        payload: FramePayload,
        timeout: Duration,
    ) -> Result<(), SendFailure> {
        let result = self.tx.send_timeout(payload, timeout).await;
        match result {
            Ok(()) => Ok(()),
            Err(mpsc::error::SendTimeoutError::Timeout(_)) => {
                self.send_errors.fetch_add(1, Ordering::Relaxed);
                Err(SendFailure::Timeout)
            }
            Err(mpsc::error::SendTimeoutError::Closed(_)) => {
                self.send_errors.fetch_add(1, Ordering::Relaxed);
                Err(SendFailure::Closed)
            }
        }
    }
}

/// The set of currently-open dashboard connections.
#[derive(Default)]
pub struct ConnectionRegistry {
    inner: Mutex<HashMap<ConnectionId, ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection's outbound channel. Returns its token.
    pub fn register(&self, tx: mpsc::Sender<FramePayload>) -> ConnectionId {
        let id = Uuid::new_v4();
        let handle = ConnectionHandle {
            id,
            tx,
            send_errors: Arc::new(AtomicU32::new(0)),
        };
        self.lock().insert(id, handle);
        id
    }

    /// Remove a connection. Returns false if it was already gone, so
    /// concurrent removal paths (broadcast failure, socket close) are
    /// idempotent.
    pub fn unregister(&self, id: ConnectionId) -> bool {
        self.lock().remove(&id).is_some()
    }

    /// Membership snapshot for iteration. Connections registered or
    /// removed afterwards are not reflected in the returned set.
    pub fn handles(&self) -> Vec<ConnectionHandle> {
        self.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ConnectionId, ConnectionHandle>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
