//! Bounded-retry reconnection state machine.
//!
//! Pure state: the IO loop asks it what to do after every open and close.
//! Retries use a fixed delay and a bounded attempt budget; once the
//! budget is spent the failure is terminal and no further retries are
//! scheduled.

use std::time::Duration;

/// Retry policy: fixed delay between attempts, bounded attempt count.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    /// Consecutive failures tolerated before giving up.
    pub max_attempts: u32,
    /// Fixed wait before each retry.
    pub retry_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            retry_delay: Duration::from_secs(3),
        }
    }
}

/// Connection lifecycle as seen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Connecting,
    Open,
    /// Closed; a retry is scheduled. `attempt` counts consecutive failures.
    ClosedRetrying { attempt: u32 },
    /// Terminal: the retry budget is spent.
    ClosedFailed,
}

impl ConnectionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ClosedFailed)
    }
}

/// What the IO loop should do after a close or failed connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
}

/// Tracks consecutive failures against the policy.
#[derive(Debug)]
pub struct ReconnectState {
    policy: ReconnectPolicy,
    failures: u32,
    phase: ConnectionPhase,
}

impl ReconnectState {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            failures: 0,
            phase: ConnectionPhase::Connecting,
        }
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    /// A connection attempt is starting.
    pub fn on_connecting(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = ConnectionPhase::Connecting;
        }
    }

    /// The connection opened; the failure budget resets in full.
    pub fn on_open(&mut self) {
        self.failures = 0;
        self.phase = ConnectionPhase::Open;
    }

    /// The connection closed (cleanly, with an error, or the connect
    /// attempt itself failed). Each failure schedules exactly one retry
    /// until the budget is spent.
    pub fn on_close(&mut self) -> RetryDecision {
        self.failures += 1;
        if self.failures >= self.policy.max_attempts {
            self.phase = ConnectionPhase::ClosedFailed;
            RetryDecision::GiveUp
        } else {
            self.phase = ConnectionPhase::ClosedRetrying {
                attempt: self.failures,
            };
            RetryDecision::RetryAfter(self.policy.retry_delay)
        }
    }
}
