//! Cucina Dashboard Client
//!
//! A native client for the live dashboard channel: a bounded-retry
//! reconnection loop, fire-and-forget command sending, and snapshot
//! reconciliation into independent view regions.

pub mod client;
pub mod reconnect;
pub mod view;

pub use client::{ClientConfig, ClientEvent, CommandHandle, DashboardClient};
pub use reconnect::{ConnectionPhase, ReconnectPolicy, ReconnectState, RetryDecision};
pub use view::{DashboardView, RegionChanges};
