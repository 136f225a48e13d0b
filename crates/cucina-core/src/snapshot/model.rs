//! Snapshot domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::controls::SimulationControls;

/// Aggregate order metrics for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KitchenMetrics {
    pub active_orders: u32,
    pub completed_orders: u32,
    /// Rolling average completion time in seconds.
    pub avg_completion_time: f64,
    pub orders_received: u32,
    pub orders_prep: u32,
    pub orders_baking: u32,
    pub orders_ready: u32,
    pub rush_hour: bool,
}

/// One oven's readings at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvenReading {
    pub oven_id: String,
    /// Degrees Fahrenheit.
    pub temperature: f64,
    pub capacity_used: u32,
    pub capacity_total: u32,
    /// Derived utilization/temperature score in `[0, 1]`.
    pub efficiency: f64,
    pub status: OvenStatus,
}

/// Oven operational state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvenStatus {
    Active,
    Offline,
}

/// Order lifecycle stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Received,
    Prep,
    Baking,
    Ready,
    Delivered,
}

impl OrderStatus {
    /// Convert to the wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Prep => "prep",
            Self::Baking => "baking",
            Self::Ready => "ready",
            Self::Delivered => "delivered",
        }
    }

    /// Delivered orders never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// One entry of the recent-orders feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub order_id: String,
    pub pizza_type: String,
    pub size: String,
    pub status: OrderStatus,
    /// Seconds since the order was created, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

/// Pipeline health indicator carried in every frame.
///
/// `Unknown` absorbs values a newer server might send; clients treat it
/// like any non-connected status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    Connected,
    Error,
    #[serde(other)]
    Unknown,
}

impl Default for PipelineStatus {
    fn default() -> Self {
        Self::Connected
    }
}

/// Immutable per-tick frame broadcast to every client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub metrics: KitchenMetrics,
    pub ovens: Vec<OvenReading>,
    /// Newest-first; the wire payload may carry more entries than clients
    /// choose to display.
    pub recent_orders: Vec<OrderEvent>,
    pub simulation_controls: SimulationControls,
    pub status: PipelineStatus,
    /// Present only when the producer failed; other fields are best-effort.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Snapshot {
    /// A healthy frame.
    pub fn new(
        metrics: KitchenMetrics,
        ovens: Vec<OvenReading>,
        recent_orders: Vec<OrderEvent>,
        simulation_controls: SimulationControls,
    ) -> Self {
        Self {
            metrics,
            ovens,
            recent_orders,
            simulation_controls,
            status: PipelineStatus::Connected,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// A best-effort frame for a failed producer cycle.
    ///
    /// The broadcast loop keeps ticking; clients see the error field and
    /// whatever defaults the frame carries.
    pub fn degraded(message: impl Into<String>, simulation_controls: SimulationControls) -> Self {
        Self {
            metrics: KitchenMetrics::default(),
            ovens: Vec::new(),
            recent_orders: Vec::new(),
            simulation_controls,
            status: PipelineStatus::Error,
            error: Some(message.into()),
            timestamp: Utc::now(),
        }
    }
}
