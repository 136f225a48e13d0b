//! Snapshot reconciliation into independent view regions.
//!
//! Every incoming snapshot is authoritative: regions are fully replaced,
//! never merged, since commands issued while disconnected are lost and
//! local state may be stale. Each of the four regions updates (and
//! reports a change) independently, so a renderer only repaints what
//! actually moved.

use std::collections::HashSet;

use cucina_core::controls::SimulationControls;
use cucina_core::snapshot::{KitchenMetrics, OrderEvent, OvenReading, PipelineStatus, Snapshot};

/// Rows shown in the recent-orders table. The wire payload may carry more.
pub const RECENT_ORDERS_DISPLAY_CAP: usize = 10;

/// Which view regions changed after applying a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionChanges {
    pub metrics: bool,
    pub ovens: bool,
    pub orders: bool,
    pub controls: bool,
}

impl RegionChanges {
    pub fn any(&self) -> bool {
        self.metrics || self.ovens || self.orders || self.controls
    }
}

/// Client-side model of the dashboard.
#[derive(Debug, Default)]
pub struct DashboardView {
    metrics: KitchenMetrics,
    ovens: Vec<OvenReading>,
    recent_orders: Vec<OrderEvent>,
    controls: SimulationControls,
    pipeline: PipelineStatus,
    error: Option<String>,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile one authoritative frame into the view.
    ///
    /// Identical frames are a no-op: no region reports a change.
    pub fn apply(&mut self, frame: &Snapshot) -> RegionChanges {
        let mut changes = RegionChanges::default();

        if self.metrics != frame.metrics {
            self.metrics = frame.metrics.clone();
            changes.metrics = true;
        }
        if self.ovens != frame.ovens {
            self.ovens = frame.ovens.clone();
            changes.ovens = true;
        }
        let orders = presentable_orders(&frame.recent_orders);
        if self.recent_orders != orders {
            self.recent_orders = orders;
            changes.orders = true;
        }
        if self.controls != frame.simulation_controls {
            self.controls = frame.simulation_controls;
            changes.controls = true;
        }

        self.pipeline = frame.status;
        self.error = frame.error.clone();

        changes
    }

    pub fn metrics(&self) -> &KitchenMetrics {
        &self.metrics
    }

    pub fn ovens(&self) -> &[OvenReading] {
        &self.ovens
    }

    pub fn recent_orders(&self) -> &[OrderEvent] {
        &self.recent_orders
    }

    pub fn controls(&self) -> SimulationControls {
        self.controls
    }

    pub fn pipeline(&self) -> PipelineStatus {
        self.pipeline
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Dedup by order id (the newest event wins), order newest-first, cap for
/// display.
fn presentable_orders(events: &[OrderEvent]) -> Vec<OrderEvent> {
    let mut sorted: Vec<OrderEvent> = events.to_vec();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for event in sorted {
        if seen.insert(event.order_id.clone()) {
            out.push(event);
            if out.len() == RECENT_ORDERS_DISPLAY_CAP {
                break;
            }
        }
    }
    out
}
