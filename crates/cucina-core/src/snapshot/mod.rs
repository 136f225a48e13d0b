//! Per-tick metrics snapshots.
//!
//! A [`Snapshot`] is constructed once per broadcast tick and is immutable
//! from then on; the broadcast loop serializes it exactly once and fans the
//! payload out to every connection.

pub mod model;

pub use model::{
    KitchenMetrics, OrderEvent, OrderStatus, OvenReading, OvenStatus, PipelineStatus, Snapshot,
};
