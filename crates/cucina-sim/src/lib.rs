//! Cucina Kitchen Simulator
//!
//! A simulated pizzeria workload that produces the per-tick metrics
//! snapshots the dashboard broadcasts: pizza ovens with drifting
//! temperatures, an order pipeline from intake to delivery, and the
//! aggregate counters derived from both.
//!
//! The simulation has no background tasks of its own. It advances lazily:
//! each snapshot request moves the model forward by the wall time elapsed
//! since the previous request, scaled by the speed multiplier.

mod orders;
mod oven;

pub mod kitchen;

pub use kitchen::{Kitchen, KitchenConfig, SimulatedKitchen};
