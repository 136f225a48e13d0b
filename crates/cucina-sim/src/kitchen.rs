//! Kitchen assembly and the lazily-advanced snapshot producer.

use std::time::Instant;

use async_trait::async_trait;
use cucina_core::controls::{SharedControls, SimulationControls};
use cucina_core::producer::SnapshotProducer;
use cucina_core::snapshot::Snapshot;
use cucina_core::CucinaResult;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::sync::Mutex;
use tracing::debug;

use crate::orders::OrderBoard;
use crate::oven::Oven;

/// Integration step, in simulated seconds. Large elapsed spans are walked
/// in sub-steps so the thermal model and arrival scheduling stay stable.
const STEP_SECONDS: f64 = 1.0;

/// Hard cap on simulated seconds advanced per snapshot request, so an
/// idle server does not replay hours of simulation on the next pull.
const MAX_ADVANCE_SECONDS: f64 = 120.0;

/// Kitchen construction parameters.
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// One oven per entry, with that slot capacity.
    pub oven_capacities: Vec<u32>,
    /// Concurrent orders in the prep stage.
    pub prep_slots: u32,
    pub base_orders_per_minute: f64,
    pub rush_multiplier: f64,
    /// Fixed seed for reproducible runs; random when `None`.
    pub seed: Option<u64>,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            oven_capacities: vec![4, 3, 2],
            prep_slots: 4,
            base_orders_per_minute: 0.5,
            rush_multiplier: 3.0,
            seed: None,
        }
    }
}

/// The full simulated kitchen: ovens plus the order pipeline.
///
/// Single-threaded state machine; wrap it in [`SimulatedKitchen`] to share
/// it with the broadcast loop.
pub struct Kitchen {
    ovens: Vec<Oven>,
    board: OrderBoard,
    rng: SmallRng,
}

impl Kitchen {
    pub fn new(config: KitchenConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let ovens = config
            .oven_capacities
            .iter()
            .enumerate()
            .map(|(index, capacity)| Oven::new(format!("oven_{}", index + 1), *capacity))
            .collect();
        let board = OrderBoard::new(
            config.base_orders_per_minute,
            config.rush_multiplier,
            config.prep_slots,
            &mut rng,
        );
        Self { ovens, board, rng }
    }

    /// Advance by `dt` simulated seconds under the given controls.
    pub fn advance(&mut self, dt: f64, controls: &SimulationControls) {
        let mut remaining = dt.max(0.0);
        while remaining > 0.0 {
            let step = remaining.min(STEP_SECONDS);
            for oven in &mut self.ovens {
                oven.advance(step, controls.equipment_failure, &mut self.rng);
            }
            self.board
                .advance(step, controls, &mut self.ovens, &mut self.rng);
            remaining -= step;
        }
    }

    /// Build the immutable frame for the current state.
    pub fn snapshot(&self, controls: SimulationControls) -> Snapshot {
        Snapshot::new(
            self.board.metrics(&controls),
            self.ovens.iter().map(Oven::reading).collect(),
            self.board.recent_events(),
            controls,
        )
    }
}

struct KitchenCell {
    kitchen: Kitchen,
    last_pull: Instant,
}

/// Shared, lazily-advanced producer for the broadcast loop.
///
/// Each snapshot request advances the kitchen by the wall time elapsed
/// since the previous request, scaled by the current speed multiplier.
pub struct SimulatedKitchen {
    cell: Mutex<KitchenCell>,
    controls: SharedControls,
}

impl SimulatedKitchen {
    pub fn new(config: KitchenConfig, controls: SharedControls) -> Self {
        Self {
            cell: Mutex::new(KitchenCell {
                kitchen: Kitchen::new(config),
                last_pull: Instant::now(),
            }),
            controls,
        }
    }
}

/// Simulated seconds to advance for an elapsed wall span, bounded by
/// `MAX_ADVANCE_SECONDS` so idle gaps are not replayed in full.
fn clamped_step(elapsed: f64, speed_multiplier: f64) -> f64 {
    (elapsed * speed_multiplier).min(MAX_ADVANCE_SECONDS)
}

#[async_trait]
impl SnapshotProducer for SimulatedKitchen {
    async fn current_snapshot(&self) -> CucinaResult<Snapshot> {
        let controls = *self.controls.read().await;
        let mut cell = self.cell.lock().await;

        let now = Instant::now();
        let elapsed = now.duration_since(cell.last_pull).as_secs_f64();
        cell.last_pull = now;

        let dt = clamped_step(elapsed, controls.speed_multiplier);
        debug!(elapsed, dt, "advancing kitchen simulation");
        cell.kitchen.advance(dt, &controls);

        Ok(cell.kitchen.snapshot(controls))
    }
}
