//! Order pipeline simulation.
//!
//! Orders flow `received -> prep -> baking -> ready -> delivered`. Prep
//! has a fixed number of slots; baking requires a free oven slot, claimed
//! and released through the kitchen.

use std::collections::VecDeque;

use chrono::Utc;
use cucina_core::controls::SimulationControls;
use cucina_core::snapshot::{KitchenMetrics, OrderEvent, OrderStatus};
use rand::rngs::SmallRng;
use rand::Rng;

use crate::oven::Oven;

/// Entries kept in the recent-orders feed (wire side; clients cap display
/// themselves).
const RECENT_EVENTS_CAP: usize = 20;

/// Shortest gap between order arrivals, in simulated seconds.
const MIN_ARRIVAL_GAP: f64 = 5.0;

const PIZZA_TYPES: &[&str] = &[
    "margherita",
    "pepperoni",
    "supreme",
    "hawaiian",
    "veggie",
    "meat_lovers",
];

const PIZZA_SIZES: &[&str] = &["small", "medium", "large", "xlarge"];

fn prep_seconds(size: &str) -> f64 {
    match size {
        "small" => 120.0,
        "medium" => 180.0,
        "large" => 240.0,
        "xlarge" => 300.0,
        _ => 180.0,
    }
}

fn cook_seconds(size: &str) -> f64 {
    match size {
        "small" => 480.0,
        "medium" => 600.0,
        "large" => 720.0,
        "xlarge" => 900.0,
        _ => 600.0,
    }
}

struct ActiveOrder {
    order_id: String,
    pizza_type: String,
    size: String,
    status: OrderStatus,
    /// Simulated seconds since creation.
    age: f64,
    /// Simulated seconds spent in the current stage.
    stage_elapsed: f64,
    prep_needed: f64,
    cook_needed: f64,
    ready_dwell: f64,
    oven: Option<usize>,
}

impl ActiveOrder {
    fn to_event(&self) -> OrderEvent {
        let duration = if self.age > 0.0 {
            Some(self.age as u64)
        } else {
            None
        };
        OrderEvent {
            order_id: self.order_id.clone(),
            pizza_type: self.pizza_type.clone(),
            size: self.size.clone(),
            status: self.status,
            duration,
            timestamp: Utc::now(),
        }
    }
}

pub(crate) struct OrderBoard {
    active: Vec<ActiveOrder>,
    events: VecDeque<OrderEvent>,
    next_order_number: u32,
    until_next_order: f64,
    base_orders_per_minute: f64,
    rush_multiplier: f64,
    prep_slots: u32,
    completed_count: u32,
    completed_seconds_total: f64,
}

impl OrderBoard {
    pub(crate) fn new(
        base_orders_per_minute: f64,
        rush_multiplier: f64,
        prep_slots: u32,
        rng: &mut SmallRng,
    ) -> Self {
        let mut board = Self {
            active: Vec::new(),
            events: VecDeque::new(),
            next_order_number: 1,
            until_next_order: 0.0,
            base_orders_per_minute,
            rush_multiplier,
            prep_slots,
            completed_count: 0,
            completed_seconds_total: 0.0,
        };
        board.until_next_order = board.arrival_gap(false, rng);
        board
    }

    /// Move the pipeline forward by `dt` simulated seconds.
    pub(crate) fn advance(
        &mut self,
        dt: f64,
        controls: &SimulationControls,
        ovens: &mut [Oven],
        rng: &mut SmallRng,
    ) {
        self.accept_arrivals(dt, controls, rng);

        for order in &mut self.active {
            order.age += dt;
            // Failed equipment bakes at half speed; other stages are manual
            // work and unaffected.
            let stage_dt = if order.status == OrderStatus::Baking && controls.equipment_failure {
                dt / 2.0
            } else {
                dt
            };
            order.stage_elapsed += stage_dt;
        }

        self.advance_received();
        self.advance_prep(ovens);
        self.advance_baking(ovens);
        self.advance_ready();

        self.active.retain(|order| !order.status.is_terminal());
    }

    fn accept_arrivals(&mut self, dt: f64, controls: &SimulationControls, rng: &mut SmallRng) {
        if !controls.new_orders_enabled {
            // The countdown freezes rather than accumulating a backlog of
            // arrivals to release when orders are re-enabled.
            return;
        }
        self.until_next_order -= dt;
        while self.until_next_order <= 0.0 {
            self.create_order(rng);
            self.until_next_order += self.arrival_gap(controls.rush_mode, rng);
        }
    }

    fn arrival_gap(&self, rush: bool, rng: &mut SmallRng) -> f64 {
        let mut rate = self.base_orders_per_minute;
        if rush {
            rate *= self.rush_multiplier;
        }
        if rate <= 0.0 {
            return f64::MAX;
        }
        let gap = (60.0 / rate) * rng.gen_range(0.7..1.4);
        gap.max(MIN_ARRIVAL_GAP)
    }

    fn create_order(&mut self, rng: &mut SmallRng) {
        let order_id = format!("ORD-{:04}", self.next_order_number);
        self.next_order_number += 1;

        let pizza_type = PIZZA_TYPES[rng.gen_range(0..PIZZA_TYPES.len())].to_string();
        let size = PIZZA_SIZES[rng.gen_range(0..PIZZA_SIZES.len())].to_string();
        let prep_needed = prep_seconds(&size) * rng.gen_range(0.9..1.2);
        let cook_needed = cook_seconds(&size) + rng.gen_range(-30.0..60.0);
        let ready_dwell = rng.gen_range(120.0..600.0);

        let order = ActiveOrder {
            order_id,
            pizza_type,
            size,
            status: OrderStatus::Received,
            age: 0.0,
            stage_elapsed: 0.0,
            prep_needed,
            cook_needed,
            ready_dwell,
            oven: None,
        };
        self.record_event(order.to_event());
        self.active.push(order);
    }

    fn advance_received(&mut self) {
        let mut prepping = self.count(OrderStatus::Prep);
        for index in 0..self.active.len() {
            if self.active[index].status != OrderStatus::Received {
                continue;
            }
            if prepping >= self.prep_slots {
                break;
            }
            self.transition(index, OrderStatus::Prep);
            prepping += 1;
        }
    }

    fn advance_prep(&mut self, ovens: &mut [Oven]) {
        for index in 0..self.active.len() {
            let order = &self.active[index];
            if order.status != OrderStatus::Prep || order.stage_elapsed < order.prep_needed {
                continue;
            }
            let Some(slot) = ovens.iter_mut().position(|oven| oven.try_reserve()) else {
                // Every oven is full; the order waits in prep.
                continue;
            };
            self.active[index].oven = Some(slot);
            self.transition(index, OrderStatus::Baking);
        }
    }

    fn advance_baking(&mut self, ovens: &mut [Oven]) {
        for index in 0..self.active.len() {
            let order = &self.active[index];
            if order.status != OrderStatus::Baking || order.stage_elapsed < order.cook_needed {
                continue;
            }
            if let Some(slot) = self.active[index].oven.take() {
                ovens[slot].release();
            }
            self.transition(index, OrderStatus::Ready);
        }
    }

    fn advance_ready(&mut self) {
        for index in 0..self.active.len() {
            let order = &self.active[index];
            if order.status != OrderStatus::Ready || order.stage_elapsed < order.ready_dwell {
                continue;
            }
            self.completed_count += 1;
            self.completed_seconds_total += self.active[index].age;
            self.transition(index, OrderStatus::Delivered);
        }
    }

    fn transition(&mut self, index: usize, status: OrderStatus) {
        self.active[index].status = status;
        self.active[index].stage_elapsed = 0.0;
        let event = self.active[index].to_event();
        self.record_event(event);
    }

    fn record_event(&mut self, event: OrderEvent) {
        self.events.push_front(event);
        self.events.truncate(RECENT_EVENTS_CAP);
    }

    fn count(&self, status: OrderStatus) -> u32 {
        self.active
            .iter()
            .filter(|order| order.status == status)
            .count() as u32
    }

    pub(crate) fn recent_events(&self) -> Vec<OrderEvent> {
        self.events.iter().cloned().collect()
    }

    pub(crate) fn metrics(&self, controls: &SimulationControls) -> KitchenMetrics {
        let avg_completion_time = if self.completed_count > 0 {
            let avg = self.completed_seconds_total / f64::from(self.completed_count);
            (avg * 10.0).round() / 10.0
        } else {
            0.0
        };
        KitchenMetrics {
            active_orders: self.active.len() as u32,
            completed_orders: self.completed_count,
            avg_completion_time,
            orders_received: self.count(OrderStatus::Received),
            orders_prep: self.count(OrderStatus::Prep),
            orders_baking: self.count(OrderStatus::Baking),
            orders_ready: self.count(OrderStatus::Ready),
            rush_hour: controls.rush_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn board(rng: &mut SmallRng) -> OrderBoard {
        OrderBoard::new(2.0, 3.0, 4, rng)
    }

    fn run(
        board: &mut OrderBoard,
        ovens: &mut [Oven],
        controls: &SimulationControls,
        rng: &mut SmallRng,
        seconds: u32,
    ) {
        for _ in 0..seconds {
            board.advance(1.0, controls, ovens, rng);
        }
    }

    #[test]
    fn test_orders_flow_through_the_pipeline() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut board = board(&mut rng);
        let mut ovens = vec![Oven::new("oven_1", 4)];
        let controls = SimulationControls::default();

        // Two hours of simulated time is enough for full deliveries.
        run(&mut board, &mut ovens, &controls, &mut rng, 7_200);

        let metrics = board.metrics(&controls);
        assert!(metrics.completed_orders > 0);
        assert!(metrics.avg_completion_time > 0.0);

        let statuses: Vec<OrderStatus> = board
            .recent_events()
            .iter()
            .map(|event| event.status)
            .collect();
        assert!(statuses.iter().any(|s| *s != OrderStatus::Received));
    }

    #[test]
    fn test_disabling_new_orders_stops_arrivals() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut board = board(&mut rng);
        let mut ovens = vec![Oven::new("oven_1", 4)];
        let controls = SimulationControls {
            new_orders_enabled: false,
            ..Default::default()
        };

        run(&mut board, &mut ovens, &controls, &mut rng, 600);

        let metrics = board.metrics(&controls);
        assert_eq!(metrics.active_orders, 0);
        assert!(board.recent_events().is_empty());
    }

    #[test]
    fn test_rush_mode_raises_arrival_rate() {
        let calm = {
            let mut rng = SmallRng::seed_from_u64(23);
            let mut board = board(&mut rng);
            let mut ovens = vec![Oven::new("oven_1", 4)];
            let controls = SimulationControls::default();
            run(&mut board, &mut ovens, &controls, &mut rng, 1_800);
            board.next_order_number
        };
        let rushed = {
            let mut rng = SmallRng::seed_from_u64(23);
            let mut board = board(&mut rng);
            let mut ovens = vec![Oven::new("oven_1", 4)];
            let controls = SimulationControls {
                rush_mode: true,
                ..Default::default()
            };
            run(&mut board, &mut ovens, &controls, &mut rng, 1_800);
            board.next_order_number
        };

        assert!(rushed > calm, "rush {rushed} vs calm {calm}");
    }

    #[test]
    fn test_recent_events_are_newest_first_and_bounded() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut board = board(&mut rng);
        let mut ovens = vec![Oven::new("oven_1", 4), Oven::new("oven_2", 3)];
        let controls = SimulationControls::default();

        run(&mut board, &mut ovens, &controls, &mut rng, 3_600);

        let events = board.recent_events();
        assert!(events.len() <= RECENT_EVENTS_CAP);
        for pair in events.windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp);
        }
    }

    #[test]
    fn test_oven_slots_are_returned() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut board = board(&mut rng);
        let mut ovens = vec![Oven::new("oven_1", 1)];
        let controls = SimulationControls::default();

        run(&mut board, &mut ovens, &controls, &mut rng, 14_400);

        // After hours of throughput on a single-slot oven, the slot must
        // not have leaked: either free, or held by exactly one baking order.
        let baking = board.count(OrderStatus::Baking);
        assert!(baking <= 1, "single slot oven holds {baking} orders");
    }
}
