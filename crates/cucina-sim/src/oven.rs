//! Pizza oven simulation.

use cucina_core::snapshot::{OvenReading, OvenStatus};
use rand::rngs::SmallRng;
use rand::Rng;

/// Regulation setpoint in degrees Fahrenheit.
const TARGET_TEMPERATURE: f64 = 450.0;

/// Physical temperature bounds.
const MIN_TEMPERATURE: f64 = 200.0;
const MAX_TEMPERATURE: f64 = 500.0;

/// Below this the oven reads as offline.
const OFFLINE_THRESHOLD: f64 = 300.0;

/// Proportional regulation gain per simulated second.
const REGULATION_GAIN: f64 = 0.02;

/// Chance per simulated second that a loaded oven's door opens.
const DOOR_OPEN_RATE: f64 = 0.02;

pub(crate) struct Oven {
    oven_id: String,
    capacity: u32,
    in_use: u32,
    temperature: f64,
}

impl Oven {
    pub(crate) fn new(oven_id: impl Into<String>, capacity: u32) -> Self {
        Self {
            oven_id: oven_id.into(),
            capacity,
            in_use: 0,
            temperature: TARGET_TEMPERATURE,
        }
    }

    /// Claim one slot, if any is free.
    pub(crate) fn try_reserve(&mut self) -> bool {
        if self.in_use < self.capacity {
            self.in_use += 1;
            true
        } else {
            false
        }
    }

    /// Free a slot claimed by `try_reserve`.
    pub(crate) fn release(&mut self) {
        self.in_use = self.in_use.saturating_sub(1);
    }

    /// Move the thermal model forward by `dt` simulated seconds.
    pub(crate) fn advance(&mut self, dt: f64, equipment_failure: bool, rng: &mut SmallRng) {
        // Door openings bleed heat while pizzas are loaded.
        if self.in_use > 0 && rng.gen_bool((DOOR_OPEN_RATE * dt).clamp(0.0, 1.0)) {
            self.temperature -= rng.gen_range(20.0..50.0);
        }

        // Proportional pull toward the setpoint, plus sensor-scale noise.
        // Failed equipment regulates at a quarter gain and leaks heat.
        let gain = if equipment_failure {
            REGULATION_GAIN / 4.0
        } else {
            REGULATION_GAIN
        };
        self.temperature += (TARGET_TEMPERATURE - self.temperature) * gain * dt;
        self.temperature += rng.gen_range(-0.6..0.6) * dt;
        if equipment_failure {
            self.temperature -= (self.temperature - 280.0).max(0.0) * 0.01 * dt;
        }

        self.temperature = self.temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
    }

    /// Utilization-weighted efficiency score in `[0, 1]`.
    pub(crate) fn efficiency(&self) -> f64 {
        let utilization = f64::from(self.in_use) / f64::from(self.capacity.max(1));
        let temperature_accuracy =
            (1.0 - (TARGET_TEMPERATURE - self.temperature).abs() / 100.0).clamp(0.0, 1.0);
        (utilization * 0.7 + temperature_accuracy * 0.3).min(1.0)
    }

    pub(crate) fn reading(&self) -> OvenReading {
        let status = if self.temperature < OFFLINE_THRESHOLD {
            OvenStatus::Offline
        } else {
            OvenStatus::Active
        };
        OvenReading {
            oven_id: self.oven_id.clone(),
            temperature: (self.temperature * 10.0).round() / 10.0,
            capacity_used: self.in_use,
            capacity_total: self.capacity,
            efficiency: (self.efficiency() * 100.0).round() / 100.0,
            status,
        }
    }
}
