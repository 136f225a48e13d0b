//! Simulation control state and the command protocol that mutates it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{CucinaError, CucinaResult};

/// Lower bound for the speed multiplier.
pub const MIN_SPEED: f64 = 0.1;

/// Upper bound for the speed multiplier.
pub const MAX_SPEED: f64 = 5.0;

/// Shared simulation parameters.
///
/// Defaults leave the simulation fully operational before any control
/// command has ever arrived. Mutation goes through [`SimulationControls::apply`]
/// only; handlers never poke fields directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationControls {
    pub rush_mode: bool,
    pub equipment_failure: bool,
    pub new_orders_enabled: bool,
    pub speed_multiplier: f64,
}

impl Default for SimulationControls {
    fn default() -> Self {
        Self {
            rush_mode: false,
            equipment_failure: false,
            new_orders_enabled: true,
            speed_multiplier: 1.0,
        }
    }
}

impl SimulationControls {
    /// Apply a validated command.
    ///
    /// An invalid command returns an error and leaves the state untouched;
    /// there is no partial application.
    pub fn apply(&mut self, command: &ControlCommand) -> CucinaResult<()> {
        match command.action {
            ControlAction::ToggleRushMode => {
                self.rush_mode = !self.rush_mode;
            }
            ControlAction::ToggleEquipmentFailure => {
                self.equipment_failure = !self.equipment_failure;
            }
            ControlAction::ToggleNewOrders => {
                self.new_orders_enabled = !self.new_orders_enabled;
            }
            ControlAction::SetSpeed => {
                let value = command
                    .value
                    .ok_or_else(|| CucinaError::validation("set_speed requires a value"))?;
                if !value.is_finite() {
                    return Err(CucinaError::validation("set_speed value must be finite"));
                }
                // Out-of-range values are clamped, not rejected.
                self.speed_multiplier = value.clamp(MIN_SPEED, MAX_SPEED);
            }
        }
        Ok(())
    }
}

/// Control state behind its single exclusive-access boundary.
pub type SharedControls = Arc<RwLock<SimulationControls>>;

/// Create the shared control state with operational defaults.
pub fn new_shared_controls() -> SharedControls {
    Arc::new(RwLock::new(SimulationControls::default()))
}

/// Closed set of actions a client may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    ToggleRushMode,
    ToggleEquipmentFailure,
    ToggleNewOrders,
    SetSpeed,
}

/// A request to mutate the control state.
///
/// `value` is only meaningful for `set_speed`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlCommand {
    pub action: ControlAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl ControlCommand {
    /// A toggle command (no value).
    pub fn toggle(action: ControlAction) -> Self {
        Self {
            action,
            value: None,
        }
    }

    /// A `set_speed` command.
    pub fn set_speed(value: f64) -> Self {
        Self {
            action: ControlAction::SetSpeed,
            value: Some(value),
        }
    }
}

/// Inbound client frame envelope.
///
/// `control` is the only envelope type; anything else fails to parse and
/// is discarded by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Control(ControlCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_operational() {
        let controls = SimulationControls::default();
        assert!(!controls.rush_mode);
        assert!(!controls.equipment_failure);
        assert!(controls.new_orders_enabled);
        assert_eq!(controls.speed_multiplier, 1.0);
    }

    #[test]
    fn test_toggle_actions() {
        let mut controls = SimulationControls::default();

        controls
            .apply(&ControlCommand::toggle(ControlAction::ToggleRushMode))
            .unwrap();
        assert!(controls.rush_mode);
        controls
            .apply(&ControlCommand::toggle(ControlAction::ToggleRushMode))
            .unwrap();
        assert!(!controls.rush_mode);

        controls
            .apply(&ControlCommand::toggle(ControlAction::ToggleNewOrders))
            .unwrap();
        assert!(!controls.new_orders_enabled);
    }

    #[test]
    fn test_set_speed_clamps_to_bounds() {
        let mut controls = SimulationControls::default();

        controls.apply(&ControlCommand::set_speed(2.5)).unwrap();
        assert_eq!(controls.speed_multiplier, 2.5);

        controls.apply(&ControlCommand::set_speed(100.0)).unwrap();
        assert_eq!(controls.speed_multiplier, MAX_SPEED);

        controls.apply(&ControlCommand::set_speed(0.0)).unwrap();
        assert_eq!(controls.speed_multiplier, MIN_SPEED);

        controls.apply(&ControlCommand::set_speed(-3.0)).unwrap();
        assert_eq!(controls.speed_multiplier, MIN_SPEED);
    }

    #[test]
    fn test_set_speed_without_value_is_rejected() {
        let mut controls = SimulationControls::default();
        let before = controls;

        let result = controls.apply(&ControlCommand::toggle(ControlAction::SetSpeed));
        assert!(result.is_err());
        assert_eq!(controls, before);
    }

    #[test]
    fn test_set_speed_non_finite_is_rejected() {
        let mut controls = SimulationControls::default();
        let before = controls;

        assert!(controls
            .apply(&ControlCommand::set_speed(f64::NAN))
            .is_err());
        assert!(controls
            .apply(&ControlCommand::set_speed(f64::INFINITY))
            .is_err());
        assert_eq!(controls, before);
    }

    #[test]
    fn test_client_message_wire_format() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"control","action":"toggle_rush_mode"}"#).unwrap();
        let ClientMessage::Control(command) = msg;
        assert_eq!(command.action, ControlAction::ToggleRushMode);
        assert_eq!(command.value, None);

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"control","action":"set_speed","value":2.0}"#).unwrap();
        let ClientMessage::Control(command) = msg;
        assert_eq!(command.action, ControlAction::SetSpeed);
        assert_eq!(command.value, Some(2.0));
    }

    #[test]
    fn test_unknown_action_fails_to_parse() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type":"control","action":"make_coffee"}"#);
        assert!(result.is_err());

        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type":"telemetry","action":"toggle_rush_mode"}"#);
        assert!(result.is_err());
    }
}
