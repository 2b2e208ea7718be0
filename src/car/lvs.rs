use crate::car::types::{EnergyModel, TickInputs};
use crate::config::LvsConfig;
use crate::error::{PhysicsError, non_negative};

/// Low-voltage bus: telemetry, lights, driver displays.
///
/// Draws a constant `current · voltage` regardless of motion.
#[derive(Debug, Clone)]
pub struct LowVoltageSystem {
    pub current_a: f64,
    pub voltage_v: f64,
}

impl LowVoltageSystem {
    pub fn from_config(cfg: &LvsConfig) -> Self {
        Self {
            current_a: cfg.current_a,
            voltage_v: cfg.voltage_v,
        }
    }

    /// Continuous draw (W).
    pub fn power_w(&self) -> f64 {
        self.current_a * self.voltage_v
    }
}

impl EnergyModel for LowVoltageSystem {
    fn energy_j(&self, inputs: &TickInputs) -> Result<f64, PhysicsError> {
        let dt = non_negative("tick duration", inputs.dt_s)?;
        Ok(-self.power_w() * dt)
    }

    fn subsystem(&self) -> &'static str {
        "lvs"
    }
}
