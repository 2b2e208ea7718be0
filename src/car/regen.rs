use crate::car::types::{EnergyModel, TickInputs};
use crate::config::RegenConfig;
use crate::error::{PhysicsError, non_negative};

/// Regenerative braking: recovers part of the kinetic energy shed while
/// decelerating.
#[derive(Debug, Clone)]
pub struct Regen {
    /// Fraction of released kinetic energy returned to the pack.
    pub efficiency: f64,
    /// Decelerations at or below this are ignored (m/s²).
    pub decel_threshold_m_s2: f64,
    /// Power ceiling of the regen circuit (W).
    pub max_power_w: f64,
    /// Vehicle mass including driver (kg).
    pub vehicle_mass_kg: f64,
}

impl Regen {
    pub fn from_config(cfg: &RegenConfig, vehicle_mass_kg: f64) -> Self {
        Self {
            efficiency: cfg.efficiency,
            decel_threshold_m_s2: cfg.decel_threshold_m_s2,
            max_power_w: cfg.max_power_w,
            vehicle_mass_kg,
        }
    }
}

impl EnergyModel for Regen {
    fn energy_j(&self, inputs: &TickInputs) -> Result<f64, PhysicsError> {
        let v = non_negative("speed", inputs.speed_ms)?;
        let v_prev = non_negative("previous speed", inputs.prev_speed_ms)?;
        if inputs.dt_s <= 0.0 {
            return Ok(0.0);
        }

        let decel = (v_prev - v) / inputs.dt_s;
        if decel <= self.decel_threshold_m_s2 {
            return Ok(0.0);
        }

        let released_j = 0.5 * self.vehicle_mass_kg * (v_prev * v_prev - v * v);
        Ok((self.efficiency * released_j).min(self.max_power_w * inputs.dt_s))
    }

    fn subsystem(&self) -> &'static str {
        "regen"
    }
}
