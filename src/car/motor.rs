use crate::car::types::{EnergyModel, GRAVITY, TickInputs};
use crate::config::MotorConfig;
use crate::error::{PhysicsError, finite, non_negative};

/// Drivetrain draw from aerodynamic drag, rolling resistance, grade, and
/// acceleration.
///
/// The motor only ever draws energy; braking and downhill coasting are
/// credited by [`super::Regen`], never here.
#[derive(Debug, Clone)]
pub struct Motor {
    pub vehicle_mass_kg: f64,
    pub drag_coefficient: f64,
    pub frontal_area_m2: f64,
    pub rolling_resistance: f64,
    pub efficiency: f64,
    pub air_density: f64,
}

impl Motor {
    pub fn from_config(cfg: &MotorConfig) -> Self {
        Self {
            vehicle_mass_kg: cfg.vehicle_mass_kg,
            drag_coefficient: cfg.drag_coefficient,
            frontal_area_m2: cfg.frontal_area_m2,
            rolling_resistance: cfg.rolling_resistance,
            efficiency: cfg.efficiency,
            air_density: cfg.air_density,
        }
    }

    /// Resistive force at the wheels (N). May be negative on a steep descent.
    fn tractive_force_n(&self, speed_ms: f64, headwind_m_s: f64, gradient: f64) -> f64 {
        let air_speed = speed_ms + headwind_m_s;
        let drag =
            0.5 * self.air_density * self.drag_coefficient * self.frontal_area_m2 * air_speed * air_speed.abs();

        let theta = gradient.atan();
        let weight = self.vehicle_mass_kg * GRAVITY;
        let rolling = weight * self.rolling_resistance * theta.cos();
        let grade = weight * theta.sin();

        drag + rolling + grade
    }
}

impl EnergyModel for Motor {
    fn energy_j(&self, inputs: &TickInputs) -> Result<f64, PhysicsError> {
        let v = non_negative("speed", inputs.speed_ms)?;
        let v_prev = non_negative("previous speed", inputs.prev_speed_ms)?;
        let gradient = finite("gradient", inputs.gradient)?;
        finite("bearing", inputs.bearing_deg)?;
        non_negative("wind speed", inputs.wind_speed_m_s)?;
        finite("wind direction", inputs.wind_direction_deg)?;

        let force = self.tractive_force_n(v, inputs.headwind_m_s(), gradient);
        let cruise_j = force * v * inputs.dt_s;
        let accel_j = (0.5 * self.vehicle_mass_kg * (v * v - v_prev * v_prev)).max(0.0);

        let mechanical_j = (cruise_j + accel_j).max(0.0);
        Ok(-(mechanical_j / self.efficiency))
    }

    fn subsystem(&self) -> &'static str {
        "motor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motor() -> Motor {
        Motor::from_config(&MotorConfig::default())
    }

    fn cruising(speed_ms: f64) -> TickInputs {
        TickInputs {
            dt_s: 60.0,
            speed_ms,
            prev_speed_ms: speed_ms,
            ..TickInputs::default()
        }
    }

    #[test]
    fn parked_car_draws_nothing() {
        assert_eq!(motor().energy_j(&cruising(0.0)), Ok(-0.0));
    }

    #[test]
    fn flat_cruise_matches_hand_calculation() {
        let m = motor();
        let v = 15.0;
        let drag = 0.5 * 1.225 * 0.135 * 1.15 * v * v;
        let rolling = 350.0 * GRAVITY * 0.0055;
        let expected = -((drag + rolling) * v * 60.0 / 0.9);
        let got = m.energy_j(&cruising(v)).expect("valid tick inputs");
        assert!((got - expected).abs() < 1e-6, "got {got}, expected {expected}");
    }

    #[test]
    fn draw_grows_with_speed() {
        let m = motor();
        let slow = m.energy_j(&cruising(10.0)).expect("valid tick inputs");
        let fast = m.energy_j(&cruising(20.0)).expect("valid tick inputs");
        assert!(fast < slow && slow < 0.0);
    }

    #[test]
    fn headwind_costs_more_than_tailwind() {
        let m = motor();
        let base = TickInputs {
            wind_speed_m_s: 5.0,
            bearing_deg: 0.0,
            ..cruising(15.0)
        };
        let with_wind_from = |deg: f64| {
            m.energy_j(&TickInputs { wind_direction_deg: deg, ..base })
                .expect("valid tick inputs")
        };
        let head = with_wind_from(0.0);
        let tail = with_wind_from(180.0);
        assert!(head < tail);
    }

    #[test]
    fn acceleration_adds_kinetic_energy() {
        let m = motor();
        let steady = m.energy_j(&cruising(10.0)).expect("valid tick inputs");
        let accel = m
            .energy_j(&TickInputs { prev_speed_ms: 0.0, ..cruising(10.0) })
            .expect("valid tick inputs");
        let ke = 0.5 * 350.0 * 100.0 / 0.9;
        assert!((steady - accel - ke).abs() < 1e-6);
    }

    #[test]
    fn steep_descent_is_never_a_credit() {
        let m = motor();
        let e = m
            .energy_j(&TickInputs { gradient: -0.2, ..cruising(10.0) })
            .expect("valid tick inputs");
        assert_eq!(e, -0.0);
    }

    #[test]
    fn nan_gradient_is_rejected() {
        let err = motor().energy_j(&TickInputs { gradient: f64::NAN, ..cruising(10.0) });
        assert_eq!(err.map_err(|e| e.quantity), Err("gradient"));
    }
}
