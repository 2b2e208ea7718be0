//! Common types and traits for the vehicle's subsystem energy models.

use crate::error::PhysicsError;

/// Standard gravity (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Physical inputs gathered by the engine for one tick.
///
/// Every subsystem model reads only the fields it needs from this context.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInputs {
    /// Duration of the tick (s).
    pub dt_s: f64,
    /// Vehicle speed during this tick (m/s).
    pub speed_ms: f64,
    /// Vehicle speed during the previous tick (m/s); zero at the start line.
    pub prev_speed_ms: f64,
    /// Road grade as rise over run.
    pub gradient: f64,
    /// Direction of travel, clockwise from north (deg).
    pub bearing_deg: f64,
    /// Global horizontal irradiance (W/m²).
    pub irradiance_w_m2: f64,
    /// Wind speed (m/s).
    pub wind_speed_m_s: f64,
    /// Direction the wind blows from (deg).
    pub wind_direction_deg: f64,
    /// Cloud cover fraction (0.0–1.0).
    pub cloud_cover: f64,
}

impl TickInputs {
    /// Component of the wind opposing the direction of travel (m/s).
    ///
    /// Positive for a headwind, negative for a tailwind.
    pub fn headwind_m_s(&self) -> f64 {
        self.wind_speed_m_s * (self.wind_direction_deg - self.bearing_deg).to_radians().cos()
    }
}

/// A subsystem that moves energy into or out of the battery during a tick.
///
/// Implementations hold only configuration; every call is a pure function of
/// the tick inputs, so ticks may be evaluated in any order or in parallel.
pub trait EnergyModel: Sync {
    /// Signed energy delta for the tick (J).
    ///
    /// Positive values charge the battery, negative values draw from it.
    ///
    /// # Errors
    ///
    /// Returns a [`PhysicsError`] naming the offending quantity when an input
    /// is NaN or outside its physical domain.
    fn energy_j(&self, inputs: &TickInputs) -> Result<f64, PhysicsError>;

    /// Returns a human-readable name for the subsystem.
    fn subsystem(&self) -> &'static str;
}
