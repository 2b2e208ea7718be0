//! Vehicle subsystem energy models.

/// Body-mounted photovoltaic array.
pub mod array;
/// Traction battery and state-of-charge integration.
pub mod battery;
/// Low-voltage auxiliary bus.
pub mod lvs;
/// Drivetrain consumption.
pub mod motor;
/// Regenerative braking.
pub mod regen;
pub mod types;

pub use array::SolarArray;
pub use battery::Battery;
pub use lvs::LowVoltageSystem;
pub use motor::Motor;
pub use regen::Regen;
pub use types::{EnergyModel, TickInputs};

use crate::config::RaceConfig;

/// The four stateless subsystems evaluated every tick.
#[derive(Debug, Clone)]
pub struct Subsystems {
    pub motor: Motor,
    pub array: SolarArray,
    pub lvs: LowVoltageSystem,
    pub regen: Regen,
}

impl Subsystems {
    pub fn from_config(config: &RaceConfig) -> Self {
        Self {
            motor: Motor::from_config(&config.motor),
            array: SolarArray::from_config(&config.array),
            lvs: LowVoltageSystem::from_config(&config.lvs),
            regen: Regen::from_config(&config.regen, config.motor.vehicle_mass_kg),
        }
    }
}
