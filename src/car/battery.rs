use crate::config::BatteryConfig;

/// Traction battery pack.
///
/// The only stateful subsystem: it integrates the per-tick net energy into a
/// raw (unclipped) state of charge. Clipping to [0, 1] is applied on read.
#[derive(Debug, Clone)]
pub struct Battery {
    /// Usable capacity (J).
    pub capacity_j: f64,
    /// Pack voltage at full charge (V).
    pub max_voltage: f64,
    /// Pack voltage when empty (V).
    pub min_voltage: f64,
    /// Integrated state of charge, unbounded.
    raw_soc: f64,
}

impl Battery {
    pub fn from_config(cfg: &BatteryConfig) -> Self {
        Self {
            capacity_j: cfg.capacity_wh * 3600.0,
            max_voltage: cfg.max_voltage,
            min_voltage: cfg.min_voltage,
            raw_soc: cfg.initial_soc,
        }
    }

    /// Adds one tick's net energy (J) and returns the new raw state of charge.
    pub fn integrate(&mut self, net_energy_j: f64) -> f64 {
        self.raw_soc += net_energy_j / self.capacity_j;
        self.raw_soc
    }

    pub fn raw_soc(&self) -> f64 {
        self.raw_soc
    }

    /// State of charge clipped to its physical range.
    pub fn soc(&self) -> f64 {
        clip_soc(self.raw_soc)
    }

    /// Pack voltage, linear in state of charge between the empty and full voltages.
    pub fn voltage_at(&self, soc: f64) -> f64 {
        self.min_voltage + (self.max_voltage - self.min_voltage) * soc
    }

    /// Energy held at `soc` (J).
    pub fn stored_energy_at(&self, soc: f64) -> f64 {
        soc * self.capacity_j
    }
}

/// Clamps a raw state of charge to [0, 1].
pub fn clip_soc(raw: f64) -> f64 {
    raw.clamp(0.0, 1.0)
}
