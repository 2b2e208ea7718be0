use crate::car::types::{EnergyModel, TickInputs};
use crate::config::ArrayConfig;
use crate::error::{PhysicsError, non_negative};

/// Photovoltaic array mounted on the car body.
///
/// Production follows the cloud-derated irradiance
/// `GHI · (1 − 0.75 · cloud^3.4)` over the panel area.
#[derive(Debug, Clone)]
pub struct SolarArray {
    /// Panel area (m²).
    pub panel_area_m2: f64,
    /// Cell-to-battery conversion efficiency.
    pub efficiency: f64,
}

impl SolarArray {
    pub fn from_config(cfg: &ArrayConfig) -> Self {
        Self {
            panel_area_m2: cfg.panel_area_m2,
            efficiency: cfg.efficiency,
        }
    }
}

/// Irradiance reaching the panels once cloud cover is accounted for (W/m²).
pub fn effective_irradiance(ghi_w_m2: f64, cloud_cover: f64) -> f64 {
    ghi_w_m2 * (1.0 - 0.75 * cloud_cover.powf(3.4))
}

impl EnergyModel for SolarArray {
    fn energy_j(&self, inputs: &TickInputs) -> Result<f64, PhysicsError> {
        let ghi = non_negative("irradiance", inputs.irradiance_w_m2)?;
        let cloud = non_negative("cloud cover", inputs.cloud_cover)?;
        if cloud > 1.0 {
            return Err(PhysicsError {
                quantity: "cloud cover",
                value: cloud,
            });
        }

        Ok(effective_irradiance(ghi, cloud) * self.panel_area_m2 * self.efficiency * inputs.dt_s)
    }

    fn subsystem(&self) -> &'static str {
        "array"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array() -> SolarArray {
        SolarArray {
            panel_area_m2: 4.0,
            efficiency: 0.25,
        }
    }

    fn sunny(irradiance_w_m2: f64, cloud_cover: f64) -> TickInputs {
        TickInputs {
            dt_s: 3600.0,
            irradiance_w_m2,
            cloud_cover,
            ..TickInputs::default()
        }
    }

    #[test]
    fn clear_sky_production() {
        // 1000 W/m² · 4 m² · 25 % for one hour = 1 kWh
        let e = array().energy_j(&sunny(1000.0, 0.0));
        assert_eq!(e, Ok(3_600_000.0));
    }

    #[test]
    fn overcast_derates_by_three_quarters() {
        let clear = array().energy_j(&sunny(800.0, 0.0)).expect("valid tick inputs");
        let overcast = array().energy_j(&sunny(800.0, 1.0)).expect("valid tick inputs");
        assert!((overcast - 0.25 * clear).abs() < 1e-6);
    }

    #[test]
    fn night_produces_nothing() {
        assert_eq!(array().energy_j(&sunny(0.0, 0.3)), Ok(0.0));
    }

    #[test]
    fn derating_is_monotonic_in_cloud_cover() {
        let mut last = f64::INFINITY;
        for i in 0..=10 {
            let e = effective_irradiance(1000.0, f64::from(i) / 10.0);
            assert!(e <= last);
            last = e;
        }
    }

    #[test]
    fn bad_inputs_are_rejected() {
        assert!(array().energy_j(&sunny(f64::NAN, 0.0)).is_err());
        assert!(array().energy_j(&sunny(-5.0, 0.0)).is_err());
        assert!(array().energy_j(&sunny(500.0, 1.2)).is_err());
    }
}
