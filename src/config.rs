//! TOML-based race configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::SimError;

/// Upper bound on the number of ticks a single run may allocate.
pub const MAX_DRIVING_TIME_DIVISIONS: usize = 1_000_000;

/// Top-level race configuration parsed from TOML.
///
/// All fields have defaults matching the `fsgp` preset. Load from TOML with
/// [`RaceConfig::from_toml_file`] or use [`RaceConfig::fsgp`] for the
/// built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RaceConfig {
    /// Competition timing and reporting mode.
    #[serde(default)]
    pub race: RaceSection,
    /// Battery pack parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Vehicle body and drivetrain parameters.
    #[serde(default)]
    pub motor: MotorConfig,
    /// Solar array parameters.
    #[serde(default)]
    pub array: ArrayConfig,
    /// Low-voltage system parameters.
    #[serde(default)]
    pub lvs: LvsConfig,
    /// Regenerative braking parameters.
    #[serde(default)]
    pub regen: RegenConfig,
    /// Synthetic route and forecast generator parameters.
    #[serde(default)]
    pub environment: EnvironmentConfig,
}

/// Competition format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RaceType {
    /// Formula Sun Grand Prix: closed-track race, laps unrolled into one route.
    Fsgp,
    /// American Solar Challenge: point-to-point road route.
    Asc,
}

/// What [`crate::sim::Simulation::run_model`] reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    TimeTaken,
    DistanceTravelled,
    DistanceAndTime,
    Void,
}

/// Race timing and reporting mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RaceSection {
    /// Competition format.
    pub race_type: RaceType,
    /// UNIX timestamp of the first tick (s).
    pub start_time: i64,
    /// Total driving time simulated (hours, must be > 0).
    pub duration_hours: f64,
    /// Ticks per hour; one tick lasts `3600 / granularity` seconds (must be > 0).
    pub granularity: f64,
    /// Value returned from a model run.
    pub return_type: ReturnType,
}

impl Default for RaceSection {
    fn default() -> Self {
        Self {
            race_type: RaceType::Fsgp,
            // 2024-07-01 14:00 UTC, 09:00 local at UTC-5.
            start_time: 1_719_842_400,
            duration_hours: 8.0,
            granularity: 60.0,
            return_type: ReturnType::DistanceAndTime,
        }
    }
}

/// Battery pack parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Nominal energy capacity (Wh).
    pub capacity_wh: f64,
    /// Initial state of charge (0.0–1.0).
    pub initial_soc: f64,
    /// Pack voltage when full (V).
    pub max_voltage: f64,
    /// Pack voltage when empty (V).
    pub min_voltage: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_wh: 5_400.0,
            initial_soc: 1.0,
            max_voltage: 134.4,
            min_voltage: 86.4,
        }
    }
}

/// Vehicle body and drivetrain parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotorConfig {
    /// Vehicle mass including driver (kg).
    pub vehicle_mass_kg: f64,
    /// Aerodynamic drag coefficient.
    pub drag_coefficient: f64,
    /// Frontal area (m²).
    pub frontal_area_m2: f64,
    /// Rolling resistance coefficient.
    pub rolling_resistance: f64,
    /// Battery-to-wheel efficiency (0.0–1.0].
    pub efficiency: f64,
    /// Air density (kg/m³).
    pub air_density: f64,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            vehicle_mass_kg: 350.0,
            drag_coefficient: 0.135,
            frontal_area_m2: 1.15,
            rolling_resistance: 0.0055,
            efficiency: 0.9,
            air_density: 1.225,
        }
    }
}

/// Solar array parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArrayConfig {
    /// Panel area (m²).
    pub panel_area_m2: f64,
    /// Cell-to-battery conversion efficiency (0.0–1.0].
    pub efficiency: f64,
}

impl Default for ArrayConfig {
    fn default() -> Self {
        Self {
            panel_area_m2: 4.0,
            efficiency: 0.24,
        }
    }
}

/// Low-voltage system parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LvsConfig {
    /// Average low-voltage bus current (A).
    pub current_a: f64,
    /// Low-voltage bus voltage (V).
    pub voltage_v: f64,
}

impl Default for LvsConfig {
    fn default() -> Self {
        Self {
            current_a: 1.5,
            voltage_v: 17.0,
        }
    }
}

/// Regenerative braking parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegenConfig {
    /// Fraction of released kinetic energy returned to the pack (0.0–1.0).
    pub efficiency: f64,
    /// Minimum deceleration captured (m/s²).
    pub decel_threshold_m_s2: f64,
    /// Maximum regenerative power (W).
    pub max_power_w: f64,
}

impl Default for RegenConfig {
    fn default() -> Self {
        Self {
            efficiency: 0.6,
            decel_threshold_m_s2: 0.05,
            max_power_w: 5_000.0,
        }
    }
}

/// Synthetic environment parameters, used when no route/weather files are supplied.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// Seed for elevation, wind, and cloud noise.
    pub seed: u64,
    /// Total route length (km).
    pub route_length_km: f64,
    /// Spacing between route samples (m).
    pub route_spacing_m: f64,
    /// Amplitude of the rolling elevation profile (m).
    pub elevation_amplitude_m: f64,
    /// Standard deviation of elevation noise (m).
    pub elevation_noise_m: f64,
    /// Latitude of the start line (deg).
    pub origin_lat: f64,
    /// Longitude of the start line (deg).
    pub origin_lon: f64,
    /// Local time offset from UTC (hours).
    pub utc_offset_hours: f64,
    /// Extraterrestrial solar irradiance feeding the clear-sky model (W/m²).
    pub solar_constant_w_m2: f64,
    /// Mean wind speed (m/s).
    pub mean_wind_m_s: f64,
    /// Wind speed noise standard deviation (m/s).
    pub wind_noise_m_s: f64,
    /// Mean cloud cover fraction (0.0–1.0).
    pub cloud_mean: f64,
    /// Cloud cover noise standard deviation.
    pub cloud_noise: f64,
    /// Spacing between forecast grid cells along the route (km).
    pub weather_cell_km: f64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            route_length_km: 250.0,
            route_spacing_m: 100.0,
            elevation_amplitude_m: 8.0,
            elevation_noise_m: 0.5,
            origin_lat: 37.0,
            origin_lon: -86.4,
            utc_offset_hours: -5.0,
            solar_constant_w_m2: 1353.0,
            mean_wind_m_s: 3.0,
            wind_noise_m_s: 0.8,
            cloud_mean: 0.2,
            cloud_noise: 0.1,
            weather_cell_km: 25.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"race.granularity"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Folds a validation report into a single [`SimError::Configuration`].
    pub fn into_sim_error(errors: &[ConfigError]) -> SimError {
        let joined = errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        SimError::Configuration(joined)
    }
}

impl RaceConfig {
    /// Returns the Formula Sun Grand Prix preset: an 8-hour track day.
    pub fn fsgp() -> Self {
        Self {
            race: RaceSection::default(),
            battery: BatteryConfig::default(),
            motor: MotorConfig::default(),
            array: ArrayConfig::default(),
            lvs: LvsConfig::default(),
            regen: RegenConfig::default(),
            environment: EnvironmentConfig::default(),
        }
    }

    /// Returns the American Solar Challenge preset: a long road stage with hills.
    pub fn asc() -> Self {
        Self {
            race: RaceSection {
                race_type: RaceType::Asc,
                duration_hours: 9.0,
                return_type: ReturnType::DistanceTravelled,
                ..RaceSection::default()
            },
            battery: BatteryConfig::default(),
            motor: MotorConfig::default(),
            array: ArrayConfig::default(),
            lvs: LvsConfig::default(),
            regen: RegenConfig::default(),
            environment: EnvironmentConfig {
                route_length_km: 600.0,
                route_spacing_m: 250.0,
                elevation_amplitude_m: 60.0,
                elevation_noise_m: 2.0,
                origin_lat: 39.1,
                origin_lon: -94.6,
                mean_wind_m_s: 4.5,
                wind_noise_m_s: 1.5,
                cloud_mean: 0.3,
                cloud_noise: 0.15,
                weather_cell_km: 50.0,
                ..EnvironmentConfig::default()
            },
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["fsgp", "asc"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name.to_ascii_lowercase().as_str() {
            "fsgp" => Ok(Self::fsgp()),
            "asc" => Ok(Self::asc()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Duration of one tick in seconds.
    pub fn tick_seconds(&self) -> f64 {
        3600.0 / self.race.granularity
    }

    /// Number of ticks covering the configured driving time.
    pub fn driving_time_divisions(&self) -> usize {
        let divisions = (self.race.duration_hours * self.race.granularity).round();
        if divisions.is_finite() && divisions > 0.0 {
            divisions as usize
        } else {
            0
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut positive = |field: &str, value: f64| {
            if !(value.is_finite() && value > 0.0) {
                errors.push(ConfigError::new(field, format!("must be > 0, got {value}")));
            }
        };

        let r = &self.race;
        positive("race.granularity", r.granularity);
        positive("race.duration_hours", r.duration_hours);
        positive("battery.capacity_wh", self.battery.capacity_wh);
        positive("motor.vehicle_mass_kg", self.motor.vehicle_mass_kg);
        positive("motor.air_density", self.motor.air_density);
        positive("environment.route_length_km", self.environment.route_length_km);
        positive("environment.route_spacing_m", self.environment.route_spacing_m);
        positive("environment.weather_cell_km", self.environment.weather_cell_km);

        let mut non_negative = |field: &str, value: f64| {
            if !(value.is_finite() && value >= 0.0) {
                errors.push(ConfigError::new(field, format!("must be >= 0, got {value}")));
            }
        };
        non_negative("motor.drag_coefficient", self.motor.drag_coefficient);
        non_negative("motor.frontal_area_m2", self.motor.frontal_area_m2);
        non_negative("motor.rolling_resistance", self.motor.rolling_resistance);
        non_negative("array.panel_area_m2", self.array.panel_area_m2);
        non_negative("lvs.current_a", self.lvs.current_a);
        non_negative("lvs.voltage_v", self.lvs.voltage_v);
        non_negative("regen.decel_threshold_m_s2", self.regen.decel_threshold_m_s2);
        non_negative("regen.max_power_w", self.regen.max_power_w);
        non_negative("battery.min_voltage", self.battery.min_voltage);
        non_negative("environment.solar_constant_w_m2", self.environment.solar_constant_w_m2);
        non_negative("environment.mean_wind_m_s", self.environment.mean_wind_m_s);
        non_negative("environment.elevation_noise_m", self.environment.elevation_noise_m);
        non_negative("environment.wind_noise_m_s", self.environment.wind_noise_m_s);
        non_negative("environment.cloud_noise", self.environment.cloud_noise);

        let mut fraction = |field: &str, value: f64, allow_zero: bool| {
            let ok = value.is_finite() && value <= 1.0 && (value > 0.0 || (allow_zero && value == 0.0));
            if !ok {
                let range = if allow_zero { "[0.0, 1.0]" } else { "(0.0, 1.0]" };
                errors.push(ConfigError::new(field, format!("must be in {range}, got {value}")));
            }
        };
        fraction("battery.initial_soc", self.battery.initial_soc, true);
        fraction("motor.efficiency", self.motor.efficiency, false);
        fraction("array.efficiency", self.array.efficiency, true);
        fraction("regen.efficiency", self.regen.efficiency, true);
        fraction("environment.cloud_mean", self.environment.cloud_mean, true);

        if !self.battery.max_voltage.is_finite() {
            errors.push(ConfigError::new(
                "battery.max_voltage",
                format!("must be finite, got {}", self.battery.max_voltage),
            ));
        } else if self.battery.max_voltage <= self.battery.min_voltage {
            errors.push(ConfigError::new(
                "battery.max_voltage",
                "must be > battery.min_voltage",
            ));
        }

        let env = &self.environment;
        if !(env.origin_lat.is_finite() && (-90.0..=90.0).contains(&env.origin_lat)) {
            errors.push(ConfigError::new(
                "environment.origin_lat",
                format!("must be in [-90.0, 90.0], got {}", env.origin_lat),
            ));
        }

        if r.granularity > 0.0 && r.duration_hours > 0.0 {
            let ticks = r.duration_hours * r.granularity;
            if ticks.round() < 1.0 {
                errors.push(ConfigError::new(
                    "race.duration_hours",
                    "must cover at least one tick at the configured granularity",
                ));
            } else if ticks.round() > MAX_DRIVING_TIME_DIVISIONS as f64 {
                errors.push(ConfigError::new(
                    "race.granularity",
                    format!(
                        "duration_hours * granularity must not exceed {MAX_DRIVING_TIME_DIVISIONS} ticks, got {ticks}"
                    ),
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fsgp_preset_valid() {
        let cfg = RaceConfig::fsgp();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "fsgp should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_is_case_insensitive() {
        assert!(RaceConfig::from_preset("FSGP").is_ok());
        assert!(RaceConfig::from_preset("asc").is_ok());
    }

    #[test]
    fn from_preset_unknown() {
        let err = RaceConfig::from_preset("wsc");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in RaceConfig::PRESETS {
            let cfg = RaceConfig::from_preset(name).expect("preset should load");
            let errors = cfg.validate();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn tick_timing_follows_granularity() {
        let mut cfg = RaceConfig::fsgp();
        cfg.race.granularity = 1.0;
        cfg.race.duration_hours = 9.0;
        assert_eq!(cfg.tick_seconds(), 3600.0);
        assert_eq!(cfg.driving_time_divisions(), 9);

        cfg.race.granularity = 4.0;
        assert_eq!(cfg.tick_seconds(), 900.0);
        assert_eq!(cfg.driving_time_divisions(), 36);
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[race]
race_type = "ASC"
start_time = 1700000000
duration_hours = 4.0
granularity = 12.0
return_type = "time_taken"

[battery]
capacity_wh = 4000.0
initial_soc = 0.9
max_voltage = 130.0
min_voltage = 90.0

[motor]
vehicle_mass_kg = 300.0
drag_coefficient = 0.12
frontal_area_m2 = 1.0
rolling_resistance = 0.005
efficiency = 0.95
air_density = 1.2

[array]
panel_area_m2 = 4.5
efficiency = 0.23

[lvs]
current_a = 2.0
voltage_v = 12.0

[regen]
efficiency = 0.5
decel_threshold_m_s2 = 0.1
max_power_w = 3000.0

[environment]
seed = 7
route_length_km = 100.0
"#;
        let cfg = RaceConfig::from_toml_str(toml).expect("valid TOML should parse");
        assert_eq!(cfg.race.race_type, RaceType::Asc);
        assert_eq!(cfg.race.return_type, ReturnType::TimeTaken);
        assert_eq!(cfg.driving_time_divisions(), 48);
        assert_eq!(cfg.environment.seed, 7);
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[race]
granularity = 1.0
bogus_field = true
"#;
        assert!(RaceConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn invalid_toml_unknown_return_type() {
        let toml = r#"
[race]
return_type = "energy"
"#;
        assert!(RaceConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_negative_granularity() {
        let mut cfg = RaceConfig::fsgp();
        cfg.race.granularity = -1.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "race.granularity"));
    }

    #[test]
    fn validation_catches_nan_capacity() {
        let mut cfg = RaceConfig::fsgp();
        cfg.battery.capacity_wh = f64::NAN;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.capacity_wh"));
    }

    #[test]
    fn validation_catches_invalid_soc() {
        let mut cfg = RaceConfig::fsgp();
        cfg.battery.initial_soc = 1.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.initial_soc"));
    }

    #[test]
    fn validation_catches_zero_motor_efficiency() {
        let mut cfg = RaceConfig::fsgp();
        cfg.motor.efficiency = 0.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "motor.efficiency"));
    }

    #[test]
    fn validation_catches_inverted_voltages() {
        let mut cfg = RaceConfig::fsgp();
        cfg.battery.min_voltage = 140.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.max_voltage"));
    }

    #[test]
    fn validation_catches_too_short_duration() {
        let mut cfg = RaceConfig::fsgp();
        cfg.race.granularity = 1.0;
        cfg.race.duration_hours = 0.25;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "race.duration_hours"));
    }

    #[test]
    fn validation_catches_non_finite_max_voltage() {
        let mut cfg = RaceConfig::fsgp();
        cfg.battery.max_voltage = f64::INFINITY;
        let errors = cfg.validate();
        let e = errors
            .iter()
            .find(|e| e.field == "battery.max_voltage")
            .expect("infinite max voltage should be rejected");
        assert!(e.message.contains("finite"));
    }

    #[test]
    fn validation_catches_bad_noise_std_devs() {
        let mut cfg = RaceConfig::fsgp();
        cfg.environment.elevation_noise_m = -0.5;
        cfg.environment.wind_noise_m_s = f64::NAN;
        cfg.environment.cloud_noise = f64::INFINITY;
        let errors = cfg.validate();
        for field in [
            "environment.elevation_noise_m",
            "environment.wind_noise_m_s",
            "environment.cloud_noise",
        ] {
            assert!(errors.iter().any(|e| e.field == field), "{field} not flagged: {errors:?}");
        }
    }

    #[test]
    fn validation_caps_the_tick_count() {
        let mut cfg = RaceConfig::fsgp();
        cfg.race.duration_hours = 1.0;
        cfg.race.granularity = MAX_DRIVING_TIME_DIVISIONS as f64;
        assert!(cfg.validate().is_empty());

        cfg.race.granularity = 1e12;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "race.granularity"));
    }

    #[test]
    fn validation_catches_out_of_range_latitude() {
        let mut cfg = RaceConfig::fsgp();
        cfg.environment.origin_lat = 95.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "environment.origin_lat"));
    }

    #[test]
    fn asc_is_longer_and_hillier() {
        let fsgp = RaceConfig::fsgp();
        let asc = RaceConfig::asc();
        assert!(asc.environment.route_length_km > fsgp.environment.route_length_km);
        assert!(asc.environment.elevation_amplitude_m > fsgp.environment.elevation_amplitude_m);
        assert_eq!(asc.race.race_type, RaceType::Asc);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[battery]
initial_soc = 0.5
"#;
        let cfg = RaceConfig::from_toml_str(toml).expect("partial TOML should parse");
        assert_eq!(cfg.battery.initial_soc, 0.5);
        assert_eq!(cfg.battery.capacity_wh, 5_400.0);
        assert_eq!(cfg.race.granularity, 60.0);
    }

    #[test]
    fn errors_fold_into_configuration_error() {
        let mut cfg = RaceConfig::fsgp();
        cfg.race.granularity = 0.0;
        cfg.battery.capacity_wh = -1.0;
        let err = ConfigError::into_sim_error(&cfg.validate());
        let msg = err.to_string();
        assert!(msg.contains("race.granularity"));
        assert!(msg.contains("battery.capacity_wh"));
    }
}
