//! Closed result-key vocabulary and the typed per-run result store.

use std::fmt;
use std::str::FromStr;

use crate::error::SimError;

/// Every quantity a completed run can report.
///
/// Per-tick keys map to arrays with one entry per simulated tick (shorter
/// than the driving time when the car reached the finish line); the rest are
/// scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKey {
    TickArray,
    Timestamps,
    SpeedKmh,
    SpeedMs,
    TickDistances,
    Distances,
    ClosestGisIndices,
    ClosestWeatherIndices,
    PathDistances,
    GisRouteElevationsAtEachTick,
    GisVehicleBearings,
    Gradients,
    SolarIrradiances,
    WindSpeeds,
    AbsoluteWindSpeeds,
    WindDirections,
    CloudCovers,
    MotorConsumedEnergy,
    ArrayProducedEnergy,
    LvsConsumedEnergy,
    RegenProducedEnergy,
    ConsumedEnergy,
    ProducedEnergy,
    DeltaEnergy,
    RawSoc,
    StateOfCharge,
    NotCharge,
    BatteryVoltage,
    StoredEnergy,
    DistanceTravelled,
    TimeTaken,
    FinalSoc,
    RouteLength,
    ExhaustionTick,
    ReachedFinish,
    WasSuccessful,
}

impl ResultKey {
    /// All keys, per-tick arrays first, in export column order.
    pub const ALL: [ResultKey; 36] = [
        ResultKey::TickArray,
        ResultKey::Timestamps,
        ResultKey::SpeedKmh,
        ResultKey::SpeedMs,
        ResultKey::TickDistances,
        ResultKey::Distances,
        ResultKey::ClosestGisIndices,
        ResultKey::ClosestWeatherIndices,
        ResultKey::PathDistances,
        ResultKey::GisRouteElevationsAtEachTick,
        ResultKey::GisVehicleBearings,
        ResultKey::Gradients,
        ResultKey::SolarIrradiances,
        ResultKey::WindSpeeds,
        ResultKey::AbsoluteWindSpeeds,
        ResultKey::WindDirections,
        ResultKey::CloudCovers,
        ResultKey::MotorConsumedEnergy,
        ResultKey::ArrayProducedEnergy,
        ResultKey::LvsConsumedEnergy,
        ResultKey::RegenProducedEnergy,
        ResultKey::ConsumedEnergy,
        ResultKey::ProducedEnergy,
        ResultKey::DeltaEnergy,
        ResultKey::RawSoc,
        ResultKey::StateOfCharge,
        ResultKey::NotCharge,
        ResultKey::BatteryVoltage,
        ResultKey::StoredEnergy,
        ResultKey::DistanceTravelled,
        ResultKey::TimeTaken,
        ResultKey::FinalSoc,
        ResultKey::RouteLength,
        ResultKey::ExhaustionTick,
        ResultKey::ReachedFinish,
        ResultKey::WasSuccessful,
    ];

    /// Keys returned for the `"default"` query, in order.
    pub const DEFAULT: [ResultKey; 11] = [
        ResultKey::SpeedKmh,
        ResultKey::Distances,
        ResultKey::StateOfCharge,
        ResultKey::DeltaEnergy,
        ResultKey::SolarIrradiances,
        ResultKey::WindSpeeds,
        ResultKey::GisRouteElevationsAtEachTick,
        ResultKey::CloudCovers,
        ResultKey::DistanceTravelled,
        ResultKey::TimeTaken,
        ResultKey::FinalSoc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResultKey::TickArray => "tick_array",
            ResultKey::Timestamps => "timestamps",
            ResultKey::SpeedKmh => "speed_kmh",
            ResultKey::SpeedMs => "speed_ms",
            ResultKey::TickDistances => "tick_distances",
            ResultKey::Distances => "distances",
            ResultKey::ClosestGisIndices => "closest_gis_indices",
            ResultKey::ClosestWeatherIndices => "closest_weather_indices",
            ResultKey::PathDistances => "path_distances",
            ResultKey::GisRouteElevationsAtEachTick => "gis_route_elevations_at_each_tick",
            ResultKey::GisVehicleBearings => "gis_vehicle_bearings",
            ResultKey::Gradients => "gradients",
            ResultKey::SolarIrradiances => "solar_irradiances",
            ResultKey::WindSpeeds => "wind_speeds",
            ResultKey::AbsoluteWindSpeeds => "absolute_wind_speeds",
            ResultKey::WindDirections => "wind_directions",
            ResultKey::CloudCovers => "cloud_covers",
            ResultKey::MotorConsumedEnergy => "motor_consumed_energy",
            ResultKey::ArrayProducedEnergy => "array_produced_energy",
            ResultKey::LvsConsumedEnergy => "lvs_consumed_energy",
            ResultKey::RegenProducedEnergy => "regen_produced_energy",
            ResultKey::ConsumedEnergy => "consumed_energy",
            ResultKey::ProducedEnergy => "produced_energy",
            ResultKey::DeltaEnergy => "delta_energy",
            ResultKey::RawSoc => "raw_soc",
            ResultKey::StateOfCharge => "state_of_charge",
            ResultKey::NotCharge => "not_charge",
            ResultKey::BatteryVoltage => "battery_voltage",
            ResultKey::StoredEnergy => "stored_energy",
            ResultKey::DistanceTravelled => "distance_travelled",
            ResultKey::TimeTaken => "time_taken",
            ResultKey::FinalSoc => "final_soc",
            ResultKey::RouteLength => "route_length",
            ResultKey::ExhaustionTick => "exhaustion_tick",
            ResultKey::ReachedFinish => "reached_finish",
            ResultKey::WasSuccessful => "was_successful",
        }
    }

    /// Whether the key names a per-tick array rather than a scalar.
    pub fn is_per_tick(self) -> bool {
        !matches!(
            self,
            ResultKey::DistanceTravelled
                | ResultKey::TimeTaken
                | ResultKey::FinalSoc
                | ResultKey::RouteLength
                | ResultKey::ExhaustionTick
                | ResultKey::ReachedFinish
                | ResultKey::WasSuccessful
        )
    }
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultKey {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResultKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SimError::UnknownKey(s.to_string()))
    }
}

/// A borrowed view of one result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultValue<'a> {
    Series(&'a [f64]),
    Indices(&'a [usize]),
    Timestamps(&'a [i64]),
    Flags(&'a [bool]),
    Scalar(f64),
    Index(Option<usize>),
    Flag(bool),
}

impl<'a> ResultValue<'a> {
    pub fn as_series(&self) -> Option<&'a [f64]> {
        match self {
            ResultValue::Series(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            ResultValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            ResultValue::Flag(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_indices(&self) -> Option<&'a [usize]> {
        match self {
            ResultValue::Indices(s) => Some(*s),
            _ => None,
        }
    }

    /// Number of per-tick entries; `None` for scalars.
    pub fn len(&self) -> Option<usize> {
        match self {
            ResultValue::Series(s) => Some(s.len()),
            ResultValue::Indices(s) => Some(s.len()),
            ResultValue::Timestamps(s) => Some(s.len()),
            ResultValue::Flags(s) => Some(s.len()),
            _ => None,
        }
    }

    /// Renders entry `i` of a per-tick array, or the scalar itself, as text.
    pub fn cell(&self, i: usize) -> String {
        match self {
            ResultValue::Series(s) => s.get(i).map(|v| v.to_string()),
            ResultValue::Indices(s) => s.get(i).map(|v| v.to_string()),
            ResultValue::Timestamps(s) => s.get(i).map(|v| v.to_string()),
            ResultValue::Flags(s) => s.get(i).map(|v| v.to_string()),
            ResultValue::Scalar(v) => Some(v.to_string()),
            ResultValue::Index(v) => (*v).map(|v| v.to_string()),
            ResultValue::Flag(v) => Some(v.to_string()),
        }
        .unwrap_or_default()
    }
}

/// Everything one completed run produced.
///
/// Energies are in joules and signed: positive charges the battery, negative
/// draws from it. `consumed_energy` is therefore non-positive and
/// `delta_energy = produced_energy + consumed_energy`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunResults {
    pub tick_array: Vec<usize>,
    pub timestamps: Vec<i64>,
    pub speed_kmh: Vec<f64>,
    pub speed_ms: Vec<f64>,
    /// Distance covered within each tick (m).
    pub tick_distances: Vec<f64>,
    /// Cumulative distance at the end of each tick (m).
    pub distances: Vec<f64>,
    pub closest_gis_indices: Vec<usize>,
    pub closest_weather_indices: Vec<usize>,
    /// Path distance of the matched route sample (m).
    pub path_distances: Vec<f64>,
    pub gis_route_elevations_at_each_tick: Vec<f64>,
    pub gis_vehicle_bearings: Vec<f64>,
    pub gradients: Vec<f64>,
    pub solar_irradiances: Vec<f64>,
    /// Headwind component of the wind (m/s); negative for a tailwind.
    pub wind_speeds: Vec<f64>,
    pub absolute_wind_speeds: Vec<f64>,
    pub wind_directions: Vec<f64>,
    pub cloud_covers: Vec<f64>,
    pub motor_consumed_energy: Vec<f64>,
    pub array_produced_energy: Vec<f64>,
    pub lvs_consumed_energy: Vec<f64>,
    pub regen_produced_energy: Vec<f64>,
    pub consumed_energy: Vec<f64>,
    pub produced_energy: Vec<f64>,
    pub delta_energy: Vec<f64>,
    pub raw_soc: Vec<f64>,
    pub state_of_charge: Vec<f64>,
    /// Ticks in which the array produced nothing.
    pub not_charge: Vec<bool>,
    pub battery_voltage: Vec<f64>,
    /// Energy held by the pack after each tick (J).
    pub stored_energy: Vec<f64>,
    pub distance_travelled_km: f64,
    pub time_taken_s: f64,
    pub final_soc: f64,
    pub route_length_km: f64,
    pub exhaustion_tick: Option<usize>,
    pub reached_finish: bool,
    pub was_successful: bool,
}

impl RunResults {
    /// Number of simulated ticks.
    pub fn len(&self) -> usize {
        self.tick_array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tick_array.is_empty()
    }

    pub fn get(&self, key: ResultKey) -> ResultValue<'_> {
        use ResultValue::{Flag, Flags, Index, Indices, Scalar, Series, Timestamps};
        match key {
            ResultKey::TickArray => Indices(&self.tick_array),
            ResultKey::Timestamps => Timestamps(&self.timestamps),
            ResultKey::SpeedKmh => Series(&self.speed_kmh),
            ResultKey::SpeedMs => Series(&self.speed_ms),
            ResultKey::TickDistances => Series(&self.tick_distances),
            ResultKey::Distances => Series(&self.distances),
            ResultKey::ClosestGisIndices => Indices(&self.closest_gis_indices),
            ResultKey::ClosestWeatherIndices => Indices(&self.closest_weather_indices),
            ResultKey::PathDistances => Series(&self.path_distances),
            ResultKey::GisRouteElevationsAtEachTick => Series(&self.gis_route_elevations_at_each_tick),
            ResultKey::GisVehicleBearings => Series(&self.gis_vehicle_bearings),
            ResultKey::Gradients => Series(&self.gradients),
            ResultKey::SolarIrradiances => Series(&self.solar_irradiances),
            ResultKey::WindSpeeds => Series(&self.wind_speeds),
            ResultKey::AbsoluteWindSpeeds => Series(&self.absolute_wind_speeds),
            ResultKey::WindDirections => Series(&self.wind_directions),
            ResultKey::CloudCovers => Series(&self.cloud_covers),
            ResultKey::MotorConsumedEnergy => Series(&self.motor_consumed_energy),
            ResultKey::ArrayProducedEnergy => Series(&self.array_produced_energy),
            ResultKey::LvsConsumedEnergy => Series(&self.lvs_consumed_energy),
            ResultKey::RegenProducedEnergy => Series(&self.regen_produced_energy),
            ResultKey::ConsumedEnergy => Series(&self.consumed_energy),
            ResultKey::ProducedEnergy => Series(&self.produced_energy),
            ResultKey::DeltaEnergy => Series(&self.delta_energy),
            ResultKey::RawSoc => Series(&self.raw_soc),
            ResultKey::StateOfCharge => Series(&self.state_of_charge),
            ResultKey::NotCharge => Flags(&self.not_charge),
            ResultKey::BatteryVoltage => Series(&self.battery_voltage),
            ResultKey::StoredEnergy => Series(&self.stored_energy),
            ResultKey::DistanceTravelled => Scalar(self.distance_travelled_km),
            ResultKey::TimeTaken => Scalar(self.time_taken_s),
            ResultKey::FinalSoc => Scalar(self.final_soc),
            ResultKey::RouteLength => Scalar(self.route_length_km),
            ResultKey::ExhaustionTick => Index(self.exhaustion_tick),
            ResultKey::ReachedFinish => Flag(self.reached_finish),
            ResultKey::WasSuccessful => Flag(self.was_successful),
        }
    }
}
