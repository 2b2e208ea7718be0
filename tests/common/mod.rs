//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use solar_race_sim::config::RaceConfig;
use solar_race_sim::env::{GeoPoint, RoutePoint, RouteTable, WeatherRecord, WeatherTable};
use solar_race_sim::sim::{Simulation, SimulationBuilder};

/// Metres per degree of longitude on the equator.
const M_PER_DEG: f64 = 111_195.0;

/// FSGP preset with one-hour ticks over `hours` hours.
pub fn hourly_config(hours: f64) -> RaceConfig {
    let mut cfg = RaceConfig::fsgp();
    cfg.race.granularity = 1.0;
    cfg.race.duration_hours = hours;
    cfg
}

/// Straight eastbound route along the equator, `samples + 1` points evenly
/// spaced over `length_m`.
pub fn straight_route(length_m: f64, samples: u32, elevation: impl Fn(f64) -> f64) -> RouteTable {
    let points = (0..=samples)
        .map(|i| {
            let d = length_m * f64::from(i) / f64::from(samples);
            RoutePoint {
                coord: GeoPoint::new(0.0, d / M_PER_DEG),
                path_distance_m: d,
                elevation_m: elevation(d),
                bearing_deg: 90.0,
            }
        })
        .collect();
    RouteTable::new(points).expect("fixture route should be valid")
}

pub fn flat_route(length_m: f64) -> RouteTable {
    straight_route(length_m, 100, |_| 200.0)
}

/// A single forecast record that every tick falls back to.
pub fn uniform_weather(timestamp: i64, irradiance_w_m2: f64, wind_speed_m_s: f64) -> WeatherTable {
    WeatherTable::new(vec![WeatherRecord {
        timestamp,
        location: GeoPoint::new(0.0, 0.0),
        irradiance_w_m2,
        wind_speed_m_s,
        wind_direction_deg: 270.0,
        cloud_cover: 0.0,
    }])
    .expect("fixture weather should be valid")
}

/// Builds a simulation on a flat route under uniform weather.
pub fn build(cfg: RaceConfig, route_length_m: f64, irradiance_w_m2: f64) -> Simulation {
    let weather = uniform_weather(cfg.race.start_time, irradiance_w_m2, 0.0);
    SimulationBuilder::new(cfg)
        .route(flat_route(route_length_m))
        .weather(weather)
        .build()
        .expect("simulation should build")
}
