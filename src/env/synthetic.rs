//! Seeded synthetic route and forecast generator.
//!
//! Lets the binary and the tests run a full race without external GIS or
//! weather data. Output is fully determined by [`EnvironmentConfig::seed`].

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::config::{EnvironmentConfig, RaceConfig, RaceType};
use crate::env::indexer::RouteIndexer;
use crate::env::route::{GeoPoint, RoutePoint, RouteTable};
use crate::env::solar::clear_sky_ghi;
use crate::env::weather::{WeatherRecord, WeatherTable};
use crate::error::SimResult;

/// Length of one lap of the closed track used for track races (m).
const TRACK_LAP_M: f64 = 5_070.0;
/// Wavelength of rolling hills on road routes (m).
const ROAD_HILL_WAVELENGTH_M: f64 = 12_000.0;
/// General direction of travel on road routes (deg).
const ROAD_HEADING_DEG: f64 = 270.0;
/// Prevailing wind origin (deg).
const PREVAILING_WIND_DEG: f64 = 200.0;
/// AR(1) persistence of hourly cloud cover within one forecast cell.
const CLOUD_PERSISTENCE: f64 = 0.7;

/// Gaussian noise via the Box-Muller transform.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

/// Generates the route table and forecast table for a race configuration.
///
/// # Errors
///
/// Propagates table validation failures, which only occur for a
/// configuration that [`RaceConfig::validate`] would already reject.
pub fn generate(config: &RaceConfig) -> SimResult<(RouteTable, WeatherTable)> {
    let route = generate_route(config.race.race_type, &config.environment)?;
    let first_ts = config.race.start_time;
    let last_ts = first_ts + (config.race.duration_hours * 3600.0).ceil() as i64;
    let weather = generate_weather(&config.environment, &route, first_ts, last_ts)?;
    debug!(
        route_samples = route.len(),
        weather_records = weather.len(),
        "generated synthetic environment"
    );
    Ok((route, weather))
}

/// Builds a route of `route_length_km`.
///
/// Track races unroll laps of a circular track into one long path; road races
/// meander westward from the origin. Elevation is a sine profile plus noise.
pub fn generate_route(race_type: RaceType, env: &EnvironmentConfig) -> SimResult<RouteTable> {
    let mut rng = StdRng::seed_from_u64(env.seed);
    let origin = GeoPoint::new(env.origin_lat, env.origin_lon);
    let length_m = env.route_length_km * 1000.0;
    let samples = (length_m / env.route_spacing_m).ceil().max(1.0) as usize;

    let radius = TRACK_LAP_M / (2.0 * std::f64::consts::PI);
    let centre = origin.destination(180.0, radius);

    let mut points = Vec::with_capacity(samples + 1);
    let mut coord = origin;
    let mut prev_d = 0.0;
    for i in 0..=samples {
        let d = (i as f64 * env.route_spacing_m).min(length_m);

        let (wavelength, bearing) = match race_type {
            RaceType::Fsgp => {
                let angle = (d / radius).to_degrees();
                coord = centre.destination(angle, radius);
                (TRACK_LAP_M, (angle + 90.0).rem_euclid(360.0))
            }
            RaceType::Asc => {
                let bearing = ROAD_HEADING_DEG
                    + 15.0 * (2.0 * std::f64::consts::PI * d / 40_000.0).sin();
                coord = coord.destination(bearing, d - prev_d);
                (ROAD_HILL_WAVELENGTH_M, bearing.rem_euclid(360.0))
            }
        };
        let elevation = 200.0
            + env.elevation_amplitude_m * (2.0 * std::f64::consts::PI * d / wavelength).sin()
            + gaussian_noise(&mut rng, env.elevation_noise_m);

        points.push(RoutePoint {
            coord,
            path_distance_m: d,
            elevation_m: elevation,
            bearing_deg: bearing,
        });
        prev_d = d;
    }

    RouteTable::new(points)
}

/// Builds an hourly forecast covering `[first_ts, last_ts]` with one cell every
/// `weather_cell_km` along the route.
///
/// Irradiance is the clear-sky value at each cell's position and altitude,
/// taken at the middle of the hour the record is valid for.
pub fn generate_weather(
    env: &EnvironmentConfig,
    route: &RouteTable,
    first_ts: i64,
    last_ts: i64,
) -> SimResult<WeatherTable> {
    let mut rng = StdRng::seed_from_u64(env.seed.wrapping_add(1));

    let cell_m = env.weather_cell_km * 1000.0;
    let mut cells = Vec::new();
    let mut indexer = RouteIndexer::new(route);
    let mut d = 0.0;
    while d <= route.max_path_distance_m() {
        let idx = indexer.locate(0, d)?;
        if let Some(p) = route.get(idx) {
            cells.push(*p);
        }
        d += cell_m;
    }

    let hour0 = first_ts.div_euclid(3600) * 3600 - 3600;
    let hours = (last_ts - hour0).div_euclid(3600) + 2;

    let mut cloud: Vec<f64> = vec![env.cloud_mean; cells.len()];
    let mut records = Vec::with_capacity(cells.len() * hours as usize);
    for h in 0..hours {
        let timestamp = hour0 + h * 3600;
        for (cell, site) in cells.iter().enumerate() {
            let clear_sky = clear_sky_ghi(
                env.solar_constant_w_m2,
                timestamp + 1800,
                env.utc_offset_hours,
                site.coord,
                site.elevation_m,
            );
            let c = CLOUD_PERSISTENCE * cloud[cell]
                + (1.0 - CLOUD_PERSISTENCE) * env.cloud_mean
                + gaussian_noise(&mut rng, env.cloud_noise);
            cloud[cell] = c.clamp(0.0, 1.0);

            records.push(WeatherRecord {
                timestamp,
                location: site.coord,
                irradiance_w_m2: clear_sky,
                wind_speed_m_s: (env.mean_wind_m_s + gaussian_noise(&mut rng, env.wind_noise_m_s))
                    .max(0.0),
                wind_direction_deg: (PREVAILING_WIND_DEG + gaussian_noise(&mut rng, 20.0))
                    .rem_euclid(360.0),
                cloud_cover: cloud[cell],
            });
        }
    }

    WeatherTable::new(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_noise_zero_std() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(gaussian_noise(&mut rng, 0.0), 0.0);
    }

    #[test]
    fn same_seed_same_environment() {
        let cfg = RaceConfig::fsgp();
        let (ra, wa) = generate(&cfg).expect("synthetic environment should generate");
        let (rb, wb) = generate(&cfg).expect("synthetic environment should generate");
        assert!(!ra.is_empty());
        assert_eq!(ra.points(), rb.points());
        assert_eq!(wa.records(), wb.records());
    }

    #[test]
    fn different_seeds_differ() {
        let mut cfg = RaceConfig::fsgp();
        let a = generate_route(cfg.race.race_type, &cfg.environment).expect("route should generate");
        cfg.environment.seed = 43;
        let b = generate_route(cfg.race.race_type, &cfg.environment).expect("route should generate");
        let elevations = |r: &RouteTable| r.points().iter().map(|p| p.elevation_m).collect::<Vec<_>>();
        assert_ne!(elevations(&a), elevations(&b));
    }

    #[test]
    fn route_spans_configured_length() {
        for cfg in [RaceConfig::fsgp(), RaceConfig::asc()] {
            let route = generate_route(cfg.race.race_type, &cfg.environment).expect("route should generate");
            let max = route.max_path_distance_m();
            assert!((max - cfg.environment.route_length_km * 1000.0).abs() < 1e-6);
        }
    }

    #[test]
    fn road_route_moves_away_from_origin() {
        let cfg = RaceConfig::asc();
        let route = generate_route(RaceType::Asc, &cfg.environment).expect("route should generate");
        let origin = GeoPoint::new(cfg.environment.origin_lat, cfg.environment.origin_lon);
        let end = route.points().last().expect("non-empty route").coord;
        let gap = origin.distance_m(end);
        assert!(gap > 400_000.0, "end is only {gap} m from origin");
    }

    #[test]
    fn track_route_stays_on_the_loop() {
        let cfg = RaceConfig::fsgp();
        let route = generate_route(RaceType::Fsgp, &cfg.environment).expect("route should generate");
        let origin = GeoPoint::new(cfg.environment.origin_lat, cfg.environment.origin_lon);
        let furthest = route
            .points()
            .iter()
            .map(|p| origin.distance_m(p.coord))
            .fold(0.0, f64::max);
        let diameter = TRACK_LAP_M / std::f64::consts::PI;
        assert!(furthest <= diameter + 1.0);
    }

    #[test]
    fn forecast_follows_the_sun() {
        let cfg = RaceConfig::fsgp();
        let route = generate_route(RaceType::Fsgp, &cfg.environment).expect("route should generate");
        // 2024-07-01 00:00 at UTC-5, one full local day.
        let midnight = 1_719_810_000;
        let weather = generate_weather(&cfg.environment, &route, midnight, midnight + 86_399)
            .expect("forecast should generate");

        let irradiance_at = |hour: i64| {
            let frame = weather
                .covering_frame(midnight + hour * 3600)
                .expect("forecast covers the day");
            weather.records()[frame][0].irradiance_w_m2
        };
        assert_eq!(irradiance_at(0), 0.0);
        assert_eq!(irradiance_at(2), 0.0);
        assert_eq!(irradiance_at(23), 0.0);
        // The 12:00 and 13:00 frames bracket solar noon at this longitude.
        let noon = irradiance_at(12).max(irradiance_at(13));
        assert!(noon > 900.0, "noon irradiance {noon}");
        assert!(noon > irradiance_at(9) && irradiance_at(9) > irradiance_at(7));
    }

    #[test]
    fn forecast_depends_on_where_the_race_is_held() {
        let midnight = 1_704_085_200; // 2024-01-01 00:00 at UTC-5
        let peak = |origin_lat: f64| {
            let env = EnvironmentConfig { origin_lat, ..EnvironmentConfig::default() };
            let route = generate_route(RaceType::Fsgp, &env).expect("route should generate");
            let weather = generate_weather(&env, &route, midnight, midnight + 86_399)
                .expect("forecast should generate");
            weather.records().iter().map(|r| r.irradiance_w_m2).fold(0.0, f64::max)
        };
        assert!(peak(15.0) > peak(37.0));
        assert!(peak(37.0) > peak(50.0));
    }

    #[test]
    fn forecast_covers_race_window() {
        let cfg = RaceConfig::fsgp();
        let (_, weather) = generate(&cfg).expect("synthetic environment should generate");
        let start = cfg.race.start_time;
        let end = start + (cfg.race.duration_hours * 3600.0) as i64;
        assert!(weather.covering_frame(start).is_some());
        assert!(weather.covering_frame(end).is_some());
        assert!(weather.records().iter().all(|r| (0.0..=1.0).contains(&r.cloud_cover)));
        assert!(weather.records().iter().all(|r| r.irradiance_w_m2 >= 0.0));
    }
}
