//! Route, forecast, and speed-profile loaders.
//!
//! # Route CSV
//!
//! ```csv
//! latitude,longitude,path_distance_m,elevation_m,bearing_deg
//! 37.0000,-86.4000,0.0,201.2,90.0
//! 37.0000,-86.3989,100.0,201.9,90.0
//! ```
//!
//! # Weather CSV
//!
//! One row per forecast cell per timestamp (UNIX seconds).
//!
//! ```csv
//! timestamp,latitude,longitude,irradiance_w_m2,wind_speed_m_s,wind_direction_deg,cloud_cover
//! 1719842400,37.0,-86.4,612.5,3.1,210.0,0.15
//! ```
//!
//! # Speed profile JSON
//!
//! A flat array of km/h values, one per driving time division.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::env::route::{GeoPoint, RoutePoint, RouteTable};
use crate::env::weather::{WeatherRecord, WeatherTable};
use crate::error::{SimError, SimResult};

#[derive(Deserialize)]
struct RouteRow {
    latitude: f64,
    longitude: f64,
    path_distance_m: f64,
    elevation_m: f64,
    bearing_deg: f64,
}

#[derive(Deserialize)]
struct WeatherRow {
    timestamp: i64,
    latitude: f64,
    longitude: f64,
    irradiance_w_m2: f64,
    wind_speed_m_s: f64,
    wind_direction_deg: f64,
    cloud_cover: f64,
}

fn open(path: &Path) -> SimResult<File> {
    File::open(path).map_err(|e| {
        SimError::Io(std::io::Error::new(
            e.kind(),
            format!("cannot open \"{}\": {e}", path.display()),
        ))
    })
}

/// Loads a route table from a CSV file.
pub fn load_route_csv(path: &Path) -> SimResult<RouteTable> {
    load_route_reader(open(path)?)
}

/// Like [`load_route_csv`] but accepts any `Read` source.
///
/// # Errors
///
/// [`SimError::Parse`] for malformed rows, [`SimError::Configuration`] when
/// the rows do not form a valid route.
pub fn load_route_reader<R: Read>(reader: R) -> SimResult<RouteTable> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut points = Vec::new();
    for (line, result) in csv_reader.deserialize::<RouteRow>().enumerate() {
        let row = result.map_err(|e| SimError::Parse(format!("route row {}: {e}", line + 1)))?;
        points.push(RoutePoint {
            coord: GeoPoint::new(row.latitude, row.longitude),
            path_distance_m: row.path_distance_m,
            elevation_m: row.elevation_m,
            bearing_deg: row.bearing_deg,
        });
    }
    debug!(samples = points.len(), "loaded route");
    RouteTable::new(points)
}

/// Loads a forecast table from a CSV file.
pub fn load_weather_csv(path: &Path) -> SimResult<WeatherTable> {
    load_weather_reader(open(path)?)
}

/// Like [`load_weather_csv`] but accepts any `Read` source.
pub fn load_weather_reader<R: Read>(reader: R) -> SimResult<WeatherTable> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for (line, result) in csv_reader.deserialize::<WeatherRow>().enumerate() {
        let row = result.map_err(|e| SimError::Parse(format!("weather row {}: {e}", line + 1)))?;
        records.push(WeatherRecord {
            timestamp: row.timestamp,
            location: GeoPoint::new(row.latitude, row.longitude),
            irradiance_w_m2: row.irradiance_w_m2,
            wind_speed_m_s: row.wind_speed_m_s,
            wind_direction_deg: row.wind_direction_deg,
            cloud_cover: row.cloud_cover,
        });
    }
    debug!(records = records.len(), "loaded weather forecast");
    WeatherTable::new(records)
}

/// A profile holding `speed_kmh` for every one of `divisions` ticks.
pub fn constant_speeds(speed_kmh: f64, divisions: usize) -> Vec<f64> {
    vec![speed_kmh; divisions]
}

/// Loads a cached speed profile (JSON array of km/h values).
///
/// # Errors
///
/// [`SimError::Parse`] for malformed JSON, [`SimError::Configuration`] when
/// the profile length differs from `divisions`.
pub fn load_speeds_json(path: &Path, divisions: usize) -> SimResult<Vec<f64>> {
    let speeds: Vec<f64> = serde_json::from_reader(BufReader::new(open(path)?))
        .map_err(|e| SimError::Parse(format!("speed profile \"{}\": {e}", path.display())))?;
    if speeds.len() != divisions {
        return Err(SimError::Configuration(format!(
            "cached speed profile \"{}\" has improper length {} (expected {divisions})",
            path.display(),
            speeds.len()
        )));
    }
    debug!(ticks = speeds.len(), "loaded speed profile");
    Ok(speeds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ROUTE: &str = "\
latitude,longitude,path_distance_m,elevation_m,bearing_deg
37.0,-86.4,0.0,200.0,90.0
37.0,-86.399,88.8,201.0,90.0
37.0,-86.398,177.6,202.5,91.0
";

    const WEATHER: &str = "\
timestamp,latitude,longitude,irradiance_w_m2,wind_speed_m_s,wind_direction_deg,cloud_cover
1719846000,37.0,-86.4,700.0,3.0,200.0,0.2
1719842400,37.0,-86.4,600.0,2.5,190.0,0.1
";

    #[test]
    fn route_csv_parses() {
        let route = load_route_reader(ROUTE.as_bytes()).expect("route CSV should parse");
        assert_eq!(route.len(), 3);
        assert_eq!(route.max_path_distance_m(), 177.6);
    }

    #[test]
    fn route_csv_missing_column_is_parse_error() {
        let bad = "latitude,longitude,path_distance_m\n37.0,-86.4,0.0\n";
        assert!(matches!(load_route_reader(bad.as_bytes()), Err(SimError::Parse(_))));
    }

    #[test]
    fn route_csv_with_nan_is_configuration_error() {
        let bad = "latitude,longitude,path_distance_m,elevation_m,bearing_deg\n37.0,-86.4,0.0,NaN,90.0\n";
        assert!(matches!(load_route_reader(bad.as_bytes()), Err(SimError::Configuration(_))));
    }

    #[test]
    fn weather_csv_parses_and_sorts() {
        let weather = load_weather_reader(WEATHER.as_bytes()).expect("weather CSV should parse");
        assert_eq!(weather.frame_count(), 2);
        let first = weather.get(0).expect("at least one record");
        assert_eq!(first.irradiance_w_m2, 600.0);
    }

    #[test]
    fn empty_weather_csv_is_rejected() {
        let header_only = WEATHER.lines().next().expect("header line");
        assert!(matches!(
            load_weather_reader(header_only.as_bytes()),
            Err(SimError::Configuration(_))
        ));
    }

    #[test]
    fn speed_profile_round_trip_and_length_check() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file should be created");
        file.write_all(b"[10.0, 20.5, 0.0]").expect("temp file should be writable");
        let path = file.path();

        let speeds = load_speeds_json(path, 3).expect("speed profile should load");
        assert_eq!(speeds, vec![10.0, 20.5, 0.0]);
        assert!(matches!(
            load_speeds_json(path, 4),
            Err(SimError::Configuration(ref m)) if m.contains("improper length")
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_route_csv(Path::new("/nonexistent/route.csv"));
        assert!(matches!(err, Err(SimError::Io(_))));
    }

    #[test]
    fn constant_profile() {
        assert_eq!(constant_speeds(35.0, 3), vec![35.0, 35.0, 35.0]);
    }
}
