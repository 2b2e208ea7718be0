//! Nearest-sample lookups from ticks into the route and weather tables.

use crate::env::route::{GeoPoint, RouteTable};
use crate::env::weather::WeatherTable;
use crate::error::{SimError, SimResult};

/// Forward walker over the route table.
///
/// Keeps the index of the last sample at or before the previous query so a
/// non-decreasing sequence of distances is resolved in O(T + N) overall. A
/// query behind the cached sample restarts the walk from the start line.
#[derive(Debug)]
pub struct RouteIndexer<'a> {
    route: &'a RouteTable,
    floor: usize,
}

impl<'a> RouteIndexer<'a> {
    pub fn new(route: &'a RouteTable) -> Self {
        Self { route, floor: 0 }
    }

    /// Index of the route sample whose path distance is closest to
    /// `distance_m`. Ties resolve to the lower index.
    ///
    /// Queries in non-decreasing order are amortised O(1); a smaller
    /// distance than the previous query costs a fresh walk.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfRange`] when `distance_m` lies past the last
    /// sample, i.e. the car has crossed the finish line at `tick`.
    pub fn locate(&mut self, tick: usize, distance_m: f64) -> SimResult<usize> {
        let points = self.route.points();
        let route_length_m = self.route.max_path_distance_m();
        if distance_m > route_length_m {
            return Err(SimError::OutOfRange {
                tick,
                distance_m,
                route_length_m,
            });
        }

        if distance_m < points[self.floor].path_distance_m {
            self.floor = 0;
        }
        while self.floor + 1 < points.len() && points[self.floor + 1].path_distance_m <= distance_m {
            self.floor += 1;
        }

        let lo = self.floor;
        let Some(next) = points.get(lo + 1) else {
            return Ok(lo);
        };
        let gap_lo = (distance_m - points[lo].path_distance_m).abs();
        let gap_hi = next.path_distance_m - distance_m;
        Ok(if gap_hi < gap_lo { lo + 1 } else { lo })
    }
}

/// Resolves the nearest route sample for every tick.
///
/// # Errors
///
/// Stops at the first tick past the end of the route with
/// [`SimError::OutOfRange`].
pub fn closest_gis_indices(distances_m: &[f64], route: &RouteTable) -> SimResult<Vec<usize>> {
    let mut indexer = RouteIndexer::new(route);
    distances_m
        .iter()
        .enumerate()
        .map(|(tick, &d)| indexer.locate(tick, d))
        .collect()
}

/// Index of the forecast record for a tick at `timestamp` located at `coord`.
///
/// Narrows to the frame whose validity window covers `timestamp` (or the
/// nearest frame in time when none does), then takes the spatially nearest
/// record in that frame. Ties resolve to the lower index.
pub fn closest_weather_index(weather: &WeatherTable, timestamp: i64, coord: GeoPoint) -> usize {
    let frame = weather
        .covering_frame(timestamp)
        .unwrap_or_else(|| weather.nearest_frame(timestamp));

    let records = weather.records();
    let mut best = frame.start;
    let mut best_d = f64::INFINITY;
    for idx in frame {
        let d = coord.distance_m(records[idx].location);
        if d < best_d {
            best = idx;
            best_d = d;
        }
    }
    best
}

/// Resolves the forecast record for every tick. Not monotonic in general.
pub fn closest_weather_indices(
    weather: &WeatherTable,
    timestamps: &[i64],
    coords: &[GeoPoint],
) -> Vec<usize> {
    timestamps
        .iter()
        .zip(coords)
        .map(|(&ts, &coord)| closest_weather_index(weather, ts, coord))
        .collect()
}
