//! Route geometry table: ordered samples along the race path.

use serde::Deserialize;

use crate::error::{SimError, SimResult};

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// Point reached by travelling `distance_m` from `self` along `bearing_deg`.
    pub fn destination(self, bearing_deg: f64, distance_m: f64) -> GeoPoint {
        const R: f64 = 6_371_000.0;

        let delta = distance_m / R;
        let theta = bearing_deg.to_radians();
        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();

        let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
        let lon2 = lon1
            + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

        GeoPoint::new(lat2.to_degrees(), lon2.to_degrees())
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// One sample of the route geometry.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RoutePoint {
    /// Location of the sample.
    pub coord: GeoPoint,
    /// Distance along the path from the start line (m).
    pub path_distance_m: f64,
    /// Elevation above sea level (m).
    pub elevation_m: f64,
    /// Direction of travel, clockwise from north (deg).
    pub bearing_deg: f64,
}

/// Route samples ordered by strictly increasing path distance.
///
/// Read-only once built; the engine only ever indexes into it.
#[derive(Clone, Debug)]
pub struct RouteTable {
    points: Vec<RoutePoint>,
}

impl RouteTable {
    /// Validates and wraps route samples.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] when the table is empty, a value
    /// is not finite, or path distances are not strictly increasing.
    pub fn new(points: Vec<RoutePoint>) -> SimResult<Self> {
        if points.is_empty() {
            return Err(SimError::Configuration("route table is empty".into()));
        }

        for (i, p) in points.iter().enumerate() {
            let values = [
                p.coord.lat,
                p.coord.lon,
                p.path_distance_m,
                p.elevation_m,
                p.bearing_deg,
            ];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(SimError::Configuration(format!(
                    "route sample {i} contains a non-finite value"
                )));
            }
        }

        if let Some(i) = points
            .windows(2)
            .position(|w| w[1].path_distance_m <= w[0].path_distance_m)
        {
            return Err(SimError::Configuration(format!(
                "route path distance must be strictly increasing (samples {i} and {})",
                i + 1
            )));
        }

        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    pub fn get(&self, idx: usize) -> Option<&RoutePoint> {
        self.points.get(idx)
    }

    /// Path distance of the last sample, i.e. the finish line (m).
    pub fn max_path_distance_m(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.path_distance_m)
    }

    /// Path distances of every sample, in order.
    pub fn path_distances(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.path_distance_m)
    }

    /// Index of the first sample of the segment containing `distance_m`.
    ///
    /// Distances outside the route snap to the first or last segment.
    fn segment_at(&self, distance_m: f64) -> usize {
        let last = self.points.len().saturating_sub(2);
        self.points
            .partition_point(|p| p.path_distance_m <= distance_m)
            .saturating_sub(1)
            .min(last)
    }

    /// Elevation at `distance_m`, linearly interpolated between the
    /// bracketing samples and held constant beyond either end (m).
    pub fn elevation_at(&self, distance_m: f64) -> f64 {
        let k = self.segment_at(distance_m);
        let a = self.points[k];
        let Some(b) = self.points.get(k + 1) else {
            return a.elevation_m;
        };
        let t = ((distance_m - a.path_distance_m) / (b.path_distance_m - a.path_distance_m))
            .clamp(0.0, 1.0);
        a.elevation_m + t * (b.elevation_m - a.elevation_m)
    }

    /// Rise over run of the segment containing `distance_m`.
    pub fn slope_at(&self, distance_m: f64) -> f64 {
        let k = self.segment_at(distance_m);
        match (self.points.get(k), self.points.get(k + 1)) {
            (Some(a), Some(b)) => {
                (b.elevation_m - a.elevation_m) / (b.path_distance_m - a.path_distance_m)
            }
            _ => 0.0,
        }
    }

    /// Mean gradient between two path distances.
    ///
    /// Falls back to [`RouteTable::slope_at`] when the span is empty.
    pub fn gradient_between(&self, from_m: f64, to_m: f64) -> f64 {
        let run = to_m - from_m;
        if run > 0.0 {
            (self.elevation_at(to_m) - self.elevation_at(from_m)) / run
        } else {
            self.slope_at(to_m)
        }
    }
}
