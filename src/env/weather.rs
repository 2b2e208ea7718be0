//! Weather and irradiance forecast table keyed by timestamp and location.

use crate::env::route::GeoPoint;
use crate::error::{SimError, SimResult};

/// Forecast resolution assumed when the table holds a single timestamp (s).
const DEFAULT_RESOLUTION_S: i64 = 3600;

/// One forecast sample for one location cell at one timestamp.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WeatherRecord {
    /// UNIX time the forecast applies from (s).
    pub timestamp: i64,
    /// Centre of the forecast cell.
    pub location: GeoPoint,
    /// Global horizontal irradiance (W/m²).
    pub irradiance_w_m2: f64,
    /// Wind speed (m/s).
    pub wind_speed_m_s: f64,
    /// Direction the wind blows from, clockwise from north (deg).
    pub wind_direction_deg: f64,
    /// Cloud cover fraction (0.0–1.0).
    pub cloud_cover: f64,
}

/// All records sharing one timestamp, as a range into the sorted record list.
#[derive(Copy, Clone, Debug)]
struct Frame {
    timestamp: i64,
    start: usize,
    end: usize,
}

/// Forecast records grouped into timestamp frames.
///
/// Records are stored sorted by timestamp (stable, so input order is kept
/// within a frame); indices handed out by the indexer refer to this order.
#[derive(Clone, Debug)]
pub struct WeatherTable {
    records: Vec<WeatherRecord>,
    frames: Vec<Frame>,
    resolution_s: i64,
}

impl WeatherTable {
    /// Sorts, groups, and validates forecast records.
    ///
    /// Physical fields (irradiance, wind, cloud) are not checked here; a bad
    /// value is only an error if a tick actually reads it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] when the table is empty or a
    /// record's location is not finite.
    pub fn new(mut records: Vec<WeatherRecord>) -> SimResult<Self> {
        if records.is_empty() {
            return Err(SimError::Configuration("weather table is empty".into()));
        }
        if let Some(i) = records
            .iter()
            .position(|r| !(r.location.lat.is_finite() && r.location.lon.is_finite()))
        {
            return Err(SimError::Configuration(format!(
                "weather record {i} has a non-finite location"
            )));
        }

        records.sort_by_key(|r| r.timestamp);

        let mut frames: Vec<Frame> = Vec::new();
        for (i, r) in records.iter().enumerate() {
            match frames.last_mut() {
                Some(f) if f.timestamp == r.timestamp => f.end = i + 1,
                _ => frames.push(Frame {
                    timestamp: r.timestamp,
                    start: i,
                    end: i + 1,
                }),
            }
        }

        let resolution_s = frames
            .windows(2)
            .map(|w| w[1].timestamp - w[0].timestamp)
            .min()
            .unwrap_or(DEFAULT_RESOLUTION_S);

        Ok(Self {
            records,
            frames,
            resolution_s,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[WeatherRecord] {
        &self.records
    }

    pub fn get(&self, idx: usize) -> Option<&WeatherRecord> {
        self.records.get(idx)
    }

    /// Interval between consecutive forecast timestamps (s).
    pub fn resolution_s(&self) -> i64 {
        self.resolution_s
    }

    /// Number of distinct forecast timestamps.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Records of the frame whose validity window `[ts, ts + resolution)`
    /// contains `timestamp`, as a range into [`Self::records`].
    pub fn covering_frame(&self, timestamp: i64) -> Option<std::ops::Range<usize>> {
        let after = self.frames.partition_point(|f| f.timestamp <= timestamp);
        let frame = self.frames.get(after.checked_sub(1)?)?;
        (timestamp - frame.timestamp < self.resolution_s).then_some(frame.start..frame.end)
    }

    /// Records of the frame closest in time to `timestamp`; ties go to the
    /// earlier frame.
    pub fn nearest_frame(&self, timestamp: i64) -> std::ops::Range<usize> {
        let after = self.frames.partition_point(|f| f.timestamp <= timestamp);
        let idx = match (after.checked_sub(1), self.frames.get(after)) {
            (Some(before), Some(next)) => {
                let gap_before = timestamp - self.frames[before].timestamp;
                let gap_after = next.timestamp - timestamp;
                if gap_after < gap_before { after } else { before }
            }
            (Some(before), None) => before,
            (None, _) => 0,
        };
        let frame = self.frames[idx];
        frame.start..frame.end
    }
}
