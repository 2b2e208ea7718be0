//! Clear-sky irradiance from solar geometry.
//!
//! The sun's position follows from latitude, longitude, the local UTC offset
//! and the day of the year. Direct normal irradiance uses the Meinel
//! air-mass attenuation with an altitude correction, and diffuse irradiance
//! is taken as a tenth of the direct beam.

use crate::env::route::GeoPoint;

/// Fraction of the beam transmitted through one air mass.
const ATMOSPHERIC_TRANSMITTANCE: f64 = 0.7;
/// Direct-beam gain per kilometre of site altitude.
const ALTITUDE_GAIN_PER_KM: f64 = 0.14;
/// Diffuse horizontal irradiance as a fraction of the direct beam.
const DIFFUSE_FRACTION: f64 = 0.1;

/// Sun position seen from one place at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPosition {
    /// Day of the local calendar year, 1 on January 1.
    pub day_of_year: u32,
    /// Sun declination (deg), positive in the northern summer.
    pub declination_deg: f64,
    /// Hour angle (deg): negative in the morning, 0 at solar noon.
    pub hour_angle_deg: f64,
    /// Angle of the sun above the horizon (deg).
    pub elevation_deg: f64,
}

impl SolarPosition {
    /// Computes the sun position at `unix_s` for `location`, whose civil
    /// clock runs `utc_offset_hours` ahead of UTC.
    pub fn at(unix_s: i64, utc_offset_hours: f64, location: GeoPoint) -> Self {
        let local_s = unix_s as f64 + utc_offset_hours * 3600.0;
        let days = (local_s / 86_400.0).floor();
        let local_hour = (local_s - days * 86_400.0) / 3600.0;
        let day_of_year = day_of_year(days as i64);
        let doy = f64::from(day_of_year);

        let declination_deg = 23.45 * (360.0 / 365.0 * (284.0 + doy)).to_radians().sin();

        // Equation of time (min), then the shift from clock time to solar time.
        let b = (360.0 / 365.0 * (doy - 81.0)).to_radians();
        let eot_min = 9.87 * (2.0 * b).sin() - 7.53 * b.cos() - 1.5 * b.sin();
        let meridian_deg = 15.0 * utc_offset_hours;
        let correction_min = 4.0 * (location.lon - meridian_deg) + eot_min;
        let solar_hour = local_hour + correction_min / 60.0;
        let hour_angle_deg = 15.0 * (solar_hour - 12.0);

        let (lat, dec, ha) = (
            location.lat.to_radians(),
            declination_deg.to_radians(),
            hour_angle_deg.to_radians(),
        );
        let sin_elevation = lat.sin() * dec.sin() + lat.cos() * dec.cos() * ha.cos();
        let elevation_deg = sin_elevation.clamp(-1.0, 1.0).asin().to_degrees();

        Self {
            day_of_year,
            declination_deg,
            hour_angle_deg,
            elevation_deg,
        }
    }

    pub fn zenith_deg(&self) -> f64 {
        90.0 - self.elevation_deg
    }
}

/// Clear-sky global horizontal irradiance (W/m²) at `unix_s` for a site at
/// `location` and `altitude_m` above sea level.
///
/// Zero while the sun is below the horizon.
pub fn clear_sky_ghi(
    solar_constant_w_m2: f64,
    unix_s: i64,
    utc_offset_hours: f64,
    location: GeoPoint,
    altitude_m: f64,
) -> f64 {
    let zenith = SolarPosition::at(unix_s, utc_offset_hours, location).zenith_deg();
    if zenith >= 90.0 {
        return 0.0;
    }

    let cos_zenith = zenith.to_radians().cos();
    // Kasten-Young air mass stays finite down to the horizon.
    let air_mass = 1.0 / (cos_zenith + 0.50572 * (96.07995 - zenith).powf(-1.6364));
    let h_km = altitude_m.max(0.0) / 1000.0;
    let dni = solar_constant_w_m2
        * ((1.0 - ALTITUDE_GAIN_PER_KM * h_km)
            * ATMOSPHERIC_TRANSMITTANCE.powf(air_mass.powf(0.678))
            + ALTITUDE_GAIN_PER_KM * h_km);
    let dhi = DIFFUSE_FRACTION * dni;
    dni * cos_zenith + dhi
}

/// Day of the year (1-366) for a count of days since 1970-01-01.
fn day_of_year(days_since_epoch: i64) -> u32 {
    // Count from 0000-03-01 so each leap day falls at the end of its year.
    let z = days_since_epoch + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let from_march = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let year = era * 400 + yoe;

    let doy = if from_march >= 306 {
        from_march - 306 + 1
    } else {
        let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
        from_march + if leap { 60 } else { 59 } + 1
    };
    doy as u32
}
