//! Race environment: route geometry, weather forecast, and the lookups that
//! tie ticks to both.

pub mod indexer;
pub mod route;
pub mod solar;
/// Seeded synthetic route and forecast generator.
pub mod synthetic;
pub mod weather;

pub use route::{GeoPoint, RoutePoint, RouteTable};
pub use weather::{WeatherRecord, WeatherTable};
