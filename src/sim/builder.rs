//! Fluent builder: the only way to construct a [`Simulation`].

use std::sync::Arc;

use tracing::info;

use crate::config::{ConfigError, RaceConfig, ReturnType};
use crate::env::route::RouteTable;
use crate::env::synthetic;
use crate::env::weather::WeatherTable;
use crate::error::SimResult;

use super::simulation::Simulation;

/// Fluent builder for [`Simulation`].
///
/// # Required inputs
///
/// - [`RaceConfig`]: race timing, vehicle parameters, synthetic environment
///
/// # Optional inputs
///
/// | Method              | Default                                        |
/// |---------------------|------------------------------------------------|
/// | `.route(r)`         | Synthetic route from `[environment]`           |
/// | `.weather(w)`       | Synthetic forecast along the route             |
/// | `.return_type(t)`   | `race.return_type` from the configuration      |
/// | `.granularity(g)`   | `race.granularity` from the configuration      |
///
/// # Example
///
/// ```
/// use solar_race_sim::config::RaceConfig;
/// use solar_race_sim::sim::SimulationBuilder;
///
/// let mut sim = SimulationBuilder::new(RaceConfig::fsgp()).build()?;
/// let speeds = vec![0.0; sim.get_driving_time_divisions()];
/// sim.run_model(&speeds)?;
/// assert!(sim.was_successful()?);
/// # Ok::<(), solar_race_sim::error::SimError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SimulationBuilder {
    config: RaceConfig,
    route: Option<RouteTable>,
    weather: Option<WeatherTable>,
}

impl SimulationBuilder {
    pub fn new(config: RaceConfig) -> Self {
        Self {
            config,
            route: None,
            weather: None,
        }
    }

    /// Supply the route geometry instead of generating one.
    pub fn route(mut self, route: RouteTable) -> Self {
        self.route = Some(route);
        self
    }

    /// Supply the forecast table instead of generating one along the route.
    pub fn weather(mut self, weather: WeatherTable) -> Self {
        self.weather = Some(weather);
        self
    }

    /// Override what [`Simulation::run_model`] reports.
    pub fn return_type(mut self, return_type: ReturnType) -> Self {
        self.config.race.return_type = return_type;
        self
    }

    /// Override the number of ticks per hour.
    pub fn granularity(mut self, granularity: f64) -> Self {
        self.config.race.granularity = granularity;
        self
    }

    /// Validates the configuration, resolves the environment, and returns a
    /// simulation ready to run.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SimError::Configuration`] listing every invalid
    /// field, or any error raised while generating the synthetic environment.
    pub fn build(self) -> SimResult<Simulation> {
        let errors = self.config.validate();
        if !errors.is_empty() {
            return Err(ConfigError::into_sim_error(&errors));
        }

        let route = match self.route {
            Some(route) => route,
            None => synthetic::generate_route(self.config.race.race_type, &self.config.environment)?,
        };
        let weather = match self.weather {
            Some(weather) => weather,
            None => {
                let first = self.config.race.start_time;
                let last = first + (self.config.race.duration_hours * 3600.0).ceil() as i64;
                synthetic::generate_weather(&self.config.environment, &route, first, last)?
            }
        };

        info!(
            race_type = ?self.config.race.race_type,
            route_samples = route.len(),
            route_km = route.max_path_distance_m() / 1000.0,
            weather_records = weather.len(),
            ticks = self.config.driving_time_divisions(),
            "simulation ready"
        );

        Ok(Simulation::new(self.config, Arc::new(route), Arc::new(weather)))
    }
}
