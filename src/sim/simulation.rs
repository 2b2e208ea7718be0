//! Public facade over the race engine.

use std::sync::Arc;

use crate::config::{RaceConfig, ReturnType};
use crate::env::route::RouteTable;
use crate::env::weather::WeatherTable;
use crate::error::{SimError, SimResult};

use super::model::{Model, ModelState};
use super::results::{ResultKey, ResultValue, RunResults};
use super::summary::RaceSummary;

/// What [`Simulation::run_model`] reports, according to the configured
/// [`ReturnType`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunReturn {
    /// Seconds driven before the finish line or the end of the race day.
    pub time_taken_s: Option<f64>,
    /// Kilometres covered.
    pub distance_travelled_km: Option<f64>,
}

/// A configured race: environment, vehicle, and the results of the last run.
///
/// Built only through [`super::SimulationBuilder`]. Every call to
/// [`Simulation::run_model`] runs a fresh engine, so a simulation can be
/// re-used across speed profiles; result accessors always describe the most
/// recent run.
#[derive(Debug)]
pub struct Simulation {
    config: RaceConfig,
    route: Arc<RouteTable>,
    weather: Arc<WeatherTable>,
    model: Option<Model>,
}

impl Simulation {
    pub(crate) fn new(config: RaceConfig, route: Arc<RouteTable>, weather: Arc<WeatherTable>) -> Self {
        Self {
            config,
            route,
            weather,
            model: None,
        }
    }

    /// Simulates the race for `speeds_kmh`, one entry per driving time division.
    ///
    /// # Errors
    ///
    /// Propagates configuration and physical-input errors from the engine;
    /// results from a previous run are discarded either way.
    pub fn run_model(&mut self, speeds_kmh: &[f64]) -> SimResult<RunReturn> {
        let mut model = Model::new(&self.config, Arc::clone(&self.route), Arc::clone(&self.weather));
        let outcome = model.run_simulation_calculations(speeds_kmh);
        self.model = Some(model);
        outcome?;

        let r = self.results()?;
        let (time, distance) = match self.config.race.return_type {
            ReturnType::TimeTaken => (Some(r.time_taken_s), None),
            ReturnType::DistanceTravelled => (None, Some(r.distance_travelled_km)),
            ReturnType::DistanceAndTime => (Some(r.time_taken_s), Some(r.distance_travelled_km)),
            ReturnType::Void => (None, None),
        };
        Ok(RunReturn {
            time_taken_s: time,
            distance_travelled_km: distance,
        })
    }

    /// Results of the last run.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Precondition`] if no run has completed.
    pub fn results(&self) -> SimResult<&RunResults> {
        match &self.model {
            Some(model) => model.results(),
            None => Err(SimError::Precondition("run_model has not been called".into())),
        }
    }

    /// One result by key.
    pub fn get_result(&self, key: ResultKey) -> SimResult<ResultValue<'_>> {
        Ok(self.results()?.get(key))
    }

    /// Several results, in the order requested.
    pub fn get_results(&self, keys: &[ResultKey]) -> SimResult<Vec<ResultValue<'_>>> {
        let results = self.results()?;
        Ok(keys.iter().map(|&k| results.get(k)).collect())
    }

    /// Results by name, in the order requested. `"default"` expands in place
    /// to [`ResultKey::DEFAULT`].
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownKey`] for an unrecognised name, before
    /// checking whether a run has completed.
    pub fn get_results_by_name(&self, names: &[&str]) -> SimResult<Vec<ResultValue<'_>>> {
        let mut keys = Vec::with_capacity(names.len());
        for name in names {
            if *name == "default" {
                keys.extend(ResultKey::DEFAULT);
            } else {
                keys.push(name.parse::<ResultKey>()?);
            }
        }
        self.get_results(&keys)
    }

    /// Whether the battery lasted the whole simulated range.
    pub fn was_successful(&self) -> SimResult<bool> {
        Ok(self.results()?.was_successful)
    }

    /// Kilometres covered up to and including the tick the battery ran out.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Precondition`] when the battery never ran out;
    /// check [`Self::was_successful`] first.
    pub fn get_distance_before_exhaustion(&self) -> SimResult<f64> {
        let results = self.results()?;
        match results.exhaustion_tick {
            Some(tick) => Ok(results.distances[tick] / 1000.0),
            None => Err(SimError::Precondition(
                "the battery was never exhausted; distance before exhaustion is undefined".into(),
            )),
        }
    }

    /// Ticks in a full race day; the required speed-profile length.
    pub fn get_driving_time_divisions(&self) -> usize {
        self.config.driving_time_divisions()
    }

    /// Duration of one tick (s).
    pub fn tick_seconds(&self) -> f64 {
        self.config.tick_seconds()
    }

    /// Whether the last run ended by crossing the finish line.
    pub fn reached_finish(&self) -> bool {
        matches!(
            self.model.as_ref().map(Model::state),
            Some(ModelState::Completed { reached_finish: true })
        )
    }

    /// Post-hoc summary of the last run.
    pub fn summary(&self) -> SimResult<RaceSummary> {
        Ok(RaceSummary::from_results(self.results()?, self.config.battery.initial_soc))
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn route(&self) -> &RouteTable {
        &self.route
    }

    pub fn weather(&self) -> &WeatherTable {
        &self.weather
    }
}
