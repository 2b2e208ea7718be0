//! Tick-indexed race engine: motion, environment lookup, subsystem energy,
//! and state-of-charge integration.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::car::battery::clip_soc;
use crate::car::{Battery, EnergyModel, Subsystems, TickInputs};
use crate::config::RaceConfig;
use crate::env::indexer::{RouteIndexer, closest_weather_index};
use crate::env::route::{RoutePoint, RouteTable};
use crate::env::weather::WeatherTable;
use crate::error::{SimError, SimResult, non_negative};

use super::clock::Clock;
use super::results::RunResults;

/// Lifecycle of a [`Model`]. A model runs at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Uninitialized,
    Running,
    /// Every tick was processed, or the car crossed the finish line early.
    Completed { reached_finish: bool },
    /// A configuration or physical-input error stopped the run.
    Aborted,
}

/// Everything the per-tick stage resolves for one tick before integration.
#[derive(Debug, Clone, Copy)]
struct TickSample {
    weather_idx: usize,
    point: RoutePoint,
    inputs: TickInputs,
    motor_j: f64,
    array_j: f64,
    lvs_j: f64,
    regen_j: f64,
}

/// The simulation engine. Owned by [`super::Simulation`]; never handed out.
///
/// A run is staged as independent array transforms feeding one sequential
/// scan:
/// 1. cumulative distance from the speed profile,
/// 2. route lookup, which also detects the finish line,
/// 3. weather lookup and subsystem energies per tick (parallel with the
///    `parallel` feature),
/// 4. state-of-charge integration, strictly in tick order.
#[derive(Debug)]
pub(crate) struct Model {
    config: RaceConfig,
    route: Arc<RouteTable>,
    weather: Arc<WeatherTable>,
    subsystems: Subsystems,
    state: ModelState,
    results: Option<RunResults>,
}

impl Model {
    pub(crate) fn new(config: &RaceConfig, route: Arc<RouteTable>, weather: Arc<WeatherTable>) -> Self {
        Self {
            config: config.clone(),
            route,
            weather,
            subsystems: Subsystems::from_config(config),
            state: ModelState::Uninitialized,
            results: None,
        }
    }

    pub(crate) fn state(&self) -> ModelState {
        self.state
    }

    /// Runs the race for a speed profile (km/h, one entry per tick).
    ///
    /// # Errors
    ///
    /// * [`SimError::AlreadyRun`] on a second call.
    /// * [`SimError::Configuration`] when the profile length is not the
    ///   number of driving time divisions.
    /// * [`SimError::InvalidPhysicalInput`] for a negative or NaN speed, or
    ///   a NaN / out-of-domain environment value read by a subsystem.
    pub(crate) fn run_simulation_calculations(&mut self, speeds_kmh: &[f64]) -> SimResult<()> {
        if self.state != ModelState::Uninitialized {
            return Err(SimError::AlreadyRun);
        }
        self.state = ModelState::Running;

        match self.calculate(speeds_kmh) {
            Ok(results) => {
                self.state = ModelState::Completed {
                    reached_finish: results.reached_finish,
                };
                self.results = Some(results);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "simulation aborted");
                self.state = ModelState::Aborted;
                Err(e)
            }
        }
    }

    /// Results of a completed run.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Precondition`] before a run or after an aborted one.
    pub(crate) fn results(&self) -> SimResult<&RunResults> {
        match (&self.state, &self.results) {
            (ModelState::Completed { .. }, Some(results)) => Ok(results),
            (ModelState::Aborted, _) => Err(SimError::Precondition(
                "the last run aborted; no results are available".into(),
            )),
            _ => Err(SimError::Precondition("the model has not been run".into())),
        }
    }

    fn calculate(&self, speeds_kmh: &[f64]) -> SimResult<RunResults> {
        let total = self.config.driving_time_divisions();
        let dt = self.config.tick_seconds();
        let start_time = self.config.race.start_time;

        if speeds_kmh.len() != total {
            return Err(SimError::Configuration(format!(
                "speed profile has improper length {} (expected {total} driving time divisions)",
                speeds_kmh.len()
            )));
        }
        for (tick, &speed) in speeds_kmh.iter().enumerate() {
            non_negative("speed", speed).map_err(|e| e.at_tick(tick))?;
        }

        info!(ticks = total, dt_s = dt, "starting simulation");

        // Stage 1: motion.
        let speed_ms: Vec<f64> = speeds_kmh.iter().map(|v| v / 3.6).collect();
        let tick_distances: Vec<f64> = speed_ms.iter().map(|v| v * dt).collect();
        let distances: Vec<f64> = tick_distances
            .iter()
            .scan(0.0, |acc, d| {
                *acc += d;
                Some(*acc)
            })
            .collect();

        // Stage 2: route lookup; running off the end of the route is the finish line.
        let mut indexer = RouteIndexer::new(&self.route);
        let mut gis = Vec::with_capacity(total);
        let mut reached_finish = false;
        for (tick, &d) in distances.iter().enumerate() {
            match indexer.locate(tick, d) {
                Ok(idx) => gis.push(idx),
                Err(e) if !e.is_fatal() => {
                    info!(tick, "{e}; truncating at the finish line");
                    reached_finish = true;
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        let n = gis.len();
        let clock = Clock::new(n, dt, start_time);

        // Stage 3: environment and subsystem energies, independent per tick.
        let points = self.route.points();
        let sample = |i: usize| -> SimResult<TickSample> {
            let point = points[gis[i]];
            // Mean grade over the stretch covered this tick, independent of sample spacing.
            let gradient = self
                .route
                .gradient_between(distances[i] - tick_distances[i], distances[i]);

            let weather_idx = closest_weather_index(&self.weather, clock.timestamp(i), point.coord);
            let record = self.weather.records()[weather_idx];

            let inputs = TickInputs {
                dt_s: dt,
                speed_ms: speed_ms[i],
                prev_speed_ms: if i == 0 { 0.0 } else { speed_ms[i - 1] },
                gradient,
                bearing_deg: point.bearing_deg,
                irradiance_w_m2: record.irradiance_w_m2,
                wind_speed_m_s: record.wind_speed_m_s,
                wind_direction_deg: record.wind_direction_deg,
                cloud_cover: record.cloud_cover,
            };
            let energy = |model: &dyn EnergyModel| {
                model.energy_j(&inputs).map_err(|e| {
                    debug!(tick = i, subsystem = model.subsystem(), "rejected tick input");
                    e.at_tick(i)
                })
            };

            Ok(TickSample {
                weather_idx,
                point,
                inputs,
                motor_j: energy(&self.subsystems.motor)?,
                array_j: energy(&self.subsystems.array)?,
                lvs_j: energy(&self.subsystems.lvs)?,
                regen_j: energy(&self.subsystems.regen)?,
            })
        };

        #[cfg(not(feature = "parallel"))]
        let samples: Vec<SimResult<TickSample>> = (0..n).map(sample).collect();

        #[cfg(feature = "parallel")]
        let samples: Vec<SimResult<TickSample>> = {
            use rayon::prelude::*;
            (0..n).into_par_iter().map(sample).collect()
        };

        // Collected in tick order, so the first error reported is the earliest tick's.
        let samples = samples.into_iter().collect::<SimResult<Vec<_>>>()?;

        // Stage 4: sequential state-of-charge scan.
        let mut results = RunResults {
            tick_array: (0..n).collect(),
            timestamps: (0..n).map(|i| clock.timestamp(i)).collect(),
            speed_kmh: speeds_kmh[..n].to_vec(),
            speed_ms: speed_ms[..n].to_vec(),
            tick_distances: tick_distances[..n].to_vec(),
            distances: distances[..n].to_vec(),
            closest_gis_indices: gis,
            route_length_km: self.route.max_path_distance_m() / 1000.0,
            reached_finish,
            ..RunResults::default()
        };
        for s in &samples {
            results.closest_weather_indices.push(s.weather_idx);
            results.path_distances.push(s.point.path_distance_m);
            results.gis_route_elevations_at_each_tick.push(s.point.elevation_m);
            results.gis_vehicle_bearings.push(s.point.bearing_deg);
            results.gradients.push(s.inputs.gradient);
            results.solar_irradiances.push(s.inputs.irradiance_w_m2);
            results.wind_speeds.push(s.inputs.headwind_m_s());
            results.absolute_wind_speeds.push(s.inputs.wind_speed_m_s);
            results.wind_directions.push(s.inputs.wind_direction_deg);
            results.cloud_covers.push(s.inputs.cloud_cover);
            results.motor_consumed_energy.push(s.motor_j);
            results.array_produced_energy.push(s.array_j);
            results.lvs_consumed_energy.push(s.lvs_j);
            results.regen_produced_energy.push(s.regen_j);
            results.consumed_energy.push(s.motor_j + s.lvs_j);
            results.produced_energy.push(s.array_j + s.regen_j);
            results.delta_energy.push(s.array_j + s.regen_j + s.motor_j + s.lvs_j);
            results.not_charge.push(s.array_j <= 0.0);
        }

        let mut battery = Battery::from_config(&self.config.battery);
        let mut exhaustion_tick = None;
        let mut scan = clock.clone();
        scan.run(|i| {
            let raw = battery.integrate(results.delta_energy[i]);
            let soc = clip_soc(raw);
            if soc <= 0.0 && exhaustion_tick.is_none() {
                exhaustion_tick = Some(i);
            }
            results.raw_soc.push(raw);
            results.state_of_charge.push(soc);
            results.battery_voltage.push(battery.voltage_at(soc));
            results.stored_energy.push(battery.stored_energy_at(soc));
        });

        results.exhaustion_tick = exhaustion_tick;
        results.was_successful = exhaustion_tick.is_none();
        results.distance_travelled_km = results.distances.last().copied().unwrap_or(0.0) / 1000.0;
        results.time_taken_s = clock.elapsed_s(n);
        results.final_soc = results.state_of_charge.last().copied().unwrap_or_else(|| battery.soc());

        if let Some(tick) = exhaustion_tick {
            warn!(tick, "battery exhausted");
        }
        debug!(
            ticks = n,
            distance_km = results.distance_travelled_km,
            final_soc = results.final_soc,
            "simulation completed"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::route::GeoPoint;
    use crate::env::weather::WeatherRecord;

    /// Ten one-hour ticks over a flat, straight 100 km route.
    fn config() -> RaceConfig {
        let mut cfg = RaceConfig::fsgp();
        cfg.race.granularity = 1.0;
        cfg.race.duration_hours = 10.0;
        cfg
    }

    fn route(length_m: f64, elevation: impl Fn(f64) -> f64) -> Arc<RouteTable> {
        sampled_route(length_m, 100, elevation)
    }

    fn sampled_route(length_m: f64, samples: u32, elevation: impl Fn(f64) -> f64) -> Arc<RouteTable> {
        let points = (0..=samples)
            .map(|i| {
                let d = length_m * f64::from(i) / f64::from(samples);
                RoutePoint {
                    coord: GeoPoint::new(0.0, d / 111_195.0),
                    path_distance_m: d,
                    elevation_m: elevation(d),
                    bearing_deg: 90.0,
                }
            })
            .collect();
        match RouteTable::new(points) {
            Ok(r) => Arc::new(r),
            Err(e) => panic!("fixture route invalid: {e}"),
        }
    }

    fn weather(irradiance_w_m2: f64) -> Arc<WeatherTable> {
        let record = WeatherRecord {
            timestamp: RaceConfig::fsgp().race.start_time,
            location: GeoPoint::new(0.0, 0.0),
            irradiance_w_m2,
            wind_speed_m_s: 0.0,
            wind_direction_deg: 0.0,
            cloud_cover: 0.0,
        };
        match WeatherTable::new(vec![record]) {
            Ok(w) => Arc::new(w),
            Err(e) => panic!("fixture weather invalid: {e}"),
        }
    }

    fn model(irradiance_w_m2: f64) -> Model {
        Model::new(&config(), route(100_000.0, |_| 0.0), weather(irradiance_w_m2))
    }

    #[test]
    fn second_run_is_rejected() {
        let mut m = model(0.0);
        m.run_simulation_calculations(&[0.0; 10]).expect("first run should succeed");
        let again = m.run_simulation_calculations(&[0.0; 10]);
        assert!(matches!(again, Err(SimError::AlreadyRun)));
        assert_eq!(m.state(), ModelState::Completed { reached_finish: false });
    }

    #[test]
    fn wrong_profile_length_aborts() {
        let mut m = model(0.0);
        let err = m.run_simulation_calculations(&[0.0; 9]);
        assert!(matches!(err, Err(SimError::Configuration(ref msg)) if msg.contains("improper length")));
        assert_eq!(m.state(), ModelState::Aborted);
        assert!(matches!(m.results(), Err(SimError::Precondition(_))));
    }

    #[test]
    fn negative_speed_reports_tick() {
        let mut m = model(0.0);
        let mut speeds = [10.0; 10];
        speeds[4] = -1.0;
        match m.run_simulation_calculations(&speeds) {
            Err(SimError::InvalidPhysicalInput { tick, quantity, value }) => {
                assert_eq!((tick, quantity, value), (4, "speed", -1.0));
            }
            other => panic!("expected InvalidPhysicalInput, got {other:?}"),
        }
    }

    #[test]
    fn nan_irradiance_aborts_instead_of_integrating() {
        let mut m = model(f64::NAN);
        let err = m.run_simulation_calculations(&[0.0; 10]);
        assert!(matches!(
            err,
            Err(SimError::InvalidPhysicalInput { tick: 0, quantity: "irradiance", .. })
        ));
        assert_eq!(m.state(), ModelState::Aborted);
    }

    #[test]
    fn results_unavailable_before_run() {
        assert!(matches!(model(0.0).results(), Err(SimError::Precondition(_))));
    }

    #[test]
    fn cumulative_distance_sums_tick_distances() {
        let mut m = model(0.0);
        let speeds = [0.0, 3.6, 7.2, 0.0, 1.8, 0.0, 0.0, 3.6, 3.6, 0.0];
        m.run_simulation_calculations(&speeds).expect("run should succeed");
        let r = m.results().expect("results after run");
        assert_eq!(r.distances.len(), 10);
        assert!(r.distances.windows(2).all(|w| w[0] <= w[1]));
        let total: f64 = speeds.iter().map(|v| v / 3.6 * 3600.0).sum();
        assert!((r.distances[9] - total).abs() < 1e-6);
    }

    #[test]
    fn finish_line_truncates_arrays() {
        // 40 km/h for one-hour ticks on a 100 km route: over the line at tick 2
        let mut m = model(0.0);
        m.run_simulation_calculations(&[40.0; 10]).expect("run should succeed");
        assert_eq!(m.state(), ModelState::Completed { reached_finish: true });
        let r = m.results().expect("results after run");
        assert_eq!(r.len(), 2);
        assert_eq!(r.raw_soc.len(), 2);
        assert_eq!(r.time_taken_s, 7200.0);
        assert!((r.distance_travelled_km - 80.0).abs() < 1e-9);
    }

    #[test]
    fn soc_is_clipped_raw_soc_continues() {
        let mut cfg = config();
        cfg.battery.capacity_wh = 100.0;
        let mut m = Model::new(&cfg, route(100_000.0, |_| 0.0), weather(0.0));
        m.run_simulation_calculations(&[0.0; 10]).expect("run should succeed");
        let r = m.results().expect("results after run");
        // LVS alone draws 25.5 Wh per tick
        assert_eq!(r.exhaustion_tick, Some(3));
        assert!(!r.was_successful);
        assert_eq!(r.raw_soc.len(), 10);
        assert!(r.raw_soc[9] < r.raw_soc[3]);
        for (raw, soc) in r.raw_soc.iter().zip(&r.state_of_charge) {
            assert_eq!(*soc, raw.clamp(0.0, 1.0));
        }
    }

    #[test]
    fn climbing_costs_more_than_flat() {
        let mut flat = model(0.0);
        flat.run_simulation_calculations(&[5.0; 10]).expect("run should succeed");
        let flat = flat.results().expect("results after run").final_soc;

        let mut hill = Model::new(&config(), route(100_000.0, |d| d * 0.01), weather(0.0));
        hill.run_simulation_calculations(&[5.0; 10]).expect("run should succeed");
        let r = hill.results().expect("results after run");
        assert!(r.gradients.iter().all(|g| (g - 0.01).abs() < 1e-9), "{:?}", r.gradients);
        assert!(r.final_soc < flat);
    }

    #[test]
    fn gradient_does_not_depend_on_route_sampling() {
        // 1 s ticks at 3.6 km/h climb 900 m of a 1 km, 10% grade.
        let mut cfg = config();
        cfg.race.granularity = 3600.0;
        cfg.race.duration_hours = 0.25;
        let climb = |samples: u32| {
            let mut m = Model::new(
                &cfg,
                sampled_route(1_000.0, samples, |d| 200.0 + 0.1 * d),
                weather(0.0),
            );
            m.run_simulation_calculations(&[3.6; 900]).expect("run should succeed");
            m.results().expect("results after run").clone()
        };

        let dense = climb(1_000);
        let coarse = climb(10);
        assert_eq!(dense.len(), 900);
        assert_eq!(coarse.len(), 900);
        for r in [&dense, &coarse] {
            let worst = r.gradients.iter().map(|g| (g - 0.1).abs()).fold(0.0, f64::max);
            assert!(worst < 1e-9, "gradient strays {worst} from the route grade");
        }

        let motor = |r: &RunResults| r.motor_consumed_energy.iter().sum::<f64>();
        let (a, b) = (motor(&dense), motor(&coarse));
        assert!(a < 0.0);
        assert!((a - b).abs() < 1e-6 * a.abs(), "dense {a} J vs coarse {b} J");
    }

    #[test]
    fn parked_car_takes_the_grade_under_it() {
        let mut m = Model::new(&config(), route(100_000.0, |d| 0.02 * d), weather(0.0));
        m.run_simulation_calculations(&[0.0; 10]).expect("run should succeed");
        let r = m.results().expect("results after run");
        assert!(r.gradients.iter().all(|g| (g - 0.02).abs() < 1e-12));
        assert!(r.motor_consumed_energy.iter().all(|&e| e == 0.0));
    }
}
