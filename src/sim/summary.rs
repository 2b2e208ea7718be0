//! Post-hoc race summary computed from a completed run.

use std::fmt;

use super::results::RunResults;

const J_PER_WH: f64 = 3600.0;

/// Aggregate figures derived from a complete run.
///
/// Computed from [`RunResults`] after the fact so the summary always agrees
/// with the per-tick arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceSummary {
    /// Ticks simulated (fewer than the race day when the finish was reached).
    pub ticks: usize,
    /// Distance covered (km).
    pub distance_km: f64,
    /// Time driven (h).
    pub time_taken_h: f64,
    /// Mean speed over the simulated ticks (km/h).
    pub mean_speed_kmh: f64,
    /// Whether the car crossed the finish line.
    pub reached_finish: bool,
    /// Whether the battery lasted the whole run.
    pub was_successful: bool,
    /// First tick with an empty battery.
    pub exhaustion_tick: Option<usize>,
    pub initial_soc: f64,
    pub final_soc: f64,
    pub min_soc: f64,
    /// Motor draw (Wh, positive).
    pub motor_wh: f64,
    /// Low-voltage draw (Wh, positive).
    pub lvs_wh: f64,
    /// Array production (Wh).
    pub array_wh: f64,
    /// Regenerative braking recovery (Wh).
    pub regen_wh: f64,
    /// Net energy into the pack (Wh, negative when discharged).
    pub net_wh: f64,
}

impl RaceSummary {
    /// Computes the summary from a run's results.
    ///
    /// # Arguments
    ///
    /// * `results` - Results of a completed run
    /// * `initial_soc` - State of charge at the start line, used when the run
    ///   has no ticks
    pub fn from_results(results: &RunResults, initial_soc: f64) -> Self {
        let total_wh = |series: &[f64]| series.iter().sum::<f64>() / J_PER_WH;

        let ticks = results.len();
        let mean_speed_kmh = if ticks > 0 {
            results.speed_kmh.iter().sum::<f64>() / ticks as f64
        } else {
            0.0
        };
        let min_soc = results
            .state_of_charge
            .iter()
            .copied()
            .fold(initial_soc.clamp(0.0, 1.0), f64::min);

        Self {
            ticks,
            distance_km: results.distance_travelled_km,
            time_taken_h: results.time_taken_s / 3600.0,
            mean_speed_kmh,
            reached_finish: results.reached_finish,
            was_successful: results.was_successful,
            exhaustion_tick: results.exhaustion_tick,
            initial_soc,
            final_soc: results.final_soc,
            min_soc,
            motor_wh: -total_wh(&results.motor_consumed_energy),
            lvs_wh: -total_wh(&results.lvs_consumed_energy),
            array_wh: total_wh(&results.array_produced_energy),
            regen_wh: total_wh(&results.regen_produced_energy),
            net_wh: total_wh(&results.delta_energy),
        }
    }
}

impl fmt::Display for RaceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Race Summary ---")?;
        writeln!(f, "Ticks simulated:       {}", self.ticks)?;
        writeln!(f, "Distance travelled:    {:.2} km", self.distance_km)?;
        writeln!(f, "Time taken:            {:.2} h", self.time_taken_h)?;
        writeln!(f, "Mean speed:            {:.1} km/h", self.mean_speed_kmh)?;
        writeln!(f, "Reached finish:        {}", self.reached_finish)?;
        match self.exhaustion_tick {
            Some(tick) => writeln!(f, "Battery exhausted:     tick {tick}")?,
            None => writeln!(f, "Battery exhausted:     no")?,
        }
        writeln!(
            f,
            "State of charge:       {:.1}% -> {:.1}% (min {:.1}%)",
            self.initial_soc * 100.0,
            self.final_soc * 100.0,
            self.min_soc * 100.0
        )?;
        writeln!(f, "Motor draw:            {:.1} Wh", self.motor_wh)?;
        writeln!(f, "LVS draw:              {:.1} Wh", self.lvs_wh)?;
        writeln!(f, "Array production:      {:.1} Wh", self.array_wh)?;
        writeln!(f, "Regen recovery:        {:.1} Wh", self.regen_wh)?;
        write!(f, "Net energy:            {:.1} Wh", self.net_wh)
    }
}
