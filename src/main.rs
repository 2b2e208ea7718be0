//! Race simulator entry point: CLI wiring and config-driven simulation construction.

use std::process;

use tracing::{error, info};

use solar_race_sim::cli::{self, CliOptions, Command, SpeedSource};
use solar_race_sim::config::RaceConfig;
use solar_race_sim::error::SimResult;
use solar_race_sim::io::export::export_csv;
use solar_race_sim::io::loader;
use solar_race_sim::sim::{RaceSummary, RunReturn, SimulationBuilder};
use solar_race_sim::telemetry::init_tracing;

fn load_config(opts: &CliOptions) -> Result<RaceConfig, String> {
    let loaded = match (&opts.scenario, &opts.preset) {
        (Some(path), _) => RaceConfig::from_toml_file(path),
        (None, Some(name)) => RaceConfig::from_preset(name),
        (None, None) => Ok(RaceConfig::fsgp()),
    };
    loaded.map_err(|e| e.to_string())
}

fn run(opts: &CliOptions, config: RaceConfig) -> SimResult<(RunReturn, RaceSummary)> {
    let mut builder = SimulationBuilder::new(config);
    if let Some(g) = opts.granularity {
        builder = builder.granularity(g);
    }
    if let Some(path) = &opts.route {
        builder = builder.route(loader::load_route_csv(path)?);
    }
    if let Some(path) = &opts.weather {
        builder = builder.weather(loader::load_weather_csv(path)?);
    }
    let mut sim = builder.build()?;

    let divisions = sim.get_driving_time_divisions();
    let speeds = match &opts.speed {
        SpeedSource::Constant(kmh) => loader::constant_speeds(*kmh, divisions),
        SpeedSource::File(path) => loader::load_speeds_json(path, divisions)?,
    };

    let ret = sim.run_model(&speeds)?;
    let summary = sim.summary()?;

    if let Some(path) = &opts.telemetry_out {
        export_csv(sim.results()?, path)?;
        info!(path = %path.display(), "telemetry written");
    }

    Ok((ret, summary))
}

fn main() {
    let opts = match cli::parse_args() {
        Ok(Command::Run(opts)) => opts,
        Ok(Command::Help) => {
            cli::print_usage();
            return;
        }
        Err(msg) => {
            eprintln!("error: {msg}");
            cli::print_usage();
            process::exit(2);
        }
    };

    init_tracing(opts.verbose);

    let config = match load_config(&opts) {
        Ok(cfg) => cfg,
        Err(msg) => {
            eprintln!("{msg}");
            process::exit(1);
        }
    };

    match run(&opts, config) {
        Ok((ret, summary)) => {
            if let Some(t) = ret.time_taken_s {
                println!("time_taken_s: {t:.1}");
            }
            if let Some(d) = ret.distance_travelled_km {
                println!("distance_travelled_km: {d:.3}");
            }
            println!("\n{summary}");
        }
        Err(e) => {
            error!(fatal = e.is_fatal(), "simulation failed");
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
