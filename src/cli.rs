use std::env;
use std::path::PathBuf;

/// Constant cruising speed used when no speed profile is given (km/h).
pub const DEFAULT_SPEED_KMH: f64 = 35.0;

/// Where the speed profile comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeedSource {
    /// The same speed for every tick (km/h).
    Constant(f64),
    /// A cached JSON array of per-tick speeds.
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub route: Option<PathBuf>,
    pub weather: Option<PathBuf>,
    pub speed: SpeedSource,
    pub granularity: Option<f64>,
    pub telemetry_out: Option<PathBuf>,
    pub verbose: bool,
}

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(CliOptions),
    Help,
}

pub fn parse_args() -> Result<Command, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<Command, String> {
    if args.iter().any(|a| a == "--help" || a == "-h") {
        return Ok(Command::Help);
    }
    parse_options(&args).map(Command::Run)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut scenario = None;
    let mut preset = None;
    let mut route = None;
    let mut weather = None;
    let mut speed = None;
    let mut speeds = None;
    let mut granularity = None;
    let mut telemetry_out = None;
    let mut verbose = false;

    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --scenario (expected a TOML file path)")?;
                if scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected fsgp or asc)")?;
                if preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--route" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --route (expected a CSV file path)")?;
                if route.replace(PathBuf::from(path)).is_some() {
                    return Err("--route provided more than once".to_string());
                }
            }
            "--weather" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --weather (expected a CSV file path)")?;
                if weather.replace(PathBuf::from(path)).is_some() {
                    return Err("--weather provided more than once".to_string());
                }
            }
            "--speed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --speed (expected km/h)")?;
                let kmh = raw
                    .parse::<f64>()
                    .map_err(|_| format!("--speed value \"{raw}\" is not a number"))?;
                if speed.replace(kmh).is_some() {
                    return Err("--speed provided more than once".to_string());
                }
            }
            "--speeds" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --speeds (expected a JSON file path)")?;
                if speeds.replace(PathBuf::from(path)).is_some() {
                    return Err("--speeds provided more than once".to_string());
                }
            }
            "--granularity" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --granularity (expected ticks per hour)")?;
                let g = raw
                    .parse::<f64>()
                    .map_err(|_| format!("--granularity value \"{raw}\" is not a number"))?;
                if granularity.replace(g).is_some() {
                    return Err("--granularity provided more than once".to_string());
                }
            }
            "--telemetry-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --telemetry-out (expected a file path)")?;
                if telemetry_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--telemetry-out provided more than once".to_string());
                }
            }
            "--verbose" | "-v" => verbose = true,
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if scenario.is_some() && preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    let speed = match (speed, speeds) {
        (Some(_), Some(_)) => {
            return Err("arguments `--speed` and `--speeds` are mutually exclusive".to_string());
        }
        (Some(kmh), None) => SpeedSource::Constant(kmh),
        (None, Some(path)) => SpeedSource::File(path),
        (None, None) => SpeedSource::Constant(DEFAULT_SPEED_KMH),
    };

    if scenario.is_none() && preset.is_none() {
        preset = Some("fsgp".to_string());
    }

    Ok(CliOptions {
        scenario,
        preset,
        route,
        weather,
        speed,
        granularity,
        telemetry_out,
        verbose,
    })
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("solar-race-sim: energy and motion simulator for solar race cars");
    eprintln!();
    eprintln!("Usage: solar-race-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load race configuration from a TOML file");
    eprintln!("  --preset <name>          Use a built-in preset (fsgp, asc)");
    eprintln!("  --route <path>           Route CSV (default: synthetic route)");
    eprintln!("  --weather <path>         Weather CSV (default: synthetic forecast)");
    eprintln!("  --speed <km/h>           Constant speed for every tick (default: {DEFAULT_SPEED_KMH})");
    eprintln!("  --speeds <path>          Cached speed profile (JSON array, km/h)");
    eprintln!("  --granularity <f64>      Override ticks per hour");
    eprintln!("  --telemetry-out <path>   Export per-tick results to CSV");
    eprintln!("  --verbose, -v            Debug logging (RUST_LOG overrides)");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the fsgp preset is used.");
}
