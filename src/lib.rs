//! Tick-indexed energy and motion simulator for solar-powered race cars.
//!
//! Given a race configuration, a route, a weather forecast, and a speed for
//! every driving time division, the engine integrates motor, array, low-voltage
//! and regenerative energy into a battery state of charge and reports how far
//! and how long the car drove.

/// Vehicle subsystem energy models and the battery.
pub mod car;
/// Command-line parsing for the `solar-race-sim` binary.
pub mod cli;
pub mod config;
/// Route geometry, forecast tables, index lookup, and synthetic generation.
pub mod env;
pub mod error;
/// CSV/JSON loaders and result export.
pub mod io;
/// Simulation engine, facade, builder, and result vocabulary.
pub mod sim;
pub mod telemetry;
