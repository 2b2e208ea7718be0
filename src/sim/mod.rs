/// Fluent construction of a [`Simulation`].
pub mod builder;
/// Race clock for tick timing.
pub mod clock;
mod model;
/// Result-key vocabulary and per-run result store.
pub mod results;
pub mod simulation;
pub mod summary;

pub use builder::SimulationBuilder;
pub use model::ModelState;
pub use results::{ResultKey, ResultValue, RunResults};
pub use simulation::{RunReturn, Simulation};
pub use summary::RaceSummary;
