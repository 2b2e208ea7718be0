/// CSV export of per-tick results.
pub mod export;
/// Route, weather, and speed-profile loaders.
pub mod loader;
