//! Error taxonomy shared by the engine, the facade, and the data loaders.

use thiserror::Error;

/// Every failure the simulator can surface to a caller.
///
/// [`SimError::OutOfRange`] is the one non-fatal kind: the indexer raises it
/// when a tick's cumulative distance runs past the end of the route, and the
/// engine consumes it as the finish-line signal instead of propagating it.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid physical input at tick {tick}: {quantity} = {value}")]
    InvalidPhysicalInput {
        tick: usize,
        quantity: &'static str,
        value: f64,
    },

    #[error(
        "tick {tick}: cumulative distance {distance_m:.1} m exceeds route length {route_length_m:.1} m"
    )]
    OutOfRange {
        tick: usize,
        distance_m: f64,
        route_length_m: f64,
    },

    #[error("precondition violated: {0}")]
    Precondition(String),

    #[error("unknown result key \"{0}\"")]
    UnknownKey(String),

    #[error("simulation model has already run; build a fresh model for another speed profile")]
    AlreadyRun,

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Returns `false` only for the finish-line signal.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SimError::OutOfRange { .. })
    }
}

/// Shorthand result type used across the crate.
pub type SimResult<T> = Result<T, SimError>;

/// A NaN or out-of-domain value rejected by a subsystem energy model.
///
/// Models do not know which tick they are evaluating; the engine attaches the
/// tick index when lifting this into [`SimError::InvalidPhysicalInput`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsError {
    pub quantity: &'static str,
    pub value: f64,
}

impl PhysicsError {
    pub fn at_tick(self, tick: usize) -> SimError {
        SimError::InvalidPhysicalInput {
            tick,
            quantity: self.quantity,
            value: self.value,
        }
    }
}

/// Rejects NaN and infinities.
pub(crate) fn finite(quantity: &'static str, value: f64) -> Result<f64, PhysicsError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PhysicsError { quantity, value })
    }
}

/// Rejects non-finite and negative values.
pub(crate) fn non_negative(quantity: &'static str, value: f64) -> Result<f64, PhysicsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(PhysicsError { quantity, value })
    }
}
