//! Error types for the integrator.
//!
//! Every detected invariant violation is unrecoverable for the run, but it is
//! surfaced as a typed value carrying enough context (quantity, cell, step)
//! to diagnose and to test against, never as a process abort.

use thiserror::Error;

/// Which physical quantity violated positivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Density,
    Pressure,
    Energy,
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quantity::Density => write!(f, "density"),
            Quantity::Pressure => write!(f, "pressure"),
            Quantity::Energy => write!(f, "energy"),
        }
    }
}

/// A pointwise positivity failure, raised where the cell location is not yet
/// known. The integrator wraps it into [`MhdError::NonPhysicalState`].
#[derive(Debug, Clone, Copy, Error)]
#[error("non-physical {quantity}: {value}")]
pub struct BadState {
    pub quantity: Quantity,
    pub value: f64,
}

/// Top-level error type of the crate.
#[derive(Debug, Error)]
pub enum MhdError {
    /// Non-positive density, pressure or energy discovered mid-update.
    #[error(
        "non-physical {quantity} = {value} at cell (k={k}, j={j}, i={i}) \
         during {stage} of step {step}"
    )]
    NonPhysicalState {
        quantity: Quantity,
        value: f64,
        k: usize,
        j: usize,
        i: usize,
        /// Sweep or correction stage that tripped, for diagnosis.
        stage: &'static str,
        step: usize,
    },

    /// Setup-time rejects: inconsistent mesh shape, bad feature combination.
    #[error("configuration error: {0}")]
    Config(String),
}

impl MhdError {
    /// Attach a cell location and step number to a pointwise failure.
    pub fn at(bad: BadState, idx: [usize; 3], stage: &'static str, step: usize) -> Self {
        MhdError::NonPhysicalState {
            quantity: bad.quantity,
            value: bad.value,
            k: idx[0],
            j: idx[1],
            i: idx[2],
            stage,
            step,
        }
    }
}

pub type Result<T> = std::result::Result<T, MhdError>;
