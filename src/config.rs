//! Immutable run configuration.
//!
//! All feature selections (equation of state, reconstruction order, MHD,
//! H-correction, gravity, shearing box, passive scalar count) are fixed for
//! the lifetime of a run and threaded through construction as one value,
//! rather than scattered as flags.
//!
//! # Example
//! ```
//! use ctu_mhd::config::RunConfig;
//!
//! let cfg = RunConfig::adiabatic(5.0 / 3.0)
//!     .with_h_correction(true)
//!     .with_scalars(1);
//! assert!(cfg.validate().is_ok());
//! ```

use std::sync::Arc;

use crate::error::{MhdError, Result};
use crate::types::MAX_SCALARS;

/// Equation-of-state class. Isothermal drops the energy equation from every
/// update; the sound speed is then a global constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Eos {
    Adiabatic { gamma: f64 },
    Isothermal { cs: f64 },
}

impl Eos {
    #[inline]
    pub fn is_adiabatic(self) -> bool {
        matches!(self, Eos::Adiabatic { .. })
    }
}

/// Interface reconstruction choice for the sweep stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconMethod {
    /// First-order donor cell. Mainly for debugging and convergence studies.
    DonorCell,
    /// Piecewise-linear with monotonized-central limiting and a half-step
    /// upwind advance of the interface states.
    Plm,
}

/// A time-independent gravitational potential, sampled pointwise.
pub trait StaticPotential: Send + Sync {
    fn phi(&self, x1: f64, x2: f64, x3: f64) -> f64;
}

impl<F> StaticPotential for F
where
    F: Fn(f64, f64, f64) -> f64 + Send + Sync,
{
    fn phi(&self, x1: f64, x2: f64, x3: f64) -> f64 {
        self(x1, x2, x3)
    }
}

/// Local co-rotating frame parameters. Adds Coriolis predictor terms in the
/// x1 sweep and a Crank-Nicholson momentum corrector to the final update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShearingBox {
    /// Orbital frequency of the frame.
    pub omega: f64,
}

/// The full, immutable configuration of one run.
#[derive(Clone)]
pub struct RunConfig {
    pub eos: Eos,
    pub recon: ReconMethod,
    /// Evolve magnetic fields. With this off the integrator is a plain
    /// unsplit hydrodynamics scheme and the face fields stay untouched.
    pub mhd: bool,
    pub h_correction: bool,
    /// Live passive scalar count, at most [`MAX_SCALARS`].
    pub n_scalars: usize,
    /// CFL number used by the timestep estimate.
    pub cfl: f64,
    pub gravity: Option<Arc<dyn StaticPotential>>,
    pub shearing_box: Option<ShearingBox>,
}

impl RunConfig {
    /// Adiabatic MHD defaults: PLM reconstruction, no sources, CFL 0.4.
    pub fn adiabatic(gamma: f64) -> Self {
        RunConfig {
            eos: Eos::Adiabatic { gamma },
            recon: ReconMethod::Plm,
            mhd: true,
            h_correction: false,
            n_scalars: 0,
            cfl: 0.4,
            gravity: None,
            shearing_box: None,
        }
    }

    /// Isothermal MHD defaults.
    pub fn isothermal(cs: f64) -> Self {
        RunConfig {
            eos: Eos::Isothermal { cs },
            ..RunConfig::adiabatic(0.0)
        }
    }

    pub fn with_recon(mut self, recon: ReconMethod) -> Self {
        self.recon = recon;
        self
    }

    pub fn with_mhd(mut self, mhd: bool) -> Self {
        self.mhd = mhd;
        self
    }

    pub fn with_h_correction(mut self, on: bool) -> Self {
        self.h_correction = on;
        self
    }

    pub fn with_scalars(mut self, n: usize) -> Self {
        self.n_scalars = n;
        self
    }

    pub fn with_cfl(mut self, cfl: f64) -> Self {
        self.cfl = cfl;
        self
    }

    pub fn with_gravity(mut self, phi: Arc<dyn StaticPotential>) -> Self {
        self.gravity = Some(phi);
        self
    }

    pub fn with_shearing_box(mut self, sb: ShearingBox) -> Self {
        self.shearing_box = Some(sb);
        self
    }

    /// Reject inconsistent configurations before any stepping happens.
    pub fn validate(&self) -> Result<()> {
        match self.eos {
            Eos::Adiabatic { gamma } if gamma <= 1.0 => {
                return Err(MhdError::Config(format!("gamma must exceed 1, got {gamma}")));
            }
            Eos::Isothermal { cs } if cs <= 0.0 => {
                return Err(MhdError::Config(format!(
                    "isothermal sound speed must be positive, got {cs}"
                )));
            }
            _ => {}
        }
        if self.n_scalars > MAX_SCALARS {
            return Err(MhdError::Config(format!(
                "n_scalars = {} exceeds capacity {}",
                self.n_scalars, MAX_SCALARS
            )));
        }
        if !(self.cfl > 0.0 && self.cfl <= 1.0) {
            return Err(MhdError::Config(format!(
                "CFL number must lie in (0, 1], got {}",
                self.cfl
            )));
        }
        if self.shearing_box.is_some() && !self.mhd {
            return Err(MhdError::Config(
                "shearing box requires the MHD update".into(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("eos", &self.eos)
            .field("recon", &self.recon)
            .field("mhd", &self.mhd)
            .field("h_correction", &self.h_correction)
            .field("n_scalars", &self.n_scalars)
            .field("cfl", &self.cfl)
            .field("gravity", &self.gravity.is_some())
            .field("shearing_box", &self.shearing_box)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_validate() {
        assert!(RunConfig::adiabatic(5.0 / 3.0).validate().is_ok());
        assert!(RunConfig::isothermal(1.0).validate().is_ok());
    }

    #[test]
    fn bad_settings_are_rejected() {
        assert!(RunConfig::adiabatic(1.0).validate().is_err());
        assert!(RunConfig::isothermal(0.0).validate().is_err());
        assert!(RunConfig::adiabatic(1.4)
            .with_scalars(MAX_SCALARS + 1)
            .validate()
            .is_err());
        assert!(RunConfig::adiabatic(1.4).with_cfl(0.0).validate().is_err());
        assert!(RunConfig::adiabatic(1.4)
            .with_mhd(false)
            .with_shearing_box(ShearingBox { omega: 1.0 })
            .validate()
            .is_err());
    }
}
