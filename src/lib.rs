//! # ctu-mhd
//!
//! A directionally-unsplit second-order Godunov integrator for ideal MHD on
//! a structured 3-D mesh, with constrained transport for the magnetic field.
//!
//! This crate provides the core building blocks of the scheme:
//! - Mesh blocks with cell-centered state and staggered face fields
//! - Equation-of-state conversions and wavespeeds (adiabatic, isothermal)
//! - Slope-limited piecewise-linear reconstruction
//! - HLLE Riemann fluxes with an optional H-correction dissipation floor
//! - The corner-transport-upwind (CTU) integrator in 1-D/2-D/3-D
//! - Constrained transport via upwind-averaged corner EMFs
//! - Static gravity and shearing-box source terms
//! - Ghost-zone boundary conditions and CFL timestep estimation

pub mod boundary;
pub mod config;
pub mod diag;
pub mod dt;
pub mod eos;
pub mod error;
pub mod flux;
pub mod integrate;
pub mod mesh;
pub mod recon;
pub mod types;

// Re-export the main types for convenience
pub use boundary::{apply, BoundaryConfig, BoundaryKind, HaloValid, Side, UserBoundary};
pub use config::{Eos, ReconMethod, RunConfig, ShearingBox, StaticPotential};
pub use diag::{face_fields_from_potential, max_div_b, Totals};
pub use dt::new_dt;
pub use error::{BadState, MhdError, Quantity, Result};
pub use flux::{Hlle, RiemannSolver};
pub use integrate::CtuIntegrator;
pub use mesh::{MeshBlock, MIN_NGHOST};
pub use recon::{DonorCell, Plm, Reconstruction, Reconstructor};
pub use types::{Axis, Cons1D, ConsCell, Idx, Prim1D, MAX_SCALARS};
