//! Core value types shared by every module: axes, index helpers and the
//! conserved/primitive state structs.

mod axis;
mod state;

pub use axis::{idx3, shift, Axis, Idx};
pub use state::{Cons1D, ConsCell, Prim1D, MAX_SCALARS};
