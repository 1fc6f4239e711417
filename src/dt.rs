//! CFL timestep estimate.

use crate::config::RunConfig;
use crate::eos::{cfast, cons_to_prim};
use crate::error::{MhdError, Result};
use crate::mesh::MeshBlock;
use crate::types::{Axis, Cons1D, ConsCell, MAX_SCALARS};

fn rotated(u: &ConsCell, a: Axis) -> Cons1D {
    Cons1D {
        d: u.d,
        mx: u.m(a),
        my: u.m(a.next()),
        mz: u.m(a.next2()),
        e: u.e,
        by: u.bc(a.next()),
        bz: u.bc(a.next2()),
        s: [0.0; MAX_SCALARS],
    }
}

/// Largest stable timestep for the current state, `cfl / max(signal/dx)`
/// over all active cells and non-degenerate axes.
pub fn new_dt(mesh: &MeshBlock, cfg: &RunConfig) -> Result<f64> {
    let mut max_rate = 0.0f64;

    for k in mesh.range(Axis::X3, 0, 0) {
        for j in mesh.range(Axis::X2, 0, 0) {
            for i in mesh.range(Axis::X1, 0, 0) {
                let cell = &mesh.u[[k, j, i]];
                for a in Axis::all() {
                    if mesh.nx(a) == 1 {
                        continue;
                    }
                    let u = rotated(cell, a);
                    let w = cons_to_prim(&u, cell.bc(a), cfg.eos)
                        .map_err(|b| MhdError::at(b, [k, j, i], "timestep estimate", mesh.nstep))?;
                    let signal = w.vx.abs() + cfast(&w, cell.bc(a), cfg.eos);
                    max_rate = max_rate.max(signal / mesh.dx(a));
                }
            }
        }
    }

    Ok(cfg.cfl / max_rate)
}
