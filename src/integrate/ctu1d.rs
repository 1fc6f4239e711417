//! 1-D Godunov path: a single x1 sweep with no transverse machinery.
//!
//! The sweep's source-corrected states are already at the half timestep, so
//! the provisional fluxes are final. There is no CT in one dimension: the
//! normal field is constant, the transverse cell-centered components evolve
//! through the flux divergence and the matching face arrays mirror them.

use crate::config::RunConfig;
use crate::error::Result;
use crate::flux::Hlle;
use crate::mesh::MeshBlock;
use crate::recon::Reconstructor;
use crate::types::Axis;

use super::{sweep, update, Scratch};

pub(super) fn step1d(
    mesh: &mut MeshBlock,
    cfg: &RunConfig,
    recon: &Reconstructor,
    solver: &Hlle,
    s: &mut Scratch,
) -> Result<()> {
    sweep::sweep(mesh, cfg, recon, solver, &mut s.dir[0], Axis::X1)?;

    {
        let fluxes = [&s.dir[0].flux, &s.dir[1].flux, &s.dir[2].flux];
        update::half_density(mesh, &fluxes, &mut s.dhalf);
        if let Some(phi) = cfg.gravity.as_ref() {
            update::gravity_correct(mesh, cfg, phi.as_ref(), &s.dhalf, &fluxes);
        }
    }
    update::apply_flux_divergence(mesh, cfg, Axis::X1, &s.dir[0].flux);

    if cfg.mhd {
        for i in mesh.range(Axis::X1, 0, 0) {
            mesh.b2i[[0, 0, i]] = mesh.u[[0, 0, i]].b2c;
            mesh.b3i[[0, 0, i]] = mesh.u[[0, 0, i]].b3c;
        }
    }

    Ok(())
}
