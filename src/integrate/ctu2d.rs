//! 2-D CTU step in the (x1, x2) plane.
//!
//! Only the x3-edge EMF exists, so CT touches the `b1i`/`b2i` faces alone;
//! the out-of-plane field is carried as a cell-centered quantity evolved by
//! the flux divergence, with `b3i` mirroring it. The tangential-field parts
//! of the transverse corrections difference the transverse flux's EMF
//! component directly instead of averaging corner values.

use crate::config::RunConfig;
use crate::error::Result;
use crate::flux::Hlle;
use crate::mesh::MeshBlock;
use crate::recon::Reconstructor;
use crate::types::Axis;

use super::correct::{self, TangentialB};
use super::{emf, sweep, update, Scratch};

pub(super) fn step2d(
    mesh: &mut MeshBlock,
    cfg: &RunConfig,
    recon: &Reconstructor,
    solver: &Hlle,
    s: &mut Scratch,
) -> Result<()> {
    let (x1, x2, x3) = (Axis::X1, Axis::X2, Axis::X3);

    {
        let m = &*mesh;
        let [d1, d2, _] = &mut s.dir;
        #[cfg(feature = "parallel")]
        {
            let (r1, r2) = rayon::join(
                || sweep::sweep(m, cfg, recon, solver, d1, Axis::X1),
                || sweep::sweep(m, cfg, recon, solver, d2, Axis::X2),
            );
            r1?;
            r2?;
        }
        #[cfg(not(feature = "parallel"))]
        {
            sweep::sweep(m, cfg, recon, solver, d1, Axis::X1)?;
            sweep::sweep(m, cfg, recon, solver, d2, Axis::X2)?;
        }
    }

    if cfg.mhd {
        emf::emf_cc_initial(mesh, x3, &mut s.emf_cc[2]);
        {
            let [d1, d2, _] = &s.dir;
            emf::corner_emf(mesh, x3, &d1.flux, &d2.flux, &s.emf_cc[2], &mut s.emf[2]);
        }
        let [d1, d2, _] = &mut s.dir;
        emf::ct_half(mesh, &s.emf, &mut d1.bface, x1);
        emf::ct_half(mesh, &s.emf, &mut d2.bface, x2);
    }

    {
        let m = &*mesh;
        let [d1, d2, _] = &mut s.dir;
        let tang = if cfg.mhd {
            TangentialB::FluxDiff
        } else {
            TangentialB::None
        };
        correct::transverse_correct(m, cfg, x1, x2, &mut d1.ul, &mut d1.ur, &d2.flux, tang);
        correct::transverse_correct(m, cfg, x2, x1, &mut d2.ul, &mut d2.ur, &d1.flux, tang);

        if cfg.mhd {
            correct::mhd_face_source(m, cfg, x1, &mut d1.ul, &mut d1.ur);
            correct::mhd_face_source(m, cfg, x2, &mut d2.ul, &mut d2.ur);
        }

        if let Some(phi) = cfg.gravity.as_ref() {
            let p = phi.as_ref();
            correct::gravity_face_correct(m, cfg, p, x1, x2, &mut d1.ul, &mut d1.ur, &d2.flux);
            correct::gravity_face_correct(m, cfg, p, x2, x1, &mut d2.ul, &mut d2.ur, &d1.flux);
        }
    }

    {
        let fluxes = [&s.dir[0].flux, &s.dir[1].flux, &s.dir[2].flux];
        update::half_density(mesh, &fluxes, &mut s.dhalf);
        if cfg.mhd {
            let bfaces = [&s.dir[0].bface, &s.dir[1].bface, &s.dir[2].bface];
            update::emf_cc_half(mesh, cfg, &fluxes, &bfaces, &s.dhalf, &mut s.emf_cc, &[x3]);
        }
    }

    {
        let m = &*mesh;
        if cfg.h_correction {
            let [d1, d2, _] = &s.dir;
            correct::eta_faces(m, cfg, x1, d1, &mut s.eta[0])?;
            correct::eta_faces(m, cfg, x2, d2, &mut s.eta[1])?;
        }
        let [d1, d2, _] = &mut s.dir;
        correct::final_fluxes(m, cfg, solver, x1, d1, &s.eta)?;
        correct::final_fluxes(m, cfg, solver, x2, d2, &s.eta)?;
    }

    if cfg.mhd {
        {
            let [d1, d2, _] = &s.dir;
            emf::corner_emf(mesh, x3, &d1.flux, &d2.flux, &s.emf_cc[2], &mut s.emf[2]);
        }
        emf::ct_full(mesh, &s.emf, x1);
        emf::ct_full(mesh, &s.emf, x2);
    }

    {
        let fluxes = [&s.dir[0].flux, &s.dir[1].flux, &s.dir[2].flux];
        if let Some(phi) = cfg.gravity.as_ref() {
            update::gravity_correct(mesh, cfg, phi.as_ref(), &s.dhalf, &fluxes);
        }
    }
    update::apply_flux_divergence(mesh, cfg, x1, &s.dir[0].flux);
    update::apply_flux_divergence(mesh, cfg, x2, &s.dir[1].flux);

    // In-plane cell fields follow the evolved faces; the out-of-plane face
    // mirrors its flux-evolved cell value.
    if cfg.mhd {
        for j in mesh.range(x2, 0, 0) {
            for i in mesh.range(x1, 0, 0) {
                mesh.u[[0, j, i]].b1c = 0.5 * (mesh.b1i[[0, j, i]] + mesh.b1i[[0, j, i + 1]]);
                mesh.u[[0, j, i]].b2c = 0.5 * (mesh.b2i[[0, j, i]] + mesh.b2i[[0, j + 1, i]]);
                mesh.b3i[[0, j, i]] = mesh.u[[0, j, i]].b3c;
            }
        }
    }

    Ok(())
}
