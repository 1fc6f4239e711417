//! Full 3-D CTU step: three sweeps, three corner-EMF integrations, the
//! complete transverse correction network and the CT face updates.

use crate::config::RunConfig;
use crate::error::Result;
use crate::flux::Hlle;
use crate::mesh::MeshBlock;
use crate::recon::Reconstructor;
use crate::types::Axis;

use super::correct::{self, TangentialB};
use super::{emf, sweep, update, Scratch};

pub(super) fn step3d(
    mesh: &mut MeshBlock,
    cfg: &RunConfig,
    recon: &Reconstructor,
    solver: &Hlle,
    s: &mut Scratch,
) -> Result<()> {
    // Provisional states and fluxes, one independent sweep per direction.
    {
        let m = &*mesh;
        let [d1, d2, d3] = &mut s.dir;
        #[cfg(feature = "parallel")]
        {
            let (r1, (r2, r3)) = rayon::join(
                || sweep::sweep(m, cfg, recon, solver, d1, Axis::X1),
                || {
                    rayon::join(
                        || sweep::sweep(m, cfg, recon, solver, d2, Axis::X2),
                        || sweep::sweep(m, cfg, recon, solver, d3, Axis::X3),
                    )
                },
            );
            r1?;
            r2?;
            r3?;
        }
        #[cfg(not(feature = "parallel"))]
        {
            sweep::sweep(m, cfg, recon, solver, d1, Axis::X1)?;
            sweep::sweep(m, cfg, recon, solver, d2, Axis::X2)?;
            sweep::sweep(m, cfg, recon, solver, d3, Axis::X3)?;
        }
    }

    // Corner EMFs at t^n and the half-dt CT update of the working faces.
    if cfg.mhd {
        for d in Axis::all() {
            emf::emf_cc_initial(mesh, d, &mut s.emf_cc[d.xyz()]);
        }
        {
            let [d1, d2, d3] = &s.dir;
            emf::corner_emf(mesh, Axis::X1, &d2.flux, &d3.flux, &s.emf_cc[0], &mut s.emf[0]);
            emf::corner_emf(mesh, Axis::X2, &d3.flux, &d1.flux, &s.emf_cc[1], &mut s.emf[1]);
            emf::corner_emf(mesh, Axis::X3, &d1.flux, &d2.flux, &s.emf_cc[2], &mut s.emf[2]);
        }
        let [d1, d2, d3] = &mut s.dir;
        emf::ct_half(mesh, &s.emf, &mut d1.bface, Axis::X1);
        emf::ct_half(mesh, &s.emf, &mut d2.bface, Axis::X2);
        emf::ct_half(mesh, &s.emf, &mut d3.bface, Axis::X3);
    }

    // Transverse corrections: each face direction is corrected by the flux
    // gradients of the other two sweeps, then the multidimensional MHD and
    // gravity sources.
    {
        let m = &*mesh;
        let [d1, d2, d3] = &mut s.dir;
        let (t1, t2, t3) = if cfg.mhd {
            (
                TangentialB::CornerEmf(&s.emf[0]),
                TangentialB::CornerEmf(&s.emf[1]),
                TangentialB::CornerEmf(&s.emf[2]),
            )
        } else {
            (TangentialB::None, TangentialB::None, TangentialB::None)
        };

        let (x1, x2, x3) = (Axis::X1, Axis::X2, Axis::X3);
        correct::transverse_correct(m, cfg, x1, x2, &mut d1.ul, &mut d1.ur, &d2.flux, t1);
        correct::transverse_correct(m, cfg, x1, x3, &mut d1.ul, &mut d1.ur, &d3.flux, t1);
        correct::transverse_correct(m, cfg, x2, x3, &mut d2.ul, &mut d2.ur, &d3.flux, t2);
        correct::transverse_correct(m, cfg, x2, x1, &mut d2.ul, &mut d2.ur, &d1.flux, t2);
        correct::transverse_correct(m, cfg, x3, x1, &mut d3.ul, &mut d3.ur, &d1.flux, t3);
        correct::transverse_correct(m, cfg, x3, x2, &mut d3.ul, &mut d3.ur, &d2.flux, t3);

        if cfg.mhd {
            correct::mhd_face_source(m, cfg, x1, &mut d1.ul, &mut d1.ur);
            correct::mhd_face_source(m, cfg, x2, &mut d2.ul, &mut d2.ur);
            correct::mhd_face_source(m, cfg, x3, &mut d3.ul, &mut d3.ur);
        }

        if let Some(phi) = cfg.gravity.as_ref() {
            let p = phi.as_ref();
            correct::gravity_face_correct(m, cfg, p, x1, x2, &mut d1.ul, &mut d1.ur, &d2.flux);
            correct::gravity_face_correct(m, cfg, p, x1, x3, &mut d1.ul, &mut d1.ur, &d3.flux);
            correct::gravity_face_correct(m, cfg, p, x2, x3, &mut d2.ul, &mut d2.ur, &d3.flux);
            correct::gravity_face_correct(m, cfg, p, x2, x1, &mut d2.ul, &mut d2.ur, &d1.flux);
            correct::gravity_face_correct(m, cfg, p, x3, x1, &mut d3.ul, &mut d3.ur, &d1.flux);
            correct::gravity_face_correct(m, cfg, p, x3, x2, &mut d3.ul, &mut d3.ur, &d2.flux);
        }

        if let Some(sb) = cfg.shearing_box {
            correct::coriolis_face_correct(m, sb.omega, x2, &mut d2.ul, &mut d2.ur);
            correct::coriolis_face_correct(m, sb.omega, x3, &mut d3.ul, &mut d3.ur);
        }
    }

    // Half-step density and, for MHD, the half-step cell-centered EMFs.
    {
        let fluxes = [&s.dir[0].flux, &s.dir[1].flux, &s.dir[2].flux];
        update::half_density(mesh, &fluxes, &mut s.dhalf);
        if cfg.mhd {
            let bfaces = [&s.dir[0].bface, &s.dir[1].bface, &s.dir[2].bface];
            update::emf_cc_half(
                mesh,
                cfg,
                &fluxes,
                &bfaces,
                &s.dhalf,
                &mut s.emf_cc,
                &Axis::all(),
            );
        }
    }

    // Corrected fluxes, with the H-correction dissipation floor if enabled.
    {
        let m = &*mesh;
        if cfg.h_correction {
            let [d1, d2, d3] = &s.dir;
            correct::eta_faces(m, cfg, Axis::X1, d1, &mut s.eta[0])?;
            correct::eta_faces(m, cfg, Axis::X2, d2, &mut s.eta[1])?;
            correct::eta_faces(m, cfg, Axis::X3, d3, &mut s.eta[2])?;
        }
        let [d1, d2, d3] = &mut s.dir;
        correct::final_fluxes(m, cfg, solver, Axis::X1, d1, &s.eta)?;
        correct::final_fluxes(m, cfg, solver, Axis::X2, d2, &s.eta)?;
        correct::final_fluxes(m, cfg, solver, Axis::X3, d3, &s.eta)?;
    }

    // Corner EMFs at t^{n+1/2} and the full-dt CT update of the mesh faces.
    if cfg.mhd {
        {
            let [d1, d2, d3] = &s.dir;
            emf::corner_emf(mesh, Axis::X1, &d2.flux, &d3.flux, &s.emf_cc[0], &mut s.emf[0]);
            emf::corner_emf(mesh, Axis::X2, &d3.flux, &d1.flux, &s.emf_cc[1], &mut s.emf[1]);
            emf::corner_emf(mesh, Axis::X3, &d1.flux, &d2.flux, &s.emf_cc[2], &mut s.emf[2]);
        }
        for a in Axis::all() {
            emf::ct_full(mesh, &s.emf, a);
        }
    }

    // Full-dt source terms, then the conservative flux update.
    {
        let fluxes = [&s.dir[0].flux, &s.dir[1].flux, &s.dir[2].flux];
        if let Some(sb) = cfg.shearing_box {
            update::shearing_correct(mesh, cfg, sb, &s.dhalf, &fluxes);
        } else if let Some(phi) = cfg.gravity.as_ref() {
            update::gravity_correct(mesh, cfg, phi.as_ref(), &s.dhalf, &fluxes);
        }
    }
    for b in Axis::all() {
        update::apply_flux_divergence(mesh, cfg, b, &s.dir[b.xyz()].flux);
    }

    // Cell-centered field follows the evolved, divergence-free faces.
    if cfg.mhd {
        mesh.consolidate_bcc();
    }

    Ok(())
}
