//! Directional sweep: rotated 1-D states, reconstruction, half-dt source
//! terms and the provisional interface fluxes.

use crate::config::RunConfig;
use crate::eos::{cons_to_prim, prim_to_cons};
use crate::error::{MhdError, Result};
use crate::flux::{Hlle, RiemannSolver};
use crate::mesh::MeshBlock;
use crate::recon::{Reconstruction, Reconstructor};
use crate::types::{idx3, shift, Axis, Cons1D, Idx};

use super::DirScratch;

fn stage_name(a: Axis) -> &'static str {
    match a {
        Axis::X1 => "x1 sweep",
        Axis::X2 => "x2 sweep",
        Axis::X3 => "x3 sweep",
    }
}

/// Face-field derivative of component `g` at a cell, zero on degenerate
/// axes.
#[inline]
fn db(mesh: &MeshBlock, g: Axis, cell: Idx) -> f64 {
    if mesh.nx(g) > 1 {
        (mesh.bface(g)[shift(cell, g, 1)] - mesh.bface(g)[cell]) / mesh.dx(g)
    } else {
        0.0
    }
}

/// Tension-gradient clamp of the in-sweep tangential field source: the
/// normal derivative is limited against the negated transverse one, so the
/// source vanishes on a discretely divergence-free pair with equal signs.
#[inline]
fn clamp_source(db_n: f64, db_t: f64) -> f64 {
    if db_n >= 0.0 {
        db_n.min(-db_t).max(0.0)
    } else {
        db_n.max(-db_t).min(0.0)
    }
}

/// Run one full directional sweep along `a`, filling `dir.ul`, `dir.ur`,
/// `dir.flux` at faces `lo-1..=hi+2` (transverse extent two cells beyond
/// active) and seeding `dir.bface` with the current normal face field.
pub(super) fn sweep(
    mesh: &MeshBlock,
    cfg: &RunConfig,
    recon: &Reconstructor,
    solver: &Hlle,
    dir: &mut DirScratch,
    a: Axis,
) -> Result<()> {
    let stage = stage_name(a);
    let (a1, a2) = (a.next(), a.next2());
    let lo = mesh.lo(a);
    let hi = mesh.hi(a);
    let n = *mesh.range(a, mesh.nghost(), mesh.nghost()).end() + 1;
    let dtodx = mesh.dtodx(a);
    let hdt = 0.5 * mesh.dt;

    let DirScratch {
        ul,
        ur,
        flux,
        bface,
        line,
    } = dir;

    for t1 in mesh.range(a1, 2, 2) {
        for t2 in mesh.range(a2, 2, 2) {
            // Gather the rotated 1-D line, ghosts included.
            for s in 0..n {
                let c = idx3(a, s, t1, t2);
                let u = &mesh.u[c];
                line.u1d[s] = Cons1D {
                    d: u.d,
                    mx: u.m(a),
                    my: u.m(a1),
                    mz: u.m(a2),
                    e: u.e,
                    by: u.bc(a1),
                    bz: u.bc(a2),
                    s: u.s,
                };
                line.bxc[s] = u.bc(a);
                line.bxi[s] = mesh.bface(a)[c];
                bface[c] = mesh.bface(a)[c];
            }

            for s in 0..n {
                line.w[s] = cons_to_prim(&line.u1d[s], line.bxc[s], cfg.eos)
                    .map_err(|b| MhdError::at(b, idx3(a, s, t1, t2), stage, mesh.nstep))?;
            }

            recon.states(
                &line.w,
                &line.bxc,
                cfg.eos,
                dtodx,
                lo - 1,
                hi + 1,
                &mut line.wl,
                &mut line.wr,
            );

            // Half-dt tangential field source from the face-centered
            // tension gradients (Gardiner & Stone multidimensional term).
            if cfg.mhd {
                for f in (lo - 1)..=(hi + 2) {
                    for (left, cell_s) in [(true, f - 1), (false, f)] {
                        let cell = idx3(a, cell_s, t1, t2);
                        let db_n = db(mesh, a, cell);
                        let l1 = clamp_source(db_n, db(mesh, a1, cell));
                        let l2 = clamp_source(db_n, db(mesh, a2, cell));
                        let u = &mesh.u[cell];
                        let src_by = (u.m(a1) / u.d) * l1;
                        let src_bz = (u.m(a2) / u.d) * l2;
                        let w = if left {
                            &mut line.wl[f]
                        } else {
                            &mut line.wr[f]
                        };
                        w.by += hdt * src_by;
                        w.bz += hdt * src_bz;
                    }
                }
            }

            // Half-dt normal gravitational acceleration.
            if let Some(phi) = cfg.gravity.as_ref() {
                for f in (lo - 1)..=(hi + 2) {
                    let c = idx3(a, f, t1, t2);
                    let (x1, x2, x3) = mesh.cc_pos(c[0], c[1], c[2]);
                    let mut xc = [x1, x2, x3];
                    let mut xf = xc;
                    xf[a.xyz()] -= 0.5 * mesh.dx(a);
                    let phifc = phi.phi(xf[0], xf[1], xf[2]);
                    let phicr = phi.phi(xc[0], xc[1], xc[2]);
                    xc[a.xyz()] -= mesh.dx(a);
                    let phicl = phi.phi(xc[0], xc[1], xc[2]);
                    line.wl[f].vx -= dtodx * (phifc - phicl);
                    line.wr[f].vx -= dtodx * (phicr - phifc);
                }
            }

            // Half-dt Coriolis terms; the tidal part is folded into the
            // static potential by the caller.
            if a == Axis::X1 {
                if let Some(sb) = cfg.shearing_box {
                    let dt_om = mesh.dt * sb.omega;
                    for f in (lo - 1)..=(hi + 2) {
                        line.wl[f].vx += dt_om * line.w[f - 1].vy;
                        line.wl[f].vy -= dt_om * line.w[f - 1].vx;
                        line.wr[f].vx += dt_om * line.w[f].vy;
                        line.wr[f].vy -= dt_om * line.w[f].vx;
                    }
                }
            }

            // Provisional fluxes from the source-corrected states.
            for f in (lo - 1)..=(hi + 2) {
                let c = idx3(a, f, t1, t2);
                let bx = line.bxi[f];
                let l = prim_to_cons(&line.wl[f], bx, cfg.eos);
                let r = prim_to_cons(&line.wr[f], bx, cfg.eos);
                flux[c] = solver
                    .flux(cfg.eos, bx, &l, &r, 0.0)
                    .map_err(|b| MhdError::at(b, c, stage, mesh.nstep))?;
                ul[c] = l;
                ur[c] = r;
            }
        }
    }

    Ok(())
}
