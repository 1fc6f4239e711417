//! Half-dt corrections of the interface states: transverse flux gradients,
//! multidimensional MHD source terms, transverse gravity, the H-correction
//! wavespeeds and the corrected-state flux pass.

use ndarray::Array3;

use crate::config::{RunConfig, StaticPotential};
use crate::eos::cfast_cons;
use crate::error::{MhdError, Result};
use crate::flux::{Hlle, RiemannSolver};
use crate::mesh::MeshBlock;
use crate::types::{idx3, shift, Axis, Cons1D, Idx};

use super::DirScratch;

/// How the tangential-field part of a transverse correction is evaluated.
#[derive(Clone, Copy)]
pub(super) enum TangentialB<'a> {
    /// 3-D: average the corner EMF differences over the third direction.
    CornerEmf(&'a Array3<f64>),
    /// 2-D: difference the transverse flux's EMF component directly.
    FluxDiff,
    /// Hydrodynamics: no tangential field to correct.
    None,
}

/// Correct the `a`-face states with the transverse flux gradient along `b`,
/// for half a timestep. The left state belongs to the cell below the face,
/// the right state to the cell above it.
pub(super) fn transverse_correct(
    mesh: &MeshBlock,
    cfg: &RunConfig,
    a: Axis,
    b: Axis,
    ul: &mut Array3<Cons1D>,
    ur: &mut Array3<Cons1D>,
    flux_b: &Array3<Cons1D>,
    tang: TangentialB<'_>,
) {
    let (a1, a2) = (a.next(), a.next2());
    let qb = 0.5 * mesh.dtodx(b);
    let adiabatic = cfg.eos.is_adiabatic();
    // The third direction, over which the 3-D EMF differences average.
    let other = if b == a1 { a2 } else { a1 };

    let apply = |s: &mut Cons1D, cell: Idx| {
        let f0 = &flux_b[cell];
        let f1 = &flux_b[shift(cell, b, 1)];
        s.d -= qb * (f1.d - f0.d);
        for g in Axis::all() {
            *s.mom_mut(a, g) -= qb * (f1.mom(b, g) - f0.mom(b, g));
        }
        if adiabatic {
            s.e -= qb * (f1.e - f0.e);
        }
        for n in 0..cfg.n_scalars {
            s.s[n] -= qb * (f1.s[n] - f0.s[n]);
        }

        // Tangential field: the transverse part of the induction equation
        // for the face's in-plane components uses the edge EMF along `a`.
        let de = match &tang {
            TangentialB::CornerEmf(e) => {
                let c1 = shift(cell, other, 1);
                0.5 * ((e[shift(cell, b, 1)] - e[cell]) + (e[shift(c1, b, 1)] - e[c1]))
            }
            TangentialB::FluxDiff => {
                if b == a1 {
                    -(f1.by - f0.by)
                } else {
                    f1.bz - f0.bz
                }
            }
            TangentialB::None => return,
        };
        if b == a1 {
            s.bz += qb * de;
        } else {
            s.by -= qb * de;
        }
    };

    for s in mesh.range(a, 1, 2) {
        for t1 in mesh.range(a1, 1, 1) {
            for t2 in mesh.range(a2, 1, 1) {
                let c = idx3(a, s, t1, t2);
                apply(&mut ul[c], shift(c, a, -1));
                apply(&mut ur[c], c);
            }
        }
    }
}

/// Minmod of `-db_n` and `db_t`: nonzero only when the two derivatives have
/// opposite signs, returning the one of smaller magnitude.
#[inline]
fn mdb(db_n: f64, db_t: f64) -> f64 {
    if db_n > 0.0 && db_t < 0.0 {
        db_t.max(-db_n)
    } else if db_n < 0.0 && db_t > 0.0 {
        db_t.min(-db_n)
    } else {
        0.0
    }
}

/// Half-dt multidimensional MHD source on the corrected `a`-face states,
/// from the face-field divergence terms of the donor cell (limited as in
/// Gardiner & Stone 2007).
pub(super) fn mhd_face_source(
    mesh: &MeshBlock,
    cfg: &RunConfig,
    a: Axis,
    ul: &mut Array3<Cons1D>,
    ur: &mut Array3<Cons1D>,
) {
    let (a1, a2) = (a.next(), a.next2());
    let hdt = 0.5 * mesh.dt;
    let adiabatic = cfg.eos.is_adiabatic();

    let db = |g: Axis, cell: Idx| -> f64 {
        if mesh.nx(g) > 1 {
            (mesh.bface(g)[shift(cell, g, 1)] - mesh.bface(g)[cell]) / mesh.dx(g)
        } else {
            0.0
        }
    };

    let apply = |s: &mut Cons1D, cell: Idx| {
        let db_n = db(a, cell);
        let mdb1 = mdb(db_n, db(a1, cell));
        let mdb2 = mdb(db_n, db(a2, cell));
        let u = &mesh.u[cell];
        let (b_n, b1, b2) = (u.bc(a), u.bc(a1), u.bc(a2));
        let (v1, v2) = (u.m(a1) / u.d, u.m(a2) / u.d);

        s.mx += hdt * b_n * db_n;
        s.my += hdt * b1 * db_n;
        s.mz += hdt * b2 * db_n;
        s.by += hdt * v1 * (-mdb2);
        s.bz += hdt * v2 * (-mdb1);
        if adiabatic {
            s.e += hdt * (b1 * v1 * (-mdb2) + b2 * v2 * (-mdb1));
        }
    };

    for s in mesh.range(a, 1, 2) {
        for t1 in mesh.range(a1, 1, 1) {
            for t2 in mesh.range(a2, 1, 1) {
                let c = idx3(a, s, t1, t2);
                apply(&mut ul[c], shift(c, a, -1));
                apply(&mut ur[c], c);
            }
        }
    }
}

/// Half-dt transverse gravitational source along `b` on the `a`-face
/// states. Momentum uses the potential gradient at the owning cell; the
/// energy source averages the work done at that cell's two `b`-faces, using
/// that cell's own position for both states.
pub(super) fn gravity_face_correct(
    mesh: &MeshBlock,
    cfg: &RunConfig,
    phi: &dyn StaticPotential,
    a: Axis,
    b: Axis,
    ul: &mut Array3<Cons1D>,
    ur: &mut Array3<Cons1D>,
    flux_b: &Array3<Cons1D>,
) {
    let (a1, a2) = (a.next(), a.next2());
    let qb = 0.5 * mesh.dtodx(b);
    let half_db = 0.5 * mesh.dx(b);
    let adiabatic = cfg.eos.is_adiabatic();

    let apply = |s: &mut Cons1D, cell: Idx| {
        let (x1, x2, x3) = mesh.cc_pos(cell[0], cell[1], cell[2]);
        let xc = [x1, x2, x3];
        let mut xr = xc;
        xr[b.xyz()] += half_db;
        let mut xl = xc;
        xl[b.xyz()] -= half_db;
        let phic = phi.phi(xc[0], xc[1], xc[2]);
        let phir = phi.phi(xr[0], xr[1], xr[2]);
        let phil = phi.phi(xl[0], xl[1], xl[2]);

        *s.mom_mut(a, b) -= qb * (phir - phil) * mesh.u[cell].d;
        if adiabatic {
            s.e -= qb
                * (flux_b[cell].d * (phic - phil) + flux_b[shift(cell, b, 1)].d * (phir - phic));
        }
    };

    for s in mesh.range(a, 1, 2) {
        for t1 in mesh.range(a1, 1, 1) {
            for t2 in mesh.range(a2, 1, 1) {
                let c = idx3(a, s, t1, t2);
                apply(&mut ul[c], shift(c, a, -1));
                apply(&mut ur[c], c);
            }
        }
    }
}

/// Half-dt Coriolis source on the `a`-face states, from the owning cell's
/// pre-step momenta. The x1 faces already carry this from the sweep
/// predictor, so this runs on the x2 and x3 face families only.
pub(super) fn coriolis_face_correct(
    mesh: &MeshBlock,
    omega: f64,
    a: Axis,
    ul: &mut Array3<Cons1D>,
    ur: &mut Array3<Cons1D>,
) {
    let (a1, a2) = (a.next(), a.next2());
    // dt*Omega = (dt/2)*(2 Omega).
    let om_dt = mesh.dt * omega;

    let apply = |s: &mut Cons1D, cell: Idx| {
        let u = &mesh.u[cell];
        *s.mom_mut(a, Axis::X1) += om_dt * u.m2;
        *s.mom_mut(a, Axis::X2) -= om_dt * u.m1;
    };

    for s in mesh.range(a, 1, 2) {
        for t1 in mesh.range(a1, 1, 1) {
            for t2 in mesh.range(a2, 1, 1) {
                let c = idx3(a, s, t1, t2);
                apply(&mut ul[c], shift(c, a, -1));
                apply(&mut ur[c], c);
            }
        }
    }
}

/// H-correction wavespeeds on `a`-faces: half the jump in normal velocity
/// plus the jump in fast speed across each corrected interface.
pub(super) fn eta_faces(
    mesh: &MeshBlock,
    cfg: &RunConfig,
    a: Axis,
    dir: &DirScratch,
    eta: &mut Array3<f64>,
) -> Result<()> {
    let (a1, a2) = (a.next(), a.next2());
    for s in mesh.range(a, 1, 2) {
        for t1 in mesh.range(a1, 1, 1) {
            for t2 in mesh.range(a2, 1, 1) {
                let c = idx3(a, s, t1, t2);
                let bx = dir.bface[c];
                let l = &dir.ul[c];
                let r = &dir.ur[c];
                let cfl = cfast_cons(l, bx, cfg.eos)
                    .map_err(|b| MhdError::at(b, c, "h-correction", mesh.nstep))?;
                let cfr = cfast_cons(r, bx, cfg.eos)
                    .map_err(|b| MhdError::at(b, c, "h-correction", mesh.nstep))?;
                let vl = l.mx / l.d;
                let vr = r.mx / r.d;
                eta[c] = 0.5 * ((vr - vl).abs() + (cfr - cfl).abs());
            }
        }
    }
    Ok(())
}

/// Dissipation floor at an `a`-face: the maximum eta over the face itself
/// and the transverse faces touching its two cells.
fn etah_at(mesh: &MeshBlock, a: Axis, eta: &[Array3<f64>; 3], c: Idx) -> f64 {
    let mut etah = eta[a.xyz()][c];
    for t in [a.next(), a.next2()] {
        if mesh.nx(t) == 1 {
            continue;
        }
        let e = &eta[t.xyz()];
        let cm = shift(c, a, -1);
        etah = etah
            .max(e[cm])
            .max(e[c])
            .max(e[shift(cm, t, 1)])
            .max(e[shift(c, t, 1)]);
    }
    etah
}

/// Flux pass over the corrected states, on active `a`-faces widened by one
/// transverse cell. Faces outside this region keep their provisional flux.
pub(super) fn final_fluxes(
    mesh: &MeshBlock,
    cfg: &RunConfig,
    solver: &Hlle,
    a: Axis,
    dir: &mut DirScratch,
    eta: &[Array3<f64>; 3],
) -> Result<()> {
    let (a1, a2) = (a.next(), a.next2());
    let DirScratch {
        ul,
        ur,
        flux,
        bface,
        ..
    } = dir;
    for s in mesh.range(a, 0, 1) {
        for t1 in mesh.range(a1, 1, 1) {
            for t2 in mesh.range(a2, 1, 1) {
                let c = idx3(a, s, t1, t2);
                let etah = if cfg.h_correction {
                    etah_at(mesh, a, eta, c)
                } else {
                    0.0
                };
                flux[c] = solver
                    .flux(cfg.eos, bface[c], &ul[c], &ur[c], etah)
                    .map_err(|b| MhdError::at(b, c, "corrected fluxes", mesh.nstep))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn coriolis_face_source_uses_the_owning_cell_momenta() {
        let mut mesh = MeshBlock::new([4, 4, 4], [0.25; 3], [0.0; 3], 4).unwrap();
        mesh.dt = 0.1;
        let omega = 0.5;
        for k in 0..mesh.shape().0 {
            for j in 0..mesh.shape().1 {
                for i in 0..mesh.shape().2 {
                    let u = &mut mesh.u[[k, j, i]];
                    u.d = 1.0;
                    u.m1 = i as f64;
                    u.m2 = 10.0 * j as f64;
                }
            }
        }

        for a in [Axis::X2, Axis::X3] {
            let mut ul = Array3::<Cons1D>::default(mesh.shape());
            let mut ur = Array3::<Cons1D>::default(mesh.shape());
            coriolis_face_correct(&mesh, omega, a, &mut ul, &mut ur);

            let om_dt = mesh.dt * omega;
            let f = mesh.lo(a) + 1;
            let c = idx3(a, f, mesh.lo(a.next()), mesh.lo(a.next2()));
            let cm = shift(c, a, -1);
            // Right state owns cell `c`, left state the cell one face back.
            assert_abs_diff_eq!(ur[c].mom(a, Axis::X1), om_dt * mesh.u[c].m2);
            assert_abs_diff_eq!(ur[c].mom(a, Axis::X2), -om_dt * mesh.u[c].m1);
            assert_abs_diff_eq!(ul[c].mom(a, Axis::X1), om_dt * mesh.u[cm].m2);
            assert_abs_diff_eq!(ul[c].mom(a, Axis::X2), -om_dt * mesh.u[cm].m1);
            assert_eq!(ur[c].mom(a, Axis::X3), 0.0);
            assert_eq!(ur[c].d, 0.0);
        }
    }
}
