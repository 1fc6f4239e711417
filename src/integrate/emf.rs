//! Cell-centered EMFs, the upwind corner-EMF average and the CT updates.
//!
//! Sign conventions, fixed by the rotated flux layout: for a sweep along
//! axis `s`, `flux.by = -E(s.next2())` and `flux.bz = +E(s.next())` at that
//! face. The corner average for edge axis `d` therefore consumes the fluxes
//! of the two transverse sweeps: `fp` from the `d.next()` sweep (whose `by`
//! is `-E_d`) and `fq` from the `d.next2()` sweep (whose `bz` is `+E_d`).

use ndarray::Array3;

use crate::mesh::MeshBlock;
use crate::types::{idx3, shift, Axis, Cons1D};

/// Cell-centered EMF `E_d = (B_{d1} v_{d2} - B_{d2} v_{d1})` from the
/// current cell-centered state, over the active zone widened by two cells.
pub(super) fn emf_cc_initial(mesh: &MeshBlock, d: Axis, out: &mut Array3<f64>) {
    let (d1, d2) = (d.next(), d.next2());
    for k in mesh.range(Axis::X3, 2, 2) {
        for j in mesh.range(Axis::X2, 2, 2) {
            for i in mesh.range(Axis::X1, 2, 2) {
                let u = &mesh.u[[k, j, i]];
                out[[k, j, i]] = (u.bc(d1) * u.m(d2) - u.bc(d2) * u.m(d1)) / u.d;
            }
        }
    }
}

/// Integrate the face-centered EMFs to cell corners with the upwind
/// average of Gardiner & Stone: each of the four one-sided differences
/// between a face EMF and the adjacent cell-centered EMF is selected by the
/// sign of the mass flux transverse to it.
pub(super) fn corner_emf(
    mesh: &MeshBlock,
    d: Axis,
    fp: &Array3<Cons1D>,
    fq: &Array3<Cons1D>,
    cc: &Array3<f64>,
    emf: &mut Array3<f64>,
) {
    let (d1, d2) = (d.next(), d.next2());

    // Pick the one-sided difference upwind of a mass flux, averaging the
    // two sides at a stagnation point.
    let sel = |m: f64, pos: f64, neg: f64| -> f64 {
        if m > 0.0 {
            pos
        } else if m < 0.0 {
            neg
        } else {
            0.5 * (pos + neg)
        }
    };

    for s in mesh.range(d, 2, 2) {
        for t1 in mesh.range(d1, 1, 2) {
            for t2 in mesh.range(d2, 1, 2) {
                let c = idx3(d, s, t1, t2);
                let cm1 = shift(c, d1, -1);
                let cm2 = shift(c, d2, -1);
                let cm12 = shift(cm1, d2, -1);

                // Differences along d2, upwinded by the d1-sweep mass flux.
                let de_l2 = sel(
                    fp[cm2].d,
                    fq[cm1].bz - cc[cm12],
                    fq[c].bz - cc[cm2],
                );
                let de_r2 = sel(fp[c].d, fq[cm1].bz - cc[cm1], fq[c].bz - cc[c]);

                // Differences along d1, upwinded by the d2-sweep mass flux.
                let de_l1 = sel(
                    fq[cm1].d,
                    -fp[cm2].by - cc[cm12],
                    -fp[c].by - cc[cm1],
                );
                let de_r1 = sel(fq[c].d, -fp[cm2].by - cc[cm2], -fp[c].by - cc[c]);

                emf[c] = 0.25
                    * (fq[c].bz + fq[cm1].bz - fp[c].by - fp[cm2].by
                        + de_l1
                        + de_r1
                        + de_l2
                        + de_r2);
            }
        }
    }
}

/// Half-dt CT update of the working normal face field for face axis `a`:
/// `B_a += (dt/2) * (curl E)_a` on faces `lo-1..=hi+2` (normal) by
/// `lo-1..=hi+1` (transverse). Curl terms along degenerate axes vanish.
pub(super) fn ct_half(mesh: &MeshBlock, emf: &[Array3<f64>; 3], bface: &mut Array3<f64>, a: Axis) {
    let (a1, a2) = (a.next(), a.next2());
    for s in mesh.range(a, 1, 2) {
        for t1 in mesh.range(a1, 1, 1) {
            for t2 in mesh.range(a2, 1, 1) {
                let c = idx3(a, s, t1, t2);
                let mut dbdt = 0.0;
                if mesh.nx(a2) > 1 {
                    let e = &emf[a1.xyz()];
                    dbdt += 0.5 * mesh.dtodx(a2) * (e[shift(c, a2, 1)] - e[c]);
                }
                if mesh.nx(a1) > 1 {
                    let e = &emf[a2.xyz()];
                    dbdt -= 0.5 * mesh.dtodx(a1) * (e[shift(c, a1, 1)] - e[c]);
                }
                bface[c] += dbdt;
            }
        }
    }
}

/// Full-dt CT update of the mesh face field for face axis `a`, over active
/// faces `lo..=hi+1` (normal) by the active transverse extent.
pub(super) fn ct_full(mesh: &mut MeshBlock, emf: &[Array3<f64>; 3], a: Axis) {
    let (a1, a2) = (a.next(), a.next2());
    let q1 = mesh.dtodx(a1);
    let q2 = mesh.dtodx(a2);
    let n1 = mesh.nx(a1) > 1;
    let n2 = mesh.nx(a2) > 1;
    let range_a = mesh.range(a, 0, 1);
    let range_t1 = mesh.range(a1, 0, 0);
    let range_t2 = mesh.range(a2, 0, 0);
    let bface = mesh.bface_mut(a);
    for s in range_a {
        for t1 in range_t1.clone() {
            for t2 in range_t2.clone() {
                let c = idx3(a, s, t1, t2);
                let mut dbdt = 0.0;
                if n2 {
                    let e = &emf[a1.xyz()];
                    dbdt += q2 * (e[shift(c, a2, 1)] - e[c]);
                }
                if n1 {
                    let e = &emf[a2.xyz()];
                    dbdt -= q1 * (e[shift(c, a1, 1)] - e[c]);
                }
                bface[c] += dbdt;
            }
        }
    }
}
