//! Half-step density and cell-centered EMFs, the conservative update and
//! the full-dt gravity and shearing-box correctors.

use ndarray::Array3;

use crate::config::{RunConfig, ShearingBox, StaticPotential};
use crate::mesh::MeshBlock;
use crate::types::{shift, Axis, Cons1D, Idx};

/// Half-step density from the provisional fluxes, over the active zone
/// widened by one cell.
pub(super) fn half_density(
    mesh: &MeshBlock,
    fluxes: &[&Array3<Cons1D>; 3],
    dhalf: &mut Array3<f64>,
) {
    for k in mesh.range(Axis::X3, 1, 1) {
        for j in mesh.range(Axis::X2, 1, 1) {
            for i in mesh.range(Axis::X1, 1, 1) {
                let c = [k, j, i];
                let mut d = mesh.u[c].d;
                for b in Axis::all() {
                    if mesh.nx(b) == 1 {
                        continue;
                    }
                    let f = fluxes[b.xyz()];
                    d -= 0.5 * mesh.dtodx(b) * (f[shift(c, b, 1)].d - f[c].d);
                }
                dhalf[c] = d;
            }
        }
    }
}

/// Cell-centered EMFs at the half timestep, for the edge axes in `which`:
/// momenta are advanced by the provisional flux gradients plus half-dt
/// gravity (and Coriolis) sources, and the field comes from the half-dt CT
/// face values.
#[allow(clippy::too_many_arguments)]
pub(super) fn emf_cc_half(
    mesh: &MeshBlock,
    cfg: &RunConfig,
    fluxes: &[&Array3<Cons1D>; 3],
    bfaces: &[&Array3<f64>; 3],
    dhalf: &Array3<f64>,
    emf_cc: &mut [Array3<f64>; 3],
    which: &[Axis],
) {
    for k in mesh.range(Axis::X3, 1, 1) {
        for j in mesh.range(Axis::X2, 1, 1) {
            for i in mesh.range(Axis::X1, 1, 1) {
                let c = [k, j, i];
                let u = &mesh.u[c];
                let (x1, x2, x3) = mesh.cc_pos(k, j, i);
                let xc = [x1, x2, x3];

                let mut m = [0.0; 3];
                let mut bc = [0.0; 3];
                for g in Axis::all() {
                    let mut mg = u.m(g);
                    for b in Axis::all() {
                        if mesh.nx(b) == 1 {
                            continue;
                        }
                        let f = fluxes[b.xyz()];
                        mg -= 0.5
                            * mesh.dtodx(b)
                            * (f[shift(c, b, 1)].mom(b, g) - f[c].mom(b, g));
                    }
                    if mesh.nx(g) > 1 {
                        if let Some(phi) = cfg.gravity.as_ref() {
                            let mut xr = xc;
                            xr[g.xyz()] += 0.5 * mesh.dx(g);
                            let mut xl = xc;
                            xl[g.xyz()] -= 0.5 * mesh.dx(g);
                            let grad = phi.phi(xr[0], xr[1], xr[2])
                                - phi.phi(xl[0], xl[1], xl[2]);
                            mg -= 0.5 * mesh.dtodx(g) * grad * u.d;
                        }
                        let bf = bfaces[g.xyz()];
                        bc[g.xyz()] = 0.5 * (bf[c] + bf[shift(c, g, 1)]);
                    }
                    m[g.xyz()] = mg;
                }

                if let Some(sb) = cfg.shearing_box {
                    m[0] += mesh.dt * sb.omega * u.m2;
                    m[1] -= mesh.dt * sb.omega * u.m1;
                }

                for &d in which {
                    let (d1, d2) = (d.next(), d.next2());
                    emf_cc[d.xyz()][c] = (bc[d1.xyz()] * m[d2.xyz()]
                        - bc[d2.xyz()] * m[d1.xyz()])
                        / dhalf[c];
                }
            }
        }
    }
}

/// Apply the full-dt flux divergence along `b` to the cell-centered state
/// over the active zone. The tangential field components of the flux evolve
/// the cell-centered field; in 3-D that value is replaced by the face
/// average afterwards, in lower dimensions it is the evolved value for the
/// out-of-plane components.
pub(super) fn apply_flux_divergence(
    mesh: &mut MeshBlock,
    cfg: &RunConfig,
    b: Axis,
    flux: &Array3<Cons1D>,
) {
    let q = mesh.dtodx(b);
    let adiabatic = cfg.eos.is_adiabatic();
    let (b1, b2) = (b.next(), b.next2());
    for k in mesh.range(Axis::X3, 0, 0) {
        for j in mesh.range(Axis::X2, 0, 0) {
            for i in mesh.range(Axis::X1, 0, 0) {
                let c = [k, j, i];
                let f0 = &flux[c];
                let f1 = &flux[shift(c, b, 1)];
                let u = &mut mesh.u[c];
                u.d -= q * (f1.d - f0.d);
                for g in Axis::all() {
                    *u.m_mut(g) -= q * (f1.mom(b, g) - f0.mom(b, g));
                }
                if adiabatic {
                    u.e -= q * (f1.e - f0.e);
                }
                if cfg.mhd {
                    *u.bc_mut(b1) -= q * (f1.by - f0.by);
                    *u.bc_mut(b2) -= q * (f1.bz - f0.bz);
                }
                for n in 0..cfg.n_scalars {
                    u.s[n] -= q * (f1.s[n] - f0.s[n]);
                }
            }
        }
    }
}

/// Full-dt gravitational source at second order: momentum from the
/// half-step density, energy from the face-averaged work done by the mass
/// fluxes.
pub(super) fn gravity_correct(
    mesh: &mut MeshBlock,
    cfg: &RunConfig,
    phi: &dyn StaticPotential,
    dhalf: &Array3<f64>,
    fluxes: &[&Array3<Cons1D>; 3],
) {
    let adiabatic = cfg.eos.is_adiabatic();
    for k in mesh.range(Axis::X3, 0, 0) {
        for j in mesh.range(Axis::X2, 0, 0) {
            for i in mesh.range(Axis::X1, 0, 0) {
                let c = [k, j, i];
                let (x1, x2, x3) = mesh.cc_pos(k, j, i);
                let xc = [x1, x2, x3];
                let phic = phi.phi(x1, x2, x3);
                for g in Axis::all() {
                    if mesh.nx(g) == 1 {
                        continue;
                    }
                    let q = mesh.dtodx(g);
                    let mut xr = xc;
                    xr[g.xyz()] += 0.5 * mesh.dx(g);
                    let mut xl = xc;
                    xl[g.xyz()] -= 0.5 * mesh.dx(g);
                    let phir = phi.phi(xr[0], xr[1], xr[2]);
                    let phil = phi.phi(xl[0], xl[1], xl[2]);
                    let f = fluxes[g.xyz()];
                    let de = if adiabatic {
                        q * (f[c].d * (phic - phil) + f[shift(c, g, 1)].d * (phir - phic))
                    } else {
                        0.0
                    };
                    let u = &mut mesh.u[c];
                    *u.m_mut(g) -= q * (phir - phil) * dhalf[c];
                    u.e -= de;
                }
            }
        }
    }
}

/// Full-dt Coriolis and tidal update in the shearing-box frame, using a
/// Crank-Nicholson discretization of the coupled momentum-fluctuation
/// system, plus the vertical gravity and energy sources from the enrolled
/// effective potential.
pub(super) fn shearing_correct(
    mesh: &mut MeshBlock,
    cfg: &RunConfig,
    sb: ShearingBox,
    dhalf: &Array3<f64>,
    fluxes: &[&Array3<Cons1D>; 3],
) {
    let om = sb.omega;
    let om_dt = om * mesh.dt;
    let fact = om_dt / (1.0 + 0.25 * om_dt * om_dt);
    let adiabatic = cfg.eos.is_adiabatic();
    let [fx1, fx2, fx3] = *fluxes;
    let hq1 = 0.5 * mesh.dtodx(Axis::X1);
    let hq2 = 0.5 * mesh.dtodx(Axis::X2);
    let hq3 = 0.5 * mesh.dtodx(Axis::X3);
    let dx1 = mesh.dx(Axis::X1);

    for k in mesh.range(Axis::X3, 0, 0) {
        for j in mesh.range(Axis::X2, 0, 0) {
            for i in mesh.range(Axis::X1, 0, 0) {
                let c: Idx = [k, j, i];
                let (x1, x2, x3) = mesh.cc_pos(k, j, i);
                let (c1, c2, c3) = (
                    shift(c, Axis::X1, 1),
                    shift(c, Axis::X2, 1),
                    shift(c, Axis::X3, 1),
                );

                let u = &mesh.u[c];
                let m1n = u.m1;
                let dm2n = u.m2 + u.d * 1.5 * om * x1;

                // Fluxes of the azimuthal momentum fluctuation dM2 through
                // this cell's six faces.
                let fl1 = fx1[c].my + 1.5 * om * (x1 - 0.5 * dx1) * fx1[c].d;
                let fr1 = fx1[c1].my + 1.5 * om * (x1 + 0.5 * dx1) * fx1[c1].d;
                let fl2 = fx2[c].mx + 1.5 * om * x1 * fx2[c].d;
                let fr2 = fx2[c2].mx + 1.5 * om * x1 * fx2[c2].d;
                let fl3 = fx3[c].mz + 1.5 * om * x1 * fx3[c].d;
                let fr3 = fx3[c3].mz + 1.5 * om * x1 * fx3[c3].d;

                // Forward-Euler half-step of M1 and dM2.
                let m1e = m1n
                    - hq1 * (fx1[c1].mx - fx1[c].mx)
                    - hq2 * (fx2[c2].mz - fx2[c].mz)
                    - hq3 * (fx3[c3].my - fx3[c].my);
                let dm2e = dm2n - hq1 * (fr1 - fl1) - hq2 * (fr2 - fl2) - hq3 * (fr3 - fl3);

                let dm1 = (2.0 * dm2e - 0.5 * om_dt * m1e) * fact;
                let dm2 = -0.5 * (m1e + om_dt * dm2e) * fact
                    - 0.75 * om_dt * (fx1[c].d + fx1[c1].d);

                // Vertical gravity and the energy sources of the enrolled
                // effective potential (which carries the tidal term).
                let (mut dm3, mut de) = (0.0, 0.0);
                if let Some(phi) = cfg.gravity.as_ref() {
                    let phic = phi.phi(x1, x2, x3);
                    let phir = phi.phi(x1, x2, x3 + 0.5 * mesh.dx(Axis::X3));
                    let phil = phi.phi(x1, x2, x3 - 0.5 * mesh.dx(Axis::X3));
                    dm3 = -mesh.dtodx(Axis::X3) * (phir - phil) * dhalf[c];
                    if adiabatic {
                        de -= mesh.dtodx(Axis::X3)
                            * (fx3[c].d * (phic - phil) + fx3[c3].d * (phir - phic));
                        let p1r = phi.phi(x1 + 0.5 * dx1, x2, x3);
                        let p1l = phi.phi(x1 - 0.5 * dx1, x2, x3);
                        de -= mesh.dtodx(Axis::X1)
                            * (fx1[c].d * (phic - p1l) + fx1[c1].d * (p1r - phic));
                        let p2r = phi.phi(x1, x2 + 0.5 * mesh.dx(Axis::X2), x3);
                        let p2l = phi.phi(x1, x2 - 0.5 * mesh.dx(Axis::X2), x3);
                        de -= mesh.dtodx(Axis::X2)
                            * (fx2[c].d * (phic - p2l) + fx2[c2].d * (p2r - phic));
                    }
                }

                let u = &mut mesh.u[c];
                u.m1 += dm1;
                u.m2 += dm2;
                u.m3 += dm3;
                u.e += de;
            }
        }
    }
}
