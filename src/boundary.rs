//! Ghost-zone fill for the cell-centered state and the face fields.
//!
//! Boundaries are applied in fixed x1 -> x2 -> x3 order; each later axis
//! sweeps the full already-filled extent of the earlier ones, which is what
//! fills edge and corner ghosts by sequential composition. Degenerate axes
//! are skipped.
//!
//! [`apply`] returns a [`HaloValid`] token. The integrator's `step` consumes
//! it, so a step cannot be compiled without a preceding ghost fill.

use crate::config::RunConfig;
use crate::error::{MhdError, Result};
use crate::mesh::MeshBlock;
use crate::types::{idx3, Axis};

/// Proof value that every ghost zone of a block is current.
///
/// Not `Clone`: one fill, one step.
#[derive(Debug)]
pub struct HaloValid(());

/// Physical boundary-condition kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    /// Mirror with reflected normal momentum. The normal field obeys a
    /// perfectly conducting wall with zero normal component: the wall face
    /// value is zeroed and ghost faces get odd parity.
    Reflecting,
    /// Zero-gradient copy of the edge cell and faces.
    Outflow,
    /// Wrap-around copy from the opposite active zone.
    Periodic,
    /// Delegated to the [`UserBoundary`] hook passed to [`apply`].
    User,
}

/// Which end of an axis a boundary sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Inner,
    Outer,
}

/// Custom ghost fill for [`BoundaryKind::User`] faces. The implementation
/// must fill both the cell-centered state and all face fields for the
/// named axis and side.
pub trait UserBoundary {
    fn fill(&self, mesh: &mut MeshBlock, axis: Axis, side: Side);
}

/// Per-face boundary selection, `(inner, outer)` per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryConfig {
    pub x1: (BoundaryKind, BoundaryKind),
    pub x2: (BoundaryKind, BoundaryKind),
    pub x3: (BoundaryKind, BoundaryKind),
}

impl BoundaryConfig {
    pub fn periodic() -> Self {
        Self::uniform(BoundaryKind::Periodic)
    }

    pub fn uniform(kind: BoundaryKind) -> Self {
        BoundaryConfig {
            x1: (kind, kind),
            x2: (kind, kind),
            x3: (kind, kind),
        }
    }

    fn kind(&self, axis: Axis, side: Side) -> BoundaryKind {
        let pair = match axis {
            Axis::X1 => self.x1,
            Axis::X2 => self.x2,
            Axis::X3 => self.x3,
        };
        match side {
            Side::Inner => pair.0,
            Side::Outer => pair.1,
        }
    }
}

/// Fill all ghost zones and hand back the halo token.
pub fn apply(
    mesh: &mut MeshBlock,
    bc: &BoundaryConfig,
    cfg: &RunConfig,
    user: Option<&dyn UserBoundary>,
) -> Result<HaloValid> {
    for axis in Axis::all() {
        if mesh.nx(axis) == 1 {
            continue;
        }
        for side in [Side::Inner, Side::Outer] {
            match bc.kind(axis, side) {
                BoundaryKind::User => match user {
                    Some(u) => u.fill(mesh, axis, side),
                    None => {
                        return Err(MhdError::Config(format!(
                            "user boundary on {axis} {side:?} but no hook supplied"
                        )))
                    }
                },
                kind => fill_side(mesh, cfg, axis, side, kind),
            }
        }
    }
    Ok(HaloValid(()))
}

// ============================================================================
// Fill machinery
// ============================================================================

/// Index range swept along a transverse axis `t` while filling ghosts along
/// `axis`: earlier axes are already ghost-filled and are covered in full,
/// later axes only over their active zone (optionally one extra face row).
fn transverse_range(
    mesh: &MeshBlock,
    axis: Axis,
    t: Axis,
    extra_face: bool,
) -> std::ops::RangeInclusive<usize> {
    if mesh.nx(t) == 1 {
        return 0..=0;
    }
    if t.dim() > axis.dim() {
        // t comes earlier in x1,x2,x3 order (larger dim() means faster index).
        0..=(mesh.nx(t) + 2 * mesh.nghost() - 1)
    } else {
        let hi = mesh.hi(t) + usize::from(extra_face);
        mesh.lo(t)..=hi
    }
}

fn fill_side(mesh: &mut MeshBlock, cfg: &RunConfig, axis: Axis, side: Side, kind: BoundaryKind) {
    let nghost = mesh.nghost();
    let (lo, hi) = (mesh.lo(axis), mesh.hi(axis));
    let t1 = axis.next();
    let t2 = axis.next2();

    // Ghost target and cell-centered source index along `axis`, per depth.
    let cell_pair = |g: usize| -> (usize, usize) {
        match (side, kind) {
            (Side::Inner, BoundaryKind::Reflecting) => (lo - g, lo + (g - 1)),
            (Side::Inner, BoundaryKind::Outflow) => (lo - g, lo),
            (Side::Inner, BoundaryKind::Periodic) => (lo - g, hi - (g - 1)),
            (Side::Outer, BoundaryKind::Reflecting) => (hi + g, hi - (g - 1)),
            (Side::Outer, BoundaryKind::Outflow) => (hi + g, hi),
            (Side::Outer, BoundaryKind::Periodic) => (hi + g, lo + (g - 1)),
            (_, BoundaryKind::User) => unreachable!("user faces handled by the hook"),
        }
    };

    // Cell-centered state.
    for g in 1..=nghost {
        let (tgt, src) = cell_pair(g);
        for p1 in transverse_range(mesh, axis, t1, false) {
            for p2 in transverse_range(mesh, axis, t2, false) {
                let ti = idx3(axis, tgt, p1, p2);
                let si = idx3(axis, src, p1, p2);
                let mut c = mesh.u[si];
                if kind == BoundaryKind::Reflecting {
                    *c.m_mut(axis) = -c.m(axis);
                    *c.bc_mut(axis) = -c.bc(axis);
                }
                mesh.u[ti] = c;
            }
        }
    }

    if !cfg.mhd {
        return;
    }

    // Tangential face fields: same cell mapping, one extra face row along
    // their own staggered axis when that axis is filled later.
    for comp in [t1, t2] {
        for g in 1..=nghost {
            let (tgt, src) = cell_pair(g);
            for p1 in transverse_range(mesh, axis, t1, comp == t1) {
                for p2 in transverse_range(mesh, axis, t2, comp == t2) {
                    let ti = idx3(axis, tgt, p1, p2);
                    let si = idx3(axis, src, p1, p2);
                    let v = mesh.bface(comp)[si];
                    mesh.bface_mut(comp)[ti] = v;
                }
            }
        }
    }

    // Normal face field: staggered, so the source map differs and the outer
    // face `hi+1` is evolved data, not a boundary value.
    let face_pairs: Vec<(usize, usize, f64)> = match (side, kind) {
        (Side::Inner, BoundaryKind::Reflecting) => {
            (1..=nghost).map(|g| (lo - g, lo + g, -1.0)).collect()
        }
        (Side::Inner, BoundaryKind::Outflow) => (1..=nghost).map(|g| (lo - g, lo, 1.0)).collect(),
        (Side::Inner, BoundaryKind::Periodic) => {
            (1..=nghost).map(|g| (lo - g, hi + 1 - g, 1.0)).collect()
        }
        (Side::Outer, BoundaryKind::Reflecting) => {
            (2..=nghost).map(|g| (hi + g, hi - (g - 2), -1.0)).collect()
        }
        (Side::Outer, BoundaryKind::Outflow) => {
            (2..=nghost).map(|g| (hi + g, hi + 1, 1.0)).collect()
        }
        (Side::Outer, BoundaryKind::Periodic) => {
            (2..=nghost).map(|g| (hi + g, lo + (g - 1), 1.0)).collect()
        }
        (_, BoundaryKind::User) => unreachable!(),
    };
    for (tgt, src, sign) in face_pairs {
        for p1 in transverse_range(mesh, axis, t1, false) {
            for p2 in transverse_range(mesh, axis, t2, false) {
                let ti = idx3(axis, tgt, p1, p2);
                let si = idx3(axis, src, p1, p2);
                let v = mesh.bface(axis)[si];
                mesh.bface_mut(axis)[ti] = sign * v;
            }
        }
    }
    if kind == BoundaryKind::Reflecting {
        let wall = match side {
            Side::Inner => lo,
            Side::Outer => hi + 1,
        };
        for p1 in transverse_range(mesh, axis, t1, false) {
            for p2 in transverse_range(mesh, axis, t2, false) {
                let ti = idx3(axis, wall, p1, p2);
                mesh.bface_mut(axis)[ti] = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;

    fn mesh_1d(n: usize) -> MeshBlock {
        let mut m = MeshBlock::new([n, 1, 1], [1.0; 3], [0.0; 3], 4).unwrap();
        for i in m.range(Axis::X1, 0, 0) {
            m.u[[0, 0, i]].d = (i - m.lo(Axis::X1) + 1) as f64;
            m.u[[0, 0, i]].m1 = 1.0;
            m.b1i[[0, 0, i]] = i as f64;
        }
        let hi = m.hi(Axis::X1);
        m.b1i[[0, 0, hi + 1]] = (hi + 1) as f64;
        m
    }

    #[test]
    fn periodic_wraps_cells_and_faces() {
        let cfg = RunConfig::adiabatic(1.4);
        let mut m = mesh_1d(8);
        let (lo, hi) = (m.lo(Axis::X1), m.hi(Axis::X1));
        apply(&mut m, &BoundaryConfig::periodic(), &cfg, None).unwrap();
        assert_eq!(m.u[[0, 0, lo - 1]].d, m.u[[0, 0, hi]].d);
        assert_eq!(m.u[[0, 0, hi + 2]].d, m.u[[0, 0, lo + 1]].d);
        assert_eq!(m.b1i[[0, 0, lo - 1]], m.b1i[[0, 0, hi]]);
        // hi+1 is evolved data and stays untouched.
        assert_eq!(m.b1i[[0, 0, hi + 1]], (hi + 1) as f64);
        assert_eq!(m.b1i[[0, 0, hi + 2]], m.b1i[[0, 0, lo + 1]]);
    }

    #[test]
    fn reflecting_negates_normal_momentum_and_zeroes_the_wall_face() {
        let cfg = RunConfig::adiabatic(1.4);
        let mut m = mesh_1d(8);
        let (lo, hi) = (m.lo(Axis::X1), m.hi(Axis::X1));
        apply(
            &mut m,
            &BoundaryConfig::uniform(BoundaryKind::Reflecting),
            &cfg,
            None,
        )
        .unwrap();
        assert_eq!(m.u[[0, 0, lo - 1]].m1, -m.u[[0, 0, lo]].m1);
        assert_eq!(m.u[[0, 0, lo - 1]].d, m.u[[0, 0, lo]].d);
        assert_eq!(m.b1i[[0, 0, lo]], 0.0);
        assert_eq!(m.b1i[[0, 0, hi + 1]], 0.0);
        assert_eq!(m.b1i[[0, 0, lo - 2]], -m.b1i[[0, 0, lo + 2]]);
    }

    #[test]
    fn outflow_copies_the_edge() {
        let cfg = RunConfig::adiabatic(1.4);
        let mut m = mesh_1d(8);
        let (lo, hi) = (m.lo(Axis::X1), m.hi(Axis::X1));
        apply(
            &mut m,
            &BoundaryConfig::uniform(BoundaryKind::Outflow),
            &cfg,
            None,
        )
        .unwrap();
        for g in 1..=4 {
            assert_eq!(m.u[[0, 0, lo - g]].d, m.u[[0, 0, lo]].d);
            assert_eq!(m.u[[0, 0, hi + g]].d, m.u[[0, 0, hi]].d);
        }
    }

    #[test]
    fn missing_user_hook_is_a_config_error() {
        let cfg = RunConfig::adiabatic(1.4);
        let mut m = mesh_1d(8);
        let bc = BoundaryConfig::uniform(BoundaryKind::User);
        assert!(apply(&mut m, &bc, &cfg, None).is_err());
    }
}
