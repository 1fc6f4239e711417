//! Interface reconstruction: cell averages to left/right face states.
//!
//! The contract mirrors the sweep stage's needs: given primitives `w` along
//! one line and the sweep-normal cell field `bxc`, fill `wl[f]`/`wr[f]` for
//! every face `f` in `lo..=hi+1`, where `wl[f]` is the state seen from cell
//! `f-1` and `wr[f]` the state seen from cell `f`. Implementations may read
//! `w` one cell beyond `lo-1..=hi+1`, which the caller's ghost margin
//! guarantees.

use crate::config::{Eos, ReconMethod};
use crate::eos::cfast;
use crate::types::{Prim1D, MAX_SCALARS};

const NVAR: usize = 7 + MAX_SCALARS;

pub trait Reconstruction: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    fn states(
        &self,
        w: &[Prim1D],
        bxc: &[f64],
        eos: Eos,
        dtodx: f64,
        lo: usize,
        hi: usize,
        wl: &mut [Prim1D],
        wr: &mut [Prim1D],
    );
}

// ============================================================================
// First order
// ============================================================================

/// Piecewise-constant states. First order; useful as a reference scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct DonorCell;

impl Reconstruction for DonorCell {
    fn states(
        &self,
        w: &[Prim1D],
        _bxc: &[f64],
        _eos: Eos,
        _dtodx: f64,
        lo: usize,
        hi: usize,
        wl: &mut [Prim1D],
        wr: &mut [Prim1D],
    ) {
        for f in lo..=hi + 1 {
            wl[f] = w[f - 1];
            wr[f] = w[f];
        }
    }
}

// ============================================================================
// Piecewise linear
// ============================================================================

/// Piecewise-linear reconstruction with monotonized-central limiting and a
/// half-step upwind advance of the face states by the extremal wavespeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plm;

#[inline]
fn unpack(w: &Prim1D) -> [f64; NVAR] {
    let mut a = [0.0; NVAR];
    a[0] = w.d;
    a[1] = w.vx;
    a[2] = w.vy;
    a[3] = w.vz;
    a[4] = w.p;
    a[5] = w.by;
    a[6] = w.bz;
    a[7..].copy_from_slice(&w.r);
    a
}

#[inline]
fn pack(a: &[f64; NVAR]) -> Prim1D {
    let mut r = [0.0; MAX_SCALARS];
    r.copy_from_slice(&a[7..]);
    Prim1D {
        d: a[0],
        vx: a[1],
        vy: a[2],
        vz: a[3],
        p: a[4],
        by: a[5],
        bz: a[6],
        r,
    }
}

/// Monotonized-central slope of two one-sided differences.
#[inline]
fn mc_limit(dl: f64, dr: f64) -> f64 {
    if dl * dr <= 0.0 {
        0.0
    } else {
        let c = 0.5 * (dl + dr);
        let bound = 2.0 * dl.abs().min(dr.abs());
        c.signum() * c.abs().min(bound)
    }
}

impl Reconstruction for Plm {
    fn states(
        &self,
        w: &[Prim1D],
        bxc: &[f64],
        eos: Eos,
        dtodx: f64,
        lo: usize,
        hi: usize,
        wl: &mut [Prim1D],
        wr: &mut [Prim1D],
    ) {
        for c in (lo - 1)..=(hi + 1) {
            let wm = unpack(&w[c - 1]);
            let wc = unpack(&w[c]);
            let wp = unpack(&w[c + 1]);

            let mut dw = [0.0; NVAR];
            for v in 0..NVAR {
                dw[v] = mc_limit(wc[v] - wm[v], wp[v] - wc[v]);
            }

            let cf = cfast(&w[c], bxc[c], eos);
            let lam_max = (w[c].vx + cf).max(0.0);
            let lam_min = (w[c].vx - cf).min(0.0);

            let mut left = [0.0; NVAR];
            let mut right = [0.0; NVAR];
            for v in 0..NVAR {
                left[v] = wc[v] + 0.5 * dw[v] * (1.0 - dtodx * lam_max);
                right[v] = wc[v] - 0.5 * dw[v] * (1.0 + dtodx * lam_min);
            }
            wl[c + 1] = pack(&left);
            wr[c] = pack(&right);
        }
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Zero-cost dispatch over the configured reconstruction.
#[derive(Debug, Clone, Copy)]
pub enum Reconstructor {
    DonorCell(DonorCell),
    Plm(Plm),
}

impl From<ReconMethod> for Reconstructor {
    fn from(m: ReconMethod) -> Self {
        match m {
            ReconMethod::DonorCell => Reconstructor::DonorCell(DonorCell),
            ReconMethod::Plm => Reconstructor::Plm(Plm),
        }
    }
}

impl Reconstruction for Reconstructor {
    fn states(
        &self,
        w: &[Prim1D],
        bxc: &[f64],
        eos: Eos,
        dtodx: f64,
        lo: usize,
        hi: usize,
        wl: &mut [Prim1D],
        wr: &mut [Prim1D],
    ) {
        match self {
            Reconstructor::DonorCell(r) => r.states(w, bxc, eos, dtodx, lo, hi, wl, wr),
            Reconstructor::Plm(r) => r.states(w, bxc, eos, dtodx, lo, hi, wl, wr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-14;
    const EOS: Eos = Eos::Adiabatic { gamma: 5.0 / 3.0 };

    fn line(f: impl Fn(usize) -> f64, n: usize) -> Vec<Prim1D> {
        (0..n)
            .map(|c| Prim1D {
                d: f(c),
                p: 1.0,
                ..Prim1D::default()
            })
            .collect()
    }

    #[test]
    fn mc_limiter_basics() {
        assert_eq!(mc_limit(1.0, -1.0), 0.0);
        assert_eq!(mc_limit(0.0, 1.0), 0.0);
        assert!((mc_limit(1.0, 1.0) - 1.0).abs() < TOL);
        // Steep one-sided difference is clipped to twice the shallow one.
        assert!((mc_limit(0.1, 10.0) - 0.2).abs() < TOL);
    }

    #[test]
    fn plm_is_exact_on_linear_data() {
        let n = 10;
        let w = line(|c| 1.0 + 0.1 * c as f64, n);
        let bxc = vec![0.0; n];
        let mut wl = vec![Prim1D::default(); n + 1];
        let mut wr = vec![Prim1D::default(); n + 1];
        // Zero dtodx isolates the spatial part.
        Plm.states(&w, &bxc, EOS, 0.0, 2, 6, &mut wl, &mut wr);
        for f in 2..=7 {
            let exact = 1.0 + 0.1 * (f as f64 - 0.5);
            assert!((wl[f].d - exact).abs() < TOL);
            assert!((wr[f].d - exact).abs() < TOL);
        }
    }

    #[test]
    fn plm_preserves_constant_states_under_advance() {
        let n = 10;
        let w = line(|_| 2.0, n);
        let bxc = vec![0.3; n];
        let mut wl = vec![Prim1D::default(); n + 1];
        let mut wr = vec![Prim1D::default(); n + 1];
        Plm.states(&w, &bxc, EOS, 0.4, 2, 6, &mut wl, &mut wr);
        for f in 2..=7 {
            assert!((wl[f].d - 2.0).abs() < TOL);
            assert!((wr[f].d - 2.0).abs() < TOL);
        }
    }

    #[test]
    fn donor_cell_copies_neighbors() {
        let n = 8;
        let w = line(|c| c as f64 + 1.0, n);
        let bxc = vec![0.0; n];
        let mut wl = vec![Prim1D::default(); n + 1];
        let mut wr = vec![Prim1D::default(); n + 1];
        DonorCell.states(&w, &bxc, EOS, 0.5, 2, 5, &mut wl, &mut wr);
        assert_eq!(wl[3].d, 3.0);
        assert_eq!(wr[3].d, 4.0);
    }
}
