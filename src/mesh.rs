//! Mesh block: cell-centered state, staggered face fields and geometry.
//!
//! A block is a rectangular subdomain with `nghost` ghost cells around the
//! active zone in every non-degenerate direction. Face field `b1i[[k,j,i]]`
//! lives on the left (x1-minus) face of cell `(k,j,i)`, and likewise for
//! `b2i`/`b3i`; the staggering means face index `hi+1` is the last evolved
//! face along the matching axis.

use ndarray::Array3;

use crate::error::{MhdError, Result};
use crate::types::{Axis, ConsCell};

/// Minimum ghost margin required by the correction stencils.
pub const MIN_NGHOST: usize = 4;

/// One structured mesh block owning its state arrays.
#[derive(Debug, Clone)]
pub struct MeshBlock {
    nx: [usize; 3],
    dx: [f64; 3],
    xmin: [f64; 3],
    nghost: usize,
    lo: [usize; 3],
    hi: [usize; 3],

    /// Simulation time at the start of the current step.
    pub time: f64,
    /// Timestep to advance by; set by the caller before each step.
    pub dt: f64,
    /// Completed step count.
    pub nstep: usize,

    /// Cell-centered conserved state, indexed `[[k, j, i]]`.
    pub u: Array3<ConsCell>,
    /// Face-centered fields, same index layout as `u`.
    pub b1i: Array3<f64>,
    pub b2i: Array3<f64>,
    pub b3i: Array3<f64>,
}

impl MeshBlock {
    /// Allocate a zeroed block.
    ///
    /// `nx` are active cell counts in (x1, x2, x3) order. Degenerate axes
    /// (count 1) carry no ghost cells and must trail the non-degenerate
    /// ones, so the supported shapes are 3-D, 2-D in (x1,x2) and 1-D in x1.
    pub fn new(nx: [usize; 3], dx: [f64; 3], xmin: [f64; 3], nghost: usize) -> Result<Self> {
        if nx[0] < 2 {
            return Err(MhdError::Config(format!(
                "x1 must have at least 2 active cells, got {}",
                nx[0]
            )));
        }
        if nx[1] == 1 && nx[2] > 1 {
            return Err(MhdError::Config(
                "degenerate x2 with active x3 is unsupported".into(),
            ));
        }
        if nghost < MIN_NGHOST {
            return Err(MhdError::Config(format!(
                "nghost must be at least {MIN_NGHOST}, got {nghost}"
            )));
        }
        for (a, &d) in dx.iter().enumerate() {
            if d <= 0.0 {
                return Err(MhdError::Config(format!(
                    "dx{} must be positive, got {d}",
                    a + 1
                )));
            }
        }

        let total = |n: usize| if n > 1 { n + 2 * nghost } else { 1 };
        let nt = [total(nx[2]), total(nx[1]), total(nx[0])]; // (k, j, i)

        let lo_of = |n: usize| if n > 1 { nghost } else { 0 };
        let lo = [lo_of(nx[0]), lo_of(nx[1]), lo_of(nx[2])];
        let hi = [lo[0] + nx[0] - 1, lo[1] + nx[1] - 1, lo[2] + nx[2] - 1];

        Ok(MeshBlock {
            nx,
            dx,
            xmin,
            nghost,
            lo,
            hi,
            time: 0.0,
            dt: 0.0,
            nstep: 0,
            u: Array3::default(nt),
            b1i: Array3::zeros(nt),
            b2i: Array3::zeros(nt),
            b3i: Array3::zeros(nt),
        })
    }

    #[inline]
    pub fn nghost(&self) -> usize {
        self.nghost
    }

    /// Active cell count along an axis.
    #[inline]
    pub fn nx(&self, a: Axis) -> usize {
        match a {
            Axis::X1 => self.nx[0],
            Axis::X2 => self.nx[1],
            Axis::X3 => self.nx[2],
        }
    }

    #[inline]
    pub fn dx(&self, a: Axis) -> f64 {
        match a {
            Axis::X1 => self.dx[0],
            Axis::X2 => self.dx[1],
            Axis::X3 => self.dx[2],
        }
    }

    /// First active index along an axis.
    #[inline]
    pub fn lo(&self, a: Axis) -> usize {
        match a {
            Axis::X1 => self.lo[0],
            Axis::X2 => self.lo[1],
            Axis::X3 => self.lo[2],
        }
    }

    /// Last active index along an axis.
    #[inline]
    pub fn hi(&self, a: Axis) -> usize {
        match a {
            Axis::X1 => self.hi[0],
            Axis::X2 => self.hi[1],
            Axis::X3 => self.hi[2],
        }
    }

    /// Active index range widened by `pad_lo`/`pad_hi` cells, collapsed to a
    /// single index on degenerate axes.
    #[inline]
    pub fn range(&self, a: Axis, pad_lo: usize, pad_hi: usize) -> std::ops::RangeInclusive<usize> {
        if self.nx(a) > 1 {
            (self.lo(a) - pad_lo)..=(self.hi(a) + pad_hi)
        } else {
            0..=0
        }
    }

    /// Number of non-degenerate dimensions (1, 2 or 3).
    #[inline]
    pub fn dims(&self) -> usize {
        1 + (self.nx[1] > 1) as usize + (self.nx[2] > 1) as usize
    }

    #[inline]
    pub fn dtodx(&self, a: Axis) -> f64 {
        self.dt / self.dx(a)
    }

    /// Cell-center position of cell `(k, j, i)`.
    #[inline]
    pub fn cc_pos(&self, k: usize, j: usize, i: usize) -> (f64, f64, f64) {
        let pos = |x0: f64, dx: f64, idx: usize, lo: usize| {
            x0 + (idx as f64 - lo as f64 + 0.5) * dx
        };
        (
            pos(self.xmin[0], self.dx[0], i, self.lo[0]),
            pos(self.xmin[1], self.dx[1], j, self.lo[1]),
            pos(self.xmin[2], self.dx[2], k, self.lo[2]),
        )
    }

    /// Face field array along an axis.
    #[inline]
    pub fn bface(&self, a: Axis) -> &Array3<f64> {
        match a {
            Axis::X1 => &self.b1i,
            Axis::X2 => &self.b2i,
            Axis::X3 => &self.b3i,
        }
    }

    #[inline]
    pub fn bface_mut(&mut self, a: Axis) -> &mut Array3<f64> {
        match a {
            Axis::X1 => &mut self.b1i,
            Axis::X2 => &mut self.b2i,
            Axis::X3 => &mut self.b3i,
        }
    }

    /// Total allocated shape `(nk, nj, ni)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        let s = self.u.dim();
        (s.0, s.1, s.2)
    }

    /// Set every cell-centered field component to the average of its two
    /// bounding face values. Used at initialization; the integrator performs
    /// the same consolidation at the end of each step.
    pub fn consolidate_bcc(&mut self) {
        for k in self.range(Axis::X3, 0, 0) {
            for j in self.range(Axis::X2, 0, 0) {
                for i in self.range(Axis::X1, 0, 0) {
                    self.u[[k, j, i]].b1c = 0.5 * (self.b1i[[k, j, i]] + self.b1i[[k, j, i + 1]]);
                    self.u[[k, j, i]].b2c = if self.nx[1] > 1 {
                        0.5 * (self.b2i[[k, j, i]] + self.b2i[[k, j + 1, i]])
                    } else {
                        self.b2i[[k, j, i]]
                    };
                    self.u[[k, j, i]].b3c = if self.nx[2] > 1 {
                        0.5 * (self.b3i[[k, j, i]] + self.b3i[[k + 1, j, i]])
                    } else {
                        self.b3i[[k, j, i]]
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_and_bounds() {
        let m = MeshBlock::new([8, 4, 1], [0.5, 0.5, 1.0], [0.0; 3], 4).unwrap();
        assert_eq!(m.shape(), (1, 12, 16));
        assert_eq!(m.lo(Axis::X1), 4);
        assert_eq!(m.hi(Axis::X1), 11);
        assert_eq!(m.lo(Axis::X3), 0);
        assert_eq!(m.dims(), 2);
        assert_eq!(m.range(Axis::X3, 2, 2), 0..=0);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(MeshBlock::new([1, 4, 4], [1.0; 3], [0.0; 3], 4).is_err());
        assert!(MeshBlock::new([4, 1, 4], [1.0; 3], [0.0; 3], 4).is_err());
        assert!(MeshBlock::new([4, 4, 4], [1.0; 3], [0.0; 3], 2).is_err());
        assert!(MeshBlock::new([4, 4, 4], [1.0, 0.0, 1.0], [0.0; 3], 4).is_err());
    }

    #[test]
    fn cell_centers() {
        let m = MeshBlock::new([4, 4, 4], [0.25; 3], [0.0; 3], 4).unwrap();
        let (x1, x2, x3) = m.cc_pos(m.lo(Axis::X3), m.lo(Axis::X2), m.lo(Axis::X1));
        assert!((x1 - 0.125).abs() < 1e-15);
        assert!((x2 - 0.125).abs() < 1e-15);
        assert!((x3 - 0.125).abs() < 1e-15);
    }
}
