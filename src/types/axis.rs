//! Coordinate axes and the cyclic permutation used by the rotated sweeps.
//!
//! Every directional loop in the integrator is written once, generically over
//! the sweep axis. The two transverse directions are always taken in cyclic
//! order, so the (normal, transverse1, transverse2) triple is
//! (x1,x2,x3) for an x1-sweep, (x2,x3,x1) for x2 and (x3,x1,x2) for x3.

/// A coordinate axis of the structured mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X1,
    X2,
    X3,
}

impl Axis {
    /// The next axis in cyclic order (x1 -> x2 -> x3 -> x1).
    #[inline]
    pub fn next(self) -> Axis {
        match self {
            Axis::X1 => Axis::X2,
            Axis::X2 => Axis::X3,
            Axis::X3 => Axis::X1,
        }
    }

    /// The axis after `next`, i.e. the second transverse direction.
    #[inline]
    pub fn next2(self) -> Axis {
        self.next().next()
    }

    /// Position of this axis in a `[k, j, i]` index triple.
    ///
    /// Storage is row-major with x1 fastest, matching the loop nests the
    /// scheme was designed around.
    #[inline]
    pub fn dim(self) -> usize {
        match self {
            Axis::X1 => 2,
            Axis::X2 => 1,
            Axis::X3 => 0,
        }
    }

    /// Position of this axis in an `(x1, x2, x3)` coordinate triple.
    #[inline]
    pub fn xyz(self) -> usize {
        match self {
            Axis::X1 => 0,
            Axis::X2 => 1,
            Axis::X3 => 2,
        }
    }

    /// All three axes in x1, x2, x3 order.
    #[inline]
    pub fn all() -> [Axis; 3] {
        [Axis::X1, Axis::X2, Axis::X3]
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X1 => write!(f, "x1"),
            Axis::X2 => write!(f, "x2"),
            Axis::X3 => write!(f, "x3"),
        }
    }
}

/// A `[k, j, i]` cell or face index.
pub type Idx = [usize; 3];

/// Build an index from a position along `a` and the two cyclic transverse
/// positions (`t1` along `a.next()`, `t2` along `a.next2()`).
#[inline]
pub fn idx3(a: Axis, s: usize, t1: usize, t2: usize) -> Idx {
    let mut ix = [0usize; 3];
    ix[a.dim()] = s;
    ix[a.next().dim()] = t1;
    ix[a.next2().dim()] = t2;
    ix
}

/// Shift an index by `delta` cells along `a`.
///
/// Callers stay inside the ghost margin, so the signed arithmetic cannot
/// underflow in a well-formed loop nest.
#[inline]
pub fn shift(ix: Idx, a: Axis, delta: isize) -> Idx {
    let mut out = ix;
    out[a.dim()] = (out[a.dim()] as isize + delta) as usize;
    out
}
