//! Conserved and primitive state structs.
//!
//! `ConsCell` is the cell-centered 3-D state. `Cons1D`/`Prim1D` are the
//! rotated 1-D states used inside a sweep: `mx`/`vx` is always the momentum
//! or velocity along the sweep axis, `my`/`vy` follows `axis.next()` and
//! `mz`/`vz` follows `axis.next2()`. `by`/`bz` hold the transverse magnetic
//! field in the same order; the sweep-normal field travels separately since
//! it is not evolved by the 1-D system.

use super::axis::Axis;

/// Capacity for passively advected scalar densities. The live count is in
/// the run configuration; unused slots stay zero.
pub const MAX_SCALARS: usize = 4;

/// Cell-centered conserved state: density, momenta, total energy,
/// cell-centered magnetic field and passive scalar densities.
///
/// For an isothermal run `e` is inert storage and stays zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConsCell {
    pub d: f64,
    pub m1: f64,
    pub m2: f64,
    pub m3: f64,
    pub e: f64,
    pub b1c: f64,
    pub b2c: f64,
    pub b3c: f64,
    pub s: [f64; MAX_SCALARS],
}

impl ConsCell {
    /// Momentum component along a global axis.
    #[inline]
    pub fn m(&self, a: Axis) -> f64 {
        match a {
            Axis::X1 => self.m1,
            Axis::X2 => self.m2,
            Axis::X3 => self.m3,
        }
    }

    #[inline]
    pub fn m_mut(&mut self, a: Axis) -> &mut f64 {
        match a {
            Axis::X1 => &mut self.m1,
            Axis::X2 => &mut self.m2,
            Axis::X3 => &mut self.m3,
        }
    }

    /// Cell-centered field component along a global axis.
    #[inline]
    pub fn bc(&self, a: Axis) -> f64 {
        match a {
            Axis::X1 => self.b1c,
            Axis::X2 => self.b2c,
            Axis::X3 => self.b3c,
        }
    }

    #[inline]
    pub fn bc_mut(&mut self, a: Axis) -> &mut f64 {
        match a {
            Axis::X1 => &mut self.b1c,
            Axis::X2 => &mut self.b2c,
            Axis::X3 => &mut self.b3c,
        }
    }
}

/// Sweep-rotated conserved state (or flux) at a cell or interface.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cons1D {
    pub d: f64,
    pub mx: f64,
    pub my: f64,
    pub mz: f64,
    pub e: f64,
    pub by: f64,
    pub bz: f64,
    pub s: [f64; MAX_SCALARS],
}

impl Cons1D {
    /// Momentum component for global axis `g`, given that this state is
    /// stored in the rotated frame of sweep axis `frame`.
    #[inline]
    pub fn mom(&self, frame: Axis, g: Axis) -> f64 {
        if g == frame {
            self.mx
        } else if g == frame.next() {
            self.my
        } else {
            self.mz
        }
    }

    #[inline]
    pub fn mom_mut(&mut self, frame: Axis, g: Axis) -> &mut f64 {
        if g == frame {
            &mut self.mx
        } else if g == frame.next() {
            &mut self.my
        } else {
            &mut self.mz
        }
    }
}

/// Sweep-rotated primitive state. `r` holds scalar concentrations (density
/// fractions), not densities.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Prim1D {
    pub d: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub p: f64,
    pub by: f64,
    pub bz: f64,
    pub r: [f64; MAX_SCALARS],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mom_maps_follow_the_rotation() {
        let u = Cons1D {
            mx: 1.0,
            my: 2.0,
            mz: 3.0,
            ..Cons1D::default()
        };
        // x2-sweep storage: mx=M2, my=M3, mz=M1.
        assert_eq!(u.mom(Axis::X2, Axis::X2), 1.0);
        assert_eq!(u.mom(Axis::X2, Axis::X3), 2.0);
        assert_eq!(u.mom(Axis::X2, Axis::X1), 3.0);
    }

    #[test]
    fn cell_accessors_round_trip() {
        let mut u = ConsCell::default();
        *u.m_mut(Axis::X3) = 4.5;
        *u.bc_mut(Axis::X2) = -1.0;
        assert_eq!(u.m3, 4.5);
        assert_eq!(u.b2c, -1.0);
        assert_eq!(u.m(Axis::X3), 4.5);
        assert_eq!(u.bc(Axis::X2), -1.0);
    }
}
