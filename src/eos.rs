//! Equation of state: variable conversions and wavespeeds.
//!
//! Conversions are pointwise and side-effect free. Conversion toward
//! primitives is the positivity checkpoint of the whole scheme: a
//! non-positive density or pressure here is reported, never clamped.

use crate::config::Eos;
use crate::error::{BadState, Quantity};
use crate::types::{Cons1D, Prim1D, MAX_SCALARS};

/// Convert a rotated conserved state to primitives, given the sweep-normal
/// field `bx`.
pub fn cons_to_prim(u: &Cons1D, bx: f64, eos: Eos) -> Result<Prim1D, BadState> {
    if u.d <= 0.0 {
        return Err(BadState {
            quantity: Quantity::Density,
            value: u.d,
        });
    }
    let di = 1.0 / u.d;
    let vx = u.mx * di;
    let vy = u.my * di;
    let vz = u.mz * di;

    let p = match eos {
        Eos::Adiabatic { gamma } => {
            let ke = 0.5 * u.d * (vx * vx + vy * vy + vz * vz);
            let me = 0.5 * (bx * bx + u.by * u.by + u.bz * u.bz);
            let p = (gamma - 1.0) * (u.e - ke - me);
            if p <= 0.0 {
                return Err(BadState {
                    quantity: Quantity::Pressure,
                    value: p,
                });
            }
            p
        }
        Eos::Isothermal { cs } => cs * cs * u.d,
    };

    let mut r = [0.0; MAX_SCALARS];
    for n in 0..MAX_SCALARS {
        r[n] = u.s[n] * di;
    }

    Ok(Prim1D {
        d: u.d,
        vx,
        vy,
        vz,
        p,
        by: u.by,
        bz: u.bz,
        r,
    })
}

/// Convert a rotated primitive state back to conserved form.
pub fn prim_to_cons(w: &Prim1D, bx: f64, eos: Eos) -> Cons1D {
    let e = match eos {
        Eos::Adiabatic { gamma } => {
            w.p / (gamma - 1.0)
                + 0.5 * w.d * (w.vx * w.vx + w.vy * w.vy + w.vz * w.vz)
                + 0.5 * (bx * bx + w.by * w.by + w.bz * w.bz)
        }
        Eos::Isothermal { .. } => 0.0,
    };

    let mut s = [0.0; MAX_SCALARS];
    for n in 0..MAX_SCALARS {
        s[n] = w.r[n] * w.d;
    }

    Cons1D {
        d: w.d,
        mx: w.d * w.vx,
        my: w.d * w.vy,
        mz: w.d * w.vz,
        e,
        by: w.by,
        bz: w.bz,
        s,
    }
}

/// Fast magnetosonic speed along the sweep axis.
///
/// Reduces to the sound speed when the field vanishes.
pub fn cfast(w: &Prim1D, bx: f64, eos: Eos) -> f64 {
    let asq = match eos {
        Eos::Adiabatic { gamma } => gamma * w.p / w.d,
        Eos::Isothermal { cs } => cs * cs,
    };
    let bsq_od = (bx * bx + w.by * w.by + w.bz * w.bz) / w.d;
    let ct2 = asq + bsq_od;
    let disc = (ct2 * ct2 - 4.0 * asq * bx * bx / w.d).max(0.0);
    (0.5 * (ct2 + disc.sqrt())).sqrt()
}

/// `cfast` evaluated directly on a conserved state.
pub fn cfast_cons(u: &Cons1D, bx: f64, eos: Eos) -> Result<f64, BadState> {
    Ok(cfast(&cons_to_prim(u, bx, eos)?, bx, eos))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-13;
    const GAMMA: f64 = 5.0 / 3.0;

    fn sample() -> Prim1D {
        Prim1D {
            d: 1.2,
            vx: 0.3,
            vy: -0.1,
            vz: 0.05,
            p: 0.8,
            by: 0.4,
            bz: -0.2,
            r: [0.5, 0.0, 0.0, 0.0],
        }
    }

    #[test]
    fn adiabatic_round_trip() {
        let eos = Eos::Adiabatic { gamma: GAMMA };
        let w = sample();
        let u = prim_to_cons(&w, 0.7, eos);
        let w2 = cons_to_prim(&u, 0.7, eos).unwrap();
        assert!((w2.d - w.d).abs() < TOL);
        assert!((w2.vx - w.vx).abs() < TOL);
        assert!((w2.p - w.p).abs() < TOL);
        assert!((w2.r[0] - w.r[0]).abs() < TOL);
    }

    #[test]
    fn isothermal_pressure_tracks_density() {
        let eos = Eos::Isothermal { cs: 2.0 };
        let w = sample();
        let u = prim_to_cons(&w, 0.0, eos);
        let w2 = cons_to_prim(&u, 0.0, eos).unwrap();
        assert!((w2.p - 4.0 * w.d).abs() < TOL);
        assert_eq!(u.e, 0.0);
    }

    #[test]
    fn positivity_violations_are_reported() {
        let eos = Eos::Adiabatic { gamma: GAMMA };
        let mut u = prim_to_cons(&sample(), 0.0, eos);
        u.d = -1.0;
        assert!(cons_to_prim(&u, 0.0, eos).is_err());

        let mut u = prim_to_cons(&sample(), 0.0, eos);
        u.e = 0.0; // internal energy now negative
        assert!(cons_to_prim(&u, 0.0, eos).is_err());
    }

    #[test]
    fn cfast_bounds_the_sound_speed() {
        let eos = Eos::Adiabatic { gamma: GAMMA };
        let w = sample();
        let a = (GAMMA * w.p / w.d).sqrt();
        assert!(cfast(&w, 0.7, eos) >= a - TOL);

        // Hydro limit: no field, cfast is the sound speed.
        let mut wh = w;
        wh.by = 0.0;
        wh.bz = 0.0;
        assert!((cfast(&wh, 0.0, eos) - a).abs() < TOL);
    }
}
