use crate::{FbError, FbResult};

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> FbResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(FbError::NonFinite { what, value: v })
    }
}

/// Point `i` of `n` evenly spaced points on `[start, end]`.
///
/// Computed directly from the index rather than by accumulation, so the last
/// point is exactly `end`.
#[inline]
pub fn grid_point(start: Real, end: Real, i: usize, n: usize) -> Real {
    debug_assert!(n >= 2 && i < n);
    if i + 1 == n {
        return end;
    }
    start + (end - start) * (i as Real) / ((n - 1) as Real)
}

/// `n` evenly spaced points on `[start, end]`, both endpoints included.
pub fn linspace(start: Real, end: Real, n: usize) -> FbResult<Vec<Real>> {
    if n < 2 {
        return Err(FbError::InvalidArg {
            what: "linspace needs at least two points",
        });
    }
    ensure_finite(start, "linspace start")?;
    ensure_finite(end, "linspace end")?;
    Ok((0..n).map(|i| grid_point(start, end, i, n)).collect())
}
