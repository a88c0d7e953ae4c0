use crate::{
    error::{PreconditionViolation, Result},
    math::{dot, MatN, VecN},
};
use core::ops::Deref;

/// `r = b - A x` for a candidate solution `x`.
#[derive(Clone, Debug, PartialEq)]
pub struct Residual(VecN);

impl Residual {
    /// Total squared residual, `sum r_i^2`.
    pub fn sum_of_squares(&self) -> f64 {
        self.0.dot(&self.0)
    }

    pub fn norm(&self) -> f64 {
        self.0.norm()
    }

    /// Largest absolute component.
    pub fn max_abs(&self) -> f64 {
        self.0.iter().fold(0.0, |max: f64, r| max.max(r.abs()))
    }
}

impl Deref for Residual {
    type Target = VecN;
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub fn residuals(a: &MatN, b: &VecN, x: &VecN) -> Result<Residual> {
    let n = a.dimension();
    if b.len() != n {
        return Err(PreconditionViolation::LengthMismatch { rhs: b.len(), rows: n }.into());
    }
    if x.len() != n {
        return Err(PreconditionViolation::LengthMismatch { rhs: x.len(), rows: n }.into());
    }

    let mut r = VecN::zero(n);
    for i in 0..n {
        r[i] = b[i] - dot(a.row(i), x);
    }
    Ok(Residual(r))
}
