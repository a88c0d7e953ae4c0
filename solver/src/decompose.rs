use crate::{
    error::{PreconditionViolation, Result},
    math::{dot, MatN, VecN},
};
use tracing::debug;

/// The fixed-point form `x = alpha x + beta` of a linear system.
#[derive(Clone, Debug, PartialEq)]
pub struct Decomposition {
    pub alpha: MatN,
    pub beta: VecN,
}

impl Decomposition {
    #[inline]
    pub fn dimension(&self) -> usize {
        self.beta.len()
    }

    /// Frobenius norm of `alpha`.
    pub fn alpha_norm(&self) -> f64 {
        self.alpha.frobenius_norm()
    }

    /// One Jacobi pass: returns `beta + alpha * prev`.
    pub fn step(&self, prev: &VecN) -> VecN {
        let mut x = VecN::zero(self.dimension());
        self.step_into(prev, &mut x);
        x
    }

    /// Writes `beta + alpha * prev` into `x`. Only `prev` is read, so a
    /// partially updated `x` never feeds back into the same pass.
    pub(crate) fn step_into(&self, prev: &VecN, x: &mut VecN) {
        debug_assert_eq!(prev.len(), self.dimension());
        for i in 0..self.dimension() {
            x[i] = self.beta[i] + dot(self.alpha.row(i), prev);
        }
    }
}

/// Splits `A x = b` into `x = alpha x + beta` by dividing each row by its
/// diagonal entry.
pub fn decompose(a: &MatN, b: &VecN) -> Result<Decomposition> {
    let n = a.dimension();
    if b.len() != n {
        return Err(PreconditionViolation::LengthMismatch { rhs: b.len(), rows: n }.into());
    }
    // check every pivot before dividing by any of them
    if let Some(row) = (0..n).find(|&i| a.get(i, i) == 0.0) {
        return Err(PreconditionViolation::DivisionByZero { row }.into());
    }

    let mut alpha = MatN::zero(n);
    let mut beta = VecN::zero(n);
    for i in 0..n {
        let pivot = a.get(i, i);
        for j in 0..n {
            if i != j {
                alpha.set(i, j, -a.get(i, j) / pivot);
            }
        }
        beta[i] = b[i] / pivot;
    }

    if let Some(index) = alpha.entries().position(|v| !v.is_finite()) {
        return Err(PreconditionViolation::NonFinite { what: "alpha", index }.into());
    }
    if let Some(index) = beta.iter().position(|v| !v.is_finite()) {
        return Err(PreconditionViolation::NonFinite { what: "beta", index }.into());
    }

    debug!(dimension = n, alpha_norm = alpha.frobenius_norm(), "decomposed system");
    Ok(Decomposition { alpha, beta })
}
