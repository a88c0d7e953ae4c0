use super::{dot, VecN};
use crate::error::PreconditionViolation;
use core::ops::Mul;
use serde::{Deserialize, Serialize};

/// Dense square matrix stored as rows.
///
/// The only way to build one from caller data is [`MatN::from_rows`], which
/// rejects ragged or non-square input, so every `MatN` is `n x n`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct MatN {
    rows: Vec<VecN>,
}

impl MatN {
    #[inline]
    pub fn zero(dimension: usize) -> Self {
        MatN {
            rows: vec![VecN::zero(dimension); dimension],
        }
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, PreconditionViolation> {
        let expected = rows.len();
        if expected == 0 {
            return Err(PreconditionViolation::Empty);
        }
        for (row, values) in rows.iter().enumerate() {
            if values.len() != expected {
                return Err(PreconditionViolation::NotSquare {
                    row,
                    len: values.len(),
                    expected,
                });
            }
        }
        Ok(MatN {
            rows: rows.into_iter().map(VecN::from).collect(),
        })
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn row(&self, i: usize) -> &VecN {
        &self.rows[i]
    }

    #[inline]
    pub fn rows(&self) -> &[VecN] {
        &self.rows
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.rows[i][j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.rows[i][j] = value;
    }

    /// Iterates over every entry in row-major order.
    pub fn entries(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().flat_map(|row| row.iter().copied())
    }

    /// 2-norm of all entries viewed as one flat vector.
    pub fn frobenius_norm(&self) -> f64 {
        self.entries().fold(0.0, |acc, v| acc + v * v).sqrt()
    }
}

impl TryFrom<Vec<Vec<f64>>> for MatN {
    type Error = PreconditionViolation;
    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        MatN::from_rows(rows)
    }
}

impl From<MatN> for Vec<Vec<f64>> {
    fn from(m: MatN) -> Self {
        m.rows.into_iter().map(VecN::into_inner).collect()
    }
}

impl Mul<&VecN> for &MatN {
    type Output = VecN;
    #[inline]
    fn mul(self, rhs: &VecN) -> Self::Output {
        debug_assert_eq!(self.dimension(), rhs.len());
        let mut tmp = VecN::zero(self.dimension());
        for m in 0..self.dimension() {
            tmp[m] = dot(&self.rows[m], rhs);
        }
        tmp
    }
}
