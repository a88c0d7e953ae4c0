use super::dot;
use core::ops::{Deref, DerefMut};
use serde::{Deserialize, Serialize};

/// Dense vector of `f64` whose length is fixed when it is created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VecN(Vec<f64>);

impl VecN {
    #[inline]
    pub fn zero(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    #[inline]
    pub fn dot(&self, rhs: &Self) -> f64 {
        dot(&self.0, &rhs.0)
    }

    /// Euclidean norm.
    #[inline]
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Euclidean norm of `self - rhs` without allocating the difference.
    pub fn distance(&self, rhs: &Self) -> f64 {
        debug_assert_eq!(self.len(), rhs.len());
        self.0
            .iter()
            .zip(rhs.0.iter())
            .fold(0.0, |acc, (&lhs, &rhs)| {
                let d = lhs - rhs;
                acc + d * d
            })
            .sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for VecN {
    #[inline]
    fn from(v: Vec<f64>) -> Self {
        Self(v)
    }
}

impl Deref for VecN {
    type Target = [f64];
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for VecN {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
