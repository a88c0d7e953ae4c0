use crate::math::{MatN, VecN};
use serde::{Deserialize, Serialize};

/// Which stopping threshold to compare the step norm `|x - prev|` against.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoppingRule {
    /// `(1 - |alpha| / |alpha|) * eps`.
    ///
    /// Zero for any non-zero `alpha`, so the iteration only stops once two
    /// successive iterates are bit-identical. Undefined (NaN, never satisfied)
    /// when `alpha` is all zeros.
    Literal,
    /// `(1 - |alpha|) / |alpha| * eps`, the usual a-posteriori bound for a
    /// contraction. Never satisfied for a positive `eps` once `|alpha| > 1`.
    Corrected,
}

impl Default for StoppingRule {
    fn default() -> Self {
        StoppingRule::Corrected
    }
}

impl StoppingRule {
    pub fn threshold(self, alpha_norm: f64, tolerance: f64) -> f64 {
        match self {
            StoppingRule::Literal => (1.0 - alpha_norm / alpha_norm) * tolerance,
            StoppingRule::Corrected => {
                if tolerance == 0.0 {
                    0.0
                } else if alpha_norm == 0.0 {
                    // beta is already the exact solution after one pass
                    f64::INFINITY
                } else {
                    (1.0 - alpha_norm) / alpha_norm * tolerance
                }
            }
        }
    }

    /// The stopping policy: `delta <= threshold(alpha_norm, tolerance)`.
    #[inline]
    pub fn is_satisfied(self, delta: f64, alpha_norm: f64, tolerance: f64) -> bool {
        delta <= self.threshold(alpha_norm, tolerance)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Check {
    /// `|x - prev|`
    pub delta: f64,
    pub converged: bool,
}

/// Stopping test for one solve. The norm of `alpha` is computed once up front.
#[derive(Copy, Clone, Debug)]
pub struct ConvergenceChecker {
    rule: StoppingRule,
    alpha_norm: f64,
    tolerance: f64,
}

impl ConvergenceChecker {
    pub fn new(rule: StoppingRule, alpha: &MatN, tolerance: f64) -> Self {
        Self {
            rule,
            alpha_norm: alpha.frobenius_norm(),
            tolerance,
        }
    }

    #[inline]
    pub fn alpha_norm(&self) -> f64 {
        self.alpha_norm
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.rule.threshold(self.alpha_norm, self.tolerance)
    }

    pub fn check(&self, x: &VecN, prev: &VecN) -> Check {
        let delta = x.distance(prev);
        Check {
            delta,
            converged: self.rule.is_satisfied(delta, self.alpha_norm, self.tolerance),
        }
    }

    #[inline]
    pub fn has_converged(&self, x: &VecN, prev: &VecN) -> bool {
        self.check(x, prev).converged
    }
}

pub fn has_converged(rule: StoppingRule, x: &VecN, prev: &VecN, alpha: &MatN, tolerance: f64) -> bool {
    ConvergenceChecker::new(rule, alpha, tolerance).has_converged(x, prev)
}
