use crate::{
    convergence::{ConvergenceChecker, StoppingRule},
    decompose::Decomposition,
    error::{PreconditionViolation, Result, SolverError},
    math::VecN,
};
use serde::{Deserialize, Serialize};
use std::{error::Error, fs::File, io::BufReader};
use tracing::{debug, trace, warn};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Passes before giving up with [`SolverError::NonConvergence`].
    pub max_iterations: usize,
    pub stopping_rule: StoppingRule,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            stopping_rule: StoppingRule::Corrected,
        }
    }
}

impl SolverConfig {
    pub fn load(path: &str) -> std::result::Result<Self, Box<dyn Error>> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config = serde_json::from_reader(reader)?;

        Ok(config)
    }
}

/// Snapshot handed to the observer after each pass.
#[derive(Copy, Clone, Debug)]
pub struct Iterate<'a> {
    /// 1-based pass number
    pub iteration: usize,
    pub x: &'a VecN,
    /// `|x - prev|`
    pub delta: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    pub x: VecN,
    pub iterations: usize,
    /// Step norm of the final pass.
    pub delta: f64,
}

/// Drives the fixed-point iteration `x = alpha x + beta` from the zero vector.
#[derive(Clone, Debug, Default)]
pub struct IterativeSolver {
    config: SolverConfig,
}

impl IterativeSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn solve(&self, decomposition: &Decomposition, tolerance: f64) -> Result<Solution> {
        self.solve_with(decomposition, tolerance, |_| {})
    }

    pub fn solve_with<F>(&self, decomposition: &Decomposition, tolerance: f64, mut observer: F) -> Result<Solution>
    where
        F: FnMut(&Iterate<'_>),
    {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(PreconditionViolation::InvalidTolerance { tolerance }.into());
        }

        let n = decomposition.dimension();
        let checker = ConvergenceChecker::new(self.config.stopping_rule, &decomposition.alpha, tolerance);
        debug!(
            rule = ?self.config.stopping_rule,
            alpha_norm = checker.alpha_norm(),
            threshold = checker.threshold(),
            "starting simple iteration"
        );

        let mut prev = VecN::zero(n);
        let mut x = VecN::zero(n);
        let mut delta = f64::INFINITY;
        for iteration in 1..=self.config.max_iterations {
            decomposition.step_into(&prev, &mut x);
            if !x.is_finite() {
                warn!(iteration, "iterate is no longer finite");
                return Err(SolverError::Diverged { iteration });
            }

            let check = checker.check(&x, &prev);
            delta = check.delta;
            trace!(iteration, delta, "iteration");
            observer(&Iterate {
                iteration,
                x: &x,
                delta,
            });

            if check.converged {
                debug!(iterations = iteration, delta, "converged");
                return Ok(Solution {
                    x,
                    iterations: iteration,
                    delta,
                });
            }
            // x is fully overwritten by the next pass
            core::mem::swap(&mut prev, &mut x);
        }

        warn!(
            iterations = self.config.max_iterations,
            delta, "stopping test not met within the iteration bound"
        );
        Err(SolverError::NonConvergence {
            iterations: self.config.max_iterations,
            delta,
        })
    }
}

/// Runs the iteration for `decomposition` with `config`.
pub fn solve(decomposition: &Decomposition, tolerance: f64, config: &SolverConfig) -> Result<Solution> {
    IterativeSolver::new(config.clone()).solve(decomposition, tolerance)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        decompose::decompose,
        math::MatN,
        system::{demo_system, LinearSystem},
    };
    use approx::assert_abs_diff_eq;

    const DEMO_SOLUTION: [f64; 3] = [1.936800819716508, 2.695559935754117, 4.926720793087752];

    fn literal() -> SolverConfig {
        SolverConfig {
            stopping_rule: StoppingRule::Literal,
            ..SolverConfig::default()
        }
    }

    fn decomposition(a: Vec<Vec<f64>>, b: Vec<f64>) -> Decomposition {
        LinearSystem::from_rows(a, b).unwrap().decompose().unwrap()
    }

    #[test]
    fn test_corrected_rule_on_demo_system() {
        let d = demo_system().decompose().unwrap();
        let solution = solve(&d, 1e-4, &SolverConfig::default()).unwrap();
        assert_eq!(solution.iterations, 4);
        assert!(solution.delta <= StoppingRule::Corrected.threshold(d.alpha_norm(), 1e-4));
        for i in 0..3 {
            assert_abs_diff_eq!(solution.x[i], DEMO_SOLUTION[i], epsilon = 1e-4);
        }
    }

    #[test]
    fn test_literal_rule_runs_to_exact_fixed_point() {
        let d = demo_system().decompose().unwrap();
        let solution = solve(&d, 1e-4, &literal()).unwrap();
        assert_eq!(solution.iterations, 14);
        assert_eq!(solution.delta, 0.0);
        assert_eq!(d.step(&solution.x), solution.x);
        for i in 0..3 {
            assert_abs_diff_eq!(solution.x[i], DEMO_SOLUTION[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_literal_rule_with_nilpotent_alpha() {
        let d = decomposition(vec![vec![2.0, 0.0], vec![1.0, 2.0]], vec![2.0, 3.0]);
        let solution = solve(&d, 1e-4, &literal()).unwrap();
        assert_eq!(solution.iterations, 3);
        assert_eq!(solution.x, VecN::from(vec![1.0, 1.0]));
    }

    #[test]
    fn test_zero_alpha() {
        let d = decomposition(vec![vec![2.0, 0.0], vec![0.0, 4.0]], vec![2.0, 2.0]);
        let solution = solve(&d, 1e-4, &SolverConfig::default()).unwrap();
        assert_eq!(solution.iterations, 1);
        assert_eq!(solution.x, VecN::from(vec![1.0, 0.5]));

        // 0 / 0 in the literal threshold never compares true
        let config = SolverConfig {
            max_iterations: 10,
            ..literal()
        };
        assert_eq!(
            solve(&d, 1e-4, &config),
            Err(SolverError::NonConvergence {
                iterations: 10,
                delta: 0.0
            })
        );
    }

    #[test]
    fn test_zero_tolerance() {
        let d = demo_system().decompose().unwrap();
        for config in [SolverConfig::default(), literal()] {
            let solution = solve(&d, 0.0, &config).unwrap();
            assert_eq!(solution.iterations, 14);
            assert_eq!(solution.delta, 0.0);
        }

        let d = decomposition(vec![vec![1.0, 2.0], vec![2.0, 1.0]], vec![1.0, 1.0]);
        let config = SolverConfig {
            max_iterations: 50,
            ..SolverConfig::default()
        };
        match solve(&d, 0.0, &config) {
            Err(SolverError::NonConvergence { iterations, delta }) => {
                assert_eq!(iterations, 50);
                assert!(delta > 1.0);
            }
            other => panic!("expected NonConvergence, got {:?}", other),
        }
    }

    #[test]
    fn test_non_contracting_system_hits_bound() {
        let d = decomposition(vec![vec![1.0, 2.0], vec![2.0, 1.0]], vec![1.0, 1.0]);
        assert!(d.alpha_norm() > 1.0);
        let config = SolverConfig {
            max_iterations: 20,
            ..SolverConfig::default()
        };
        assert!(matches!(
            solve(&d, 1e-4, &config),
            Err(SolverError::NonConvergence { iterations: 20, .. })
        ));
    }

    #[test]
    fn test_divergence_is_reported() {
        let d = decomposition(vec![vec![1.0, 2.0], vec![2.0, 1.0]], vec![1.0, 1.0]);
        let config = SolverConfig {
            max_iterations: 5000,
            ..SolverConfig::default()
        };
        match solve(&d, 1e-4, &config) {
            Err(SolverError::Diverged { iteration }) => assert!(iteration > 1000 && iteration < 1100),
            other => panic!("expected Diverged, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_tolerance() {
        let d = demo_system().decompose().unwrap();
        for tolerance in [-1e-4, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                solve(&d, tolerance, &SolverConfig::default()),
                Err(SolverError::Precondition(PreconditionViolation::InvalidTolerance { .. }))
            ));
        }
    }

    #[test]
    fn test_observer_sees_every_pass() {
        let d = demo_system().decompose().unwrap();
        let mut trace = Vec::new();
        let solution = IterativeSolver::default()
            .solve_with(&d, 1e-4, |it| trace.push((it.iteration, it.x.clone(), it.delta)))
            .unwrap();
        assert_eq!(trace.iter().map(|t| t.0).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(trace[0].1, d.beta);
        assert_eq!(trace[3].1, solution.x);
        assert_eq!(trace[3].2, solution.delta);
        assert_eq!(trace[0].2, d.beta.norm());
        for w in trace.windows(2) {
            assert!(w[1].2 <= w[0].2);
        }
    }

    #[test]
    fn test_max_iterations_zero() {
        let d = decompose(&MatN::from_rows(vec![vec![1.0]]).unwrap(), &VecN::from(vec![1.0])).unwrap();
        let config = SolverConfig {
            max_iterations: 0,
            ..SolverConfig::default()
        };
        assert!(matches!(
            solve(&d, 1e-4, &config),
            Err(SolverError::NonConvergence { iterations: 0, .. })
        ));
    }

    #[test]
    fn test_config_defaults() {
        let config: SolverConfig = serde_json::from_str(r#"{"stopping_rule": "literal"}"#).unwrap();
        assert_eq!(config.max_iterations, 1000);
        assert_eq!(config.stopping_rule, StoppingRule::Literal);
        let config: SolverConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SolverConfig::default());
    }
}
