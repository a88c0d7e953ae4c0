use crate::{
    decompose::{decompose, Decomposition},
    error::{PreconditionViolation, Result},
    iteration::{Iterate, IterativeSolver, Solution, SolverConfig},
    math::{MatN, VecN},
    residual::{residuals, Residual},
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use std::{
    error::Error,
    fs::File,
    io::{BufReader, BufWriter},
};

/// A square linear system `A x = b`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSystem")]
pub struct LinearSystem {
    a: MatN,
    b: VecN,
}

#[derive(Deserialize)]
struct RawSystem {
    a: MatN,
    b: VecN,
}

impl TryFrom<RawSystem> for LinearSystem {
    type Error = PreconditionViolation;
    fn try_from(raw: RawSystem) -> std::result::Result<Self, Self::Error> {
        LinearSystem::new(raw.a, raw.b)
    }
}

/// Everything produced by one run of the method.
#[derive(Clone, Debug)]
pub struct Report {
    pub decomposition: Decomposition,
    pub solution: Solution,
    pub residual: Residual,
}

impl LinearSystem {
    pub fn new(a: MatN, b: VecN) -> std::result::Result<Self, PreconditionViolation> {
        if a.dimension() != b.len() {
            return Err(PreconditionViolation::LengthMismatch {
                rhs: b.len(),
                rows: a.dimension(),
            });
        }
        if let Some(index) = a.entries().position(|v| !v.is_finite()) {
            return Err(PreconditionViolation::NonFinite { what: "A", index });
        }
        if let Some(index) = b.iter().position(|v| !v.is_finite()) {
            return Err(PreconditionViolation::NonFinite { what: "b", index });
        }
        Ok(Self { a, b })
    }

    pub fn from_rows(a: Vec<Vec<f64>>, b: Vec<f64>) -> std::result::Result<Self, PreconditionViolation> {
        Self::new(MatN::from_rows(a)?, b.into())
    }

    #[inline]
    pub fn a(&self) -> &MatN {
        &self.a
    }

    #[inline]
    pub fn b(&self) -> &VecN {
        &self.b
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.b.len()
    }

    pub fn decompose(&self) -> Result<Decomposition> {
        decompose(&self.a, &self.b)
    }

    pub fn residuals(&self, x: &VecN) -> Result<Residual> {
        residuals(&self.a, &self.b, x)
    }

    /// Decomposes, iterates and evaluates the residual of the result.
    pub fn solve(&self, tolerance: f64, config: &SolverConfig) -> Result<Report> {
        self.solve_with(tolerance, config, |_| {})
    }

    /// Like [`LinearSystem::solve`], calling `observer` after every pass.
    pub fn solve_with<F>(&self, tolerance: f64, config: &SolverConfig, observer: F) -> Result<Report>
    where
        F: FnMut(&Iterate<'_>),
    {
        let decomposition = self.decompose()?;
        let solution = IterativeSolver::new(config.clone()).solve_with(&decomposition, tolerance, observer)?;
        let residual = self.residuals(&solution.x)?;
        Ok(Report {
            decomposition,
            solution,
            residual,
        })
    }
}

/// The 3x3 system the method is usually demonstrated on.
pub fn demo_system() -> LinearSystem {
    LinearSystem::from_rows(
        vec![
            vec![4.0, 0.24, -0.08],
            vec![0.09, 3.0, 0.15],
            vec![0.04, 0.08, 4.0],
        ],
        vec![8.0, 9.0, 20.0],
    )
    .expect("demo system is square")
}

/// Generates a strictly diagonally dominant system of size `n`.
///
/// Each diagonal entry outweighs its row by a factor of `2 sqrt(n)`, which keeps
/// the Frobenius norm of the iteration matrix below one half.
pub fn random_diagonally_dominant<R: Rng>(
    n: usize,
    rng: &mut R,
) -> std::result::Result<LinearSystem, PreconditionViolation> {
    if n == 0 {
        return Err(PreconditionViolation::Empty);
    }
    let scale = 2.0 * (n as f64).sqrt();
    let mut a = MatN::zero(n);
    for i in 0..n {
        let mut row_sum = 0.0;
        for j in 0..n {
            if i != j {
                let v: f64 = rng.gen_range(-1.0..1.0);
                row_sum += v.abs();
                a.set(i, j, v);
            }
        }
        let magnitude = (row_sum + rng.gen_range(0.5f64..1.5)) * scale;
        let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        a.set(i, i, sign * magnitude);
    }
    let b = (0..n).map(|_| rng.gen_range(-10.0..10.0)).collect::<Vec<f64>>();
    LinearSystem::new(a, b.into())
}

/// [`random_diagonally_dominant`] driven by a seeded PCG generator, so the
/// same `seed` always yields the same system.
pub fn random_system(n: usize, seed: u64) -> std::result::Result<LinearSystem, PreconditionViolation> {
    random_diagonally_dominant(n, &mut Pcg64::seed_from_u64(seed))
}

pub fn load_system(path: &str) -> std::result::Result<LinearSystem, Box<dyn Error>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let system = serde_json::from_reader(reader)?;

    Ok(system)
}

pub fn save_system(path: &str, system: &LinearSystem) -> std::result::Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, system)?;

    Ok(())
}
