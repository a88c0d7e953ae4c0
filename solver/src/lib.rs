//! Simple-iteration (Jacobi) solver for square linear systems `A x = b`.
//!
//! The system is rewritten as `x = alpha x + beta`, iterated from the zero
//! vector until the step norm passes the configured [`StoppingRule`], and the
//! result is checked by computing `b - A x`.

pub mod convergence;
pub mod decompose;
pub mod error;
pub mod iteration;
mod math;
pub mod residual;
pub mod system;

#[cfg(test)]
mod proptests;

pub use convergence::{ConvergenceChecker, StoppingRule};
pub use decompose::{decompose, Decomposition};
pub use error::{PreconditionViolation, Result, SolverError};
pub use iteration::{solve, Iterate, IterativeSolver, Solution, SolverConfig};
pub use math::{MatN, VecN};
pub use residual::{residuals, Residual};
pub use system::{LinearSystem, Report};
