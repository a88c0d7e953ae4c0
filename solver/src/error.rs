//! Error types for the simple-iteration solver

use thiserror::Error;

/// Input that the method cannot be applied to.
///
/// All of these are detected before any division or iteration happens.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PreconditionViolation {
    /// The coefficient matrix has no rows
    #[error("coefficient matrix is empty")]
    Empty,

    /// A row of the coefficient matrix has the wrong number of columns
    #[error("coefficient matrix is not square: row {row} has {len} entries, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    /// The right-hand side does not line up with the matrix rows
    #[error("right-hand side has {rhs} entries but the matrix has {rows} rows")]
    LengthMismatch { rhs: usize, rows: usize },

    /// A zero diagonal entry would divide by zero while building alpha and beta
    #[error("division by zero: diagonal entry A[{row}][{row}] is zero")]
    DivisionByZero { row: usize },

    /// NaN or infinity in the input
    #[error("non-finite value in {what} at index {index}")]
    NonFinite { what: &'static str, index: usize },

    /// Tolerance must be a finite, non-negative number
    #[error("tolerance must be finite and non-negative, got {tolerance}")]
    InvalidTolerance { tolerance: f64 },
}

/// Errors returned by the solver.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SolverError {
    #[error(transparent)]
    Precondition(#[from] PreconditionViolation),

    /// The stopping test was not met within the iteration bound
    #[error("no convergence after {iterations} iterations (last step norm {delta:e})")]
    NonConvergence { iterations: usize, delta: f64 },

    /// An iterate overflowed to infinity or NaN
    #[error("iteration diverged: iterate {iteration} is not finite")]
    Diverged { iteration: usize },
}

/// Result type for solver operations
pub type Result<T> = std::result::Result<T, SolverError>;
