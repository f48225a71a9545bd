#![allow(non_snake_case)]

use super::CoreSettings;
use crate::algebra::*;
use crate::qdldl::QDLDLError;
use thiserror::Error;

pub mod direct;
mod inertia;
pub use inertia::*;

/// Error type returned by KKT system updates and solves

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KKTError {
    #[error("Inertia correction exceeded the maximum Hessian shift")]
    InertiaCorrection,
    #[error("KKT factorization failed: {0}")]
    Factorization(#[from] QDLDLError),
    #[error("KKT solve produced a non-finite solution")]
    NonFiniteSolution,
    #[error("KKT data is non-finite")]
    NonFiniteData,
}

/// Eigenvalue counts of a symmetric matrix.
///
/// A factorization that ran into a zero pivot reports the number of
/// unprocessed columns as `zero`, so `zero > 0` flags a (numerically)
/// singular matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Inertia {
    pub positive: usize,
    pub negative: usize,
    pub zero: usize,
}

impl Inertia {
    pub fn new(positive: usize, negative: usize, zero: usize) -> Self {
        Self {
            positive,
            negative,
            zero,
        }
    }
}

/// Linear solver for the primal-dual system
///
/// ```text
/// [ W + Σ + δw I      Aᵀ  ] [Δx]   [r₁]
/// [      A         -δc I  ] [Δλ] = [r₂]
/// ```
///
/// with the inertia correction `(δw, δc)` chosen at each update.
pub trait KKTSolver<T: FloatT> {
    /// Load new `W`, `Σ` and `A`, then factor with inertia correction.
    fn update(
        &mut self,
        W: &Matrix<T>,
        σ: &[T],
        A: &Matrix<T>,
        μ: T,
        settings: &CoreSettings<T>,
    ) -> Result<(), KKTError>;

    /// Solve against the most recent factorization.
    fn solve(&mut self, lhs: &mut [T], rhs: &[T], settings: &CoreSettings<T>)
        -> Result<(), KKTError>;

    /// Regularization `(δw, δc)` used by the most recent factorization
    fn regularization(&self) -> (T, T);

    /// Number of numeric factorizations performed by the most recent update
    fn factorizations(&self) -> usize;
}
