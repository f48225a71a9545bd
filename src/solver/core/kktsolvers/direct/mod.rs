use super::{Inertia, KKTError};
use crate::algebra::*;

//ldl linear solvers kept in a submodule (not flattened)
pub mod ldlsolvers;

//flatten direct KKT module structure
mod directldlkktsolver;
mod kkt_assembly;
pub use directldlkktsolver::*;
use kkt_assembly::*;

/// A symmetric indefinite factorization engine that reports inertia.
pub trait DirectLDLSolver<T: FloatT> {
    /// Overwrite entries in the order of the `nzval` field of the
    /// matrix the solver was created with.
    fn update_values(&mut self, index: &[usize], values: &[T]);
    fn solve(&mut self, x: &mut [T], b: &[T]);
    /// Numeric factorization.  A zero pivot is not an error: it is
    /// reported through the returned inertia.
    fn refactor(&mut self) -> Result<Inertia, KKTError>;
}
