#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ---------------------------------
// Solver status type
// ---------------------------------

/// Status of solver at termination

#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolverStatus {
    /// Problem is not solved (solver hasn't run).
    #[default]
    Unsolved,
    /// Solver converged to a point satisfying the optimality and feasibility tolerances.
    Optimal,
    /// Iteration, time or step size limits were exhausted before convergence.
    Failed,
    /// Feasibility restoration converged to a point with nonzero constraint violation.
    Infeasible,
    /// Solver terminated with an unrecoverable numerical error.
    Error,
    /// Solver was interrupted by the caller.
    Aborted,
}

impl SolverStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(*self, SolverStatus::Optimal)
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(*self, SolverStatus::Infeasible)
    }

    pub fn is_errored(&self) -> bool {
        // status is any of the error codes
        matches!(*self, SolverStatus::Error | SolverStatus::Aborted)
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[test]
fn test_status_flags() {
    assert!(SolverStatus::Optimal.is_optimal());
    assert!(SolverStatus::Infeasible.is_infeasible());
    assert!(SolverStatus::Aborted.is_errored());
    assert!(!SolverStatus::Failed.is_errored());
    assert_eq!(SolverStatus::default(), SolverStatus::Unsolved);
    assert_eq!(format!("{}", SolverStatus::Infeasible), "Infeasible");
}
