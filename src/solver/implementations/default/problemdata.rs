use crate::algebra::*;
use crate::solver::core::traits::Evaluator;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction of a constraint function

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConstraintSense {
    /// `cᵢ(x) = 0`
    Equal,
    /// `cᵢ(x) ≥ 0`
    GreaterThan,
    /// `cᵢ(x) ≤ 0`
    LessThan,
}

impl ConstraintSense {
    pub fn is_inequality(&self) -> bool {
        !matches!(self, ConstraintSense::Equal)
    }
}

/// Error type returned when a problem is malformed

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProblemError {
    #[error("Incompatible dimension for {what}: expected {expected}, found {found}")]
    IncompatibleDimension {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Bounds of variable {0} are inconsistent")]
    InconsistentBounds(usize),
}

/// A bounded nonlinear program
///
/// ```text
/// minimize    f(x)
/// subject to  cᵢ(x) {=, ≥, ≤} 0
///             l ≤ x ≤ u
/// ```
///
/// where `f` and `c` are supplied by an [`Evaluator`] and infinite
/// bounds mark unbounded directions.

#[derive(Debug, Clone)]
pub struct NonlinearProblem<T, E> {
    pub evaluator: E,
    pub lower: Vec<T>,
    pub upper: Vec<T>,
    pub senses: Vec<ConstraintSense>,
}

impl<T, E> NonlinearProblem<T, E>
where
    T: FloatT,
    E: Evaluator<T>,
{
    pub fn new(
        evaluator: E,
        lower: Vec<T>,
        upper: Vec<T>,
        senses: Vec<ConstraintSense>,
    ) -> Result<Self, ProblemError> {
        let n = evaluator.nvars();
        let m = evaluator.ncons();

        check_dimension("lower bounds", n, lower.len())?;
        check_dimension("upper bounds", n, upper.len())?;
        check_dimension("constraint senses", m, senses.len())?;

        Ok(Self {
            evaluator,
            lower,
            upper,
            senses,
        })
    }

    /// A problem with every variable bounded below by zero and
    /// equality constraints only
    pub fn nonnegative(evaluator: E) -> Self {
        let n = evaluator.nvars();
        let m = evaluator.ncons();
        Self {
            evaluator,
            lower: vec![T::zero(); n],
            upper: vec![T::infinity(); n],
            senses: vec![ConstraintSense::Equal; m],
        }
    }

    pub fn nvars(&self) -> usize {
        self.evaluator.nvars()
    }

    pub fn ncons(&self) -> usize {
        self.evaluator.ncons()
    }
}

fn check_dimension(what: &'static str, expected: usize, found: usize) -> Result<(), ProblemError> {
    if expected != found {
        return Err(ProblemError::IncompatibleDimension {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

/// Check a point against the bounds and constraints of `problem`,
/// allowing a violation of `tol` in each.
pub fn is_feasible<T, E>(problem: &NonlinearProblem<T, E>, x: &[T], tol: T) -> bool
where
    T: FloatT,
    E: Evaluator<T>,
{
    if x.len() != problem.nvars() || !x.is_finite() {
        return false;
    }

    let in_bounds = x
        .iter()
        .zip(problem.lower.iter().zip(&problem.upper))
        .all(|(&xi, (&l, &u))| xi >= l - tol && xi <= u + tol);
    if !in_bounds {
        return false;
    }

    let mut c = vec![T::zero(); problem.ncons()];
    problem.evaluator.constraints(x, &mut c);

    c.iter().zip(&problem.senses).all(|(&ci, sense)| match sense {
        ConstraintSense::Equal => T::abs(ci) <= tol,
        ConstraintSense::GreaterThan => ci >= -tol,
        ConstraintSense::LessThan => ci <= tol,
    })
}
