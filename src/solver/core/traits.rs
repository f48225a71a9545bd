//! Required traits for types interacting with the solver.
//!
//! The solver never sees the problem functions directly.  It talks to
//! them only through an [`Evaluator`], which supplies values and
//! derivatives at a numeric point.   Feasibility restoration further
//! relies on a generic least squares primitive, described by the
//! [`NonlinearSystem`] and [`NonlinearSystemSolver`] traits.
//!
//! In nearly all cases a user needs only to implement [`Evaluator`] for
//! their problem and pass it to a
//! [`NonlinearProblem`](crate::solver::implementations::default::NonlinearProblem).

#![allow(non_snake_case)]

use crate::algebra::*;
use thiserror::Error;

/// Values and derivatives of an objective and constraint functions.
///
/// All methods must be pure functions of `x`.  Hessians and Jacobians
/// are written into dense matrices that are already sized as
/// `nvars() × nvars()` and `ncons() × nvars()` respectively.

pub trait Evaluator<T: FloatT> {
    /// Number of variables
    fn nvars(&self) -> usize;

    /// Number of constraint functions
    fn ncons(&self) -> usize;

    /// Objective value `f(x)`
    fn objective(&self, x: &[T]) -> T;

    /// Objective gradient `∇f(x)`
    fn gradient(&self, x: &[T], g: &mut [T]);

    /// Objective Hessian `∇²f(x)`
    fn hessian(&self, x: &[T], H: &mut Matrix<T>);

    /// Constraint values `c(x)`
    fn constraints(&self, x: &[T], c: &mut [T]);

    /// Constraint Jacobian, one row per constraint function
    fn jacobian(&self, x: &[T], J: &mut Matrix<T>);

    /// Hessian of the `i`th constraint function.   The default is
    /// zero, which is exact for linear constraints.
    fn constraint_hessian(&self, _x: &[T], _i: usize, H: &mut Matrix<T>) {
        H.set_zero();
    }

    /// Hessian of the Lagrangian `∇²f + Σ λᵢ ∇²cᵢ`.   `work` is a
    /// scratch matrix of the same size as `W`.
    fn lagrangian_hessian(&self, x: &[T], λ: &[T], W: &mut Matrix<T>, work: &mut Matrix<T>) {
        self.hessian(x, W);
        for (i, &λi) in λ.iter().enumerate() {
            if λi == T::zero() {
                continue;
            }
            self.constraint_hessian(x, i, work);
            W.data.axpby(λi, &work.data, T::one());
        }
    }
}

impl<T, E> Evaluator<T> for &E
where
    T: FloatT,
    E: Evaluator<T> + ?Sized,
{
    fn nvars(&self) -> usize {
        (**self).nvars()
    }
    fn ncons(&self) -> usize {
        (**self).ncons()
    }
    fn objective(&self, x: &[T]) -> T {
        (**self).objective(x)
    }
    fn gradient(&self, x: &[T], g: &mut [T]) {
        (**self).gradient(x, g)
    }
    fn hessian(&self, x: &[T], H: &mut Matrix<T>) {
        (**self).hessian(x, H)
    }
    fn constraints(&self, x: &[T], c: &mut [T]) {
        (**self).constraints(x, c)
    }
    fn jacobian(&self, x: &[T], J: &mut Matrix<T>) {
        (**self).jacobian(x, J)
    }
    fn constraint_hessian(&self, x: &[T], i: usize, H: &mut Matrix<T>) {
        (**self).constraint_hessian(x, i, H)
    }
    fn lagrangian_hessian(&self, x: &[T], λ: &[T], W: &mut Matrix<T>, work: &mut Matrix<T>) {
        (**self).lagrangian_hessian(x, λ, W, work)
    }
}

/// Error type returned by a [`NonlinearSystemSolver`]

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NonlinearSolveError {
    #[error("Residual or Jacobian evaluation produced a non-finite value")]
    NonFinite,
    #[error("Linear solve of the damped normal equations failed")]
    LinearSolve,
    #[error("Solve was interrupted")]
    Interrupted,
}

/// A square or overdetermined system `r(v) = 0` solved in the
/// least squares sense.

pub trait NonlinearSystem<T: FloatT> {
    /// Number of unknowns
    fn nvars(&self) -> usize;

    /// Number of residual components
    fn nresiduals(&self) -> usize;

    /// Residual vector `r(v)`
    fn residual(&mut self, v: &[T], r: &mut [T]) -> Result<(), NonlinearSolveError>;

    /// Residual Jacobian, of size `nresiduals() × nvars()`
    fn jacobian(&mut self, v: &[T], J: &mut Matrix<T>) -> Result<(), NonlinearSolveError>;
}

/// Result of a [`NonlinearSystemSolver`] run

#[derive(Debug, Clone, PartialEq)]
pub enum NonlinearSolution<T> {
    /// A stationary point of `‖r(v)‖²` was found.
    Converged(Vec<T>),
    /// No further progress was possible from this point.
    Stalled(Vec<T>),
    /// The iteration limit was reached while still making progress.
    MaxIterations(Vec<T>),
}

impl<T> NonlinearSolution<T> {
    pub fn point(&self) -> &[T] {
        match self {
            NonlinearSolution::Converged(v)
            | NonlinearSolution::Stalled(v)
            | NonlinearSolution::MaxIterations(v) => v,
        }
    }

    pub fn into_point(self) -> Vec<T> {
        match self {
            NonlinearSolution::Converged(v)
            | NonlinearSolution::Stalled(v)
            | NonlinearSolution::MaxIterations(v) => v,
        }
    }

    /// True unless the solver ran out of iterations
    pub fn is_stationary(&self) -> bool {
        !matches!(self, NonlinearSolution::MaxIterations(_))
    }
}

/// Black box least squares primitive

pub trait NonlinearSystemSolver<T: FloatT> {
    fn solve(
        &mut self,
        system: &mut dyn NonlinearSystem<T>,
        v0: &[T],
    ) -> Result<NonlinearSolution<T>, NonlinearSolveError>;
}
