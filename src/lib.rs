//! __ipfilter__ is a primal-dual interior point solver for smooth nonlinear
//! programs, using a filter line search to decide step acceptance.
//! It solves problems of the form
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & f(x)\\\\\[2ex\]
//!  \text{subject to} & c_i(x) \in \\{=0, \ge 0, \le 0\\} \\\\\[1ex\]
//!         & l \le x \le u
//!  \end{array}
//! $$
//!
//! where $f$ and $c$ are twice differentiable and are supplied through the
//! [`Evaluator`](crate::solver::traits::Evaluator) trait.  Bounds may be
//! infinite.
//!
//! ## Method
//!
//! * __Standard form__: bounds are removed by shifting, splitting and slack
//!   variables, giving `min f(x) s.t. c(x) = 0, x ≥ 0`.
//!
//! * __Newton steps with inertia correction__: each iteration factors the
//!   primal-dual KKT matrix with a sparse LDLᵀ, shifting its diagonal blocks
//!   until the inertia is correct.
//!
//! * __Filter line search__: trial steps are accepted when they improve
//!   either the constraint violation or the barrier objective enough,
//!   with second order corrections against the Maratos effect.
//!
//! * __Feasibility restoration__: when no step is acceptable, a damped
//!   least squares solve moves the iterate towards feasibility.
//!
//! ## Example
//!
//! ```
//! use ipfilter::algebra::*;
//! use ipfilter::solver::*;
//!
//! // minimize x₀² + x₁² subject to x₀ + x₁ = 1, x ≥ 0
//! struct Circle;
//!
//! impl Evaluator<f64> for Circle {
//!     fn nvars(&self) -> usize { 2 }
//!     fn ncons(&self) -> usize { 1 }
//!     fn objective(&self, x: &[f64]) -> f64 { x[0] * x[0] + x[1] * x[1] }
//!     fn gradient(&self, x: &[f64], g: &mut [f64]) {
//!         g[0] = 2. * x[0];
//!         g[1] = 2. * x[1];
//!     }
//!     fn hessian(&self, _x: &[f64], h: &mut Matrix<f64>) {
//!         h.set_zero();
//!         h[(0, 0)] = 2.;
//!         h[(1, 1)] = 2.;
//!     }
//!     fn constraints(&self, x: &[f64], c: &mut [f64]) { c[0] = x[0] + x[1] - 1. }
//!     fn jacobian(&self, _x: &[f64], j: &mut Matrix<f64>) {
//!         j[(0, 0)] = 1.;
//!         j[(0, 1)] = 1.;
//!     }
//! }
//!
//! let problem = NonlinearProblem::new(
//!     Circle,
//!     vec![0.; 2],
//!     vec![f64::INFINITY; 2],
//!     vec![ConstraintSense::Equal],
//! )
//! .unwrap();
//!
//! let settings = DefaultSettingsBuilder::default().verbose(false).build().unwrap();
//! let mut solver = DefaultSolver::new(&problem, settings).unwrap();
//! let outcome = solver.solve(&[0., 0.]);
//! assert!(outcome.is_optimal());
//! assert!((outcome.x[0] - 0.5).abs() < 1e-4);
//! ```
//!
//! # License
//!
//! Licensed under Apache License, Version 2.0.

//Rust hates greek characters
#![allow(confusable_idents)]

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod io;
pub mod qdldl;
pub mod solver;
pub mod timers;
