//! Filter line search interior point solver for bounded nonlinear programs.
//!
//! A [`NonlinearProblem`] is reformulated into the standard form
//! `min f(x) s.t. c(x) = 0, x ≥ 0` by [`StandardForm`] and then solved by a
//! [`DefaultSolver`] from one starting point, or by [`optimize`] from
//! several.

#![allow(non_snake_case)]

mod barrier;
mod filter;
mod info;
mod info_print;
mod linesearch;
mod multistart;
mod nlsolve;
mod presolve;
mod problemdata;
mod residuals;
mod restoration;
mod settings;
mod solution;
mod solver;
mod standardform;
mod variables;

#[cfg(feature = "serde")]
mod json;

//export flattened
pub use barrier::*;
pub use filter::*;
pub use info::*;
pub use multistart::*;
pub use nlsolve::*;
pub use presolve::*;
pub use problemdata::*;
pub use residuals::*;
pub use settings::*;
pub use solution::*;
pub use solver::*;
pub use standardform::*;
pub use variables::*;
