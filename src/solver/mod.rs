//! Solver main module.
//!
//! The solver comes with a [default implementation](crate::solver::implementations::default)
//! for bounded nonlinear programs, described in the top level
//! [API page](crate).  Problems are supplied through the
//! [`Evaluator`](crate::solver::traits::Evaluator) trait, and feasibility
//! restoration relies on the
//! [`NonlinearSystemSolver`](crate::solver::traits::NonlinearSystemSolver)
//! primitive.

// internal module structure
pub(crate) mod core;
pub mod implementations;

//Here we expose only part of the solver internals
//and rearrange public modules a bit to give a more
//user friendly API

//user facing traits required to interact with solver
pub use crate::solver::core::traits::*;
pub use crate::solver::core::{SettingsError, SolverStatus};

//user facing modules
pub use crate::solver::core::callbacks;
pub use crate::solver::core::interrupt::InterruptToken;
pub use crate::solver::core::kktsolvers;
pub use crate::solver::core::traits;
pub use crate::solver::core::CoreSettings;

//If we have implemtations for multple alternative
//problem formats, they would live here.   Since we
//only have default, it is exposed at the top level
//in the use statements directly below instead.

pub use crate::solver::implementations::default;
pub use crate::solver::implementations::default::*;
