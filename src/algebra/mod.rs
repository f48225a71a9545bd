//! Linear algebra types and operations used by the solver.
//!
//! Vector operations are provided as traits on slices of
//! [`FloatT`](crate::algebra::FloatT).  Matrices come in two flavours: a
//! dense column major [`Matrix`](crate::algebra::Matrix) for evaluator output
//! and a sparse [`CscMatrix`](crate::algebra::CscMatrix) for the KKT system.

mod csc;
mod dense;
mod error_types;
mod floats;
mod math_traits;
mod matrix_types;
mod scalarmath;
mod vecmath;

pub use error_types::*;
pub use floats::*;
pub use math_traits::*;
pub use matrix_types::*;
pub(crate) use scalarmath::triangular_number;
