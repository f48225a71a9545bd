//! Problem formats supported by the solver.  Only the default
//! bounded nonlinear program format is provided.

pub mod default;
