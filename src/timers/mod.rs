//! Nested wall-clock timers for profiling the solver.

#[allow(clippy::module_inception)]
mod timers;
pub use timers::*;
pub(crate) use timers::{notimeit, timeit};
