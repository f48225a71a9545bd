//! Sparse $LDL^T$ factorization for symmetric indefinite matrices.
//!
//! The factorization applies no pivoting beyond a fill reducing (AMD)
//! symmetric permutation chosen at construction.  Dynamic regularization
//! is deliberately absent: the signs of the pivots in `D` are reported back
//! to the caller, which makes the factorization usable as an inertia test.

#[allow(clippy::module_inception)]
mod qdldl;
pub use qdldl::*;
