use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
/// Error type returned by sparse matrix assembly operations.
pub enum SparseFormatError {
    /// Matrix dimension fields and/or array lengths are incompatible
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    #[error("Row value exceeds the matrix row dimension or rows are unsorted")]
    /// Row values out of range or not increasing within a column
    BadRowval,
    #[error("Bad column pointer values")]
    /// Matrix column pointer values are defective
    BadColptr,
}

#[derive(Error, Debug, PartialEq, Eq)]
/// Error type returned when data does not match an expected shape.
pub enum DimensionError {
    #[error("{what} has length {found}, expected {expected}")]
    /// A vector has the wrong length
    BadLength {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{what} has size {found:?}, expected {expected:?}")]
    /// A matrix has the wrong size
    BadSize {
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },
}
