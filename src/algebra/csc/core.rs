#![allow(non_snake_case)]

use crate::algebra::{
    triangular_number, CscMatrix, FloatT, MatrixShape, ShapedMatrix, SparseFormatError, Symmetric,
};

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// `CscMatrix` constructor.
    ///
    /// # Panics
    /// Makes rudimentary dimensional compatibility checks and panics on
    /// failure.   This constructor does __not__
    /// ensure that rows indices are all in bounds or that data is arranged
    /// such that entries within each column appear in order of increasing
    /// row index.   Use [`check_format`](CscMatrix::check_format) for that.
    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        assert_eq!(rowval.len(), nzval.len());
        assert_eq!(colptr.len(), n + 1);
        assert_eq!(colptr[n], rowval.len());
        CscMatrix {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// allocate space for a sparse matrix with `nnz` elements
    pub fn spalloc(m: usize, n: usize, nnz: usize) -> Self {
        let mut colptr = vec![0; n + 1];
        colptr[n] = nnz;
        CscMatrix::new(m, n, colptr, vec![0; nnz], vec![T::zero(); nnz])
    }

    /// Upper triangle of a dense `n × n` matrix, with every entry
    /// stored.  Entry `(i,j)`, `i ≤ j`, lives at `nzval[j(j+1)/2 + i]`.
    pub fn dense_triu(n: usize) -> Self {
        let nnz = triangular_number(n);
        let mut colptr = Vec::with_capacity(n + 1);
        let mut rowval = Vec::with_capacity(nnz);
        colptr.push(0);
        for col in 0..n {
            rowval.extend(0..=col);
            colptr.push(rowval.len());
        }
        CscMatrix::new(n, n, colptr, rowval, vec![T::zero(); nnz])
    }

    /// number of nonzeros
    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    /// symmetric view
    pub fn sym(&self) -> Symmetric<'_, Self> {
        debug_assert!(self.is_triu());
        Symmetric { src: self }
    }

    /// Check that matrix data is correctly formatted.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.rowval.len() != self.nzval.len()
            || self.colptr.len() != self.n + 1
            || self.colptr[self.n] != self.rowval.len()
        {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.colptr.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadColptr);
        }

        for col in 0..self.n {
            let rows = &self.rowval[self.colptr[col]..self.colptr[col + 1]];
            if rows.windows(2).any(|c| c[0] >= c[1]) {
                return Err(SparseFormatError::BadRowval);
            }
        }

        if !self.rowval.iter().all(|r| r < &self.m) {
            return Err(SparseFormatError::BadRowval);
        }

        Ok(())
    }

    /// True if the matrix is upper triangular
    pub fn is_triu(&self) -> bool {
        (0..self.n).all(|col| {
            let rows = &self.rowval[self.colptr[col]..self.colptr[col + 1]];
            rows.iter().all(|&row| row <= col)
        })
    }

    /// Returns the value at the given (row,col) index, or None if
    /// it is not a structural nonzero.
    ///
    /// # Panics
    /// Panics if the given index is out of bounds.
    pub fn get_entry(&self, idx: (usize, usize)) -> Option<T> {
        let (row, col) = idx;
        assert!(row < self.m && col < self.n);

        let first = self.colptr[col];
        let last = self.colptr[col + 1];
        match self.rowval[first..last].binary_search(&row) {
            Ok(k) => Some(self.nzval[first + k]),
            Err(_) => None,
        }
    }
}

impl<T> ShapedMatrix for CscMatrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
    fn shape(&self) -> MatrixShape {
        MatrixShape::N
    }
}

#[test]
fn test_csc_get_entry() {
    // A =
    //[ ⋅   4.0    ⋅   ]
    //[1.0  5.0    ⋅   ]
    //[ ⋅   6.0   7.0  ]

    let A = CscMatrix::new(
        3,
        3,
        vec![0, 1, 4, 5],
        vec![1, 0, 1, 2, 2],
        vec![1., 4., 5., 6., 7.],
    );
    assert!(A.check_format().is_ok());
    assert!(!A.is_triu());

    assert_eq!(A.get_entry((1, 0)), Some(1.));
    assert_eq!(A.get_entry((2, 1)), Some(6.));
    assert_eq!(A.get_entry((2, 2)), Some(7.));
    assert!(A.get_entry((0, 0)).is_none());
    assert!(A.get_entry((0, 2)).is_none());
}

#[test]
fn test_csc_check_format() {
    let mut A = CscMatrix::new(3, 3, vec![0, 1, 2, 3], vec![0, 1, 2], vec![1.; 3]);
    assert!(A.check_format().is_ok());
    assert!(A.is_triu());

    A.rowval[1] = 5;
    assert_eq!(A.check_format(), Err(SparseFormatError::BadRowval));

    let B = CscMatrix {
        m: 2,
        n: 2,
        colptr: vec![0, 2, 1],
        rowval: vec![0],
        nzval: vec![1.0],
    };
    assert_eq!(B.check_format(), Err(SparseFormatError::BadColptr));
}

#[test]
fn test_csc_dense_triu() {
    let A = CscMatrix::<f64>::dense_triu(3);
    assert!(A.check_format().is_ok());
    assert!(A.is_triu());
    assert_eq!(A.nnz(), 6);
    assert_eq!(A.colptr, vec![0, 1, 3, 6]);
    assert_eq!(A.rowval, vec![0, 0, 1, 0, 1, 2]);
}
