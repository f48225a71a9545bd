#![allow(non_snake_case)]

use crate::algebra::*;
use std::iter::zip;

impl<T: FloatT> SymMatrixVectorMultiply for Symmetric<'_, CscMatrix<T>> {
    type T = T;

    fn symv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_symv(self.src, y, x, a, b);
    }
}

// The KKT product K*x used in iterative refinement.  Only the
// upper triangle of A is stored.
fn _csc_symv<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    assert_eq!(x.len(), A.n);
    assert_eq!(y.len(), A.n);
    assert_eq!(A.n, A.m);

    y.scale(b);

    for (col, &xcol) in x.iter().enumerate() {
        let rng = A.colptr[col]..A.colptr[col + 1];
        for (&row, &Aij) in zip(&A.rowval[rng.clone()], &A.nzval[rng]) {
            y[row] += a * Aij * xcol;

            if row != col {
                //don't double up on the diagonal
                y[col] += a * Aij * x[row];
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_symv() {
        // K = [4. 1.]
        //     [1. 2.]   (triu stored)
        let K = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![4., 1., 2.]);
        let x = vec![1., -1.];
        let mut y = vec![0.; 2];
        K.sym().symv(&mut y, &x, 1., 0.);
        assert_eq!(y, vec![3., -1.]);
    }
}
