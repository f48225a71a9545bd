#![allow(non_snake_case)]

use crate::algebra::*;

// The KKT matrix is held as the full upper triangle of an (n+m)×(n+m)
// matrix.  Evaluator output is dense, so every entry is kept as a
// structural nonzero and the sparsity pattern never changes between
// iterations.  Entry (i,j) with i ≤ j lives at nzval[j(j+1)/2 + i].

pub(crate) fn allocate_kkt_matrix<T: FloatT>(n: usize, m: usize) -> CscMatrix<T> {
    CscMatrix::dense_triu(n + m)
}

#[inline]
pub(crate) fn kkt_index(row: usize, col: usize) -> usize {
    debug_assert!(row <= col);
    triangular_number(col) + row
}

// indices of the diagonal entries of the KKT matrix
pub(crate) fn kkt_diagonal_index(dim: usize) -> Vec<usize> {
    (0..dim).map(|i| kkt_index(i, i)).collect()
}

// write [W+Σ+δw I, Aᵀ; A, -δc I] into the upper triangle.  Only the
// symmetric part of W is used.
pub(crate) fn fill_kkt_values<T: FloatT>(
    nzval: &mut [T],
    W: &Matrix<T>,
    σ: &[T],
    A: &Matrix<T>,
    δw: T,
    δc: T,
) {
    let n = W.ncols();
    let m = A.nrows();
    let half: T = (0.5).as_T();

    for col in 0..n {
        for row in 0..col {
            nzval[kkt_index(row, col)] = half * (W[(row, col)] + W[(col, row)]);
        }
        nzval[kkt_index(col, col)] = W[(col, col)] + σ[col] + δw;
    }

    for k in 0..m {
        let col = n + k;
        for row in 0..n {
            nzval[kkt_index(row, col)] = A[(k, row)];
        }
        for row in n..col {
            nzval[kkt_index(row, col)] = T::zero();
        }
        nzval[kkt_index(col, col)] = -δc;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_kkt_pattern() {
        let K = allocate_kkt_matrix::<f64>(3, 2);
        assert!(K.check_format().is_ok());
        assert!(K.is_triu());
        assert_eq!(K.nnz(), 15);
        assert_eq!(kkt_diagonal_index(5), vec![0, 2, 5, 9, 14]);
    }

    #[test]
    fn test_kkt_fill() {
        let mut K = allocate_kkt_matrix::<f64>(2, 1);
        let W = Matrix::from(&[[2., 1.], [3., 4.]]);
        let A = Matrix::from(&[[5., 6.]]);
        fill_kkt_values(&mut K.nzval, &W, &[0.5, 0.25], &A, 1., 1e-3);

        assert_eq!(K.get_entry((0, 0)), Some(3.5));
        assert_eq!(K.get_entry((0, 1)), Some(2.));
        assert_eq!(K.get_entry((1, 1)), Some(5.25));
        assert_eq!(K.get_entry((0, 2)), Some(5.));
        assert_eq!(K.get_entry((1, 2)), Some(6.));
        assert_eq!(K.get_entry((2, 2)), Some(-1e-3));
    }
}
