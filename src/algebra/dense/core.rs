#![allow(non_snake_case)]

use crate::algebra::{Adjoint, FloatT, Matrix, MatrixShape, ShapedMatrix, VectorMath};
use std::ops::{Index, IndexMut};

impl<T> Matrix<T>
where
    T: FloatT,
{
    pub fn zeros(size: (usize, usize)) -> Self {
        let (m, n) = size;
        Self {
            m,
            n,
            data: vec![T::zero(); m * n],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut mat = Matrix::zeros((n, n));
        for i in 0..n {
            mat[(i, i)] = T::one();
        }
        mat
    }

    /// set every entry to zero, keeping the dimensions
    pub fn set_zero(&mut self) {
        self.data.set(T::zero());
    }

    pub fn t(&self) -> Adjoint<'_, Self> {
        Adjoint { src: self }
    }

    pub fn col_slice(&self, col: usize) -> &[T] {
        assert!(col < self.n);
        &self.data[(col * self.m)..(col + 1) * self.m]
    }

    pub fn col_slice_mut(&mut self, col: usize) -> &mut [T] {
        assert!(col < self.n);
        &mut self.data[(col * self.m)..(col + 1) * self.m]
    }

    pub fn is_finite(&self) -> bool {
        self.data.is_finite()
    }

    /// Largest absolute asymmetry `|M[i,j] - M[j,i]|`
    pub fn asymmetry(&self) -> T {
        assert!(self.is_square());
        let mut out = T::zero();
        for j in 0..self.n {
            for i in 0..j {
                out = T::max(out, T::abs(self[(i, j)] - self[(j, i)]));
            }
        }
        out
    }

    #[inline]
    fn index_linear(&self, idx: (usize, usize)) -> usize {
        idx.0 + self.m * idx.1
    }
}

impl<T: FloatT, const M: usize, const N: usize> From<&[[T; N]; M]> for Matrix<T> {
    // row major literal, as written in code
    fn from(rows: &[[T; N]; M]) -> Self {
        let mut mat = Matrix::zeros((M, N));
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                mat[(i, j)] = v;
            }
        }
        mat
    }
}

impl<T> ShapedMatrix for Matrix<T> {
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

impl<T: FloatT> Index<(usize, usize)> for Matrix<T> {
    type Output = T;
    fn index(&self, idx: (usize, usize)) -> &T {
        &self.data[self.index_linear(idx)]
    }
}

impl<T: FloatT> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, idx: (usize, usize)) -> &mut T {
        let lidx = self.index_linear(idx);
        &mut self.data[lidx]
    }
}

#[test]
fn test_matrix_indexing() {
    let mut A = Matrix::from(&[[1., 2., 3.], [4., 5., 6.]]);
    assert_eq!(A.size(), (2, 3));
    assert_eq!(A.data, vec![1., 4., 2., 5., 3., 6.]);
    assert_eq!(A[(1, 2)], 6.);
    assert_eq!(A.col_slice(1), &[2., 5.]);

    A[(0, 0)] = -1.;
    assert_eq!(A.data[0], -1.);
    A.set_zero();
    assert!(A.data.iter().all(|&v| v == 0.));
}

#[test]
fn test_matrix_asymmetry() {
    let A = Matrix::from(&[[1., 2.], [2.5, 1.]]);
    assert_eq!(A.asymmetry(), 0.5);
    assert_eq!(Matrix::<f64>::identity(3).asymmetry(), 0.);
}
