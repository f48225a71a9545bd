#![allow(non_snake_case)]

use crate::algebra::*;

impl<T: FloatT> MatrixVectorMultiply for Matrix<T> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        assert_eq!(x.len(), self.n);
        assert_eq!(y.len(), self.m);

        if b == T::zero() {
            y.fill(T::zero());
        } else {
            y.scale(b);
        }
        for (col, &xcol) in x.iter().enumerate() {
            y.axpby(a * xcol, self.col_slice(col), T::one());
        }
    }
}

impl<T: FloatT> MatrixVectorMultiply for Adjoint<'_, Matrix<T>> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        let A = self.src;
        assert_eq!(x.len(), A.m);
        assert_eq!(y.len(), A.n);

        for (col, ycol) in y.iter_mut().enumerate() {
            let ax = a * A.col_slice(col).dot(x);
            *ycol = if b == T::zero() { ax } else { ax + b * (*ycol) };
        }
    }
}

#[test]
fn test_dense_gemv() {
    let A = Matrix::from(&[[1., 0., 2.], [0., 3., 4.]]);
    let x = vec![1., 1., 1.];
    let mut y = vec![1., 1.];
    A.gemv(&mut y, &x, 2., -1.);
    assert_eq!(y, vec![5., 13.]);

    let x = vec![1., 2.];
    let mut y = vec![1.; 3];
    A.t().gemv(&mut y, &x, 1., 0.);
    assert_eq!(y, vec![1., 6., 10.]);
}
