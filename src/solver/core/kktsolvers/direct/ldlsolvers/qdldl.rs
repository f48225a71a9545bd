#![allow(non_snake_case)]
use super::super::DirectLDLSolver;
use crate::algebra::*;
use crate::qdldl::*;
use crate::solver::core::kktsolvers::{Inertia, KKTError};

pub struct QDLDLDirectLDLSolver<T> {
    //KKT matrix and its QDLDL factorization
    factors: QDLDLFactorisation<T>,
}

impl<T> QDLDLDirectLDLSolver<T>
where
    T: FloatT,
{
    /// Make a logical factorization to fix memory allocations.   Pass
    /// `perm` to bypass the AMD ordering.
    pub fn new(
        KKT: &CscMatrix<T>,
        perm: Option<Vec<usize>>,
        zero_pivot_tol: T,
    ) -> Result<Self, KKTError> {
        assert!(KKT.nrows() == KKT.ncols(), "KKT matrix is not square");

        let mut builder = QDLDLSettingsBuilder::default();
        builder
            .logical(true) //allocate memory only on init
            .zero_pivot_tol(zero_pivot_tol)
            .amd_dense_scale(1.5);
        if let Some(perm) = perm {
            builder.perm(perm);
        }
        let opts = builder
            .build()
            .map_err(|_| KKTError::Factorization(QDLDLError::InvalidPermutation))?;

        let factors = QDLDLFactorisation::<T>::new(KKT, Some(opts))?;

        Ok(Self { factors })
    }
}

impl<T> DirectLDLSolver<T> for QDLDLDirectLDLSolver<T>
where
    T: FloatT,
{
    fn update_values(&mut self, index: &[usize], values: &[T]) {
        //Update values that are stored within
        //the reordered copy held internally by QDLDL.
        self.factors.update_values(index, values);
    }

    fn solve(&mut self, x: &mut [T], b: &[T]) {
        // NB: QDLDL solves in place
        x.copy_from(b);
        self.factors.solve(x);
    }

    fn refactor(&mut self) -> Result<Inertia, KKTError> {
        //QDLDL has maintained its own version of the permuted
        //KKT matrix through update_values, so there is nothing
        //to pass in here
        let dim = self.factors.D.len();
        match self.factors.refactor() {
            Ok(()) => {
                if !self.factors.Dinv.is_finite() {
                    return Err(KKTError::NonFiniteData);
                }
                Ok(Inertia::new(
                    self.factors.positive_inertia(),
                    self.factors.negative_inertia(),
                    0,
                ))
            }
            Err(QDLDLError::ZeroPivot) => {
                let positive = self.factors.positive_inertia();
                let negative = self.factors.negative_inertia();
                Ok(Inertia::new(positive, negative, dim - positive - negative))
            }
            Err(e) => Err(e.into()),
        }
    }
}
