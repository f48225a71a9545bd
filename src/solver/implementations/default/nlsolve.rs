#![allow(non_snake_case)]

use crate::algebra::*;
use crate::qdldl::*;
use crate::solver::core::traits::*;

// ---------------------------------------------------------------
// Dense symmetric positive definite solves through QDLDL
// ---------------------------------------------------------------

/// Repeated solves with dense symmetric positive definite matrices of
/// a fixed size.  The sparsity pattern is the full upper triangle, so
/// the symbolic factorization is done once.
pub(crate) struct DenseLDL<T> {
    K: CscMatrix<T>,
    factors: QDLDLFactorisation<T>,
}

impl<T> DenseLDL<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Result<Self, QDLDLError> {
        let K = CscMatrix::dense_triu(n);
        let opts = QDLDLSettingsBuilder::default()
            .logical(true)
            .build()
            .map_err(|_| QDLDLError::InvalidPermutation)?;
        let factors = QDLDLFactorisation::new(&K, Some(opts))?;
        Ok(Self { K, factors })
    }

    /// Factor `M + shift·I`, reading only the upper triangle of `M`
    pub fn factor(&mut self, M: &Matrix<T>, shift: T) -> Result<(), QDLDLError> {
        let n = self.K.n;
        let mut idx = 0;
        for col in 0..n {
            for row in 0..=col {
                self.K.nzval[idx] = if row == col { M[(row, col)] + shift } else { M[(row, col)] };
                idx += 1;
            }
        }
        self.factors.update_all_values(&self.K.nzval);
        self.factors.refactor()
    }

    /// Solve in place with the most recent factors
    pub fn solve(&mut self, b: &mut [T]) {
        self.factors.solve(b);
    }
}

// ---------------------------------------------------------------
// Levenberg-Marquardt
// ---------------------------------------------------------------

/// Damped Gauss-Newton solver for `min ½‖r(v)‖²`.
///
/// The damping follows Nielsen's update: it shrinks smoothly after a
/// good step and doubles at an increasing rate after a bad one.
#[derive(Debug, Clone)]
pub struct LevenbergMarquardt<T> {
    pub max_iter: u32,
    /// stop when `‖Jᵀr‖∞` falls below this
    pub gtol: T,
    /// stop when the step is this small relative to `‖v‖`
    pub xtol: T,
    /// initial damping relative to the largest diagonal of `JᵀJ`
    pub tau: T,
}

impl<T> LevenbergMarquardt<T>
where
    T: FloatT,
{
    pub fn new(max_iter: u32, gtol: T) -> Self {
        Self {
            max_iter,
            gtol,
            xtol: T::epsilon().sqrt() * T::epsilon().sqrt().sqrt(),
            tau: (1e-3).as_T(),
        }
    }
}

// JᵀJ and Jᵀr
fn normal_equations<T: FloatT>(J: &Matrix<T>, r: &[T], JtJ: &mut Matrix<T>, Jtr: &mut [T]) {
    let n = J.ncols();
    for j in 0..n {
        for i in 0..=j {
            let v = J.col_slice(i).dot(J.col_slice(j));
            JtJ[(i, j)] = v;
            JtJ[(j, i)] = v;
        }
    }
    J.t().gemv(Jtr, r, T::one(), T::zero());
}

fn evaluate<T: FloatT>(
    system: &mut dyn NonlinearSystem<T>,
    v: &[T],
    r: &mut [T],
) -> Result<bool, NonlinearSolveError> {
    match system.residual(v, r) {
        Ok(()) => Ok(r.is_finite()),
        Err(NonlinearSolveError::NonFinite) => Ok(false),
        Err(e) => Err(e),
    }
}

impl<T> NonlinearSystemSolver<T> for LevenbergMarquardt<T>
where
    T: FloatT,
{
    fn solve(
        &mut self,
        system: &mut dyn NonlinearSystem<T>,
        v0: &[T],
    ) -> Result<NonlinearSolution<T>, NonlinearSolveError> {
        let n = system.nvars();
        let p = system.nresiduals();
        assert_eq!(v0.len(), n);

        let mut v = v0.to_vec();
        let mut r = vec![T::zero(); p];
        let mut J = Matrix::zeros((p, n));

        if !evaluate(system, &v, &mut r)? {
            return Err(NonlinearSolveError::NonFinite);
        }
        system.jacobian(&v, &mut J)?;
        if !J.is_finite() {
            return Err(NonlinearSolveError::NonFinite);
        }

        let mut JtJ = Matrix::zeros((n, n));
        let mut g = vec![T::zero(); n];
        normal_equations(&J, &r, &mut JtJ, &mut g);
        let mut F = r.sumsq() / (2.).as_T();

        let mut ldl = DenseLDL::new(n).map_err(|_| NonlinearSolveError::LinearSolve)?;
        let mut h = vec![T::zero(); n];
        let mut v_new = vec![T::zero(); n];
        let mut r_new = vec![T::zero(); p];

        let diag_max = (0..n).fold(T::zero(), |acc, i| T::max(acc, JtJ[(i, i)]));
        let mut ν = if diag_max > T::zero() { self.tau * diag_max } else { self.tau };
        let mut factor: T = (2.).as_T();
        let ν_max: T = T::max_value().sqrt();

        for _ in 0..self.max_iter {
            if g.norm_inf() <= self.gtol {
                return Ok(NonlinearSolution::Converged(v));
            }

            // (JᵀJ + νI) h = -Jᵀr
            ldl.factor(&JtJ, ν).map_err(|_| NonlinearSolveError::LinearSolve)?;
            h.scalarop_from(|gi| -gi, &g);
            ldl.solve(&mut h);
            if !h.is_finite() {
                return Err(NonlinearSolveError::LinearSolve);
            }

            if h.norm() <= self.xtol * (v.norm() + self.xtol) {
                return Ok(NonlinearSolution::Stalled(v));
            }

            v_new.waxpby(T::one(), &v, T::one(), &h);

            // predicted decrease ½ hᵀ(νh - g)
            let pred = (ν * h.sumsq() - h.dot(&g)) / (2.).as_T();
            let ρ = if evaluate(system, &v_new, &mut r_new)? {
                (F - r_new.sumsq() / (2.).as_T()) / pred
            } else {
                -T::one()
            };

            if ρ > T::zero() {
                std::mem::swap(&mut v, &mut v_new);
                std::mem::swap(&mut r, &mut r_new);
                system.jacobian(&v, &mut J)?;
                if !J.is_finite() {
                    return Err(NonlinearSolveError::NonFinite);
                }
                normal_equations(&J, &r, &mut JtJ, &mut g);
                F = r.sumsq() / (2.).as_T();

                let one = T::one();
                let two: T = (2.).as_T();
                let shrink = one - T::powi(two * ρ - one, 3);
                ν *= T::max((1. / 3.).as_T(), shrink);
                factor = two;
            } else {
                ν *= factor;
                factor *= (2.).as_T();
                if ν > ν_max {
                    return Ok(NonlinearSolution::Stalled(v));
                }
            }
        }

        Ok(NonlinearSolution::MaxIterations(v))
    }
}
