#![allow(non_snake_case)]

use super::ldlsolvers::qdldl::*;
use super::*;
use crate::solver::core::kktsolvers::{InertiaCorrector, KKTSolver};
use crate::solver::core::CoreSettings;

// -------------------------------------
// KKTSolver using direct LDL factorisation
// -------------------------------------

type BoxedDirectLDLSolver<T> = Box<dyn DirectLDLSolver<T> + Send>;

pub struct DirectLDLKKTSolver<T> {
    // problem dimensions
    n: usize,
    m: usize,

    // Left and right hand sides for solves
    x: Vec<T>,
    b: Vec<T>,

    // internal workspace for IR scheme
    work1: Vec<T>,
    work2: Vec<T>,

    // every entry of the KKT matrix, in nzval order
    index: Vec<usize>,

    // unpermuted KKT matrix holding the regularized values
    // used in the most recent factorization
    KKT: CscMatrix<T>,

    // the direct linear LDL solver
    ldlsolver: BoxedDirectLDLSolver<T>,

    // inertia correction state, persists across updates
    corrector: InertiaCorrector<T>,

    // the regularization currently applied
    δw: T,
    δc: T,
    nfactor: usize,
}

impl<T> DirectLDLKKTSolver<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize, settings: &CoreSettings<T>) -> Result<Self, KKTError> {
        let dim = n + m;

        // LHS/RHS/work for iterative refinement
        let x = vec![T::zero(); dim];
        let b = vec![T::zero(); dim];
        let work1 = vec![T::zero(); dim];
        let work2 = vec![T::zero(); dim];

        let KKT = allocate_kkt_matrix(n, m);
        let index = (0..KKT.nnz()).collect();

        // Natural ordering puts the Hessian block first, so a negative
        // pivot appearing there is exactly a missing positive eigenvalue
        // of the reduced Hessian.
        let perm = (0..dim).collect();
        let ldlsolver: BoxedDirectLDLSolver<T> = Box::new(QDLDLDirectLDLSolver::new(
            &KKT,
            Some(perm),
            settings.zero_pivot_tol,
        )?);

        Ok(Self {
            n,
            m,
            x,
            b,
            work1,
            work2,
            index,
            KKT,
            ldlsolver,
            corrector: InertiaCorrector::new(),
            δw: T::zero(),
            δc: T::zero(),
            nfactor: 0,
        })
    }

    /// The last nonzero Hessian shift applied by an update
    pub fn last_delta_w(&self) -> T {
        self.corrector.last_delta_w()
    }

    fn iterative_refinement(&mut self, settings: &CoreSettings<T>) -> bool {
        let (x, b) = (&mut self.x, &self.b);
        let (e, dx) = (&mut self.work1, &mut self.work2);

        // iterative refinement params
        let reltol = settings.iterative_refinement_reltol;
        let abstol = settings.iterative_refinement_abstol;
        let maxiter = settings.iterative_refinement_max_iter;
        let stopratio = settings.iterative_refinement_stop_ratio;

        let K = &self.KKT;
        let normb = b.norm_inf();

        //compute the initial error
        let mut norme = _get_refine_error(e, b, K, x);

        for _ in 0..maxiter {
            // bail on numerical error
            if !norme.is_finite() {
                return false;
            }

            if norme <= (abstol + reltol * normb) {
                //within tolerance.  Exit
                break;
            }

            let lastnorme = norme;

            //make a refinement
            self.ldlsolver.solve(dx, e);

            //prospective solution is x + dx.  Use dx space to
            // hold it for a check before applying to x
            dx.axpby(T::one(), x, T::one()); //now dx is really x + dx
            norme = _get_refine_error(e, b, K, dx);

            let improved_ratio = lastnorme / norme;
            if improved_ratio < stopratio {
                //insufficient improvement.  Exit
                if improved_ratio > T::one() {
                    std::mem::swap(x, dx);
                }
                break;
            } else {
                std::mem::swap(x, dx);
            }
        }
        //NB: "success" means only that we had a finite valued result
        true
    }
}

impl<T> KKTSolver<T> for DirectLDLKKTSolver<T>
where
    T: FloatT,
{
    fn update(
        &mut self,
        W: &Matrix<T>,
        σ: &[T],
        A: &Matrix<T>,
        μ: T,
        settings: &CoreSettings<T>,
    ) -> Result<(), KKTError> {
        assert_eq!(W.size(), (self.n, self.n));
        assert_eq!(A.size(), (self.m, self.n));
        assert_eq!(σ.len(), self.n);

        if !W.is_finite() || !A.is_finite() || !σ.is_finite() {
            return Err(KKTError::NonFiniteData);
        }

        let (n, m) = (self.n, self.m);
        let KKT = &mut self.KKT;
        let ldlsolver = &mut self.ldlsolver;
        let index = &self.index;

        let reg = self.corrector.correct(n, m, μ, settings, |δw, δc| {
            fill_kkt_values(&mut KKT.nzval, W, σ, A, δw, δc);
            ldlsolver.update_values(index, &KKT.nzval);
            ldlsolver.refactor()
        });

        match reg {
            Ok(reg) => {
                self.δw = reg.δw;
                self.δc = reg.δc;
                self.nfactor = reg.factorizations;
                Ok(())
            }
            Err(e) => {
                self.nfactor = 0;
                Err(e)
            }
        }
    }

    fn solve(
        &mut self,
        lhs: &mut [T],
        rhs: &[T],
        settings: &CoreSettings<T>,
    ) -> Result<(), KKTError> {
        assert_eq!(lhs.len(), self.n + self.m);
        assert_eq!(rhs.len(), self.n + self.m);

        self.b.copy_from(rhs);
        self.ldlsolver.solve(&mut self.x, &self.b);

        let is_success = {
            if settings.iterative_refinement_enable {
                self.iterative_refinement(settings)
            } else {
                self.x.is_finite()
            }
        };

        if !is_success || !self.x.is_finite() {
            return Err(KKTError::NonFiniteSolution);
        }
        lhs.copy_from(&self.x);
        Ok(())
    }

    fn regularization(&self) -> (T, T) {
        (self.δw, self.δc)
    }

    fn factorizations(&self) -> usize {
        self.nfactor
    }
}

//  computes e = b - Kξ, overwriting the first argument
//  and returning its norm

fn _get_refine_error<T: FloatT>(e: &mut [T], b: &[T], K: &CscMatrix<T>, ξ: &mut [T]) -> T {
    // Note that K is only triu data, so need to
    // be careful when computing the residual here

    e.copy_from(b);
    K.sym().symv(e, ξ, -T::one(), T::one()); //#  e = b - Kξ

    e.norm_inf()
}

#[cfg(test)]
mod test {
    use super::*;

    fn check_solution(W: &Matrix<f64>, σ: &[f64], A: &Matrix<f64>, δ: (f64, f64), x: &[f64], b: &[f64]) {
        // residual of the shifted system, computed densely
        let (n, m) = (W.ncols(), A.nrows());
        let mut r = b.to_vec();
        for i in 0..n {
            for j in 0..n {
                r[i] -= W[(i, j)] * x[j];
            }
            r[i] -= (σ[i] + δ.0) * x[i];
            for k in 0..m {
                r[i] -= A[(k, i)] * x[n + k];
            }
        }
        for k in 0..m {
            for j in 0..n {
                r[n + k] -= A[(k, j)] * x[j];
            }
            r[n + k] += δ.1 * x[n + k];
        }
        assert!(r.norm_inf() < 1e-10);
    }

    #[test]
    fn test_kkt_solve_convex() {
        let settings = CoreSettings::<f64>::default();
        let mut kkt = DirectLDLKKTSolver::new(2, 1, &settings).unwrap();

        let W = Matrix::from(&[[2., 0.], [0., 2.]]);
        let A = Matrix::from(&[[1., 1.]]);
        let σ = [0.1, 0.1];
        kkt.update(&W, &σ, &A, 0.1, &settings).unwrap();
        assert_eq!(kkt.regularization(), (0., 0.));
        assert_eq!(kkt.factorizations(), 1);

        let b = [1., -1., 0.5];
        let mut x = [0.; 3];
        kkt.solve(&mut x, &b, &settings).unwrap();
        check_solution(&W, &σ, &A, (0., 0.), &x, &b);
    }

    #[test]
    fn test_kkt_indefinite_hessian() {
        let settings = CoreSettings::<f64>::default();
        let mut kkt = DirectLDLKKTSolver::new(2, 0, &settings).unwrap();

        // eigenvalues of W + Σ are 3.1 and -0.9
        let W = Matrix::from(&[[1., 2.], [2., 1.]]);
        let A = Matrix::zeros((0, 2));
        let σ = [0.1, 0.1];
        kkt.update(&W, &σ, &A, 0.1, &settings).unwrap();

        let (δw, δc) = kkt.regularization();
        assert!(δw > 0.9);
        assert_eq!(δc, 0.);
        assert!(kkt.factorizations() > 1);
        assert_eq!(kkt.last_delta_w(), δw);

        let b = [1., 2.];
        let mut x = [0.; 2];
        kkt.solve(&mut x, &b, &settings).unwrap();
        check_solution(&W, &σ, &A, (δw, δc), &x, &b);
    }

    #[test]
    fn test_kkt_dependent_constraints() {
        let settings = CoreSettings::<f64>::default();
        let mut kkt = DirectLDLKKTSolver::new(1, 2, &settings).unwrap();

        // two identical constraint gradients make the matrix singular
        let W = Matrix::zeros((1, 1));
        let A = Matrix::from(&[[1.], [1.]]);
        let σ = [0.5];
        kkt.update(&W, &σ, &A, 0.1, &settings).unwrap();

        let (δw, δc) = kkt.regularization();
        assert_eq!(δw, 0.);
        assert!(δc > 0.);

        let b = [0., -0.5, -0.5];
        let mut x = [0.; 3];
        kkt.solve(&mut x, &b, &settings).unwrap();
        check_solution(&W, &σ, &A, (δw, δc), &x, &b);
    }

    #[test]
    fn test_kkt_nonfinite_data() {
        let settings = CoreSettings::<f64>::default();
        let mut kkt = DirectLDLKKTSolver::new(1, 0, &settings).unwrap();
        let W = Matrix::from(&[[f64::NAN]]);
        let A = Matrix::zeros((0, 1));
        assert_eq!(
            kkt.update(&W, &[1.], &A, 0.1, &settings),
            Err(KKTError::NonFiniteData)
        );
    }
}
