#![allow(non_snake_case)]

use super::nlsolve::DenseLDL;
use super::*;
use crate::algebra::*;
use crate::solver::core::{
    interrupt::InterruptToken,
    kktsolvers::KKTError,
    traits::{Evaluator, NonlinearSolveError, NonlinearSystem, NonlinearSystemSolver},
    SolverStatus,
};

// ---------------------------------------------------------------
// Feasibility restoration
// ---------------------------------------------------------------

// Least squares system with residual
//
//    r(v) = [ c(v) ; √ρ·D(v - x_r) ],   dᵢ = min(1, 1/|x_r,i|)
//
// which reduces the constraint violation while staying close to the
// reference point x_r.
struct RestorationSystem<'s, T, E> {
    eval: &'s E,
    x_r: &'s [T],
    w: Vec<T>,
    token: &'s InterruptToken,
    A: Matrix<T>,
}

impl<'s, T, E> RestorationSystem<'s, T, E>
where
    T: FloatT,
    E: Evaluator<T>,
{
    fn new(eval: &'s E, x_r: &'s [T], ρ: T, token: &'s InterruptToken) -> Self {
        let sqrtρ = ρ.sqrt();
        let w = x_r
            .iter()
            .map(|&xi| sqrtρ * T::min(T::one(), T::recip(xi.abs())))
            .collect();
        let A = Matrix::zeros((eval.ncons(), eval.nvars()));
        Self {
            eval,
            x_r,
            w,
            token,
            A,
        }
    }

    fn check_interrupt(&self) -> Result<(), NonlinearSolveError> {
        if self.token.is_interrupted() {
            Err(NonlinearSolveError::Interrupted)
        } else {
            Ok(())
        }
    }
}

impl<'s, T, E> NonlinearSystem<T> for RestorationSystem<'s, T, E>
where
    T: FloatT,
    E: Evaluator<T>,
{
    fn nvars(&self) -> usize {
        self.x_r.len()
    }

    fn nresiduals(&self) -> usize {
        self.eval.ncons() + self.x_r.len()
    }

    fn residual(&mut self, v: &[T], r: &mut [T]) -> Result<(), NonlinearSolveError> {
        self.check_interrupt()?;
        let (c, prox) = r.split_at_mut(self.eval.ncons());
        self.eval.constraints(v, c);
        self.check_interrupt()?;
        for (pi, (&wi, (&vi, &xi))) in prox.iter_mut().zip(self.w.iter().zip(v.iter().zip(self.x_r))) {
            *pi = wi * (vi - xi);
        }
        Ok(())
    }

    fn jacobian(&mut self, v: &[T], J: &mut Matrix<T>) -> Result<(), NonlinearSolveError> {
        self.check_interrupt()?;
        let m = self.eval.ncons();
        self.eval.jacobian(v, &mut self.A);
        self.check_interrupt()?;

        J.set_zero();
        for (j, &wj) in self.w.iter().enumerate() {
            J.col_slice_mut(j)[..m].copy_from(self.A.col_slice(j));
            J[(m + j, j)] = wj;
        }
        Ok(())
    }
}

impl<'a, T, E> SolveState<'a, T, E>
where
    T: FloatT,
    E: Evaluator<T>,
{
    /// Move to a point with a smaller constraint violation, ignoring
    /// the objective.  Fails with a terminal status if no such point
    /// is found.
    pub(crate) fn restore(&mut self, info: &mut DefaultInfo<T>) -> Result<(), StepError> {
        self.restorations += 1;
        info.restorations += 1;
        info.restored = true;
        if self.restorations > self.settings.max_restorations {
            return Err(StepError::Terminated(SolverStatus::Failed));
        }

        let μ = self.barrier.μ;
        let θ_old = self.residuals.θ;
        let x_r = self.vars.x.clone();

        let solution = {
            let s = &self.settings;
            let mut system = RestorationSystem::new(&self.standard, &x_r, s.restoration_rho, &self.token);
            let mut lm = LevenbergMarquardt::new(s.restoration_max_iter, s.eps);
            match lm.solve(&mut system, &x_r) {
                Ok(solution) => solution,
                Err(NonlinearSolveError::Interrupted) => return Err(StepError::Interrupted),
                Err(_) => return Err(StepError::Terminated(SolverStatus::Failed)),
            }
        };
        let stationary = solution.is_stationary();
        self.trial.x.copy_from(solution.point());

        // a point outside the positive orthant is rejected outright
        if self.trial.x.iter().any(|&vi| vi <= T::zero()) {
            let (standard, x, c) = (&self.standard, &self.trial.x, &mut self.c_trial);
            guarded(&self.token, || standard.constraints(x, c))?;
            return Err(StepError::Terminated(self.rejection_status(stationary)));
        }

        // components moved too close to their bound are pulled back
        let floor = T::one() - self.barrier.τ;
        for (vi, &xi) in self.trial.x.iter_mut().zip(&x_r) {
            *vi = T::max(*vi, floor * xi);
        }

        let trial = evaluate_trial(&self.standard, &self.trial.x, μ, &mut self.c_trial, &self.token)?;
        let accepted = trial.is_some_and(|(θ_new, φ_new)| {
            θ_new <= self.settings.kappa_resto * θ_old
                || (θ_new < θ_old && self.filter.is_acceptable(θ_new, φ_new))
        });

        if !accepted {
            return Err(StepError::Terminated(self.rejection_status(stationary)));
        }

        self.residuals
            .evaluate_functions(&self.standard, &self.trial.x, &self.token)?;
        self.refit_duals()?;
        std::mem::swap(&mut self.vars, &mut self.trial);
        self.residuals.update(&self.vars, μ);
        Ok(())
    }

    // Local infeasibility needs a stationary least squares point that
    // still violates the constraints.  Expects `c_trial` to hold the
    // constraints at the rejected point.
    fn rejection_status(&self, stationary: bool) -> SolverStatus {
        if stationary && self.c_trial.norm_inf() > self.settings.tol {
            SolverStatus::Infeasible
        } else {
            SolverStatus::Failed
        }
    }

    // Multipliers for the trial point by alternating sweeps: a least
    // squares λ for fixed z, then z = max(∇f + Aᵀλ, 0).  Expects the
    // residuals to hold the derivatives at the trial point.
    fn refit_duals(&mut self) -> Result<(), StepError> {
        let μ = self.barrier.μ;
        let A = &self.residuals.A;
        let g = &self.residuals.g;
        let (m, n) = A.size();

        let trial = &mut self.trial;
        trial.z.copy_from(&self.vars.z);
        trial.λ.set(T::zero());

        if m > 0 {
            // A Aᵀ, shifted slightly so that dependent rows are harmless
            let mut AAt = Matrix::zeros((m, m));
            for i in 0..m {
                for j in 0..=i {
                    let v = (0..n).fold(T::zero(), |acc, k| acc + A[(i, k)] * A[(j, k)]);
                    AAt[(i, j)] = v;
                    AAt[(j, i)] = v;
                }
            }
            let mut ldl = DenseLDL::new(m).map_err(KKTError::from)?;
            ldl.factor(&AAt, (1e-8).as_T()).map_err(KKTError::from)?;

            let mut r = vec![T::zero(); n];
            for _ in 0..self.settings.restoration_dual_sweeps {
                // λ = (AAᵀ)⁻¹ A(z - g)
                r.waxpby(T::one(), &trial.z, -T::one(), g);
                A.gemv(&mut trial.λ, &r, T::one(), T::zero());
                ldl.solve(&mut trial.λ);

                // z = max(g + Aᵀλ, 0)
                trial.z.copy_from(g);
                A.t().gemv(&mut trial.z, &trial.λ, T::one(), T::one());
                trial.z.scalarop(|zi| T::max(zi, T::zero()));
            }
        } else {
            trial.z.scalarop_from(|gi| T::max(gi, T::zero()), g);
        }

        for (zi, &xi) in trial.z.iter_mut().zip(&trial.x) {
            *zi = T::max(*zi, μ / xi);
        }
        trial.clip_bound_duals(μ, self.settings.kappa_sigma);

        if !trial.λ.is_finite() || !trial.z.is_finite() {
            return Err(StepError::NonFiniteEvaluation);
        }
        Ok(())
    }
}
