#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use crate::solver::core::{kktsolvers::KKTSolver, traits::Evaluator};

// ---------------------------------------------------------------
// Backtracking filter line search with second order corrections
// ---------------------------------------------------------------

impl<'a, T, E> SolveState<'a, T, E>
where
    T: FloatT,
    E: Evaluator<T>,
{
    /// Search along the current direction.  Returns `false` if the step
    /// length fell below its minimum without finding an acceptable
    /// point, in which case the iterate is unchanged.
    pub(crate) fn line_search(&mut self, info: &mut DefaultInfo<T>) -> Result<bool, StepError> {
        let τ = self.barrier.τ;
        let μ = self.barrier.μ;
        let θ = self.residuals.θ;
        let m = self.vars.λ.len();

        let α_max = fraction_to_boundary(&self.vars.x, &self.step.x, τ);
        let α_du = fraction_to_boundary(&self.vars.z, &self.step.z, τ);
        let gφdx = self.residuals.grad_φ.dot(&self.step.x);
        let α_min = self.minimum_step(gφdx);

        let mut α = α_max;
        let mut trials = 0;

        while α >= α_min {
            trials += 1;
            info.ls_trials = trials;

            self.trial
                .x
                .waxpby(T::one(), &self.vars.x, α, &self.step.x);
            let trial = evaluate_trial(&self.standard, &self.trial.x, μ, &mut self.c_trial, &self.token)?;

            if let Some((θt, φt)) = trial {
                if let Some(armijo) = self.acceptance(α, θt, φt, gφdx) {
                    self.accept(α, α_du, armijo, info)?;
                    return Ok(true);
                }
            }

            // curb the Maratos effect before the first shortening
            let θt = trial.map_or(T::infinity(), |(θt, _)| θt);
            if trials == 1 && m > 0 && θt >= θ && self.second_order_correction(α, θt, gφdx, info)? {
                return Ok(true);
            }

            α /= (2.).as_T();
        }
        Ok(false)
    }

    /// Filter and sufficient decrease tests for a trial point reached
    /// with step length `α`.  Returns `Some(armijo)` on acceptance,
    /// where `armijo` tells if the Armijo condition was the reason.
    pub(crate) fn acceptance(&self, α: T, θt: T, φt: T, gφdx: T) -> Option<bool> {
        let s = &self.settings;
        let (θ, φ) = (self.residuals.θ, self.residuals.φ);

        if !self.filter.is_acceptable(θt, φt) {
            return None;
        }

        let switching = gφdx < T::zero()
            && α * T::powf(-gφdx, s.s_phi) > s.delta * T::powf(θ, s.s_theta)
            && θ <= self.θ_min;

        if switching {
            (φt <= φ + s.eta_phi * α * gφdx).then_some(true)
        } else {
            let accepted = θt <= (T::one() - s.gamma_theta) * θ || φt <= φ - s.gamma_phi * θ;
            accepted.then_some(false)
        }
    }

    /// Smallest step length tried before falling back on restoration
    pub(crate) fn minimum_step(&self, gφdx: T) -> T {
        let s = &self.settings;
        let θ = self.residuals.θ;

        let mut α_min = s.gamma_theta;
        if gφdx < T::zero() {
            α_min = T::min(α_min, s.gamma_phi * θ / (-gφdx));
            if θ <= self.θ_min {
                let switching = s.delta * T::powf(θ, s.s_theta) / T::powf(-gφdx, s.s_phi);
                α_min = T::min(α_min, switching);
            }
        }
        T::max(s.gamma_alpha * α_min, T::epsilon())
    }

    // take the step and update the filter if the step was not
    // accepted on the objective alone
    fn accept(&mut self, α_pr: T, α_du: T, armijo: bool, info: &mut DefaultInfo<T>) -> Result<(), StepError> {
        if !armijo {
            let s = &self.settings;
            let (θ, φ) = (self.residuals.θ, self.residuals.φ);
            self.filter
                .augment((T::one() - s.gamma_theta) * θ, φ - s.gamma_phi * θ);
        }
        self.commit_step(α_pr, α_du)?;

        info.α_pr = α_pr;
        info.α_du = α_du;
        self.restorations = 0;
        Ok(())
    }

    // Recompute the step with the constraint term of the right hand
    // side replaced by an accumulated correction.
    fn second_order_correction(
        &mut self,
        α: T,
        θt: T,
        gφdx: T,
        info: &mut DefaultInfo<T>,
    ) -> Result<bool, StepError> {
        if !self.c_trial.is_finite() {
            return Ok(false);
        }

        let τ = self.barrier.τ;
        let μ = self.barrier.μ;
        let κ_soc = self.settings.kappa_soc;

        // c_soc = α·c(x) + c(x_trial)
        let mut c_soc = self.c_trial.clone();
        c_soc.axpby(α, &self.residuals.c, T::one());
        let mut θ_prev = θt;

        for _ in 0..self.settings.soc_max {
            kkt_rhs(&mut self.rhs, &self.residuals, &self.vars.λ, &c_soc);
            self.kkt.solve(&mut self.lhs, &self.rhs, &self.settings)?;
            unpack_direction(&self.lhs, &self.vars, μ, &mut self.soc_step);

            let α_soc = fraction_to_boundary(&self.vars.x, &self.soc_step.x, τ);
            self.trial
                .x
                .waxpby(T::one(), &self.vars.x, α_soc, &self.soc_step.x);

            let trial = evaluate_trial(&self.standard, &self.trial.x, μ, &mut self.c_trial, &self.token)?;
            let Some((θs, φs)) = trial else {
                break;
            };

            if let Some(armijo) = self.acceptance(α, θs, φs, gφdx) {
                std::mem::swap(&mut self.step, &mut self.soc_step);
                let α_du = fraction_to_boundary(&self.vars.z, &self.step.z, τ);
                self.accept(α_soc, α_du, armijo, info)?;
                info.soc = true;
                return Ok(true);
            }

            if θs > κ_soc * θ_prev {
                break;
            }
            θ_prev = θs;

            // c_soc = α_soc·c_soc + c(x_soc)
            c_soc.axpby(T::one(), &self.c_trial, α_soc);
        }
        Ok(false)
    }
}
