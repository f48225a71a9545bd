#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use crate::solver::core::{interrupt::InterruptToken, traits::Evaluator};

// ---------------
// Cached evaluations at the current iterate
// ---------------

/// Function values and derivatives at the current iterate.
///
/// Everything here is computed on the standard form variables.  `θ` is
/// the constraint violation `‖c‖₁` and `φ` the barrier objective
/// `f - μ Σ ln xᵢ`.
#[derive(Debug, Clone)]
pub struct DefaultResiduals<T> {
    pub f: T,
    pub g: Vec<T>,
    pub c: Vec<T>,
    pub A: Matrix<T>,
    pub W: Matrix<T>,
    work: Matrix<T>,

    // ∇f + Aᵀλ - z
    pub rd: Vec<T>,
    // ∇f - μ X⁻¹e
    pub grad_φ: Vec<T>,

    pub θ: T,
    pub φ: T,
}

impl<T> DefaultResiduals<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            f: T::zero(),
            g: vec![T::zero(); n],
            c: vec![T::zero(); m],
            A: Matrix::zeros((m, n)),
            W: Matrix::zeros((n, n)),
            work: Matrix::zeros((n, n)),
            rd: vec![T::zero(); n],
            grad_φ: vec![T::zero(); n],
            θ: T::zero(),
            φ: T::zero(),
        }
    }

    /// Objective, gradient, constraints and Jacobian at `x`
    pub(crate) fn evaluate_functions<E>(&mut self, eval: &E, x: &[T], token: &InterruptToken) -> Result<(), StepError>
    where
        E: Evaluator<T>,
    {
        let f = guarded(token, || eval.objective(x))?;
        guarded(token, || eval.gradient(x, &mut self.g))?;
        guarded(token, || eval.constraints(x, &mut self.c))?;
        guarded(token, || eval.jacobian(x, &mut self.A))?;

        if !f.is_finite() || !self.g.is_finite() || !self.c.is_finite() || !self.A.is_finite() {
            return Err(StepError::NonFiniteEvaluation);
        }
        self.f = f;
        self.θ = self.c.norm_one();
        Ok(())
    }

    /// Lagrangian Hessian at `(x, λ)`
    pub(crate) fn evaluate_hessian<E>(&mut self, eval: &E, x: &[T], λ: &[T], token: &InterruptToken) -> Result<(), StepError>
    where
        E: Evaluator<T>,
    {
        guarded(token, || eval.lagrangian_hessian(x, λ, &mut self.W, &mut self.work))?;
        if !self.W.is_finite() {
            return Err(StepError::NonFiniteEvaluation);
        }
        Ok(())
    }

    /// Refresh the quantities that depend on `μ` or the multipliers
    pub fn update(&mut self, vars: &DefaultVariables<T>, μ: T) {
        self.φ = barrier_objective(self.f, &vars.x, μ);

        for (gφ, (&gi, &xi)) in self.grad_φ.iter_mut().zip(self.g.iter().zip(&vars.x)) {
            *gφ = gi - μ / xi;
        }

        // rd = g + Aᵀλ - z
        self.rd.copy_from(&self.g);
        self.A.t().gemv(&mut self.rd, &vars.λ, T::one(), T::one());
        self.rd.axpby(-T::one(), &vars.z, T::one());
    }

    /// Constraint violation in the max norm
    pub fn primal_infeasibility(&self) -> T {
        self.c.norm_inf()
    }

    /// Stationarity violation over the structural columns.  Slack
    /// columns carry no objective and do not enter.
    pub fn dual_infeasibility(&self, nstructural: usize) -> T {
        self.rd[..nstructural].norm_inf()
    }

    /// Scaled optimality error `E_μ` of the barrier problem.  `E_0` is
    /// the optimality error of the original problem.
    pub fn optimality_error(&self, vars: &DefaultVariables<T>, μ: T, nstructural: usize, s_max: T) -> T {
        let n = vars.x.len();
        let m = vars.λ.len();

        let z_one = vars.z.norm_one();
        let s_d = T::max(s_max, (vars.λ.norm_one() + z_one) / (m + n).max(1).as_T()) / s_max;
        let s_c = T::max(s_max, z_one / n.max(1).as_T()) / s_max;

        let mut comp = T::zero();
        for (&xi, &zi) in vars.x.iter().zip(&vars.z) {
            comp = T::max(comp, T::abs(xi * zi - μ));
        }

        let dual = self.dual_infeasibility(nstructural) / s_d;
        let primal = self.primal_infeasibility();
        T::max(dual, T::max(primal, comp / s_c))
    }
}

/// `f - μ Σ ln xᵢ`
pub(crate) fn barrier_objective<T: FloatT>(f: T, x: &[T], μ: T) -> T {
    f - μ * x.sumlog()
}

/// Constraint violation and barrier objective at a trial point, or
/// `None` if either is not finite.
pub(crate) fn evaluate_trial<T, E>(
    eval: &E,
    x: &[T],
    μ: T,
    c: &mut [T],
    token: &InterruptToken,
) -> Result<Option<(T, T)>, StepError>
where
    T: FloatT,
    E: Evaluator<T>,
{
    let f = guarded(token, || eval.objective(x))?;
    guarded(token, || eval.constraints(x, c))?;

    let θ = c.norm_one();
    let φ = barrier_objective(f, x, μ);
    if θ.is_finite() && φ.is_finite() {
        Ok(Some((θ, φ)))
    } else {
        Ok(None)
    }
}
