use super::*;
use crate::algebra::*;
use crate::io::PrintTarget;
use crate::solver::core::SolverStatus;
use crate::timers::*;

/// Progress information for the filter line search solver.
///
/// A reference to the current info is passed to the termination
/// callback once per iteration.

#[derive(Default, Debug)]
pub struct DefaultInfo<T> {
    /// barrier parameter
    pub μ: T,
    /// objective value at the current iterate
    pub objective: T,
    /// constraint violation `‖c‖∞`
    pub res_primal: T,
    /// stationarity violation `‖∇f + Aᵀλ - z‖∞`
    pub res_dual: T,
    /// scaled optimality error of the original problem
    pub opt_error: T,
    pub iterations: u32,

    // last step
    pub α_pr: T,
    pub α_du: T,
    /// trial points evaluated by the last line search
    pub ls_trials: u32,
    /// true if the last step used a second order correction
    pub soc: bool,
    /// true if the last step came from feasibility restoration
    pub restored: bool,

    // last KKT factorization
    pub δw: T,
    pub δc: T,
    pub factorizations: usize,

    /// restoration phases entered during the solve
    pub restorations: u32,

    pub solve_time: f64,
    pub status: SolverStatus,

    // target stream for printing
    pub(crate) stream: PrintTarget,
}

impl<T> DefaultInfo<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self, timers: &mut Timers) {
        self.status = SolverStatus::Unsolved;
        self.iterations = 0;
        self.restorations = 0;
        self.solve_time = 0f64;
        self.reset_step();
        self.δw = T::zero();
        self.δc = T::zero();
        self.factorizations = 0;

        timers.reset();
    }

    pub(crate) fn reset_step(&mut self) {
        self.α_pr = T::zero();
        self.α_du = T::zero();
        self.ls_trials = 0;
        self.soc = false;
        self.restored = false;
    }

    pub(crate) fn update(
        &mut self,
        vars: &DefaultVariables<T>,
        residuals: &DefaultResiduals<T>,
        μ: T,
        nstructural: usize,
        settings: &DefaultSettings<T>,
        timers: &Timers,
    ) {
        self.μ = μ;
        self.objective = residuals.f;
        self.res_primal = residuals.primal_infeasibility();
        self.res_dual = residuals.dual_infeasibility(nstructural);
        self.opt_error = residuals.optimality_error(vars, T::zero(), nstructural, settings.s_max);

        // solve time so far
        self.solve_time = timers.running_time("solve").as_secs_f64();
    }

    pub(crate) fn finalize(&mut self, status: SolverStatus, timers: &Timers) {
        self.status = status;
        self.solve_time = timers.total_time().as_secs_f64();
    }
}
