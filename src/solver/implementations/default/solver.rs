#![allow(non_snake_case)]

use super::info_print::ProblemSize;
use super::*;
use crate::algebra::*;
use crate::io::ConfigurablePrintTarget;
use crate::solver::core::{
    callbacks::{Callback, SolverCallbacks},
    interrupt::InterruptToken,
    kktsolvers::{direct::DirectLDLKKTSolver, KKTError, KKTSolver},
    traits::Evaluator,
    SettingsError, SolverStatus,
};
use crate::timers::*;
use thiserror::Error;

// ---------------------------------
// internal step errors
// ---------------------------------

/// Reasons for leaving the main loop from inside an iteration
#[derive(Error, Debug, Clone, PartialEq)]
pub(crate) enum StepError {
    #[error("solve interrupted")]
    Interrupted,
    #[error("evaluation returned a non-finite value")]
    NonFiniteEvaluation,
    #[error(transparent)]
    Kkt(#[from] KKTError),
    #[error("terminated with status {0}")]
    Terminated(SolverStatus),
}

impl StepError {
    pub(crate) fn status(&self) -> SolverStatus {
        match self {
            StepError::Interrupted => SolverStatus::Aborted,
            StepError::NonFiniteEvaluation | StepError::Kkt(_) => SolverStatus::Error,
            StepError::Terminated(status) => *status,
        }
    }
}

/// Run `f` with interrupt checks on either side
pub(crate) fn guarded<R>(token: &InterruptToken, f: impl FnOnce() -> R) -> Result<R, StepError> {
    if token.is_interrupted() {
        return Err(StepError::Interrupted);
    }
    let out = f();
    if token.is_interrupted() {
        return Err(StepError::Interrupted);
    }
    Ok(out)
}

// steps are not considered tiny while the constraint
// violation exceeds this
const TINY_STEP_MAX_VIOLATION: f64 = 1e-4;

// ---------------------------------
// per-solve state
// ---------------------------------

/// Everything owned by one run from one starting point
pub(crate) struct SolveState<'a, T: FloatT, E> {
    pub standard: StandardForm<'a, T, E>,
    pub settings: DefaultSettings<T>,
    pub token: InterruptToken,

    pub vars: DefaultVariables<T>,
    pub trial: DefaultVariables<T>,
    pub step: DefaultVariables<T>,
    pub soc_step: DefaultVariables<T>,
    pub residuals: DefaultResiduals<T>,
    pub kkt: DirectLDLKKTSolver<T>,
    pub filter: Filter<T>,
    pub barrier: BarrierController<T>,

    pub θ_min: T,
    pub θ_max: T,

    // workspace
    pub σ: Vec<T>,
    pub rhs: Vec<T>,
    pub lhs: Vec<T>,
    pub c_trial: Vec<T>,

    // consecutive tiny steps and restorations
    pub tiny_steps: u32,
    pub restorations: u32,
}

impl<'a, T, E> SolveState<'a, T, E>
where
    T: FloatT,
    E: Evaluator<T>,
{
    pub fn new(
        standard: StandardForm<'a, T, E>,
        settings: &DefaultSettings<T>,
        token: &InterruptToken,
    ) -> Result<Self, KKTError> {
        let n = standard.nvars();
        let m = standard.ncons();
        let kkt = DirectLDLKKTSolver::new(n, m, settings)?;

        Ok(Self {
            standard,
            settings: settings.clone(),
            token: token.clone(),
            vars: DefaultVariables::new(n, m),
            trial: DefaultVariables::new(n, m),
            step: DefaultVariables::new(n, m),
            soc_step: DefaultVariables::new(n, m),
            residuals: DefaultResiduals::new(n, m),
            kkt,
            filter: Filter::new(T::infinity()),
            barrier: BarrierController::new(settings),
            θ_min: T::zero(),
            θ_max: T::infinity(),
            σ: vec![T::zero(); n],
            rhs: vec![T::zero(); n + m],
            lhs: vec![T::zero(); n + m],
            c_trial: vec![T::zero(); m],
            tiny_steps: 0,
            restorations: 0,
        })
    }

    /// Push the starting point into the interior and evaluate there
    pub fn initialize(&mut self, x0: &[T]) -> Result<(), StepError> {
        let settings = &self.settings;
        let standard = &self.standard;
        let y0 = guarded(&self.token, || {
            standard.from_original(x0, settings.bound_push, settings.bound_frac)
        })?
        .map_err(|_| StepError::Terminated(SolverStatus::Error))?;

        if !y0.is_finite() {
            return Err(StepError::NonFiniteEvaluation);
        }

        self.vars.x.copy_from(&y0);
        self.vars.λ.set(T::zero());
        self.vars.z.set(settings.z_init);

        self.residuals
            .evaluate_functions(&self.standard, &self.vars.x, &self.token)?;

        let θ0 = T::max(T::one(), self.residuals.θ);
        self.θ_max = settings.theta_max_fact * θ0;
        self.θ_min = settings.theta_min_fact * θ0;
        self.filter.reset(self.θ_max);

        self.residuals.update(&self.vars, self.barrier.μ);
        Ok(())
    }

    /// The current iterate in the original variables
    pub fn original_point(&self) -> Vec<T> {
        self.standard.to_original(&self.vars.x)
    }

    /// Decrease μ while the barrier subproblem is solved to tolerance
    pub fn update_barrier(&mut self) {
        let nstructural = self.standard.nstructural();
        let mut changed = false;
        loop {
            let μ = self.barrier.μ;
            let Eμ = self
                .residuals
                .optimality_error(&self.vars, μ, nstructural, self.settings.s_max);
            if Eμ > self.settings.kappa_eps * μ || !self.barrier.decrease(&self.settings) {
                break;
            }
            changed = true;
        }
        if changed {
            self.on_barrier_change();
        }
    }

    fn on_barrier_change(&mut self) {
        self.filter.reset(self.θ_max);
        self.residuals.update(&self.vars, self.barrier.μ);
    }

    /// One outer iteration: direction, then a line search or a
    /// restoration phase.  Returns a status if the solve is finished.
    pub fn step(&mut self, info: &mut DefaultInfo<T>, timers: &mut Timers) -> Result<Option<SolverStatus>, StepError> {
        let direction;
        timeit! {timers => "kkt factor"; {
            direction = self.compute_direction(info);
        }}

        match direction {
            Ok(()) => {}
            Err(StepError::Kkt(KKTError::InertiaCorrection)) => {
                self.run_restoration(info, timers)?;
                return Ok(None);
            }
            Err(e) => return Err(e),
        }

        if self.is_tiny_step() {
            return self.take_tiny_step(info);
        }
        self.tiny_steps = 0;

        let accepted;
        timeit! {timers => "line search"; {
            accepted = self.line_search(info);
        }}

        if !accepted? {
            let (θ, φ) = (self.residuals.θ, self.residuals.φ);
            self.filter.augment(
                (T::one() - self.settings.gamma_theta) * θ,
                φ - self.settings.gamma_phi * θ,
            );
            self.run_restoration(info, timers)?;
        }
        Ok(None)
    }

    fn run_restoration(&mut self, info: &mut DefaultInfo<T>, timers: &mut Timers) -> Result<(), StepError> {
        let restored;
        timeit! {timers => "restoration"; {
            restored = self.restore(info);
        }}
        restored
    }

    // Newton direction of the barrier subproblem, with inertia correction
    pub(crate) fn compute_direction(&mut self, info: &mut DefaultInfo<T>) -> Result<(), StepError> {
        self.residuals.evaluate_hessian(
            &self.standard,
            &self.vars.x,
            &self.vars.λ,
            &self.token,
        )?;
        self.vars.barrier_sigma(&mut self.σ);

        let updated = self.kkt.update(
            &self.residuals.W,
            &self.σ,
            &self.residuals.A,
            self.barrier.μ,
            &self.settings,
        );
        info.factorizations = self.kkt.factorizations();
        updated?;

        let (δw, δc) = self.kkt.regularization();
        info.δw = δw;
        info.δc = δc;

        kkt_rhs(&mut self.rhs, &self.residuals, &self.vars.λ, &self.residuals.c);
        self.kkt.solve(&mut self.lhs, &self.rhs, &self.settings)?;
        unpack_direction(&self.lhs, &self.vars, self.barrier.μ, &mut self.step);
        Ok(())
    }

    fn is_tiny_step(&self) -> bool {
        if self.residuals.primal_infeasibility() > TINY_STEP_MAX_VIOLATION.as_T() {
            return false;
        }
        let tol = T::epsilon() * (10.).as_T();
        self.vars
            .x
            .iter()
            .zip(&self.step.x)
            .all(|(&xi, &dxi)| T::abs(dxi) / (T::one() + T::abs(xi)) < tol)
    }

    fn take_tiny_step(&mut self, info: &mut DefaultInfo<T>) -> Result<Option<SolverStatus>, StepError> {
        let τ = self.barrier.τ;
        let α_pr = fraction_to_boundary(&self.vars.x, &self.step.x, τ);
        let α_du = fraction_to_boundary(&self.vars.z, &self.step.z, τ);
        self.commit_step(α_pr, α_du)?;
        info.α_pr = α_pr;
        info.α_du = α_du;
        self.restorations = 0;
        self.tiny_steps += 1;

        if self.barrier.decrease(&self.settings) {
            self.on_barrier_change();
        }

        if self.tiny_steps >= 2 && self.barrier.at_floor() {
            let status = if self.residuals.primal_infeasibility() <= self.settings.tol {
                SolverStatus::Optimal
            } else {
                SolverStatus::Failed
            };
            return Ok(Some(status));
        }
        Ok(None)
    }

    /// Replace the iterate with `vars + (α_pr·dx, α_pr·dλ, α_du·dz)`.
    /// The iterate is left unchanged if evaluation fails.
    pub fn commit_step(&mut self, α_pr: T, α_du: T) -> Result<(), StepError> {
        let μ = self.barrier.μ;
        self.trial.take_step(&self.vars, &self.step, α_pr, α_du);
        self.trial.clip_bound_duals(μ, self.settings.kappa_sigma);
        self.commit_trial()
    }

    /// Evaluate at the trial iterate and make it current
    pub fn commit_trial(&mut self) -> Result<(), StepError> {
        self.residuals
            .evaluate_functions(&self.standard, &self.trial.x, &self.token)?;
        std::mem::swap(&mut self.vars, &mut self.trial);
        self.residuals.update(&self.vars, self.barrier.μ);
        Ok(())
    }
}

/// `rhs = -[∇φ + Aᵀλ ; c]`
pub(crate) fn kkt_rhs<T: FloatT>(rhs: &mut [T], residuals: &DefaultResiduals<T>, λ: &[T], c: &[T]) {
    let n = residuals.grad_φ.len();
    let (top, bottom) = rhs.split_at_mut(n);
    top.copy_from(&residuals.grad_φ);
    residuals.A.t().gemv(top, λ, T::one(), T::one());
    top.negate();
    bottom.scalarop_from(|ci| -ci, c);
}

/// Split a KKT solution into `(dx, dλ)` and complete `dz`
pub(crate) fn unpack_direction<T: FloatT>(lhs: &[T], vars: &DefaultVariables<T>, μ: T, step: &mut DefaultVariables<T>) {
    let n = step.x.len();
    step.x.copy_from(&lhs[..n]);
    step.λ.copy_from(&lhs[n..]);
    DefaultVariables::bound_step(vars, μ, step);
}

// ---------------------------------
// the solver
// ---------------------------------

/// Primal-dual interior point solver with a filter line search.
///
/// ```no_run
/// # use ipfilter::solver::*;
/// # fn run<E: Evaluator<f64>>(problem: &NonlinearProblem<f64, E>, x0: &[f64]) {
/// let settings = DefaultSettings::default();
/// let mut solver = DefaultSolver::new(problem, settings).unwrap();
/// let outcome = solver.solve(x0);
/// println!("{}: {:?}", outcome.status, outcome.x);
/// # }
/// ```
pub struct DefaultSolver<'a, T: FloatT, E> {
    problem: &'a NonlinearProblem<T, E>,
    pub settings: DefaultSettings<T>,
    pub info: DefaultInfo<T>,
    //timers is stored as an option so that
    //we can swap it out during a solve
    timers: Option<Timers>,
    token: InterruptToken,
    callbacks: SolverCallbacks<DefaultInfo<T>>,
}

impl<'a, T, E> DefaultSolver<'a, T, E>
where
    T: FloatT,
    E: Evaluator<T>,
{
    pub fn new(problem: &'a NonlinearProblem<T, E>, settings: DefaultSettings<T>) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            problem,
            settings,
            info: DefaultInfo::new(),
            timers: Some(Timers::default()),
            token: InterruptToken::new(),
            callbacks: SolverCallbacks::default(),
        })
    }

    /// Use `token` to interrupt this solver, in place of its own
    pub fn set_interrupt_token(&mut self, token: InterruptToken) {
        self.token = token;
    }

    /// A token that interrupts this solver when tripped
    pub fn interrupt_token(&self) -> InterruptToken {
        self.token.clone()
    }

    /// Register a callback run once per iteration.  Returning `true`
    /// stops the solve with [`Aborted`](SolverStatus::Aborted).
    pub fn set_termination_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&DefaultInfo<T>) -> bool + 'static,
    {
        self.callbacks.termination_callback = Callback::Rust(Box::new(callback));
    }

    pub fn unset_termination_callback(&mut self) {
        self.callbacks.termination_callback = Callback::None;
    }

    /// Timers from the most recent solve
    pub fn timers(&self) -> Option<&Timers> {
        self.timers.as_ref()
    }

    /// Solve from the starting point `x0`, given in the original
    /// variables.
    pub fn solve(&mut self, x0: &[T]) -> Outcome<T> {
        let mut timers = self.timers.take().unwrap_or_default();
        self.info.reset(&mut timers);

        notimeit! {timers; {
            let _ = self.info.print_banner(&self.settings);
        }}

        let (status, x);
        timeit! {timers => "solve"; {
            (status, x) = self.run(x0, &mut timers);
        }}

        self.info.finalize(status, &timers);

        let objective = match status {
            SolverStatus::Error | SolverStatus::Aborted => None,
            _ => x
                .is_finite()
                .then(|| self.problem.evaluator.objective(&x)),
        };

        let _ = self.info.print_footer(&self.settings, &timers);
        self.timers.replace(timers);

        let mut outcome = Outcome::new(status, x, objective);
        outcome.iterations = self.info.iterations;
        outcome.solve_time = self.info.solve_time;
        outcome
    }

    fn run(&mut self, x0: &[T], timers: &mut Timers) -> (SolverStatus, Vec<T>) {
        let standard = match StandardForm::new(self.problem) {
            Ok(standard) => standard,
            Err(ProblemError::InconsistentBounds(_)) => {
                return (SolverStatus::Infeasible, x0.to_vec());
            }
            Err(_) => return (SolverStatus::Error, x0.to_vec()),
        };
        if x0.len() != self.problem.nvars() {
            return (SolverStatus::Error, x0.to_vec());
        }

        let size = ProblemSize {
            nvars: self.problem.nvars(),
            ncons: self.problem.ncons(),
            nfixed: standard.classes().iter().filter(|c| c.is_fixed()).count(),
            nstandard: standard.nvars(),
            nrows: standard.ncons(),
        };
        notimeit! {timers; {
            let _ = self.info.print_configuration(&self.settings, &size);
        }}

        // nothing left to optimize
        if standard.is_empty() {
            let x = standard.to_original(&[]);
            let status = if is_feasible(self.problem, &x, self.settings.tol) {
                SolverStatus::Optimal
            } else {
                SolverStatus::Infeasible
            };
            return (status, x);
        }

        let mut state = match SolveState::new(standard, &self.settings, &self.token) {
            Ok(state) => state,
            Err(_) => return (SolverStatus::Error, x0.to_vec()),
        };

        if let Err(e) = state.initialize(x0) {
            return (e.status(), x0.to_vec());
        }

        notimeit! {timers; {
            let _ = self.info.print_status_header(&self.settings);
        }}

        let status = self.iterate(&mut state, timers);
        (status, state.original_point())
    }

    // ----------
    // main loop
    // ----------
    fn iterate(&mut self, state: &mut SolveState<'a, T, E>, timers: &mut Timers) -> SolverStatus {
        let nstructural = state.standard.nstructural();

        loop {
            if self.token.is_interrupted() {
                return SolverStatus::Aborted;
            }

            // convergence check and printing
            self.info.update(
                &state.vars,
                &state.residuals,
                state.barrier.μ,
                nstructural,
                &self.settings,
                timers,
            );

            notimeit! {timers; {
                let _ = self.info.print_status(&self.settings);
            }}

            if self.callbacks.check_termination(&self.info) {
                return SolverStatus::Aborted;
            }

            if self.info.opt_error <= self.settings.eps && self.info.res_primal <= self.settings.tol {
                return SolverStatus::Optimal;
            }
            if self.info.iterations >= self.settings.max_iter {
                return SolverStatus::Failed;
            }
            if timers.running_time("solve").as_secs_f64() > self.settings.time_limit {
                return SolverStatus::Failed;
            }

            state.update_barrier();

            self.info.iterations += 1;
            self.info.reset_step();

            match state.step(&mut self.info, timers) {
                Ok(None) => {}
                Ok(Some(status)) => return status,
                Err(e) => return e.status(),
            }
        }
    }
}

impl<'a, T, E> ConfigurablePrintTarget for DefaultSolver<'a, T, E>
where
    T: FloatT,
{
    fn print_to_stdout(&mut self) {
        self.info.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.info.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn std::io::Write + Send + Sync>) {
        self.info.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.info.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.info.get_print_buffer()
    }
}
