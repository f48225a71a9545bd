use super::*;
use crate::algebra::*;
use crate::solver::core::{interrupt::InterruptToken, traits::Evaluator, SettingsError, SolverStatus};

/// Solve `problem` once from each starting point in `starts`.
///
/// Runs are independent and sequential, and each outcome corresponds
/// to the starting point at the same position.  An interrupted run
/// ends the sequence, so the result can be shorter than `starts`.
pub fn optimize<T, E>(
    problem: &NonlinearProblem<T, E>,
    starts: &[Vec<T>],
    settings: &DefaultSettings<T>,
) -> Result<Vec<Outcome<T>>, SettingsError>
where
    T: FloatT,
    E: Evaluator<T>,
{
    optimize_with_token(problem, starts, settings, InterruptToken::new())
}

/// As [`optimize`], with every run watching `token`
pub fn optimize_with_token<T, E>(
    problem: &NonlinearProblem<T, E>,
    starts: &[Vec<T>],
    settings: &DefaultSettings<T>,
    token: InterruptToken,
) -> Result<Vec<Outcome<T>>, SettingsError>
where
    T: FloatT,
    E: Evaluator<T>,
{
    let mut solver = DefaultSolver::new(problem, settings.clone())?;
    solver.set_interrupt_token(token);

    let mut outcomes = Vec::with_capacity(starts.len());
    for x0 in starts {
        let outcome = solver.solve(x0);
        let aborted = outcome.status == SolverStatus::Aborted;
        outcomes.push(outcome);
        if aborted {
            break;
        }
    }
    Ok(outcomes)
}

/// The outcome with the lowest objective among those whose point is
/// feasible for `problem` to within `tol`.
pub fn best_outcome<'o, T, E>(
    problem: &NonlinearProblem<T, E>,
    outcomes: &'o [Outcome<T>],
    tol: T,
) -> Option<&'o Outcome<T>>
where
    T: FloatT,
    E: Evaluator<T>,
{
    outcomes
        .iter()
        .filter_map(|o| o.objective.map(|f| (o, f)))
        .filter(|(o, _)| is_feasible(problem, &o.x, tol))
        .min_by(|(_, f1), (_, f2)| f1.partial_cmp(f2).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(o, _)| o)
}
