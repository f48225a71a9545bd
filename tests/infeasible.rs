#![allow(non_snake_case)]

use ipfilter::{algebra::*, solver::*};

// zero objective with x - 1 = 0 and x - 2 = 0
struct Contradiction;

impl Evaluator<f64> for Contradiction {
    fn nvars(&self) -> usize {
        1
    }
    fn ncons(&self) -> usize {
        2
    }
    fn objective(&self, _x: &[f64]) -> f64 {
        0.
    }
    fn gradient(&self, _x: &[f64], g: &mut [f64]) {
        g[0] = 0.;
    }
    fn hessian(&self, _x: &[f64], H: &mut Matrix<f64>) {
        H[(0, 0)] = 0.;
    }
    fn constraints(&self, x: &[f64], c: &mut [f64]) {
        c[0] = x[0] - 1.;
        c[1] = x[0] - 2.;
    }
    fn jacobian(&self, _x: &[f64], J: &mut Matrix<f64>) {
        J[(0, 0)] = 1.;
        J[(1, 0)] = 1.;
    }
}

#[test]
fn test_infeasible_equalities() {
    let problem = NonlinearProblem::nonnegative(Contradiction);
    let settings = DefaultSettingsBuilder::default().verbose(false).build().unwrap();
    let mut solver = DefaultSolver::new(&problem, settings).unwrap();

    let outcome = solver.solve(&[0.]);

    assert_eq!(outcome.status, SolverStatus::Infeasible);
    assert!(!is_feasible(&problem, &outcome.x, 1e-6));
    assert!(outcome.x[0].is_finite());
    assert!(solver.info.restorations > 0);
}

// x⁸ = 256 with x ≥ 0, feasible at x = 2 but nearly flat near zero
struct EighthPower;

impl Evaluator<f64> for EighthPower {
    fn nvars(&self) -> usize {
        1
    }
    fn ncons(&self) -> usize {
        1
    }
    fn objective(&self, _x: &[f64]) -> f64 {
        0.
    }
    fn gradient(&self, _x: &[f64], g: &mut [f64]) {
        g[0] = 0.;
    }
    fn hessian(&self, _x: &[f64], H: &mut Matrix<f64>) {
        H[(0, 0)] = 0.;
    }
    fn constraints(&self, x: &[f64], c: &mut [f64]) {
        c[0] = x[0].powi(8) - 256.;
    }
    fn jacobian(&self, x: &[f64], J: &mut Matrix<f64>) {
        J[(0, 0)] = 8. * x[0].powi(7);
    }
    fn constraint_hessian(&self, x: &[f64], _i: usize, H: &mut Matrix<f64>) {
        H[(0, 0)] = 56. * x[0].powi(6);
    }
}

#[test]
fn test_restoration_iteration_limit_not_infeasible() {
    let problem = NonlinearProblem::nonnegative(EighthPower);

    // a restoration that runs out of iterations is a failure, not a
    // certificate of infeasibility
    for max_iter in [0, 1, 2] {
        let settings = DefaultSettingsBuilder::default()
            .verbose(false)
            .restoration_max_iter(max_iter)
            .build()
            .unwrap();
        let mut solver = DefaultSolver::new(&problem, settings).unwrap();
        let outcome = solver.solve(&[0.01]);
        assert_eq!(outcome.status, SolverStatus::Failed);
        assert!(solver.info.restorations > 0);
    }

    let settings = DefaultSettingsBuilder::default().verbose(false).build().unwrap();
    let mut solver = DefaultSolver::new(&problem, settings).unwrap();
    let outcome = solver.solve(&[0.01]);
    assert!(outcome.is_optimal());
    assert!((outcome.x[0] - 2.).abs() < 1e-6);
}
