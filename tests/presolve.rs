#![allow(non_snake_case)]

use ipfilter::{algebra::*, solver::*};

// (x₀ - 1)² + (x₁ - x₂)²  s.t.  x₀ + x₂ - rhs = 0
struct Coupled {
    rhs: f64,
}

impl Evaluator<f64> for Coupled {
    fn nvars(&self) -> usize {
        3
    }
    fn ncons(&self) -> usize {
        1
    }
    fn objective(&self, x: &[f64]) -> f64 {
        (x[0] - 1.).powi(2) + (x[1] - x[2]).powi(2)
    }
    fn gradient(&self, x: &[f64], g: &mut [f64]) {
        g[0] = 2. * (x[0] - 1.);
        g[1] = 2. * (x[1] - x[2]);
        g[2] = -2. * (x[1] - x[2]);
    }
    fn hessian(&self, _x: &[f64], H: &mut Matrix<f64>) {
        H.set_zero();
        H[(0, 0)] = 2.;
        H[(1, 1)] = 2.;
        H[(2, 2)] = 2.;
        H[(1, 2)] = -2.;
        H[(2, 1)] = -2.;
    }
    fn constraints(&self, x: &[f64], c: &mut [f64]) {
        c[0] = x[0] + x[2] - self.rhs;
    }
    fn jacobian(&self, _x: &[f64], J: &mut Matrix<f64>) {
        J.set_zero();
        J[(0, 0)] = 1.;
        J[(0, 2)] = 1.;
    }
}

fn quiet_settings() -> DefaultSettings<f64> {
    DefaultSettingsBuilder::default().verbose(false).build().unwrap()
}

#[test]
fn test_presolve_fixed_variable() {
    // x₂ is fixed at 3, so x₀ = 1 and x₁ = 3
    let problem = NonlinearProblem::new(
        Coupled { rhs: 4. },
        vec![0., 0., 3.],
        vec![10., 10., 3.],
        vec![ConstraintSense::Equal],
    )
    .unwrap();

    let mut solver = DefaultSolver::new(&problem, quiet_settings()).unwrap();
    let outcome = solver.solve(&[5., 5., 5.]);

    assert!(outcome.is_optimal());
    assert_eq!(outcome.x[2], 3.);
    assert!((outcome.x[0] - 1.).abs() < 1e-5);
    assert!((outcome.x[1] - 3.).abs() < 1e-5);
}

#[test]
fn test_presolve_all_fixed_feasible() {
    let problem = NonlinearProblem::new(
        Coupled { rhs: 3. },
        vec![1., 2., 2.],
        vec![1., 2., 2.],
        vec![ConstraintSense::Equal],
    )
    .unwrap();

    let mut solver = DefaultSolver::new(&problem, quiet_settings()).unwrap();
    let outcome = solver.solve(&[0., 0., 0.]);

    assert_eq!(outcome.status, SolverStatus::Optimal);
    assert_eq!(outcome.x, vec![1., 2., 2.]);
    assert_eq!(outcome.objective, Some(0.));
    assert_eq!(outcome.iterations, 0);
}

#[test]
fn test_presolve_all_fixed_infeasible() {
    let problem = NonlinearProblem::new(
        Coupled { rhs: 5. },
        vec![1., 2., 2.],
        vec![1., 2., 2.],
        vec![ConstraintSense::Equal],
    )
    .unwrap();

    let mut solver = DefaultSolver::new(&problem, quiet_settings()).unwrap();
    let outcome = solver.solve(&[0., 0., 0.]);

    assert_eq!(outcome.status, SolverStatus::Infeasible);
    assert_eq!(outcome.x, vec![1., 2., 2.]);
}

#[test]
fn test_presolve_inconsistent_bounds() {
    let problem = NonlinearProblem::new(
        Coupled { rhs: 4. },
        vec![0., 3., 0.],
        vec![10., 1., 10.],
        vec![ConstraintSense::Equal],
    )
    .unwrap();

    let mut solver = DefaultSolver::new(&problem, quiet_settings()).unwrap();
    let outcome = solver.solve(&[1., 1., 1.]);

    assert_eq!(outcome.status, SolverStatus::Infeasible);
    assert_eq!(outcome.iterations, 0);
}

#[test]
fn test_presolve_classes() {
    let classes = presolve(&[0., 2., f64::NEG_INFINITY, 1.], &[1., 2., 4., f64::INFINITY]).unwrap();

    assert_eq!(classes[0], VariableClass::Boxed(0., 1.));
    assert!(classes[1].is_fixed());
    assert_eq!(classes[2], VariableClass::Upper(4.));
    assert_eq!(classes[3], VariableClass::Lower(1.));

    assert_eq!(
        presolve(&[1.], &[0.]),
        Err(ProblemError::InconsistentBounds(0))
    );
}
