#![allow(non_snake_case)]

use ipfilter::{algebra::*, solver::*};

fn quiet_settings() -> DefaultSettings<f64> {
    DefaultSettingsBuilder::default().verbose(false).build().unwrap()
}

fn solve<E: Evaluator<f64>>(problem: &NonlinearProblem<f64, E>, x0: &[f64]) -> Outcome<f64> {
    let mut solver = DefaultSolver::new(problem, quiet_settings()).unwrap();
    solver.solve(x0)
}

// a x + q x² with optional constraint x - 1 {≥, ≤} 0
struct Scalar {
    a: f64,
    q: f64,
    constrained: bool,
}

impl Evaluator<f64> for Scalar {
    fn nvars(&self) -> usize {
        1
    }
    fn ncons(&self) -> usize {
        usize::from(self.constrained)
    }
    fn objective(&self, x: &[f64]) -> f64 {
        self.a * x[0] + self.q * x[0] * x[0]
    }
    fn gradient(&self, x: &[f64], g: &mut [f64]) {
        g[0] = self.a + 2. * self.q * x[0];
    }
    fn hessian(&self, _x: &[f64], H: &mut Matrix<f64>) {
        H[(0, 0)] = 2. * self.q;
    }
    fn constraints(&self, x: &[f64], c: &mut [f64]) {
        if self.constrained {
            c[0] = x[0] - 1.;
        }
    }
    fn jacobian(&self, _x: &[f64], J: &mut Matrix<f64>) {
        if self.constrained {
            J[(0, 0)] = 1.;
        }
    }
}

// -x  s.t.  x² - 4 ≤ 0
struct Disc;

impl Evaluator<f64> for Disc {
    fn nvars(&self) -> usize {
        1
    }
    fn ncons(&self) -> usize {
        1
    }
    fn objective(&self, x: &[f64]) -> f64 {
        -x[0]
    }
    fn gradient(&self, _x: &[f64], g: &mut [f64]) {
        g[0] = -1.;
    }
    fn hessian(&self, _x: &[f64], H: &mut Matrix<f64>) {
        H[(0, 0)] = 0.;
    }
    fn constraints(&self, x: &[f64], c: &mut [f64]) {
        c[0] = x[0] * x[0] - 4.;
    }
    fn jacobian(&self, x: &[f64], J: &mut Matrix<f64>) {
        J[(0, 0)] = 2. * x[0];
    }
    fn constraint_hessian(&self, _x: &[f64], _i: usize, H: &mut Matrix<f64>) {
        H[(0, 0)] = 2.;
    }
}

#[test]
fn test_lower_bound() {
    // min x, x ≥ 1
    let eval = Scalar {
        a: 1.,
        q: 0.,
        constrained: false,
    };
    let problem = NonlinearProblem::new(eval, vec![1.], vec![f64::INFINITY], vec![]).unwrap();
    let outcome = solve(&problem, &[5.]);

    assert!(outcome.is_optimal());
    assert!((outcome.x[0] - 1.).abs() < 1e-5);
    assert!(outcome.x[0] >= 1.);
}

#[test]
fn test_greater_than_constraint() {
    // min x, x - 1 ≥ 0, x ≥ 0
    let eval = Scalar {
        a: 1.,
        q: 0.,
        constrained: true,
    };
    let problem = NonlinearProblem::new(
        eval,
        vec![0.],
        vec![f64::INFINITY],
        vec![ConstraintSense::GreaterThan],
    )
    .unwrap();
    let outcome = solve(&problem, &[5.]);

    assert!(outcome.is_optimal());
    assert!((outcome.x[0] - 1.).abs() < 1e-5);
    assert!((outcome.objective.unwrap() - 1.).abs() < 1e-5);
}

#[test]
fn test_greater_than_free_variable() {
    // min x², x - 1 ≥ 0, x free
    let eval = Scalar {
        a: 0.,
        q: 1.,
        constrained: true,
    };
    let problem = NonlinearProblem::new(
        eval,
        vec![f64::NEG_INFINITY],
        vec![f64::INFINITY],
        vec![ConstraintSense::GreaterThan],
    )
    .unwrap();
    let outcome = solve(&problem, &[3.]);

    assert!(outcome.is_optimal());
    assert!((outcome.x[0] - 1.).abs() < 1e-5);
}

#[test]
fn test_less_than_constraint_inactive() {
    // min (x - 0)², x - 1 ≤ 0, from an infeasible start
    let eval = Scalar {
        a: 0.,
        q: 1.,
        constrained: true,
    };
    let problem = NonlinearProblem::new(
        eval,
        vec![-10.],
        vec![10.],
        vec![ConstraintSense::LessThan],
    )
    .unwrap();
    let outcome = solve(&problem, &[4.]);

    assert!(outcome.is_optimal());
    assert!(outcome.x[0].abs() < 1e-5);
}

#[test]
fn test_upper_bound() {
    // min -x, x ≤ 2
    let eval = Scalar {
        a: -1.,
        q: 0.,
        constrained: false,
    };
    let problem =
        NonlinearProblem::new(eval, vec![f64::NEG_INFINITY], vec![2.], vec![]).unwrap();
    let outcome = solve(&problem, &[0.]);

    assert!(outcome.is_optimal());
    assert!((outcome.x[0] - 2.).abs() < 1e-5);
    assert!(outcome.x[0] <= 2.);
}

#[test]
fn test_box_bound() {
    // min (x - 5)² = x² - 10x + 25, 0 ≤ x ≤ 3
    let eval = Scalar {
        a: -10.,
        q: 1.,
        constrained: false,
    };
    let problem = NonlinearProblem::new(eval, vec![0.], vec![3.], vec![]).unwrap();
    let outcome = solve(&problem, &[1.]);

    assert!(outcome.is_optimal());
    assert!((outcome.x[0] - 3.).abs() < 1e-5);
    assert!(outcome.x[0] <= 3. + 1e-6);
}

#[test]
fn test_less_than_nonlinear() {
    // min -x, x² ≤ 4, x ≥ 0
    let problem = NonlinearProblem::new(
        Disc,
        vec![0.],
        vec![f64::INFINITY],
        vec![ConstraintSense::LessThan],
    )
    .unwrap();
    let outcome = solve(&problem, &[0.]);

    assert!(outcome.is_optimal());
    assert!((outcome.x[0] - 2.).abs() < 1e-5);
    assert!((outcome.objective.unwrap() + 2.).abs() < 1e-5);
}
