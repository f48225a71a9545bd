#![allow(non_snake_case)]

use ipfilter::solver::DefaultInfo;
use ipfilter::{algebra::*, solver::*};
use std::{cell::Cell, rc::Rc};

// 2(x² + y² - 1) - x on the unit circle.  Full Newton steps from points
// on the circle increase both the objective and the violation, so the
// filter only accepts them after a second order correction.
struct Maratos;

impl Evaluator<f64> for Maratos {
    fn nvars(&self) -> usize {
        2
    }
    fn ncons(&self) -> usize {
        1
    }
    fn objective(&self, x: &[f64]) -> f64 {
        2. * (x[0] * x[0] + x[1] * x[1] - 1.) - x[0]
    }
    fn gradient(&self, x: &[f64], g: &mut [f64]) {
        g[0] = 4. * x[0] - 1.;
        g[1] = 4. * x[1];
    }
    fn hessian(&self, _x: &[f64], H: &mut Matrix<f64>) {
        H.set_zero();
        H[(0, 0)] = 4.;
        H[(1, 1)] = 4.;
    }
    fn constraints(&self, x: &[f64], c: &mut [f64]) {
        c[0] = x[0] * x[0] + x[1] * x[1] - 1.;
    }
    fn jacobian(&self, x: &[f64], J: &mut Matrix<f64>) {
        J[(0, 0)] = 2. * x[0];
        J[(0, 1)] = 2. * x[1];
    }
    fn constraint_hessian(&self, _x: &[f64], _i: usize, H: &mut Matrix<f64>) {
        H.set_zero();
        H[(0, 0)] = 2.;
        H[(1, 1)] = 2.;
    }
}

#[test]
fn test_second_order_correction_accepted() {
    let problem = NonlinearProblem::new(
        Maratos,
        vec![f64::NEG_INFINITY; 2],
        vec![f64::INFINITY; 2],
        vec![ConstraintSense::Equal],
    )
    .unwrap();
    let settings = DefaultSettingsBuilder::default().verbose(false).build().unwrap();
    let mut solver = DefaultSolver::new(&problem, settings).unwrap();

    let corrections = Rc::new(Cell::new(0u32));
    let seen = corrections.clone();
    solver.set_termination_callback(move |info: &DefaultInfo<f64>| {
        if info.soc {
            seen.set(seen.get() + 1);
        }
        false
    });

    let outcome = solver.solve(&[f64::cos(0.3), f64::sin(0.3)]);

    assert!(corrections.get() > 0);
    assert!(outcome.is_optimal());
    assert!((outcome.x[0] - 1.).abs() < 1e-5);
    assert!(outcome.x[1].abs() < 1e-5);
}
