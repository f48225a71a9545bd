#![allow(non_snake_case)]
use ipfilter::{algebra::*, solver::*};

// a collection of tests to ensure that data of
// incompatible dimension won't be accepted

// Σ xᵢ² with one constraint x₀ - x₁ = 0
#[derive(Debug)]
struct Bowl {
    n: usize,
}

impl Evaluator<f64> for Bowl {
    fn nvars(&self) -> usize {
        self.n
    }
    fn ncons(&self) -> usize {
        1
    }
    fn objective(&self, x: &[f64]) -> f64 {
        x.sumsq()
    }
    fn gradient(&self, x: &[f64], g: &mut [f64]) {
        g.scalarop_from(|xi| 2. * xi, x);
    }
    fn hessian(&self, _x: &[f64], H: &mut Matrix<f64>) {
        H.set_zero();
        for i in 0..self.n {
            H[(i, i)] = 2.;
        }
    }
    fn constraints(&self, x: &[f64], c: &mut [f64]) {
        c[0] = x[0] - x[1];
    }
    fn jacobian(&self, _x: &[f64], J: &mut Matrix<f64>) {
        J.set_zero();
        J[(0, 0)] = 1.;
        J[(0, 1)] = -1.;
    }
}

fn api_dim_check_problem(
    lower: Vec<f64>,
    upper: Vec<f64>,
    senses: Vec<ConstraintSense>,
) -> Result<NonlinearProblem<f64, Bowl>, ProblemError> {
    NonlinearProblem::new(Bowl { n: 4 }, lower, upper, senses)
}

fn quiet_settings() -> DefaultSettings<f64> {
    DefaultSettingsBuilder::default().verbose(false).build().unwrap()
}

#[test]
fn api_dim_check_working() {
    // This example should work because dimensions are
    // all compatible.  All following checks vary one
    // of these sizes to test dimension checks

    let problem =
        api_dim_check_problem(vec![-1.; 4], vec![1.; 4], vec![ConstraintSense::Equal]).unwrap();

    let mut solver = DefaultSolver::new(&problem, quiet_settings()).unwrap();
    let outcome = solver.solve(&[0.5, 0.5, 0.5, 0.5]);
    assert!(outcome.is_optimal());
    assert_eq!(outcome.x.len(), 4);
}

#[test]
fn api_dim_check_bad_lower() {
    let result = api_dim_check_problem(vec![-1.; 3], vec![1.; 4], vec![ConstraintSense::Equal]);
    assert_eq!(
        result.unwrap_err(),
        ProblemError::IncompatibleDimension {
            what: "lower bounds",
            expected: 4,
            found: 3
        }
    );
}

#[test]
fn api_dim_check_bad_upper() {
    let result = api_dim_check_problem(vec![-1.; 4], vec![1.; 5], vec![ConstraintSense::Equal]);
    assert!(matches!(
        result,
        Err(ProblemError::IncompatibleDimension { found: 5, .. })
    ));
}

#[test]
fn api_dim_check_bad_senses() {
    let result = api_dim_check_problem(vec![-1.; 4], vec![1.; 4], vec![]);
    assert!(matches!(
        result,
        Err(ProblemError::IncompatibleDimension {
            what: "constraint senses",
            ..
        })
    ));
}

#[test]
fn api_dim_check_bad_start() {
    let problem =
        api_dim_check_problem(vec![-1.; 4], vec![1.; 4], vec![ConstraintSense::Equal]).unwrap();

    let mut solver = DefaultSolver::new(&problem, quiet_settings()).unwrap();
    let outcome = solver.solve(&[0.5, 0.5]);
    assert_eq!(outcome.status, SolverStatus::Error);
    assert!(outcome.objective.is_none());
}

#[test]
fn api_check_bad_settings() {
    let problem =
        api_dim_check_problem(vec![-1.; 4], vec![1.; 4], vec![ConstraintSense::Equal]).unwrap();

    let settings = DefaultSettings {
        kappa_mu: 2.,
        ..DefaultSettings::default()
    };
    assert!(matches!(
        DefaultSolver::new(&problem, settings),
        Err(SettingsError::BadField("kappa_mu"))
    ));

    // the builder checks on build
    assert!(DefaultSettingsBuilder::<f64>::default()
        .tol(-1.)
        .build()
        .is_err());
}
