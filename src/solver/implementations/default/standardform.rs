#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use crate::solver::core::traits::Evaluator;

// ---------------------------------------------------------------
// Reformulation of a bounded problem into standard form
//
//    minimize  f(y)   subject to  c(y) = 0,  y ≥ 0
//
// Column order is: structural variables, inequality slacks, box
// slacks.  Row order is: original constraints, then one row
// y + t - (u - l) = 0 per boxed variable.
// ---------------------------------------------------------------

/// How an original variable is recovered from standard variables
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Substitution<T> {
    /// `x = v`
    Fixed(T),
    /// `x = offset + sign·y[col]`
    Shifted { col: usize, offset: T, sign: T },
    /// `x = y[pos] - y[neg]`
    Split { pos: usize, neg: usize },
}

impl<T> Substitution<T>
where
    T: FloatT,
{
    fn value(&self, y: &[T]) -> T {
        match *self {
            Substitution::Fixed(v) => v,
            Substitution::Shifted { col, offset, sign } => offset + sign * y[col],
            Substitution::Split { pos, neg } => y[pos] - y[neg],
        }
    }

    // (column, ∂x/∂y[column]) pairs
    fn terms(&self) -> [Option<(usize, T)>; 2] {
        match *self {
            Substitution::Fixed(_) => [None, None],
            Substitution::Shifted { col, sign, .. } => [Some((col, sign)), None],
            Substitution::Split { pos, neg } => [Some((pos, T::one())), Some((neg, -T::one()))],
        }
    }
}

// c[row] + sign·y[col]
#[derive(Debug, Clone, Copy)]
struct SlackRow<T> {
    row: usize,
    col: usize,
    sign: T,
}

// y[col] + y[slack] - width
#[derive(Debug, Clone, Copy)]
struct BoxRow<T> {
    col: usize,
    slack: usize,
    width: T,
}

/// A [`NonlinearProblem`] viewed in standard form.
///
/// Implements [`Evaluator`] on the standard variables, pulling the
/// derivatives of the wrapped problem back through the substitution.
pub struct StandardForm<'a, T, E> {
    problem: &'a NonlinearProblem<T, E>,
    classes: Vec<VariableClass<T>>,
    subs: Vec<Substitution<T>>,
    slacks: Vec<SlackRow<T>>,
    boxes: Vec<BoxRow<T>>,
    nstructural: usize,
    n: usize,
    m: usize,
}

impl<'a, T, E> StandardForm<'a, T, E>
where
    T: FloatT,
    E: Evaluator<T>,
{
    pub fn new(problem: &'a NonlinearProblem<T, E>) -> Result<Self, ProblemError> {
        let (n0, m0) = (problem.nvars(), problem.ncons());
        if problem.lower.len() != n0 || problem.upper.len() != n0 {
            return Err(ProblemError::IncompatibleDimension {
                what: "variable bounds",
                expected: n0,
                found: usize::min(problem.lower.len(), problem.upper.len()),
            });
        }
        if problem.senses.len() != m0 {
            return Err(ProblemError::IncompatibleDimension {
                what: "constraint senses",
                expected: m0,
                found: problem.senses.len(),
            });
        }

        let classes = presolve(&problem.lower, &problem.upper)?;

        // structural columns
        let mut col = 0;
        let mut subs = Vec::with_capacity(n0);
        let mut boxed = Vec::new();
        for class in classes.iter() {
            let sub = match *class {
                VariableClass::Fixed(v) => Substitution::Fixed(v),
                VariableClass::Lower(l) => Substitution::Shifted {
                    col,
                    offset: l,
                    sign: T::one(),
                },
                VariableClass::Upper(u) => Substitution::Shifted {
                    col,
                    offset: u,
                    sign: -T::one(),
                },
                VariableClass::Boxed(l, u) => {
                    boxed.push((col, u - l));
                    Substitution::Shifted {
                        col,
                        offset: l,
                        sign: T::one(),
                    }
                }
                VariableClass::Free => Substitution::Split {
                    pos: col,
                    neg: col + 1,
                },
            };
            col += class.nstandard();
            subs.push(sub);
        }
        let nstructural = col;

        // inequality slacks
        let mut slacks = Vec::new();
        for (row, sense) in problem.senses.iter().enumerate() {
            let sign = match sense {
                ConstraintSense::Equal => continue,
                ConstraintSense::GreaterThan => -T::one(),
                ConstraintSense::LessThan => T::one(),
            };
            slacks.push(SlackRow { row, col, sign });
            col += 1;
        }

        // box slacks
        let boxes: Vec<_> = boxed
            .into_iter()
            .map(|(bcol, width)| {
                let slack = col;
                col += 1;
                BoxRow {
                    col: bcol,
                    slack,
                    width,
                }
            })
            .collect();

        let n = col;
        let m = m0 + boxes.len();

        Ok(Self {
            problem,
            classes,
            subs,
            slacks,
            boxes,
            nstructural,
            n,
            m,
        })
    }

    pub fn problem(&self) -> &NonlinearProblem<T, E> {
        self.problem
    }

    /// Number of standard columns standing for original variables.
    /// The remaining columns are slacks.
    pub fn nstructural(&self) -> usize {
        self.nstructural
    }

    /// True if every original variable is fixed and no constraint
    /// needs a slack, so there is nothing left to optimize.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn classes(&self) -> &[VariableClass<T>] {
        &self.classes
    }

    /// Map a standard point back to the original variables
    pub fn to_original(&self, y: &[T]) -> Vec<T> {
        let mut x = vec![T::zero(); self.subs.len()];
        self.to_original_into(y, &mut x);
        x
    }

    pub fn to_original_into(&self, y: &[T], x: &mut [T]) {
        assert_eq!(y.len(), self.n);
        for (xj, sub) in x.iter_mut().zip(&self.subs) {
            *xj = sub.value(y);
        }
    }

    /// Map an original starting point to a strictly positive standard
    /// point.  Bounded variables are pushed into the interior of their
    /// bounds, and slacks are set from the constraint values at the
    /// pushed point.
    pub fn from_original(&self, x0: &[T], bound_push: T, bound_frac: T) -> Result<Vec<T>, ProblemError> {
        if x0.len() != self.subs.len() {
            return Err(ProblemError::IncompatibleDimension {
                what: "starting point",
                expected: self.subs.len(),
                found: x0.len(),
            });
        }

        let one = T::one();
        let push = |b: T| bound_push * T::max(one, b.abs());

        let mut x = x0.to_vec();
        let mut y = vec![T::zero(); self.n];

        for (j, (class, sub)) in self.classes.iter().zip(&self.subs).enumerate() {
            let x0j = x0[j];
            match *class {
                VariableClass::Fixed(v) => x[j] = v,
                VariableClass::Lower(l) => x[j] = T::max(x0j, l + push(l)),
                VariableClass::Upper(u) => x[j] = T::min(x0j, u - push(u)),
                VariableClass::Boxed(l, u) => {
                    let pl = T::min(push(l), bound_frac * (u - l));
                    let pu = T::min(push(u), bound_frac * (u - l));
                    x[j] = T::min(T::max(x0j, l + pl), u - pu);
                }
                VariableClass::Free => {
                    // both halves kept well away from zero
                    if let Substitution::Split { pos, neg } = *sub {
                        y[pos] = T::max(x0j, T::zero()) + one;
                        y[neg] = T::max(-x0j, T::zero()) + one;
                    }
                    continue;
                }
            }
            if let Substitution::Shifted { col, offset, sign } = *sub {
                y[col] = sign * (x[j] - offset);
            }
        }

        for b in &self.boxes {
            y[b.slack] = b.width - y[b.col];
        }

        if !self.slacks.is_empty() {
            let xs = self.to_original(&y);
            let mut c = vec![T::zero(); self.problem.ncons()];
            self.problem.evaluator.constraints(&xs, &mut c);
            for s in &self.slacks {
                // c - s for ≥ rows, c + s for ≤ rows
                let v = -s.sign * c[s.row];
                y[s.col] = T::max(v, push(v));
            }
        }

        Ok(y)
    }

    // H ← Pᵀ H0 P for the substitution Jacobian P
    fn pullback_hessian(subs: &[Substitution<T>], H0: &Matrix<T>, H: &mut Matrix<T>) {
        H.set_zero();
        for (j, sj) in subs.iter().enumerate() {
            for (i, si) in subs.iter().enumerate() {
                let h = H0[(i, j)];
                if h == T::zero() {
                    continue;
                }
                for (ci, ai) in si.terms().into_iter().flatten() {
                    for (cj, aj) in sj.terms().into_iter().flatten() {
                        H[(ci, cj)] += ai * aj * h;
                    }
                }
            }
        }
    }
}

impl<'a, T, E> Evaluator<T> for StandardForm<'a, T, E>
where
    T: FloatT,
    E: Evaluator<T>,
{
    fn nvars(&self) -> usize {
        self.n
    }

    fn ncons(&self) -> usize {
        self.m
    }

    fn objective(&self, y: &[T]) -> T {
        self.problem.evaluator.objective(&self.to_original(y))
    }

    fn gradient(&self, y: &[T], g: &mut [T]) {
        let x = self.to_original(y);
        let mut g0 = vec![T::zero(); x.len()];
        self.problem.evaluator.gradient(&x, &mut g0);
        g.set(T::zero());
        for (sub, &gj) in self.subs.iter().zip(&g0) {
            for (col, a) in sub.terms().into_iter().flatten() {
                g[col] += a * gj;
            }
        }
    }

    fn hessian(&self, y: &[T], H: &mut Matrix<T>) {
        let x = self.to_original(y);
        let mut H0 = Matrix::zeros((x.len(), x.len()));
        self.problem.evaluator.hessian(&x, &mut H0);
        Self::pullback_hessian(&self.subs, &H0, H);
    }

    fn constraints(&self, y: &[T], c: &mut [T]) {
        let x = self.to_original(y);
        let m0 = self.problem.ncons();
        self.problem.evaluator.constraints(&x, &mut c[..m0]);
        for s in &self.slacks {
            c[s.row] += s.sign * y[s.col];
        }
        for (k, b) in self.boxes.iter().enumerate() {
            c[m0 + k] = y[b.col] + y[b.slack] - b.width;
        }
    }

    fn jacobian(&self, y: &[T], J: &mut Matrix<T>) {
        let x = self.to_original(y);
        let m0 = self.problem.ncons();
        let mut J0 = Matrix::zeros((m0, x.len()));
        self.problem.evaluator.jacobian(&x, &mut J0);
        J.set_zero();
        for (j, sub) in self.subs.iter().enumerate() {
            for (col, a) in sub.terms().into_iter().flatten() {
                for i in 0..m0 {
                    J[(i, col)] += a * J0[(i, j)];
                }
            }
        }
        for s in &self.slacks {
            J[(s.row, s.col)] = s.sign;
        }
        for (k, b) in self.boxes.iter().enumerate() {
            J[(m0 + k, b.col)] = T::one();
            J[(m0 + k, b.slack)] = T::one();
        }
    }

    fn constraint_hessian(&self, y: &[T], i: usize, H: &mut Matrix<T>) {
        let m0 = self.problem.ncons();
        if i >= m0 {
            H.set_zero();
            return;
        }
        let x = self.to_original(y);
        let mut H0 = Matrix::zeros((x.len(), x.len()));
        self.problem.evaluator.constraint_hessian(&x, i, &mut H0);
        Self::pullback_hessian(&self.subs, &H0, H);
    }

    // box rows and slacks are linear, so only the multipliers of the
    // original constraints enter
    fn lagrangian_hessian(&self, y: &[T], λ: &[T], W: &mut Matrix<T>, _work: &mut Matrix<T>) {
        let x = self.to_original(y);
        let n0 = x.len();
        let m0 = self.problem.ncons();
        let mut W0 = Matrix::zeros((n0, n0));
        let mut work0 = Matrix::zeros((n0, n0));
        self.problem
            .evaluator
            .lagrangian_hessian(&x, &λ[..m0], &mut W0, &mut work0);
        Self::pullback_hessian(&self.subs, &W0, W);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Mixed;

    impl Evaluator<f64> for Mixed {
        fn nvars(&self) -> usize {
            5
        }
        fn ncons(&self) -> usize {
            3
        }
        fn objective(&self, x: &[f64]) -> f64 {
            let sq: f64 = x.iter().enumerate().map(|(j, v)| (j + 1) as f64 * v * v).sum();
            sq + x[1] * x[4]
        }
        fn gradient(&self, x: &[f64], g: &mut [f64]) {
            for j in 0..5 {
                g[j] = 2. * (j + 1) as f64 * x[j];
            }
            g[1] += x[4];
            g[4] += x[1];
        }
        fn hessian(&self, _x: &[f64], H: &mut Matrix<f64>) {
            H.set_zero();
            for j in 0..5 {
                H[(j, j)] = 2. * (j + 1) as f64;
            }
            H[(1, 4)] = 1.;
            H[(4, 1)] = 1.;
        }
        fn constraints(&self, x: &[f64], c: &mut [f64]) {
            c[0] = x.iter().sum::<f64>() - 1.;
            c[1] = x[1] * x[4];
            c[2] = x[3] * x[3] - x[2];
        }
        fn jacobian(&self, x: &[f64], J: &mut Matrix<f64>) {
            J.set_zero();
            for j in 0..5 {
                J[(0, j)] = 1.;
            }
            J[(1, 1)] = x[4];
            J[(1, 4)] = x[1];
            J[(2, 3)] = 2. * x[3];
            J[(2, 2)] = -1.;
        }
        fn constraint_hessian(&self, _x: &[f64], i: usize, H: &mut Matrix<f64>) {
            H.set_zero();
            match i {
                1 => {
                    H[(1, 4)] = 1.;
                    H[(4, 1)] = 1.;
                }
                2 => H[(3, 3)] = 2.,
                _ => {}
            }
        }
    }

    fn mixed_problem() -> NonlinearProblem<f64, Mixed> {
        let inf = f64::INFINITY;
        NonlinearProblem::new(
            Mixed,
            vec![1., 0., -inf, -1., -inf],
            vec![1., inf, 2., 1., inf],
            vec![
                ConstraintSense::Equal,
                ConstraintSense::GreaterThan,
                ConstraintSense::LessThan,
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_standard_form_dimensions() {
        let problem = mixed_problem();
        let sf = StandardForm::new(&problem).unwrap();

        // lower, upper, boxed, free (x2), two slacks, one box slack
        assert_eq!(sf.nstructural(), 5);
        assert_eq!(sf.nvars(), 8);
        assert_eq!(sf.ncons(), 4);
        assert!(!sf.is_empty());
        assert!(sf.classes()[0].is_fixed());
    }

    #[test]
    fn test_standard_form_starting_point() {
        let problem = mixed_problem();
        let sf = StandardForm::new(&problem).unwrap();

        // x3 sits on its upper bound and x1 below its lower bound
        let x0 = [5., -1., 0.5, 1., -3.];
        let y = sf.from_original(&x0, 1e-2, 1e-2).unwrap();
        assert!(y.iter().all(|&v| v > 0.));

        let x = sf.to_original(&y);
        assert_eq!(x[0], 1.);
        assert!((x[1] - 0.01).abs() < 1e-14);
        assert_eq!(x[2], 0.5);
        assert!(x[3] < 1. && x[3] > 0.9);
        assert!((x[4] + 3.).abs() < 1e-14);

        // box row holds at the starting point
        let mut c = vec![0.; 4];
        sf.constraints(&y, &mut c);
        assert!(c[3].abs() < 1e-14);

        assert!(sf.from_original(&[0.; 4], 1e-2, 1e-2).is_err());
    }

    #[test]
    fn test_standard_form_derivatives() {
        let problem = mixed_problem();
        let sf = StandardForm::new(&problem).unwrap();
        let (n, m) = (sf.nvars(), sf.ncons());
        let y: Vec<f64> = (0..n).map(|i| 0.3 + 0.1 * i as f64).collect();
        let h = 1e-6;

        let mut g = vec![0.; n];
        sf.gradient(&y, &mut g);
        let mut J = Matrix::zeros((m, n));
        sf.jacobian(&y, &mut J);

        let mut c0 = vec![0.; m];
        let mut c1 = vec![0.; m];
        sf.constraints(&y, &mut c0);

        for k in 0..n {
            let mut yk = y.clone();
            yk[k] += h;
            let fd = (sf.objective(&yk) - sf.objective(&y)) / h;
            assert!((fd - g[k]).abs() < 1e-4, "gradient entry {}", k);

            sf.constraints(&yk, &mut c1);
            for i in 0..m {
                let fd = (c1[i] - c0[i]) / h;
                assert!((fd - J[(i, k)]).abs() < 1e-4, "jacobian entry ({},{})", i, k);
            }
        }

        // Lagrangian Hessian is symmetric and matches the objective
        // Hessian when all multipliers vanish
        let mut W = Matrix::zeros((n, n));
        let mut H = Matrix::zeros((n, n));
        let mut work = Matrix::zeros((n, n));
        sf.lagrangian_hessian(&y, &vec![0.; m], &mut W, &mut work);
        sf.hessian(&y, &mut H);
        assert_eq!(W, H);
        assert_eq!(W.asymmetry(), 0.);

        // free variable split: ∂²/∂y⁺∂y⁻ = -∂²/∂x²
        assert_eq!(W[(3, 3)], 10.);
        assert_eq!(W[(3, 4)], -10.);
    }

    #[test]
    fn test_standard_form_all_fixed() {
        let problem = NonlinearProblem::new(
            Mixed,
            vec![1.; 5],
            vec![1.; 5],
            vec![ConstraintSense::Equal; 3],
        )
        .unwrap();
        let sf = StandardForm::new(&problem).unwrap();
        assert!(sf.is_empty());
        assert_eq!(sf.to_original(&[]), vec![1.; 5]);
    }
}
