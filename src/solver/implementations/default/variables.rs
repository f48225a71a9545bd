use crate::algebra::*;

// ---------------
// Variables type for the primal-dual iterate
// ---------------

/// Primal variables `x`, constraint multipliers `λ` and bound
/// multipliers `z`.  Also used to hold a search direction.
#[derive(Debug, Clone)]
pub struct DefaultVariables<T> {
    pub x: Vec<T>,
    pub λ: Vec<T>,
    pub z: Vec<T>,
}

impl<T> DefaultVariables<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            λ: vec![T::zero(); m],
            z: vec![T::zero(); n],
        }
    }

    pub fn copy_from(&mut self, src: &Self) {
        self.x.copy_from(&src.x);
        self.λ.copy_from(&src.λ);
        self.z.copy_from(&src.z);
    }

    /// `self ← vars + (α_pr·dx, α_pr·dλ, α_du·dz)`
    pub fn take_step(&mut self, vars: &Self, step: &Self, α_pr: T, α_du: T) {
        self.x.waxpby(T::one(), &vars.x, α_pr, &step.x);
        self.λ.waxpby(T::one(), &vars.λ, α_pr, &step.λ);
        self.z.waxpby(T::one(), &vars.z, α_du, &step.z);
    }

    /// The primal dual barrier Hessian `Σ = X⁻¹Z`
    pub fn barrier_sigma(&self, σ: &mut [T]) {
        for (σi, (&xi, &zi)) in σ.iter_mut().zip(self.x.iter().zip(&self.z)) {
            *σi = zi / xi;
        }
    }

    /// Complete a direction from its `dx` part by eliminating `dz`:
    /// `dz = μ/x - z - Σ dx`
    pub fn bound_step(vars: &Self, μ: T, step: &mut Self) {
        for (dz, (&xi, (&zi, &dxi))) in step
            .z
            .iter_mut()
            .zip(vars.x.iter().zip(vars.z.iter().zip(&step.x)))
        {
            *dz = μ / xi - zi - (zi / xi) * dxi;
        }
    }

    /// Keep each `zᵢ` within a factor `κΣ` of `μ/xᵢ`
    pub fn clip_bound_duals(&mut self, μ: T, κσ: T) {
        for (zi, &xi) in self.z.iter_mut().zip(&self.x) {
            let lo = μ / (κσ * xi);
            let hi = κσ * μ / xi;
            *zi = T::max(lo, T::min(*zi, hi));
        }
    }

    pub fn is_interior(&self) -> bool {
        self.x.iter().all(|&v| v > T::zero()) && self.z.iter().all(|&v| v > T::zero())
    }
}

/// Largest `α ∈ (0,1]` such that `v + α·dv ≥ (1-τ)·v`
pub fn fraction_to_boundary<T: FloatT>(v: &[T], dv: &[T], τ: T) -> T {
    assert_eq!(v.len(), dv.len());
    let mut α = T::one();
    for (&vi, &dvi) in v.iter().zip(dv) {
        if dvi < T::zero() {
            α = T::min(α, -τ * vi / dvi);
        }
    }
    α
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fraction_to_boundary() {
        let v = [1f64, 2., 3.];
        assert_eq!(fraction_to_boundary(&v, &[1., 0., 5.], 0.99), 1.);

        let α = fraction_to_boundary(&v, &[-2., 1., -1.], 0.99);
        assert!((α - 0.495).abs() < 1e-15);
        assert!(1. + α * -2. >= 0.01 * 1. - 1e-15);

        // empty vector never limits the step
        assert_eq!(fraction_to_boundary::<f64>(&[], &[], 0.99), 1.);
    }

    #[test]
    fn test_bound_step_and_clip() {
        let mut vars = DefaultVariables::<f64>::new(2, 0);
        vars.x.copy_from(&[1., 2.]);
        vars.z.copy_from(&[3., 1e-12]);

        // dz solves  Z dx + X dz = μ - XZ
        let mut step = DefaultVariables::new(2, 0);
        step.x.copy_from(&[0.5, -1.]);
        DefaultVariables::bound_step(&vars, 0.1, &mut step);
        for i in 0..2 {
            let r = vars.z[i] * step.x[i] + vars.x[i] * step.z[i] - (0.1 - vars.x[i] * vars.z[i]);
            assert!(r.abs() < 1e-14);
        }

        vars.clip_bound_duals(0.1, 10.);
        assert_eq!(vars.z[0], 1.);
        assert_eq!(vars.z[1], 0.1 / 20.);
        assert!(vars.is_interior());
    }
}
