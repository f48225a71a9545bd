use super::*;
use crate::algebra::*;

/// Monotone (Fiacco-McCormick) control of the barrier parameter `μ`
/// and the fraction-to-boundary parameter `τ`.
#[derive(Debug, Clone)]
pub struct BarrierController<T> {
    pub μ: T,
    pub τ: T,
    μ_min: T,
}

impl<T> BarrierController<T>
where
    T: FloatT,
{
    pub fn new(settings: &DefaultSettings<T>) -> Self {
        let μ = settings.mu_init;
        Self {
            μ,
            τ: Self::tau(μ, settings.tau_min),
            μ_min: settings.eps / (10.).as_T(),
        }
    }

    fn tau(μ: T, τ_min: T) -> T {
        T::max(τ_min, T::one() - μ)
    }

    /// True once μ can not be decreased any further
    pub fn at_floor(&self) -> bool {
        self.μ <= self.μ_min
    }

    /// Linear decrease far from zero, superlinear close to it
    pub fn next_mu(&self, settings: &DefaultSettings<T>) -> T {
        let linear = settings.kappa_mu * self.μ;
        let superlinear = T::powf(self.μ, settings.theta_mu);
        T::max(self.μ_min, T::min(linear, superlinear))
    }

    /// Move to the next barrier subproblem.  Returns false if μ is
    /// already at its floor.
    pub fn decrease(&mut self, settings: &DefaultSettings<T>) -> bool {
        if self.at_floor() {
            return false;
        }
        self.μ = self.next_mu(settings);
        self.τ = Self::tau(self.μ, settings.tau_min);
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_barrier_schedule() {
        let settings = DefaultSettings::<f64>::default();
        let mut barrier = BarrierController::new(&settings);
        assert_eq!(barrier.μ, 0.1);
        assert_eq!(barrier.τ, 0.99);

        // linear phase: 0.2·0.1 < 0.1^1.5
        assert!(barrier.decrease(&settings));
        assert!((barrier.μ - 0.02).abs() < 1e-15);

        // superlinear phase, monotone down to the floor
        let mut last = barrier.μ;
        let mut steps = 0;
        while barrier.decrease(&settings) {
            assert!(barrier.μ < last);
            last = barrier.μ;
            steps += 1;
            assert!(steps < 100);
        }
        assert!(barrier.at_floor());
        assert!((barrier.μ - 1e-9).abs() < 1e-20);
        assert!((barrier.τ - 1.).abs() < 1e-8);
    }
}
