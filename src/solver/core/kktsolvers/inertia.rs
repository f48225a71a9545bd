use super::{Inertia, KKTError};
use crate::algebra::*;
use crate::solver::core::CoreSettings;

/// Regularization chosen by an inertia correction pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regularization<T> {
    pub δw: T,
    pub δc: T,
    pub factorizations: usize,
}

/// Chooses the diagonal shifts `(δw, δc)` that give a KKT matrix the
/// inertia `(n, m, 0)`.
///
/// The last nonzero `δw` is remembered between calls so that later
/// iterations can start close to a shift that worked before.
#[derive(Debug, Clone)]
pub struct InertiaCorrector<T> {
    δw_last: T,
}

impl<T> Default for InertiaCorrector<T>
where
    T: FloatT,
{
    fn default() -> Self {
        Self { δw_last: T::zero() }
    }
}

impl<T> InertiaCorrector<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_delta_w(&self) -> T {
        self.δw_last
    }

    pub fn reset(&mut self) {
        self.δw_last = T::zero();
    }

    /// Run the correction loop.  `factor(δw, δc)` must refactor the
    /// shifted matrix and report its inertia.
    pub fn correct<F>(
        &mut self,
        n: usize,
        m: usize,
        μ: T,
        settings: &CoreSettings<T>,
        mut factor: F,
    ) -> Result<Regularization<T>, KKTError>
    where
        F: FnMut(T, T) -> Result<Inertia, KKTError>,
    {
        let expected = Inertia::new(n, m, 0);
        let mut reg = Regularization {
            δw: T::zero(),
            δc: T::zero(),
            factorizations: 1,
        };

        let inertia = factor(reg.δw, reg.δc)?;
        if inertia == expected {
            return Ok(reg);
        }

        // singular: shift the constraint block first
        if inertia.zero > 0 && m > 0 {
            reg.δc = settings.delta_c_bar * T::powf(μ, settings.kappa_c);
            reg.factorizations += 1;
            if factor(T::zero(), reg.δc)? == expected {
                return Ok(reg);
            }
        }

        let mut δw = if self.δw_last == T::zero() {
            settings.delta_w_init
        } else {
            T::max(settings.delta_w_min, settings.kappa_w_minus * self.δw_last)
        };

        loop {
            reg.factorizations += 1;
            if factor(δw, reg.δc)? == expected {
                reg.δw = δw;
                self.δw_last = δw;
                return Ok(reg);
            }

            if self.δw_last == T::zero() {
                δw *= settings.kappa_w_plus_bar;
            } else {
                δw *= settings.kappa_w_plus;
            }

            if δw > settings.delta_w_max {
                return Err(KKTError::InertiaCorrection);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // inertia of diag(eigs) + δw on the first block and -δc on the second
    fn shifted_inertia(eigs_w: &[f64], eigs_c: &[f64], δw: f64, δc: f64) -> Inertia {
        let mut inertia = Inertia::default();
        let shifted = eigs_w
            .iter()
            .map(|&e| e + δw)
            .chain(eigs_c.iter().map(|&e| e - δc));
        for e in shifted {
            if e.abs() < 1e-14 {
                inertia.zero += 1;
            } else if e > 0. {
                inertia.positive += 1;
            } else {
                inertia.negative += 1;
            }
        }
        inertia
    }

    #[test]
    fn test_correct_inertia_unchanged() {
        let settings = CoreSettings::<f64>::default();
        let mut corrector = InertiaCorrector::new();
        let reg = corrector
            .correct(2, 1, 0.1, &settings, |δw, δc| {
                Ok(shifted_inertia(&[1., 2.], &[-1.], δw, δc))
            })
            .unwrap();
        assert_eq!(reg.δw, 0.);
        assert_eq!(reg.δc, 0.);
        assert_eq!(reg.factorizations, 1);
        assert_eq!(corrector.last_delta_w(), 0.);
    }

    #[test]
    fn test_correct_indefinite() {
        let settings = CoreSettings::<f64>::default();
        let mut corrector = InertiaCorrector::new();

        // eigenvalue -1.5 needs δw > 1.5
        let reg = corrector
            .correct(2, 0, 0.1, &settings, |δw, δc| {
                Ok(shifted_inertia(&[-1.5, 3.], &[], δw, δc))
            })
            .unwrap();
        assert!(reg.δw > 1.5);
        assert_eq!(reg.δc, 0.);
        assert_eq!(reg.δw, corrector.last_delta_w());

        // a second pass starts from the remembered shift
        let prev = corrector.last_delta_w();
        let reg = corrector
            .correct(2, 0, 0.1, &settings, |δw, δc| {
                Ok(shifted_inertia(&[-1.5, 3.], &[], δw, δc))
            })
            .unwrap();
        assert!(reg.δw > 1.5);
        assert!(reg.δw <= prev * settings.kappa_w_plus);
        assert!(reg.factorizations <= 4);
    }

    #[test]
    fn test_correct_singular_constraints() {
        let settings = CoreSettings::<f64>::default();
        let mut corrector = InertiaCorrector::new();

        // a zero eigenvalue in the constraint block is fixed by δc alone
        let reg = corrector
            .correct(1, 2, 0.01, &settings, |δw, δc| {
                Ok(shifted_inertia(&[1.], &[-1., 0.], δw, δc))
            })
            .unwrap();
        assert_eq!(reg.δw, 0.);
        assert!(reg.δc > 0.);
        assert_eq!(reg.factorizations, 2);
    }

    #[test]
    fn test_correct_failure() {
        let settings = CoreSettings::<f64>::default();
        let mut corrector = InertiaCorrector::new();

        // never reaches the required inertia
        let result = corrector.correct(1, 0, 0.1, &settings, |_, _| Ok(Inertia::new(0, 1, 0)));
        assert_eq!(result, Err(KKTError::InertiaCorrection));
        assert_eq!(corrector.last_delta_w(), 0.);
    }
}
