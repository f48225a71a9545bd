use crate::{algebra::*, solver::core::SettingsError};
use derive_builder::Builder;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Settings for the filter line search interior point solver.
///
/// Construct with [`DefaultSettingsBuilder`] to have values checked on
/// build, or start from `DefaultSettings::default()` and call
/// [`validate`](DefaultSettings::validate) after modifying fields.

#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(private, name = "build_unchecked"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DefaultSettings<T: FloatT> {
    ///maximum number of outer iterations
    #[builder(default = "3000")]
    pub max_iter: u32,

    ///maximum run time (seconds)
    #[builder(default = "f64::INFINITY")]
    pub time_limit: f64,

    ///verbose printing
    #[builder(default = "true")]
    pub verbose: bool,

    ///optimality tolerance on the scaled KKT error
    #[builder(default = "(1e-8).as_T()")]
    pub eps: T,

    ///feasibility tolerance on the constraint violation (max norm)
    #[builder(default = "(1e-6).as_T()")]
    pub tol: T,

    // barrier parameter control
    ///initial barrier parameter
    #[builder(default = "(0.1).as_T()")]
    pub mu_init: T,

    ///linear decrease factor for μ
    #[builder(default = "(0.2).as_T()")]
    pub kappa_mu: T,

    ///superlinear decrease exponent for μ
    #[builder(default = "(1.5).as_T()")]
    pub theta_mu: T,

    ///barrier subproblem tolerance factor, relative to μ
    #[builder(default = "(10.).as_T()")]
    pub kappa_eps: T,

    ///lower bound on the fraction-to-boundary parameter τ
    #[builder(default = "(0.99).as_T()")]
    pub tau_min: T,

    ///multiplier magnitude threshold for optimality error scaling
    #[builder(default = "(100.).as_T()")]
    pub s_max: T,

    // inertia correction
    ///first trial Hessian shift
    #[builder(default = "(1e-4).as_T()")]
    pub delta_w_init: T,

    ///smallest Hessian shift
    #[builder(default = "(1e-20).as_T()")]
    pub delta_w_min: T,

    ///largest Hessian shift before the KKT system is declared bad
    #[builder(default = "(1e40).as_T()")]
    pub delta_w_max: T,

    ///Hessian shift decrease factor relative to the last successful shift
    #[builder(default = "(1. / 3.).as_T()")]
    pub kappa_w_minus: T,

    ///Hessian shift increase factor
    #[builder(default = "(8.).as_T()")]
    pub kappa_w_plus: T,

    ///Hessian shift increase factor when no previous shift is known
    #[builder(default = "(100.).as_T()")]
    pub kappa_w_plus_bar: T,

    ///constraint block shift coefficient, applied as δc = c̄·μ^κc
    #[builder(default = "(1e-8).as_T()")]
    pub delta_c_bar: T,

    ///constraint block shift exponent
    #[builder(default = "(0.25).as_T()")]
    pub kappa_c: T,

    ///pivots at or below this magnitude are counted as zero eigenvalues
    #[builder(default = "T::epsilon() * (100.).as_T()")]
    pub zero_pivot_tol: T,

    ///KKT direct solve with iterative refinement
    #[builder(default = "true")]
    pub iterative_refinement_enable: bool,

    ///iterative refinement relative tolerance
    #[builder(default = "(1e-13).as_T()")]
    pub iterative_refinement_reltol: T,

    ///iterative refinement absolute tolerance
    #[builder(default = "(1e-12).as_T()")]
    pub iterative_refinement_abstol: T,

    ///iterative refinement maximum iterations
    #[builder(default = "10")]
    pub iterative_refinement_max_iter: u32,

    ///iterative refinement stalling tolerance
    #[builder(default = "(5.0).as_T()")]
    pub iterative_refinement_stop_ratio: T,

    // filter line search
    ///filter margin on the constraint violation
    #[builder(default = "(1e-5).as_T()")]
    pub gamma_theta: T,

    ///filter margin on the barrier objective
    #[builder(default = "(1e-5).as_T()")]
    pub gamma_phi: T,

    ///switching condition multiplier
    #[builder(default = "(1.).as_T()")]
    pub delta: T,

    ///switching condition exponent on θ
    #[builder(default = "(1.1).as_T()")]
    pub s_theta: T,

    ///switching condition exponent on the directional derivative
    #[builder(default = "(2.3).as_T()")]
    pub s_phi: T,

    ///Armijo decrease factor
    #[builder(default = "(1e-4).as_T()")]
    pub eta_phi: T,

    ///safety factor on the minimum step length
    #[builder(default = "(0.05).as_T()")]
    pub gamma_alpha: T,

    ///upper limit on θ, relative to max(1, θ(x₀))
    #[builder(default = "(1e4).as_T()")]
    pub theta_max_fact: T,

    ///switching threshold on θ, relative to max(1, θ(x₀))
    #[builder(default = "(1e-4).as_T()")]
    pub theta_min_fact: T,

    ///maximum second order corrections per line search
    #[builder(default = "4")]
    pub soc_max: u32,

    ///required violation decrease between second order corrections
    #[builder(default = "(0.99).as_T()")]
    pub kappa_soc: T,

    // feasibility restoration
    ///maximum consecutive restoration phases
    #[builder(default = "3")]
    pub max_restorations: u32,

    ///required violation decrease for a restored point
    #[builder(default = "(0.9).as_T()")]
    pub kappa_resto: T,

    ///weight of the proximity term in the restoration residual
    #[builder(default = "(1e-4).as_T()")]
    pub restoration_rho: T,

    ///maximum iterations of the restoration least squares solve
    #[builder(default = "100")]
    pub restoration_max_iter: u32,

    ///alternating sweeps used to refit duals after restoration
    #[builder(default = "3")]
    pub restoration_dual_sweeps: u32,

    // initialization and safeguards
    ///absolute push of the initial point into the interior
    #[builder(default = "(1e-2).as_T()")]
    pub bound_push: T,

    ///relative push of the initial point into the interior of a box
    #[builder(default = "(1e-2).as_T()")]
    pub bound_frac: T,

    ///initial value of the bound multipliers
    #[builder(default = "(1.).as_T()")]
    pub z_init: T,

    ///bound multiplier safeguard, keeps zᵢxᵢ within a factor of μ
    #[builder(default = "(1e10).as_T()")]
    pub kappa_sigma: T,
}

impl<T> Default for DefaultSettings<T>
where
    T: FloatT,
{
    fn default() -> DefaultSettings<T> {
        DefaultSettingsBuilder::<T>::default().build().unwrap()
    }
}

macro_rules! check_setting {
    ($self:expr, $field:ident, |$v:ident| $cond:expr) => {
        let $v = $self.$field;
        if !($cond) {
            return Err(SettingsError::BadField(stringify!($field)));
        }
    };
}

impl<T> DefaultSettings<T>
where
    T: FloatT,
{
    /// Checks that values are in their legal ranges.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let zero = T::zero();
        let one = T::one();

        check_setting!(self, time_limit, |v| v >= 0.);
        check_setting!(self, eps, |v| v > zero);
        check_setting!(self, tol, |v| v > zero);

        check_setting!(self, mu_init, |v| v > zero);
        check_setting!(self, kappa_mu, |v| v > zero && v < one);
        check_setting!(self, theta_mu, |v| v > one && v < (2.).as_T());
        check_setting!(self, kappa_eps, |v| v > zero);
        check_setting!(self, tau_min, |v| v > zero && v < one);
        check_setting!(self, s_max, |v| v >= one);

        check_setting!(self, delta_w_min, |v| v > zero);
        check_setting!(self, delta_w_init, |v| v >= self.delta_w_min);
        check_setting!(self, delta_w_max, |v| v > self.delta_w_init);
        check_setting!(self, kappa_w_minus, |v| v > zero && v < one);
        check_setting!(self, kappa_w_plus, |v| v > one);
        check_setting!(self, kappa_w_plus_bar, |v| v > one);
        check_setting!(self, delta_c_bar, |v| v >= zero);
        check_setting!(self, kappa_c, |v| v > zero);
        check_setting!(self, zero_pivot_tol, |v| v >= zero);

        check_setting!(self, iterative_refinement_reltol, |v| v >= zero);
        check_setting!(self, iterative_refinement_abstol, |v| v >= zero);
        check_setting!(self, iterative_refinement_stop_ratio, |v| v > zero);

        check_setting!(self, gamma_theta, |v| v > zero && v < one);
        check_setting!(self, gamma_phi, |v| v > zero && v < one);
        check_setting!(self, delta, |v| v > zero);
        check_setting!(self, s_theta, |v| v > one);
        check_setting!(self, s_phi, |v| v > one);
        check_setting!(self, eta_phi, |v| v > zero && v < (0.5).as_T());
        check_setting!(self, gamma_alpha, |v| v > zero && v <= one);
        check_setting!(self, theta_max_fact, |v| v > zero);
        check_setting!(self, theta_min_fact, |v| v > zero && v < self.theta_max_fact);
        check_setting!(self, kappa_soc, |v| v > zero && v < one);

        check_setting!(self, kappa_resto, |v| v > zero && v < one);
        check_setting!(self, restoration_rho, |v| v > zero);

        check_setting!(self, bound_push, |v| v > zero);
        check_setting!(self, bound_frac, |v| v > zero && v <= (0.5).as_T());
        check_setting!(self, z_init, |v| v > zero);
        check_setting!(self, kappa_sigma, |v| v > one);

        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for DefaultSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        DefaultSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic post-build settings validation
impl<T> DefaultSettingsBuilder<T>
where
    T: FloatT,
{
    /// Build the settings, checking that every value is legal
    pub fn build(&self) -> Result<DefaultSettings<T>, DefaultSettingsBuilderError> {
        let settings = self.build_unchecked()?;
        settings.validate()?;
        Ok(settings)
    }
}

#[test]
fn test_settings_validate() {
    // all standard settings
    let settings = DefaultSettingsBuilder::<f64>::default().build().unwrap();
    assert_eq!(settings.eps, 1e-8);
    assert_eq!(settings.tol, 1e-6);
    assert_eq!(settings.max_iter, 3000);
    assert!(settings.validate().is_ok());

    // fail on out of range values
    assert!(DefaultSettingsBuilder::<f64>::default()
        .eps(-1.0)
        .build()
        .is_err());

    assert!(DefaultSettingsBuilder::<f64>::default()
        .kappa_mu(1.5)
        .build()
        .is_err());

    assert!(DefaultSettingsBuilder::<f64>::default()
        .theta_mu(1.0)
        .build()
        .is_err());

    // directly construct a bad DefaultSettings and manually check
    let settings = DefaultSettings::<f64> {
        delta_w_max: 1e-8,
        ..DefaultSettings::default()
    };
    assert_eq!(
        settings.validate(),
        Err(SettingsError::BadField("delta_w_max"))
    );

    let settings = DefaultSettings::<f64> {
        tau_min: f64::NAN,
        ..DefaultSettings::default()
    };
    assert_eq!(settings.validate(), Err(SettingsError::BadField("tau_min")));
}
