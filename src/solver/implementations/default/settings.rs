use crate::algebra::*;
use crate::solver::core::SettingsError;
use derive_builder::Builder;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Standard-form solver settings.
///
/// Constructed via [`DefaultSettingsBuilder`] with validation, or
/// through `Default`.
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DefaultSettings<T: FloatT> {
    ///maximum number of outer (dual/penalty) iterations
    #[builder(default = "30")]
    pub max_outer_iter: u32,

    ///maximum number of inner solver iterations per outer iteration
    #[builder(default = "250")]
    pub max_inner_iter: u32,

    ///verbose printing
    #[builder(default = "false")]
    pub verbose: bool,

    ///inner cost decrease tolerance (final outer iteration)
    #[builder(default = "(1e-4).as_T()")]
    pub cost_tolerance: T,

    ///inner cost decrease tolerance (intermediate outer iterations)
    #[builder(default = "(1e-3).as_T()")]
    pub cost_tolerance_intermediate: T,

    ///inner gradient norm tolerance (final outer iteration)
    #[builder(default = "(1e-5).as_T()")]
    pub gradient_tolerance: T,

    ///inner gradient norm tolerance (intermediate outer iterations)
    #[builder(default = "(1e-5).as_T()")]
    pub gradient_tolerance_intermediate: T,

    ///maximum constraint violation at convergence
    #[builder(default = "(1e-3).as_T()")]
    pub constraint_tolerance: T,

    ///residual threshold for inequality activation
    #[builder(default = "T::zero()")]
    pub active_set_tolerance: T,

    ///initial quadratic penalty weight
    #[builder(default = "T::one()")]
    pub penalty_initial: T,

    ///fixed penalty escalation ratio between outer iterations
    #[builder(default = "(10.0).as_T()")]
    pub penalty_scaling: T,

    ///penalty weight ceiling
    #[builder(default = "(1e8).as_T()")]
    pub penalty_max: T,

    ///dual variable lower saturation
    #[builder(default = "(-1e8).as_T()")]
    pub dual_min: T,

    ///dual variable upper saturation
    #[builder(default = "(1e8).as_T()")]
    pub dual_max: T,

    ///backward pass regularization growth factor
    #[builder(default = "(1.6).as_T()")]
    pub regularization_factor: T,

    ///backward pass regularization floor
    #[builder(default = "(1e-8).as_T()")]
    pub regularization_min: T,

    ///backward pass regularization ceiling
    #[builder(default = "(1e8).as_T()")]
    pub regularization_max: T,

    ///rollout divergence ceiling on the state infinity norm
    #[builder(default = "(1e8).as_T()")]
    pub max_state_value: T,

    ///rollout divergence ceiling on the control infinity norm
    #[builder(default = "(1e8).as_T()")]
    pub max_control_value: T,

    ///maximum line search backtracking steps in the inner solver
    #[builder(default = "10")]
    pub max_linesearch_iter: u32,

    ///enable infeasible start (per-step slack controls)
    #[builder(default = "false")]
    pub infeasible: bool,

    ///control weight on the minimum-time step variable
    #[builder(default = "T::one()")]
    pub min_time_control_weight: T,

    ///initial per-step duration guess for minimum-time problems
    #[builder(default = "(0.1).as_T()")]
    pub min_time_step_initial: T,

    ///control weight on the infeasible slack controls
    #[builder(default = "T::one()")]
    pub infeasible_control_weight: T,
}

impl<T> Default for DefaultSettings<T>
where
    T: FloatT,
{
    fn default() -> DefaultSettings<T> {
        DefaultSettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> DefaultSettings<T>
where
    T: FloatT,
{
    /// Checks that the settings are valid.  This sanity checks the
    /// tolerance and schedule values; it does not bound iteration
    /// counts.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.penalty_scaling <= T::one() {
            return Err(SettingsError::BadFieldValue("penalty_scaling"));
        }
        if self.penalty_max <= T::zero() {
            return Err(SettingsError::BadFieldValue("penalty_max"));
        }
        if self.penalty_initial < T::zero() {
            return Err(SettingsError::BadFieldValue("penalty_initial"));
        }
        if self.constraint_tolerance <= T::zero() {
            return Err(SettingsError::BadFieldValue("constraint_tolerance"));
        }
        if self.dual_max <= self.dual_min {
            return Err(SettingsError::BadFieldValue("dual_max"));
        }
        if self.regularization_factor <= T::one() {
            return Err(SettingsError::BadFieldValue("regularization_factor"));
        }
        if self.max_state_value <= T::zero() || self.max_control_value <= T::zero() {
            return Err(SettingsError::BadFieldValue("max_state_value"));
        }
        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for DefaultSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        DefaultSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> DefaultSettingsBuilder<T>
where
    T: FloatT,
{
    fn validate(&self) -> Result<(), SettingsError> {
        if let Some(penalty_scaling) = self.penalty_scaling {
            if penalty_scaling <= T::one() {
                return Err(SettingsError::BadFieldValue("penalty_scaling"));
            }
        }
        if let Some(constraint_tolerance) = self.constraint_tolerance {
            if constraint_tolerance <= T::zero() {
                return Err(SettingsError::BadFieldValue("constraint_tolerance"));
            }
        }
        if let Some(regularization_factor) = self.regularization_factor {
            if regularization_factor <= T::one() {
                return Err(SettingsError::BadFieldValue("regularization_factor"));
            }
        }
        Ok(())
    }
}

// json read/write of settings files

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        use std::fs::File;
        use std::io::{self, Read, Write};

        impl<T> DefaultSettings<T>
        where
            T: FloatT + Serialize + DeserializeOwned,
        {
            /// Write settings to a JSON file.
            pub fn write_to_file(&self, file: &mut File) -> Result<(), io::Error> {
                let json = serde_json::to_string(&self)?;
                file.write_all(json.as_bytes())?;
                Ok(())
            }

            /// Read settings from a JSON file.
            pub fn read_from_file(file: &mut File) -> Result<Self, io::Error> {
                let mut buffer = String::new();
                file.read_to_string(&mut buffer)?;
                let settings = serde_json::from_str(&buffer)?;
                Ok(settings)
            }
        }
    }
}

#[test]
fn test_settings_validate() {
    // all standard settings
    DefaultSettingsBuilder::<f64>::default().build().unwrap();

    // fail on a non-escalating penalty schedule
    assert!(DefaultSettingsBuilder::<f64>::default()
        .penalty_scaling(1.0)
        .build()
        .is_err());

    // fail on a zero constraint tolerance
    assert!(DefaultSettingsBuilder::<f64>::default()
        .constraint_tolerance(0.0)
        .build()
        .is_err());

    // directly construct bad DefaultSettings and manually check
    let settings = DefaultSettings::<f64> {
        dual_max: -1.0,
        dual_min: 1.0,
        ..DefaultSettings::default()
    };
    assert!(settings.validate().is_err());
}
