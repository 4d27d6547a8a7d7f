use crate::config::{CollisionConfig, ConfigError};
use rand::Rng;
use rand_distr::{Distribution, Gamma};

/// Truncation radius of the Gaussian profile, in units of the nucleon width.
/// Beyond this the thickness is treated as exactly zero.
const TRUNCATION_WIDTHS: f64 = 5.0;

/// Gaussian nucleon density profile with gamma-distributed per-nucleon
/// amplitude fluctuations.
///
/// `thickness` integrates to the current fluctuation amplitude over the
/// transverse plane (up to the truncation tail), so the amplitude directly
/// scales a nucleon's contribution to the multiplicity.
#[derive(Clone, Debug)]
pub struct NucleonProfile {
    width_sq: f64,
    radius: f64,
    radius_sq: f64,
    /// 1 / (2*pi*w^2); multiplied by the amplitude in `thickness`.
    prefactor: f64,
    amplitude_dist: Gamma<f64>,
    amplitude: f64,
}

impl NucleonProfile {
    pub fn new(config: &CollisionConfig) -> Result<Self, ConfigError> {
        let width = config.nucleon_width;
        if !(width > 0.0 && width.is_finite()) {
            return Err(ConfigError::NonPositiveNucleonWidth { value: width });
        }
        let shape = config.fluctuation;
        // Gamma(k, 1/k) has unit mean for every shape k > 0.
        let amplitude_dist = Gamma::new(shape, 1.0 / shape)
            .map_err(|_| ConfigError::NonPositiveFluctuation { value: shape })?;
        let radius = TRUNCATION_WIDTHS * width;
        Ok(Self {
            width_sq: width * width,
            radius,
            radius_sq: radius * radius,
            prefactor: 1.0 / (2.0 * std::f64::consts::PI * width * width),
            amplitude_dist,
            amplitude: 1.0,
        })
    }

    /// Cutoff distance beyond which `thickness` returns zero.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Redraw the per-nucleon amplitude. Called exactly once per participant
    /// before its profile is deposited.
    pub fn fluctuate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.amplitude = self.amplitude_dist.sample(rng);
    }

    /// Density contribution at squared distance `dsq` from the nucleon center.
    #[inline]
    pub fn thickness(&self, dsq: f64) -> f64 {
        if dsq > self.radius_sq {
            return 0.0;
        }
        self.amplitude * self.prefactor * (-0.5 * dsq / self.width_sq).exp()
    }
}
