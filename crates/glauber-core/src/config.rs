use crate::nucleus::Species;
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// Full configuration for a collision run.
///
/// Lengths are in fm, cross sections in fm^2. All values are validated up
/// front by [`CollisionConfig::validate`]; nothing downstream re-checks them.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub projectile_a: Species,
    pub projectile_b: Species,
    pub number_events: usize,
    /// Overall factor applied to the combined thickness field.
    pub normalization: f64,
    /// Inelastic nucleon-nucleon cross section sigma_NN.
    pub cross_section: f64,
    /// Gaussian nucleon width w.
    pub nucleon_width: f64,
    /// Gamma shape parameter k for per-nucleon amplitude fluctuations.
    pub fluctuation: f64,
    pub b_min: f64,
    /// Maximum impact parameter; `None` derives it from the projectile radii.
    pub b_max: Option<f64>,
    /// Requested grid half-width; the actual grid may extend up to one step
    /// further so that an integral number of cells covers the domain.
    pub grid_max: f64,
    pub grid_step: f64,
    /// Base RNG seed; `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            projectile_a: Species::Lead,
            projectile_b: Species::Lead,
            number_events: 1,
            normalization: 1.0,
            cross_section: 6.4,
            nucleon_width: 0.5,
            fluctuation: 1.0,
            b_min: 0.0,
            b_max: None,
            grid_max: 10.0,
            grid_step: 0.2,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonPositiveGridStep { value: f64 },
    NonPositiveGridMax { value: f64 },
    NonPositiveNucleonWidth { value: f64 },
    NonPositiveCrossSection { value: f64 },
    NonPositiveFluctuation { value: f64 },
    InvalidImpactRange { min: f64, max: f64 },
    TooManyEvents { max: usize, actual: usize },
    UnknownSpecies { symbol: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositiveGridStep { value } => {
                write!(f, "grid step ({value}) must be positive and finite")
            }
            ConfigError::NonPositiveGridMax { value } => {
                write!(f, "grid max ({value}) must be positive and finite")
            }
            ConfigError::NonPositiveNucleonWidth { value } => {
                write!(f, "nucleon width ({value}) must be positive and finite")
            }
            ConfigError::NonPositiveCrossSection { value } => {
                write!(f, "cross section ({value}) must be positive and finite")
            }
            ConfigError::NonPositiveFluctuation { value } => {
                write!(f, "fluctuation shape ({value}) must be positive and finite")
            }
            ConfigError::InvalidImpactRange { min, max } => {
                write!(f, "impact parameter range [{min}, {max}] is invalid")
            }
            ConfigError::TooManyEvents { max, actual } => {
                write!(f, "number of events ({actual}) exceeds supported maximum ({max})")
            }
            ConfigError::UnknownSpecies { symbol } => {
                write!(f, "unknown projectile symbol '{symbol}'")
            }
        }
    }
}

impl Error for ConfigError {}

fn positive_finite(value: f64) -> bool {
    value > 0.0 && value.is_finite()
}

impl CollisionConfig {
    pub const MAX_EVENTS: usize = 1_000_000;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !positive_finite(self.grid_step) {
            return Err(ConfigError::NonPositiveGridStep {
                value: self.grid_step,
            });
        }
        if !positive_finite(self.grid_max) {
            return Err(ConfigError::NonPositiveGridMax {
                value: self.grid_max,
            });
        }
        if !positive_finite(self.nucleon_width) {
            return Err(ConfigError::NonPositiveNucleonWidth {
                value: self.nucleon_width,
            });
        }
        if !positive_finite(self.cross_section) {
            return Err(ConfigError::NonPositiveCrossSection {
                value: self.cross_section,
            });
        }
        if !positive_finite(self.fluctuation) {
            return Err(ConfigError::NonPositiveFluctuation {
                value: self.fluctuation,
            });
        }
        if !self.b_min.is_finite() || self.b_min < 0.0 {
            return Err(ConfigError::InvalidImpactRange {
                min: self.b_min,
                max: self.b_max.unwrap_or(f64::NAN),
            });
        }
        if let Some(b_max) = self.b_max {
            if !b_max.is_finite() || b_max < self.b_min {
                return Err(ConfigError::InvalidImpactRange {
                    min: self.b_min,
                    max: b_max,
                });
            }
        }
        if self.number_events > Self::MAX_EVENTS {
            return Err(ConfigError::TooManyEvents {
                max: Self::MAX_EVENTS,
                actual: self.number_events,
            });
        }
        Ok(())
    }

    /// Black-disk interaction distance: nucleons collide when their
    /// transverse separation is below `sqrt(sigma_NN / pi)`.
    pub fn interaction_distance(&self) -> f64 {
        (self.cross_section / std::f64::consts::PI).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert_eq!(CollisionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_non_positive_grid_parameters() {
        let mut config = CollisionConfig::default();
        config.grid_step = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveGridStep { .. })
        ));

        let mut config = CollisionConfig::default();
        config.grid_max = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveGridMax { .. })
        ));

        let mut config = CollisionConfig::default();
        config.grid_step = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveGridStep { .. })
        ));
    }

    #[test]
    fn rejects_inverted_impact_range() {
        let mut config = CollisionConfig::default();
        config.b_min = 5.0;
        config.b_max = Some(2.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidImpactRange { .. })
        ));
    }

    #[test]
    fn rejects_excessive_event_count() {
        let mut config = CollisionConfig::default();
        config.number_events = CollisionConfig::MAX_EVENTS + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooManyEvents { .. })
        ));
    }

    #[test]
    fn json_round_trip_preserves_config() {
        let mut config = CollisionConfig::default();
        config.projectile_a = Species::Gold;
        config.projectile_b = Species::Copper;
        config.fluctuation = 1.4;
        config.seed = Some(99);
        let json = serde_json::to_string(&config).unwrap();
        let back: CollisionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.projectile_a, Species::Gold);
        assert_eq!(back.projectile_b, Species::Copper);
        assert_eq!(back.fluctuation, config.fluctuation);
        assert_eq!(back.seed, Some(99));
    }

    #[test]
    fn species_symbols_round_trip_through_serde() {
        let json = serde_json::to_string(&Species::Lead).unwrap();
        assert_eq!(json, "\"Pb\"");
        let back: Species = serde_json::from_str("\"Cu\"").unwrap();
        assert_eq!(back, Species::Copper);
    }

    #[test]
    fn interaction_distance_matches_black_disk_area() {
        let config = CollisionConfig::default();
        let d = config.interaction_distance();
        let sigma = std::f64::consts::PI * d * d;
        assert!((sigma - config.cross_section).abs() < 1e-12);
    }
}
