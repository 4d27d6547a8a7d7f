use crate::config::ConfigError;
use crate::nucleon::Nucleon;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Hulthen deuteron wavefunction parameters [fm^-1].
const HULTHEN_A: f64 = 0.457;
const HULTHEN_B: f64 = 2.35;
/// Deuteron separations beyond this [fm] have negligible probability.
const HULTHEN_MAX_SEPARATION: f64 = 15.0;
/// Woods-Saxon radii are sampled from [0, R + this many diffusiveness lengths].
const WOODS_SAXON_TAIL: f64 = 10.0;

/// Supported projectile species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Species {
    #[serde(rename = "p")]
    Proton,
    #[serde(rename = "d")]
    Deuteron,
    #[serde(rename = "Cu")]
    Copper,
    #[serde(rename = "Au")]
    Gold,
    #[serde(rename = "Pb")]
    Lead,
    #[serde(rename = "U")]
    Uranium,
}

impl Species {
    pub fn symbol(self) -> &'static str {
        match self {
            Species::Proton => "p",
            Species::Deuteron => "d",
            Species::Copper => "Cu",
            Species::Gold => "Au",
            Species::Lead => "Pb",
            Species::Uranium => "U",
        }
    }

    pub fn mass_number(self) -> usize {
        match self {
            Species::Proton => 1,
            Species::Deuteron => 2,
            Species::Copper => 63,
            Species::Gold => 197,
            Species::Lead => 208,
            Species::Uranium => 238,
        }
    }

    /// Woods-Saxon (radius, diffusiveness) [fm] for the heavy species.
    fn woods_saxon(self) -> Option<(f64, f64)> {
        match self {
            Species::Proton | Species::Deuteron => None,
            Species::Copper => Some((4.20, 0.596)),
            Species::Gold => Some((6.38, 0.535)),
            Species::Lead => Some((6.62, 0.546)),
            Species::Uranium => Some((6.81, 0.600)),
        }
    }

    /// Characteristic nuclear radius [fm], used to derive the automatic
    /// maximum impact parameter.
    pub fn radius(self) -> f64 {
        match self.woods_saxon() {
            Some((r, _)) => r,
            None => match self {
                Species::Proton => 0.87,
                Species::Deuteron => 2.14,
                _ => unreachable!(),
            },
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Species {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "p" => Ok(Species::Proton),
            "d" => Ok(Species::Deuteron),
            "Cu" => Ok(Species::Copper),
            "Au" => Ok(Species::Gold),
            "Pb" => Ok(Species::Lead),
            "U" => Ok(Species::Uranium),
            _ => Err(ConfigError::UnknownSpecies {
                symbol: s.to_string(),
            }),
        }
    }
}

/// A nucleus: a finite sequence of nucleons with resampleable positions.
///
/// Nucleon positions are sampled in 3D and projected onto the transverse
/// plane; the longitudinal coordinate plays no further role.
#[derive(Clone, Debug)]
pub struct Nucleus {
    species: Option<Species>,
    nucleons: Vec<Nucleon>,
}

impl Nucleus {
    pub fn new(species: Species) -> Self {
        Self {
            species: Some(species),
            nucleons: vec![Nucleon::new(0.0, 0.0); species.mass_number()],
        }
    }

    /// A nucleus with a fixed, caller-supplied nucleon configuration.
    /// `sample` only clears participant flags for such a nucleus.
    pub fn from_nucleons(nucleons: Vec<Nucleon>) -> Self {
        Self {
            species: None,
            nucleons,
        }
    }

    pub fn species(&self) -> Option<Species> {
        self.species
    }

    pub fn len(&self) -> usize {
        self.nucleons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nucleons.is_empty()
    }

    pub fn nucleons(&self) -> &[Nucleon] {
        &self.nucleons
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Nucleon> {
        self.nucleons.iter()
    }

    pub fn set_participant(&mut self, index: usize) {
        self.nucleons[index].set_participant(true);
    }

    pub fn clear_participants(&mut self) {
        for nucleon in &mut self.nucleons {
            nucleon.set_participant(false);
        }
    }

    /// Redraw all nucleon positions, shifted by `x_offset` along the impact
    /// parameter axis, and clear participant flags.
    pub fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R, x_offset: f64) {
        self.clear_participants();
        let species = match self.species {
            Some(species) => species,
            // Fixed configuration: positions are the caller's business.
            None => return,
        };
        match species {
            Species::Proton => self.nucleons[0].set_position(x_offset, 0.0),
            Species::Deuteron => {
                let r = sample_hulthen(rng);
                let (dx, dy) = random_transverse(rng, r);
                self.nucleons[0].set_position(x_offset + 0.5 * dx, 0.5 * dy);
                self.nucleons[1].set_position(x_offset - 0.5 * dx, -0.5 * dy);
            }
            _ => {
                // Every remaining species carries Woods-Saxon parameters.
                if let Some((radius, diffusiveness)) = species.woods_saxon() {
                    for nucleon in &mut self.nucleons {
                        let r = sample_woods_saxon(rng, radius, diffusiveness);
                        let (x, y) = random_transverse(rng, r);
                        nucleon.set_position(x + x_offset, y);
                    }
                }
            }
        }
    }
}

impl<'a> IntoIterator for &'a Nucleus {
    type Item = &'a Nucleon;
    type IntoIter = std::slice::Iter<'a, Nucleon>;

    fn into_iter(self) -> Self::IntoIter {
        self.nucleons.iter()
    }
}

/// Rejection-sample a radius from the Woods-Saxon density r^2/(1+e^((r-R)/a)).
fn sample_woods_saxon<R: Rng + ?Sized>(rng: &mut R, radius: f64, diffusiveness: f64) -> f64 {
    let r_max = radius + WOODS_SAXON_TAIL * diffusiveness;
    let r_max_sq = r_max * r_max;
    loop {
        let r = r_max * rng.random::<f64>();
        let density = r * r / (1.0 + ((r - radius) / diffusiveness).exp());
        if rng.random::<f64>() * r_max_sq < density {
            return r;
        }
    }
}

/// Rejection-sample the deuteron separation from the Hulthen wavefunction
/// density (e^(-ar) - e^(-br))^2.
fn sample_hulthen<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let density = |r: f64| ((-HULTHEN_A * r).exp() - (-HULTHEN_B * r).exp()).powi(2);
    let r_peak = (HULTHEN_B / HULTHEN_A).ln() / (HULTHEN_B - HULTHEN_A);
    let density_max = density(r_peak);
    loop {
        let r = HULTHEN_MAX_SEPARATION * rng.random::<f64>();
        if rng.random::<f64>() * density_max < density(r) {
            return r;
        }
    }
}

/// Project a radius onto the transverse plane with an isotropic 3D direction.
fn random_transverse<R: Rng + ?Sized>(rng: &mut R, r: f64) -> (f64, f64) {
    let cos_theta: f64 = rng.random_range(-1.0..=1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = rng.random_range(0.0..2.0 * PI);
    (r * sin_theta * phi.cos(), r * sin_theta * phi.sin())
}
