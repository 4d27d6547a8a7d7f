mod observables;
mod thickness;

use crate::config::{CollisionConfig, ConfigError};
use crate::grid::{Grid, GridGeometry};
use crate::nucleus::Nucleus;
use crate::profile::NucleonProfile;
use rand::Rng;

/// Values below this are treated as numerically zero: near-empty cells are
/// skipped during observable extraction and divisions are floored here to
/// keep degenerate events defined.
pub(crate) const TINY: f64 = 1e-12;

/// A single collision event: grid geometry, the two per-nucleus thickness
/// fields, the combined (reduced) field, and the derived observables.
///
/// The three field buffers are allocated once at construction and reused by
/// every `compute` call; there is no allocation inside `compute`.
#[derive(Clone, Debug)]
pub struct Event {
    norm: f64,
    geometry: GridGeometry,
    thickness_a: Grid,
    thickness_b: Grid,
    reduced: Grid,
    npart: usize,
    multiplicity: f64,
    centroid: [f64; 2],
    eccentricity: [f64; 4],
}

impl Event {
    pub fn new(config: &CollisionConfig) -> Result<Self, ConfigError> {
        let geometry = GridGeometry::new(config.grid_max, config.grid_step)?;
        Ok(Self {
            norm: config.normalization,
            geometry,
            thickness_a: Grid::new(geometry),
            thickness_b: Grid::new(geometry),
            reduced: Grid::new(geometry),
            npart: 0,
            multiplicity: 0.0,
            centroid: [0.0, 0.0],
            eccentricity: [0.0; 4],
        })
    }

    /// Run the full per-event pipeline: deposit both nuclei onto their
    /// thickness fields, combine them into the reduced field, then extract
    /// the observables. All previous results are overwritten.
    ///
    /// The profile is shared between the two deposits and redraws its
    /// fluctuation amplitude once per participant, so nucleus iteration
    /// order determines the RNG stream.
    pub fn compute<R: Rng + ?Sized>(
        &mut self,
        nucleus_a: &Nucleus,
        nucleus_b: &Nucleus,
        profile: &mut NucleonProfile,
        rng: &mut R,
    ) {
        self.npart = thickness::deposit(&mut self.thickness_a, nucleus_a, profile, rng)
            + thickness::deposit(&mut self.thickness_b, nucleus_b, profile, rng);

        let reduced = thickness::combine(
            &self.thickness_a,
            &self.thickness_b,
            &mut self.reduced,
            self.norm,
        );
        self.multiplicity = reduced.multiplicity;
        self.centroid = [reduced.xcm, reduced.ycm];

        self.eccentricity =
            observables::eccentricity_harmonics(&self.reduced, self.centroid[0], self.centroid[1]);
    }

    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    pub fn normalization(&self) -> f64 {
        self.norm
    }

    /// Participant count of the most recent `compute` call.
    pub fn npart(&self) -> usize {
        self.npart
    }

    /// Integral of the reduced thickness field over the domain.
    pub fn multiplicity(&self) -> f64 {
        self.multiplicity
    }

    /// Field centroid `(x, y)` in grid-index units.
    pub fn centroid(&self) -> [f64; 2] {
        self.centroid
    }

    /// Eccentricity harmonic of `order` in 2..=5.
    pub fn eccentricity(&self, order: usize) -> f64 {
        self.try_eccentricity(order)
            .expect("eccentricity order must be in 2..=5")
    }

    pub fn try_eccentricity(&self, order: usize) -> Option<f64> {
        match order {
            2..=5 => Some(self.eccentricity[order - 2]),
            _ => None,
        }
    }

    /// Eccentricity harmonics for orders 2..=5.
    pub fn eccentricities(&self) -> [f64; 4] {
        self.eccentricity
    }

    /// The combined field of the most recent `compute` call.
    pub fn reduced_thickness(&self) -> &Grid {
        &self.reduced
    }
}
