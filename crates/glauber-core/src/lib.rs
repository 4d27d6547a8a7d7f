//! Monte Carlo collision-geometry generator core.
//!
//! Samples pairs of colliding nuclei, determines which nucleons participate,
//! deposits their density profiles onto a transverse grid, and reduces the
//! combined field to per-event observables: participant count, multiplicity,
//! centroid, and eccentricity harmonics.

pub mod collider;
pub mod config;
pub mod event;
pub mod grid;
pub mod nucleon;
pub mod nucleus;
pub mod profile;
pub mod spatial;

pub use collider::{pair_participants, Collider, EventRecord, RunSummary};
pub use config::{CollisionConfig, ConfigError};
pub use event::Event;
pub use grid::{Grid, GridGeometry};
pub use nucleon::Nucleon;
pub use nucleus::{Nucleus, Species};
pub use profile::NucleonProfile;
