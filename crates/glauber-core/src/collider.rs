use crate::config::{CollisionConfig, ConfigError};
use crate::event::Event;
use crate::nucleus::Nucleus;
use crate::profile::NucleonProfile;
use crate::spatial;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Observables of a single computed event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRecord {
    pub event: usize,
    pub impact_parameter: f64,
    pub npart: usize,
    pub ncoll: usize,
    pub multiplicity: f64,
    /// Field centroid in grid-index units.
    pub centroid: [f64; 2],
    /// Eccentricity harmonics for orders 2..=5.
    pub eccentricity: [f64; 4],
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub number_events: usize,
    pub seed: u64,
    pub mean_npart: f64,
    pub mean_multiplicity: f64,
    pub mean_eccentricity: [f64; 4],
    pub records: Vec<EventRecord>,
}

/// Mark the participants of both nuclei under the black-disk criterion:
/// a nucleon pair collides when its transverse separation is below
/// `max_distance`. Returns the number of binary collisions.
///
/// Pairing queries an R*-tree over nucleus B instead of scanning all A x B
/// pairs; the spatial tests verify the two agree.
pub fn pair_participants(a: &mut Nucleus, b: &mut Nucleus, max_distance: f64) -> usize {
    let tree = spatial::build_index(b);
    let mut collisions = 0;
    for index_a in 0..a.len() {
        let nucleon = a.nucleons()[index_a];
        let hits = spatial::query_within(&tree, [nucleon.x(), nucleon.y()], max_distance);
        if hits.is_empty() {
            continue;
        }
        a.set_participant(index_a);
        collisions += hits.len();
        for index_b in hits {
            b.set_participant(index_b);
        }
    }
    collisions
}

/// Per-worker state: one event plus its nuclei and profile, with all buffers
/// reused across the events the worker runs.
#[derive(Clone)]
struct EventWorker {
    event: Event,
    nucleus_a: Nucleus,
    nucleus_b: Nucleus,
    profile: NucleonProfile,
    b_min: f64,
    b_max: f64,
    interaction_distance: f64,
}

impl EventWorker {
    /// Sample trials until one produces a collision, then compute the event.
    ///
    /// Each event gets its own RNG seeded from the base seed and the event
    /// index, so results are reproducible regardless of how rayon schedules
    /// events onto workers.
    fn simulate(&mut self, index: usize, base_seed: u64) -> EventRecord {
        let mut rng = ChaCha12Rng::seed_from_u64(base_seed.wrapping_add(index as u64));

        let (impact_parameter, ncoll) = loop {
            let b = sample_impact_parameter(&mut rng, self.b_min, self.b_max);
            self.nucleus_a.sample(&mut rng, -0.5 * b);
            self.nucleus_b.sample(&mut rng, 0.5 * b);
            let ncoll = pair_participants(
                &mut self.nucleus_a,
                &mut self.nucleus_b,
                self.interaction_distance,
            );
            if ncoll > 0 {
                break (b, ncoll);
            }
        };

        self.event.compute(
            &self.nucleus_a,
            &self.nucleus_b,
            &mut self.profile,
            &mut rng,
        );
        debug!(
            event = index,
            b = impact_parameter,
            npart = self.event.npart(),
            multiplicity = self.event.multiplicity(),
            "computed event"
        );

        EventRecord {
            event: index,
            impact_parameter,
            npart: self.event.npart(),
            ncoll,
            multiplicity: self.event.multiplicity(),
            centroid: self.event.centroid(),
            eccentricity: self.event.eccentricities(),
        }
    }
}

/// Area-uniform impact parameter: P(b) db ~ b db on [b_min, b_max].
fn sample_impact_parameter<R: Rng + ?Sized>(rng: &mut R, b_min: f64, b_max: f64) -> f64 {
    let u: f64 = rng.random();
    (b_min * b_min + u * (b_max * b_max - b_min * b_min)).sqrt()
}

/// Runs many independent events for one configuration and aggregates their
/// observables. Construction validates the configuration; `run_events` then
/// cannot fail.
pub struct Collider {
    config: CollisionConfig,
    base_seed: u64,
    worker: EventWorker,
}

impl Collider {
    pub fn new(config: CollisionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let interaction_distance = config.interaction_distance();
        let b_max = match config.b_max {
            Some(b_max) => b_max,
            // Past this separation the nuclear peripheries cannot reach each
            // other, so larger impact parameters only waste trials.
            None => {
                config.projectile_a.radius()
                    + config.projectile_b.radius()
                    + 2.0 * interaction_distance
            }
        };
        let base_seed = match config.seed {
            Some(seed) => seed,
            None => rand::rng().random(),
        };
        let worker = EventWorker {
            event: Event::new(&config)?,
            nucleus_a: Nucleus::new(config.projectile_a),
            nucleus_b: Nucleus::new(config.projectile_b),
            profile: NucleonProfile::new(&config)?,
            b_min: config.b_min,
            b_max,
            interaction_distance,
        };
        Ok(Self {
            config,
            base_seed,
            worker,
        })
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// The seed actually in use (drawn from entropy when the config left it
    /// unset).
    pub fn seed(&self) -> u64 {
        self.base_seed
    }

    pub fn b_max(&self) -> f64 {
        self.worker.b_max
    }

    /// Run all configured events, in parallel across rayon workers. Each
    /// worker owns its event buffers; event indices fix the RNG streams, so
    /// the summary depends only on the configuration and seed.
    pub fn run_events(&self) -> RunSummary {
        let number_events = self.config.number_events;
        let base_seed = self.base_seed;
        let records: Vec<EventRecord> = (0..number_events)
            .into_par_iter()
            .map_init(
                || self.worker.clone(),
                |worker, index| worker.simulate(index, base_seed),
            )
            .collect();

        let denom = records.len().max(1) as f64;
        let mean_npart = records.iter().map(|r| r.npart as f64).sum::<f64>() / denom;
        let mean_multiplicity = records.iter().map(|r| r.multiplicity).sum::<f64>() / denom;
        let mut mean_eccentricity = [0.0; 4];
        for record in &records {
            for (mean, value) in mean_eccentricity.iter_mut().zip(record.eccentricity) {
                *mean += value / denom;
            }
        }

        info!(
            events = number_events,
            mean_npart, mean_multiplicity, "run complete"
        );

        RunSummary {
            schema_version: default_schema_version(),
            number_events,
            seed: base_seed,
            mean_npart,
            mean_multiplicity,
            mean_eccentricity,
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nucleon::Nucleon;
    use crate::nucleus::Species;

    fn test_config() -> CollisionConfig {
        CollisionConfig {
            projectile_a: Species::Copper,
            projectile_b: Species::Copper,
            number_events: 4,
            grid_max: 8.0,
            grid_step: 0.4,
            seed: Some(7),
            ..CollisionConfig::default()
        }
    }

    #[test]
    fn fixed_seed_runs_are_reproducible() {
        let first = Collider::new(test_config()).unwrap().run_events();
        let second = Collider::new(test_config()).unwrap().run_events();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn every_event_has_a_collision() {
        let collider = Collider::new(test_config()).unwrap();
        let summary = collider.run_events();
        assert_eq!(summary.records.len(), 4);
        for record in &summary.records {
            assert!(record.npart >= 2);
            assert!(record.ncoll >= 1);
            assert!(record.multiplicity > 0.0);
            assert!(record.impact_parameter >= 0.0);
            assert!(record.impact_parameter < collider.b_max());
            assert!(record.eccentricity.iter().all(|e| e.is_finite() && *e >= 0.0));
        }
        assert!(summary.mean_multiplicity > 0.0);
        assert!(summary.mean_npart >= 2.0);
    }

    #[test]
    fn proton_proton_events_have_exactly_two_participants() {
        let config = CollisionConfig {
            projectile_a: Species::Proton,
            projectile_b: Species::Proton,
            number_events: 8,
            grid_max: 4.0,
            grid_step: 0.2,
            seed: Some(11),
            ..CollisionConfig::default()
        };
        let summary = Collider::new(config).unwrap().run_events();
        for record in &summary.records {
            assert_eq!(record.npart, 2);
            assert_eq!(record.ncoll, 1);
        }
    }

    #[test]
    fn impact_parameter_respects_configured_range() {
        let config = CollisionConfig {
            b_min: 1.0,
            b_max: Some(3.0),
            number_events: 6,
            grid_max: 8.0,
            grid_step: 0.4,
            seed: Some(19),
            projectile_a: Species::Copper,
            projectile_b: Species::Copper,
            ..CollisionConfig::default()
        };
        let summary = Collider::new(config).unwrap().run_events();
        for record in &summary.records {
            assert!(record.impact_parameter >= 1.0);
            assert!(record.impact_parameter <= 3.0);
        }
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = CollisionConfig {
            grid_step: -0.1,
            ..test_config()
        };
        assert!(Collider::new(config).is_err());
    }

    #[test]
    fn pairing_marks_both_sides() {
        let mut a = Nucleus::from_nucleons(vec![Nucleon::new(0.0, 0.0), Nucleon::new(5.0, 5.0)]);
        let mut b = Nucleus::from_nucleons(vec![Nucleon::new(0.5, 0.0), Nucleon::new(-5.0, -5.0)]);
        let ncoll = pair_participants(&mut a, &mut b, 1.0);
        assert_eq!(ncoll, 1);
        assert!(a.nucleons()[0].is_participant());
        assert!(!a.nucleons()[1].is_participant());
        assert!(b.nucleons()[0].is_participant());
        assert!(!b.nucleons()[1].is_participant());
    }
}
