use anyhow::{Context, Result};
use clap::Parser;
use glauber_core::{Collider, CollisionConfig, Species};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Monte Carlo collision-geometry generator.
///
/// Simulates collision events for a pair of projectiles and reports
/// per-event participant counts, multiplicities, and eccentricity harmonics.
#[derive(Parser, Debug)]
#[command(name = "glauber", version, after_help = "projectile = { p | d | Cu | Au | Pb | U }")]
struct Cli {
    /// Projectile symbols
    #[arg(value_name = "PROJECTILE", num_args = 2, required = true)]
    projectiles: Vec<Species>,

    /// Number of events
    #[arg(value_name = "NUMBER_EVENTS")]
    number_events: Option<usize>,

    /// Configuration file (JSON); explicit flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not print event properties to stdout
    #[arg(short, long)]
    quiet: bool,

    /// JSON file for the run summary
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Normalization factor
    #[arg(short = 'n', long, value_name = "FLOAT")]
    normalization: Option<f64>,

    /// Gamma fluctuation shape parameter
    #[arg(short = 'k', long, value_name = "FLOAT")]
    fluctuation: Option<f64>,

    /// Gaussian nucleon width [fm]
    #[arg(short = 'w', long, value_name = "FLOAT")]
    nucleon_width: Option<f64>,

    /// Inelastic nucleon-nucleon cross section sigma_NN [fm^2]
    #[arg(short = 'x', long, value_name = "FLOAT")]
    cross_section: Option<f64>,

    /// Minimum impact parameter [fm]
    #[arg(long, value_name = "FLOAT")]
    b_min: Option<f64>,

    /// Maximum impact parameter [fm] (default: derived from projectile radii)
    #[arg(long, value_name = "FLOAT")]
    b_max: Option<f64>,

    /// Grid half-width [fm] (the grid extends from -max to +max)
    #[arg(long, value_name = "FLOAT")]
    grid_max: Option<f64>,

    /// Grid step size [fm]
    #[arg(long, value_name = "FLOAT")]
    grid_step: Option<f64>,

    /// Random seed (default: from entropy)
    #[arg(long, value_name = "INT")]
    seed: Option<u64>,
}

impl Cli {
    fn build_config(&self) -> Result<CollisionConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading configuration file {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing configuration file {}", path.display()))?
            }
            None => CollisionConfig::default(),
        };

        config.projectile_a = self.projectiles[0];
        config.projectile_b = self.projectiles[1];
        if let Some(number_events) = self.number_events {
            config.number_events = number_events;
        }
        if let Some(normalization) = self.normalization {
            config.normalization = normalization;
        }
        if let Some(fluctuation) = self.fluctuation {
            config.fluctuation = fluctuation;
        }
        if let Some(nucleon_width) = self.nucleon_width {
            config.nucleon_width = nucleon_width;
        }
        if let Some(cross_section) = self.cross_section {
            config.cross_section = cross_section;
        }
        if let Some(b_min) = self.b_min {
            config.b_min = b_min;
        }
        if self.b_max.is_some() {
            config.b_max = self.b_max;
        }
        if let Some(grid_max) = self.grid_max {
            config.grid_max = grid_max;
        }
        if let Some(grid_step) = self.grid_step {
            config.grid_step = grid_step;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = cli.build_config()?;

    let collider = Collider::new(config).context("invalid configuration")?;
    tracing::info!(seed = collider.seed(), b_max = collider.b_max(), "starting run");
    let summary = collider.run_events();

    if !cli.quiet {
        // event npart ncoll b multiplicity e2 e3 e4 e5
        for record in &summary.records {
            println!(
                "{:6} {:4} {:5} {:7.3} {:14.6} {:9.6} {:9.6} {:9.6} {:9.6}",
                record.event,
                record.npart,
                record.ncoll,
                record.impact_parameter,
                record.multiplicity,
                record.eccentricity[0],
                record.eccentricity[1],
                record.eccentricity[2],
                record.eccentricity[3],
            );
        }
    }

    if let Some(path) = &cli.output {
        let file = fs::File::create(path)
            .with_context(|| format!("creating output file {}", path.display()))?;
        serde_json::to_writer_pretty(file, &summary)
            .with_context(|| format!("writing run summary to {}", path.display()))?;
    }

    Ok(())
}
