use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use forest_fire_core::{
    Ensemble, EnsembleReport, ForestConfig, LakeConfig, Neighborhood, StepOrder, Topology,
    WindConfig,
};
use std::path::PathBuf;
use tracing::info;

/// Forest-fire cellular automaton runner
///
/// Options given on the command line override the values loaded with
/// `--config`, which in turn override the built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "forest-fire")]
#[command(about = "Stochastic forest-fire simulation for self-organized criticality studies", long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the full JSON report here
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Grid side length L
    #[arg(short = 'L', long)]
    grid_size: Option<usize>,

    /// Timesteps between lightning strikes (f)
    #[arg(short = 'f', long)]
    lightning_interval: Option<u64>,

    /// Probability of spreading to an orthogonal neighbour (g)
    #[arg(short = 'g', long)]
    spread_probability: Option<f64>,

    /// Probability of spreading to a diagonal neighbour (Moore only)
    #[arg(long)]
    diagonal_probability: Option<f64>,

    /// Timesteps a burning cell stays alight
    #[arg(long)]
    burn_duration: Option<u32>,

    /// Skip planting while any fire burns
    #[arg(long)]
    freeze: bool,

    #[arg(long, value_enum)]
    topology: Option<TopologyArg>,

    #[arg(long, value_enum)]
    neighborhood: Option<NeighborhoodArg>,

    /// Fraction of the grid covered by lakes
    #[arg(long)]
    lakes: Option<f64>,

    /// Number of lakes to carve
    #[arg(long)]
    lake_count: Option<usize>,

    /// Wind vector x component (grid units)
    #[arg(long, allow_hyphen_values = true)]
    wind_x: Option<f64>,

    /// Wind vector y component (grid units)
    #[arg(long, allow_hyphen_values = true)]
    wind_y: Option<f64>,

    /// Run planting before lightning
    #[arg(long)]
    planting_first: bool,

    /// Timesteps per instance
    #[arg(short, long)]
    timesteps: Option<u64>,

    /// Independent instances to run
    #[arg(short, long)]
    instances: Option<usize>,

    /// Base RNG seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Run instances on the calling thread instead of the rayon pool
    #[arg(long)]
    sequential: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TopologyArg {
    Toroidal,
    Bounded,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NeighborhoodArg {
    VonNeumann,
    Moore,
}

impl Args {
    fn build_config(&self) -> Result<ForestConfig> {
        let mut config = match &self.config {
            Some(path) => ForestConfig::load(path)?,
            None => ForestConfig::default(),
        };

        if let Some(size) = self.grid_size {
            config.grid_size = size;
        }
        if let Some(interval) = self.lightning_interval {
            config.lightning_interval = interval;
        }
        if let Some(g) = self.spread_probability {
            config.spread_probability = g;
        }
        if self.diagonal_probability.is_some() {
            config.diagonal_spread_probability = self.diagonal_probability;
        }
        if let Some(duration) = self.burn_duration {
            config.burn_duration = duration;
        }
        if self.freeze {
            config.freeze_time_during_fire = true;
        }
        if let Some(topology) = self.topology {
            config.topology = match topology {
                TopologyArg::Toroidal => Topology::Toroidal,
                TopologyArg::Bounded => Topology::Bounded,
            };
        }
        if let Some(neighborhood) = self.neighborhood {
            config.neighborhood = match neighborhood {
                NeighborhoodArg::VonNeumann => Neighborhood::VonNeumann,
                NeighborhoodArg::Moore => Neighborhood::Moore,
            };
        }
        if let Some(proportion) = self.lakes {
            let mut lakes = LakeConfig::new(proportion);
            if let Some(count) = self.lake_count {
                lakes.lake_count = count;
            }
            config.lakes = Some(lakes);
        } else if let (Some(lakes), Some(count)) = (config.lakes.as_mut(), self.lake_count) {
            lakes.lake_count = count;
        }
        if self.wind_x.is_some() || self.wind_y.is_some() {
            config.wind = WindConfig::new(self.wind_x.unwrap_or(0.0), self.wind_y.unwrap_or(0.0));
        }
        if self.planting_first {
            config.step_order = StepOrder::PlantingFirst;
        }
        if let Some(timesteps) = self.timesteps {
            config.timesteps = timesteps;
        }
        if let Some(instances) = self.instances {
            config.instances = instances;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = args.build_config()?;

    println!("=== Forest Fire Simulation ===\n");
    println!(
        "Grid: {0}x{0} {1:?}, {2:?} neighbourhood",
        config.grid_size, config.topology, config.neighborhood
    );
    println!(
        "Lightning every {} steps, g = {:.3}, burn duration {}",
        config.lightning_interval, config.spread_probability, config.burn_duration
    );
    if let Some(lakes) = &config.lakes {
        println!(
            "Lakes: {:.1}% of cells in {} lakes",
            lakes.proportion * 100.0,
            lakes.lake_count
        );
    }
    if let Some(wind) = config.wind.active_vector() {
        println!("Wind: ({:.2}, {:.2})", wind.x, wind.y);
    }

    let ensemble = Ensemble::new(config)?;
    info!(
        instances = ensemble.config().instances,
        timesteps = ensemble.config().timesteps,
        base_seed = ensemble.base_seed(),
        "Starting ensemble"
    );

    let report = if args.sequential {
        ensemble.run_sequential()?
    } else {
        ensemble.run()?
    };

    print_summary(&report);

    if let Some(path) = &args.output {
        let json = report
            .to_json_string()
            .context("failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        println!("\nReport written to {}", path.display());
    }

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn print_summary(report: &EnsembleReport) {
    println!(
        "\nRan {} instance(s) of {} timesteps (base seed {})\n",
        report.instances(),
        report.timesteps,
        report.base_seed
    );

    for (index, run) in report.runs.iter().enumerate() {
        let largest = run.fire_sizes.iter().max().copied().unwrap_or(0);
        let final_density = run.tree_densities().last().copied().unwrap_or(0.0);
        println!(
            "  #{index:<3} seed {:>20}  fires {:>6}  mean size {:>8.2}  largest {:>6}  density {:.3}",
            run.seed,
            run.fire_count(),
            run.mean_fire_size(),
            largest,
            final_density
        );
    }

    let densities = report.average_tree_densities();
    if let Some(last) = densities.last() {
        println!("\nMean final tree density: {last:.3}");
    }
    let durations = report.all_fire_durations();
    if !durations.is_empty() {
        let longest = durations.iter().max().copied().unwrap_or(0);
        println!(
            "Fires: {}, longest spread {} rounds",
            durations.len(),
            longest
        );
    }
}
