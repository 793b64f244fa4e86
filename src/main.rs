//! Mtaa - entry point
//!
//! Builds the settlement, initializes the population, and runs the tick
//! loop, logging a daily census along the way.

use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use mtaa::core::config::Parameters;
use mtaa::core::error::Result;
use mtaa::core::time::TICKS_PER_DAY;
use mtaa::simulation::observer::WorldCounts;
use mtaa::simulation::population::build_population;
use mtaa::simulation::tick::run_tick;
use mtaa::world::builder::build_world;
use mtaa::world::resident::{Employment, Goal, Identity};

#[derive(Parser, Debug)]
#[command(name = "mtaa", about = "Informal-settlement household simulation")]
struct Args {
    /// RNG seed; a seed and a parameter set fully determine a run
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate (1440 per day)
    #[arg(long, default_value_t = 14 * TICKS_PER_DAY)]
    ticks: u64,

    /// Override the resident target from the parameters
    #[arg(long)]
    residents: Option<usize>,

    /// TOML file overriding the default parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the final census as JSON
    #[arg(long)]
    stats_out: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mtaa=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut params = match &args.config {
        Some(path) => Parameters::from_toml_file(path)?,
        None => Parameters::default(),
    };
    if let Some(residents) = args.residents {
        params.target_residents = residents;
    }
    params.validate()?;

    tracing::info!(seed = args.seed, ticks = args.ticks, "starting run");

    let rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut world = build_world(params, rng);
    build_population(&mut world);

    for _ in 0..args.ticks {
        run_tick(&mut world);
        if world.current_tick % TICKS_PER_DAY == 0 {
            log_census(&world);
        }
    }

    let counts = WorldCounts::collect(&world);
    println!(
        "day {}: {} residents in {} households | working {} searching {} | rebels {} | happy {} semi {} unhappy {}",
        world.current_tick / TICKS_PER_DAY,
        counts.residents,
        counts.households,
        counts.with_employment(Employment::Formal) + counts.with_employment(Employment::Informal),
        counts.with_employment(Employment::Searching),
        counts.with_identity(Identity::Rebel),
        counts.happiness[2],
        counts.happiness[1],
        counts.happiness[0],
    );

    if let Some(path) = &args.stats_out {
        let json = serde_json::to_string_pretty(&counts)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "census written");
    }

    Ok(())
}

fn log_census(world: &mtaa::world::World) {
    let counts = WorldCounts::collect(world);
    tracing::info!(
        day = world.current_tick / TICKS_PER_DAY,
        at_home = counts.with_goal(Goal::StayHome),
        working = counts.with_goal(Goal::GoToWork),
        school = counts.with_goal(Goal::GetAnEducation),
        searching = counts.with_goal(Goal::FindEmployment),
        socializing = counts.with_goal(Goal::Socialize),
        water = counts.with_goal(Goal::GetWater),
        rebelling = counts.with_goal(Goal::Rebel),
        happy = counts.happiness[2],
        unhappy = counts.happiness[0],
        "daily census"
    );
}
