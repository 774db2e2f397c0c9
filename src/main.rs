use magsim::{ScenarioConfig, Scenario, TickReport};
use magsim::{bench_neighbor_queries, bench_step, bench_step_curve};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file; relative paths missing from the cwd are looked up under the crate dir
    #[arg(short, long, default_value = "scenarios/default.yaml")]
    file: String,

    /// Override the number of ticks from the scenario
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Override the placement seed from the scenario
    #[arg(short, long)]
    seed: Option<u64>,

    /// Run the benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let path = PathBuf::from(file_name);
    let config_path = if path.is_absolute() || path.exists() {
        path
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(path)
    };

    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    if args.bench {
        bench_neighbor_queries();
        bench_step();
        bench_step_curve();
        return Ok(());
    }

    let mut scenario_cfg = load_scenario_from_yaml(&args.file)?;
    if let Some(ticks) = args.ticks {
        scenario_cfg.run.ticks = ticks;
    }
    if args.seed.is_some() {
        scenario_cfg.run.seed = args.seed;
    }

    let mut scenario = Scenario::build_scenario(scenario_cfg).context("failed to build scenario")?;
    let run = scenario.run.clone();

    let mut totals = TickReport::default();
    for tick in 1..=run.ticks {
        let report = scenario.tick(run.delta_time);
        totals.magnetic_interactions += report.magnetic_interactions;
        totals.collisions += report.collisions;

        if run.report_every > 0 && tick % run.report_every == 0 {
            let stats = scenario.stats();
            info!(
                tick,
                particles = stats.particles,
                mean_speed = stats.mean_speed,
                kinetic_energy = stats.kinetic_energy,
                collisions = totals.collisions,
                "progress"
            );
        }
    }

    let stats = scenario.stats();
    info!(
        ticks = run.ticks,
        particles = stats.particles,
        mean_speed = stats.mean_speed,
        kinetic_energy = stats.kinetic_energy,
        momentum_x = stats.momentum.x,
        momentum_y = stats.momentum.y,
        magnetic_interactions = totals.magnetic_interactions,
        collisions = totals.collisions,
        "run finished"
    );

    Ok(())
}
