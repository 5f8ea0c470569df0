mod io;
mod report;

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use fireplan_core::{Planner, PlannerConfigV1};

/// Scenario count used by `--quick-mc`.
const QUICK_MC_SIMULATIONS: usize = 200;

#[derive(Parser, Debug)]
#[command(name = "fireplan")]
#[command(about = "A FIRE plan calculator with Monte Carlo risk analysis")]
struct Args {
    /// Path to a v1.0 plan config JSON (default: bundled example plan)
    config: Option<PathBuf>,

    /// Run a quick Monte Carlo pass with 200 scenarios
    #[arg(long)]
    quick_mc: bool,

    /// Write the result JSON (input config plus results) to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

fn init_logging(level: &str) {
    let default_filter = format!("fireplan={level},fireplan_core={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = match &args.config {
        Some(path) => io::load_config(path)?,
        None => {
            tracing::info!("no config given, using the bundled example plan");
            PlannerConfigV1::from_json_str(io::EXAMPLE_CONFIG)?
        }
    };

    let mut planner = Planner::from_config(config)?;
    planner.generate_projection_table()?;

    let num_simulations = args.quick_mc.then_some(QUICK_MC_SIMULATIONS);
    let mut progress = |done: usize, total: usize| {
        if total > 0 {
            eprint!("\rMonte Carlo: {:3}%", done * 100 / total);
            if done >= total {
                eprintln!();
            }
            let _ = std::io::stderr().flush();
        }
        true
    };

    let results = planner.calculate_fire_results(Some(&mut progress), num_simulations)?;
    report::print_summary(&results);

    if let Some(path) = &args.output {
        let document = io::ResultDocument {
            config: planner.export_config("")?,
            results,
        };
        io::write_results(path, &document)?;
        println!("\nResults written to {}", path.display());
    }

    Ok(())
}
