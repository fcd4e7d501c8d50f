use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use biosim::scenario::ScenarioLoader;

#[derive(Debug, Parser)]
#[command(author, version, about = "Herbivore/carnivore island population simulator")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/rossumoya.yaml")]
    scenario: PathBuf,

    /// Override year count (uses scenario default when omitted)
    #[arg(long)]
    years: Option<u32>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print yearly head counts
    #[arg(long)]
    verbose_years: bool,

    /// Print the final per-cell distribution as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "biosim=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let mut simulation = scenario.build_simulation(cli.seed)?;
    let years = scenario.years(cli.years);

    scenario.run(&mut simulation, years, |summary| {
        if cli.verbose_years {
            println!(
                "year {:>4}  herbivores {:>6}  carnivores {:>6}",
                summary.year, summary.counts.herbivores, summary.counts.carnivores
            );
        }
    })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&simulation.snapshot())?);
    } else {
        let counts = simulation.num_animals_per_species();
        println!(
            "Scenario '{}' completed after {} years. Herbivores: {}, carnivores: {}",
            scenario.name,
            simulation.year(),
            counts.herbivores,
            counts.carnivores
        );
    }
    Ok(())
}
