use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use starship::{
    engine::{EngineBuilder, EngineSettings},
    scenario::{Scenario, ScenarioLoader},
    GameConfig, Outcome,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Text adventure aboard the starship KY-25B")]
struct Cli {
    /// Path to a YAML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scenario YAML to play instead of the built-in one
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Seed for the docking pad draw
    #[arg(long)]
    seed: Option<u64>,

    /// Log filter for stderr, e.g. "debug" or "starship=info"
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => GameConfig::from_yaml(path)?,
        None => GameConfig::default(),
    };
    init_logging(cli.log_level.as_deref(), &config.logging.level);

    let scenario = match cli.scenario.as_ref().or(config.scenario.as_ref()) {
        Some(path) => ScenarioLoader::new(".").load(path)?,
        None => Scenario::builtin()?,
    };
    let seed = cli.seed.or(config.seed).unwrap_or_else(rand::random);
    info!(seed, scenario = %scenario.name, "starting session");

    let mut engine = EngineBuilder::new(EngineSettings { seed })
        .with_default_systems()
        .build(&scenario)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_outcome(&mut out, &engine.start()?)?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while !engine.is_over() {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read input")?;
        print_outcome(&mut out, &engine.submit(&line)?)?;
    }
    info!(session = ?engine.session(), "session finished");
    Ok(())
}

/// `--log-level` wins, then `RUST_LOG`, then the config file.
fn init_logging(cli_level: Option<&str>, config_level: &str) {
    let filter = match cli_level {
        Some(level) => EnvFilter::try_new(level).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::try_new(config_level).unwrap_or_else(|_| EnvFilter::new("warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_outcome(out: &mut impl Write, outcome: &Outcome) -> io::Result<()> {
    for line in &outcome.lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
