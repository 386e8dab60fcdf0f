//! EventLab CLI: run and sweep commands.
//!
//! Commands:
//! - `run`: execute a backtest from a TOML config file and save artifacts
//! - `sweep`: rerun one config over several position-sizing fractions in parallel
//! - `check`: validate a config file and print its run ID

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::Level;

use eventlab_runner::data_loader::load_bars;
use eventlab_runner::{
    export_run_with_report, rank_by_sharpe, render_summary, run_single_backtest, run_sweep,
    RunConfig,
};

#[derive(Parser)]
#[command(name = "eventlab", about = "EventLab CLI: event-driven backtesting engine")]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Use synthetic data for symbols with no CSV file.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Override the config's output directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Skip writing report.md next to the artifacts.
        #[arg(long, default_value_t = false)]
        no_report: bool,
    },
    /// Run one config over several sizing fractions in parallel.
    Sweep {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Comma-separated sizing fractions, each in (0, 1].
        #[arg(long, value_delimiter = ',', required = true)]
        fractions: Vec<f64>,

        /// Use synthetic data for symbols with no CSV file.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Save the full artifact set for every sweep point.
        #[arg(long, default_value_t = false)]
        save: bool,
    },
    /// Validate a config file and print its run ID.
    Check {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            synthetic,
            output_dir,
            no_report,
        } => run_cmd(config, synthetic, output_dir, !no_report),
        Commands::Sweep {
            config,
            fractions,
            synthetic,
            save,
        } => sweep_cmd(config, fractions, synthetic, save),
        Commands::Check { config } => check_cmd(config),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path, synthetic: bool) -> Result<RunConfig> {
    let mut config = RunConfig::load(path)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    config.synthetic |= synthetic;
    Ok(config)
}

fn run_cmd(
    config_path: PathBuf,
    synthetic: bool,
    output_dir: Option<PathBuf>,
    include_report: bool,
) -> Result<()> {
    let mut config = load_config(&config_path, synthetic)?;
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }

    let result = run_single_backtest(&config)?;
    println!("{}", render_summary(&result));

    let paths = export_run_with_report(&config.output_dir, &result, include_report)?;
    println!("Artifacts saved to: {}", paths.run_dir.display());
    Ok(())
}

fn sweep_cmd(config_path: PathBuf, fractions: Vec<f64>, synthetic: bool, save: bool) -> Result<()> {
    if fractions.is_empty() {
        bail!("--fractions needs at least one value");
    }
    let config = load_config(&config_path, synthetic)?;
    let opts = config.load_options();
    let data = load_bars(&config.symbols, &config.data_dir, &opts)?;

    let results = run_sweep(&config, &data, &fractions)?;

    println!("{:>10} {:>12} {:>8} {:>10} {:>8}", "fraction", "return %", "sharpe", "max dd %", "dd len");
    for point in rank_by_sharpe(&results) {
        let s = point.summary;
        println!(
            "{:>10.4} {:>12.2} {:>8.2} {:>10.2} {:>8}",
            point.position_sizing_fraction,
            s.total_return_pct,
            s.sharpe_ratio,
            s.max_drawdown_pct,
            s.max_drawdown_duration
        );
    }

    if save {
        for result in &results {
            let paths = export_run_with_report(&config.output_dir, result, false)?;
            println!("Artifacts saved to: {}", paths.run_dir.display());
        }
    }
    Ok(())
}

fn check_cmd(config_path: PathBuf) -> Result<()> {
    let config = load_config(&config_path, false)?;
    println!("config OK: {}", config_path.display());
    println!("run id: {}", config.run_id()?);
    println!(
        "{}",
        serde_json::to_string_pretty(&config).context("failed to render config")?
    );
    Ok(())
}
