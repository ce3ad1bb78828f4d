use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use raptoralloc::profile::{AssetUniverse, InvestmentHorizon, InvestorProfile, RiskTolerance};
use raptoralloc::{ExecutionMode, HyperparamOverrides, RunConfig, Translator};

/// RaptorAlloc portfolio allocator
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Run configuration file (.toml or .json) with `model` and `market`
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the iteration count
    #[arg(long)]
    iterations: Option<usize>,

    /// Evaluate ensemble members in parallel
    #[arg(long, default_value = "false")]
    parallel: bool,

    /// Pretty-print the JSON output
    #[arg(long, default_value = "false")]
    pretty: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Allocate across the default retail universe for an investor profile
    Profile {
        /// Risk tolerance from 1 (conservative) to 10 (aggressive)
        #[arg(long, default_value = "5")]
        risk_tolerance: u8,

        /// Investment horizon in years: 1-3, 3-5, 5-10 or 10+
        #[arg(long, default_value = "5-10")]
        horizon: String,
    },
}

impl Args {
    fn overrides(&self) -> HyperparamOverrides {
        HyperparamOverrides {
            seed: self.seed,
            iterations: self.iterations,
            execution: self.parallel.then_some(ExecutionMode::Parallel),
            ..Default::default()
        }
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> anyhow::Result<String> {
        let out = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(out)
    }
}

fn apply_overrides(target: &mut HyperparamOverrides, cli: HyperparamOverrides) {
    if cli.seed.is_some() {
        target.seed = cli.seed;
    }
    if cli.iterations.is_some() {
        target.iterations = cli.iterations;
    }
    if cli.execution.is_some() {
        target.execution = cli.execution;
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match &args.command {
        Some(Command::Profile {
            risk_tolerance,
            horizon,
        }) => {
            let profile = InvestorProfile::new(
                RiskTolerance::new(*risk_tolerance)?,
                horizon.parse::<InvestmentHorizon>()?,
            );
            info!(
                "Profile allocation: risk tolerance {}, horizon {}",
                profile.risk_tolerance.level(),
                profile.horizon
            );
            let allocation = profile.allocate(&AssetUniverse::default(), args.overrides())?;
            for w in &allocation.weights {
                info!("{:<12} {:>6.2}%", w.name, w.weight * 100.0);
            }
            info!(
                "Expected return {:.2}%, risk {:.2}%, Sharpe {:.3}",
                allocation.expected_return_pct(),
                allocation.risk_pct(),
                allocation.metrics.sharpe_ratio
            );
            println!("{}", args.to_json(&allocation)?);
        }
        None => {
            let path = args
                .config
                .as_ref()
                .context("either --config <file> or the `profile` subcommand is required")?;
            let mut config = RunConfig::from_path(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            apply_overrides(&mut config.model.hyperparams, args.overrides());

            let translator = Translator::new(config.model)?;
            let result = translator.translate(&config.market)?;
            println!("{}", args.to_json(&result)?);
        }
    }

    Ok(())
}
