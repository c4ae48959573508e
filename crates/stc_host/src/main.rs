//! Host driver for the stencil co-verification harness.
//!
//! Runs the same harness the firmware runs, against the behavioral model
//! instead of the board: interactively from a switch list, from a scenario
//! script, or as a parallel agreement sweep over random stimulus.

mod clock;
mod console;
mod model;
mod run;
mod script;
mod stats;
mod sweep;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use clock::ClockSource;
use stc_core::sim::Fault;
use stc_core::stimulus::DEFAULT_SEED;
use stc_io::scenario::{VariantKind, parse_number};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum VariantArg {
    Line,
    Grid,
}

impl From<VariantArg> for VariantKind {
    fn from(v: VariantArg) -> Self {
        match v {
            VariantArg::Line => VariantKind::Line,
            VariantArg::Grid => VariantKind::Grid,
        }
    }
}

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct FaultArgs {
    /// Status bit never rises.
    #[arg(long, conflicts_with = "corrupt_every")]
    stuck: bool,
    /// Flip bit 0 of every N-th output.
    #[arg(long)]
    corrupt_every: Option<usize>,
}

impl FaultArgs {
    fn fault(&self) -> Fault {
        match (self.stuck, self.corrupt_every) {
            (true, _) => Fault::Stuck,
            (false, Some(every)) => Fault::Corrupt { every },
            (false, None) => Fault::None,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the harness once per switch word.
    Run {
        #[arg(long, value_enum, default_value_t = VariantArg::Line)]
        variant: VariantArg,
        #[arg(short, long, value_delimiter = ',', value_parser = parse_word, required = true)]
        switches: Vec<u32>,
        #[command(flatten)]
        fault: FaultArgs,
        /// Stimulus seed; a replayed file carries its own samples.
        #[arg(long, value_parser = parse_word, conflicts_with = "stimulus")]
        seed: Option<u32>,
        /// File of sample words replacing the generated stimulus.
        #[arg(long)]
        stimulus: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ClockSource::Model)]
        clock: ClockSource,
    },
    /// Play a scenario file.
    Script { path: PathBuf },
    /// Compare hardware and reference for every kernel over many seeds.
    Sweep {
        #[arg(long, value_enum, default_value_t = VariantArg::Line)]
        variant: VariantArg,
        #[arg(long, default_value_t = 64)]
        seeds: u32,
        #[arg(long, value_parser = parse_word, default_value_t = DEFAULT_SEED)]
        seed: u32,
        #[command(flatten)]
        fault: FaultArgs,
    },
}

fn parse_word(s: &str) -> Result<u32, String> {
    parse_number(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            variant,
            switches,
            fault,
            seed,
            stimulus,
            clock,
        } => {
            run::run_switches(run::RunOptions {
                variant: variant.into(),
                switches,
                fault: fault.fault(),
                seed,
                stimulus,
                clock,
            })?;
        }
        Commands::Script { path } => {
            script::run_script(&path)?;
        }
        Commands::Sweep {
            variant,
            seeds,
            seed,
            fault,
        } => {
            sweep::run_sweep(variant.into(), seeds, seed, fault.fault())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_switch_lists_in_any_radix() {
        let cli = Cli::try_parse_from([
            "stc_host",
            "run",
            "--switches",
            "1,0x2,0b100",
            "--corrupt-every",
            "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { switches, fault, .. } => {
                assert_eq!(switches, vec![1, 2, 4]);
                assert_eq!(fault.fault(), Fault::Corrupt { every: 3 });
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn stuck_conflicts_with_corrupt() {
        assert!(
            Cli::try_parse_from(["stc_host", "sweep", "--stuck", "--corrupt-every", "2"]).is_err()
        );
    }

    #[test]
    fn seed_conflicts_with_replayed_stimulus() {
        let args = ["stc_host", "run", "--switches", "1", "--seed", "3"];
        assert!(Cli::try_parse_from(args).is_ok());
        assert!(
            Cli::try_parse_from(args.iter().chain(&["--stimulus", "frame.txt"])).is_err()
        );
    }
}
