//! Scenario playback against the model.

use crate::clock::HostClock;
use crate::console::ConsoleSink;
use crate::model;
use crate::stats::Tally;
use anyhow::{Result, bail};
use stc_core::sim::{Fault, SimClock, SimCounter};
use stc_io::scenario::{Command, Scenario, load_scenario};
use std::fmt::Write;
use std::path::Path;
use tracing::info;

pub struct ScriptOutcome {
    pub runs: u32,
    pub tally: Tally,
}

/// Plays `scenario` on a fresh model, stopping at the first failed `expect`.
pub fn execute<W: Write>(scenario: &Scenario, sink: W) -> Result<ScriptOutcome> {
    let clock = SimClock::new();
    let config = model::config_for(scenario.variant());
    let counter = HostClock::Model(SimCounter::new(&clock));
    let mut harness = model::harness(config, &clock, counter, Fault::None, sink);
    let mut tally = Tally::default();

    harness.banner();
    for line in &scenario.lines {
        match line.command {
            Command::Variant(_) => {}
            Command::Switch(raw) => {
                harness.regs_mut().io_mut().set_switches(raw);
                tally.record(harness.poll());
            }
            Command::Hold(n) => {
                for _ in 0..n {
                    tally.record(harness.poll());
                }
            }
            Command::Glitch { raw, reads } => {
                harness.regs_mut().io_mut().glitch(raw, reads);
                tally.record(harness.poll());
            }
            Command::Fault(fault) => {
                info!(line = line.number, ?fault, "fault injected");
                harness.regs_mut().io_mut().set_fault(fault);
            }
            Command::ExpectRuns(expected) => {
                if harness.runs() != expected {
                    bail!(
                        "line {}: expected {} runs, harness made {}",
                        line.number,
                        expected,
                        harness.runs()
                    );
                }
            }
        }
    }

    Ok(ScriptOutcome {
        runs: harness.runs(),
        tally,
    })
}

pub fn run_script(path: &Path) -> Result<()> {
    let scenario = load_scenario(path)?;
    info!(path = %path.display(), commands = scenario.lines.len(), "scenario loaded");

    let outcome = execute(&scenario, ConsoleSink)?;
    outcome.tally.print_report("cycles");
    println!("Scenario passed: {} runs", outcome.runs);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stc_io::scenario::parse_scenario;

    #[test]
    fn line_script_counts_runs() {
        let scenario = parse_scenario(
            "switch 0b0001\nhold 3\nexpect runs 1\n\
             glitch 0b1000 1\nexpect runs 1\n\
             switch 0b0010\nswitch 0\nswitch 0b0010\nexpect runs 3\n",
        )
        .unwrap();
        let outcome = execute(&scenario, String::new()).unwrap();
        assert_eq!(outcome.runs, 3);
        assert_eq!(outcome.tally.passed, 3);
        assert_eq!(outcome.tally.glitches, 1);
    }

    #[test]
    fn failed_expectation_names_the_line() {
        let scenario = parse_scenario("switch 1\nexpect runs 2\n").unwrap();
        let err = execute(&scenario, String::new()).err().unwrap();
        assert!(err.to_string().starts_with("line 2:"));
    }

    #[test]
    fn grid_faults_are_reported_not_fatal() {
        let scenario = parse_scenario(
            "variant grid\nfault corrupt 5\nswitch 0b01\n\
             fault stuck\nswitch 0b11\n\
             fault none\nswitch 0\nswitch 0b10\nexpect runs 3\n",
        )
        .unwrap();
        let outcome = execute(&scenario, String::new()).unwrap();
        assert_eq!(outcome.tally.failed, 1);
        assert_eq!(outcome.tally.errors, 1);
        assert_eq!(outcome.tally.passed, 1);
    }
}
