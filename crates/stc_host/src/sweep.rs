//! Parallel agreement sweep.
//!
//! Every catalog kernel is run on `seeds` random streams, each case on its
//! own model, counter and buffers, and the streaming engine's output is
//! compared with the reference. Cases are independent, so they fan out over
//! the rayon pool.

use crate::model;
use crate::stats::CycleStats;
use anyhow::{Result, bail};
use rayon::prelude::*;
use stc_core::harness::HarnessConfig;
use stc_core::kernel::Kernel;
use stc_core::regs::RegisterFile;
use stc_core::report::compare;
use stc_core::sim::{Fault, SimClock, SimCounter};
use stc_core::stimulus::{Stimulus, StimulusSource};
use stc_core::HarnessError;
use stc_io::scenario::VariantKind;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseOutcome {
    pub seed: u32,
    pub mismatches: usize,
    pub hardware_cycles: u32,
}

#[derive(Debug, Clone)]
pub struct KernelSummary {
    pub name: &'static str,
    pub cases: usize,
    pub failing: Vec<u32>,
    pub mismatches: usize,
    pub hardware: CycleStats,
}

/// One kernel, one seed, one fresh model.
pub fn run_case(
    config: &HarnessConfig,
    kernel: &'static Kernel,
    seed: u32,
    fault: Fault,
) -> Result<CaseOutcome, HarnessError> {
    let clock = SimClock::new();
    let mut regs = RegisterFile::new(model::accelerator(config, &clock, fault), config.map);
    let mut counter = SimCounter::new(&clock);
    let input = StimulusSource::with_seed(Stimulus::Random, seed)
        .generate(config.variant.samples(), 0)?;

    let hw = config.engine.run(&mut regs, &mut counter, kernel, &input)?;
    let sw = config.reference().run(&mut counter, kernel, &input)?;
    Ok(CaseOutcome {
        seed,
        mismatches: compare(&hw.output, &sw.output),
        hardware_cycles: hw.cycles,
    })
}

pub fn sweep(
    variant: VariantKind,
    seeds: u32,
    base_seed: u32,
    fault: Fault,
) -> Result<Vec<KernelSummary>> {
    let config = model::config_for(variant);
    let mut summaries = Vec::new();

    for kernel in config.variant.catalog().iter() {
        let outcomes = (0..seeds)
            .into_par_iter()
            .map(|i| run_case(&config, kernel, base_seed.wrapping_add(i), fault))
            .collect::<Result<Vec<_>, HarnessError>>();

        let outcomes = match outcomes {
            Ok(o) => o,
            Err(e) => bail!("{}: {}", kernel.name, e),
        };

        let mut summary = KernelSummary {
            name: kernel.name,
            cases: outcomes.len(),
            failing: Vec::new(),
            mismatches: 0,
            hardware: CycleStats::new(),
        };
        for o in &outcomes {
            summary.hardware.update(o.hardware_cycles);
            summary.mismatches += o.mismatches;
            if o.mismatches > 0 {
                summary.failing.push(o.seed);
            }
        }
        debug!(kernel = kernel.name, failing = summary.failing.len(), "kernel swept");
        summaries.push(summary);
    }

    Ok(summaries)
}

pub fn run_sweep(variant: VariantKind, seeds: u32, base_seed: u32, fault: Fault) -> Result<()> {
    info!(?variant, seeds, base_seed, ?fault, "starting sweep");
    let start = Instant::now();
    let summaries = sweep(variant, seeds, base_seed, fault)?;
    let elapsed = start.elapsed();

    println!(
        "{:<34} {:>6} {:>8} {:>10} {:>8} {:>10} {:>8}",
        "Kernel", "Cases", "Failing", "Mismatch", "HW min", "HW avg", "HW max"
    );
    for s in &summaries {
        println!(
            "{:<34} {:>6} {:>8} {:>10} {:>8} {:>10.1} {:>8}",
            s.name,
            s.cases,
            s.failing.len(),
            s.mismatches,
            s.hardware.min,
            s.hardware.avg(),
            s.hardware.max
        );
        if let Some(first) = s.failing.first() {
            println!("    first failing seed: {:#010x}", first);
        }
    }
    println!("Time: {:.4} s", elapsed.as_secs_f64());

    if summaries.iter().any(|s| !s.failing.is_empty()) {
        bail!("hardware and reference disagree");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_model_agrees_for_every_kernel() {
        for variant in [VariantKind::Line, VariantKind::Grid] {
            let summaries = sweep(variant, 8, 1, Fault::None).unwrap();
            assert!(!summaries.is_empty());
            for s in summaries {
                assert_eq!(s.cases, 8);
                assert_eq!(s.mismatches, 0, "{}", s.name);
                assert_eq!(s.hardware.min, s.hardware.max);
            }
        }
    }

    #[test]
    fn corrupting_model_fails_every_seed() {
        let summaries = sweep(VariantKind::Line, 4, 9, Fault::Corrupt { every: 10 }).unwrap();
        for s in summaries {
            assert_eq!(s.failing.len(), 4);
            assert_eq!(s.mismatches, 4 * 10);
        }
    }

    #[test]
    fn stuck_model_aborts_the_sweep() {
        let err = sweep(VariantKind::Grid, 1, 0, Fault::Stuck).unwrap_err();
        assert!(err.to_string().contains("accelerator timeout"));
    }

    #[test]
    fn case_is_deterministic_per_seed() {
        let config = model::config_for(VariantKind::Line);
        let kernel = config.variant.catalog().lookup(0).unwrap();
        let a = run_case(&config, kernel, 42, Fault::None).unwrap();
        let b = run_case(&config, kernel, 42, Fault::None).unwrap();
        assert_eq!(a, b);
    }
}
