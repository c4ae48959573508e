use crate::clock::{ClockSource, HostClock};
use crate::console::ConsoleSink;
use crate::model;
use crate::stats::Tally;
use anyhow::Result;
use stc_core::sim::{Fault, SimClock};
use stc_core::stimulus::{Stimulus, StimulusSource};
use stc_io::loader;
use stc_io::scenario::VariantKind;
use std::path::PathBuf;
use tracing::{info, warn};

pub struct RunOptions {
    pub variant: VariantKind,
    pub switches: Vec<u32>,
    pub fault: Fault,
    pub seed: Option<u32>,
    pub stimulus: Option<PathBuf>,
    pub clock: ClockSource,
}

/// Drives the harness with one poll per switch word and prints the reports
/// followed by a cycle summary.
pub fn run_switches(opts: RunOptions) -> Result<()> {
    let mut config = model::config_for(opts.variant);
    let samples = config.variant.samples();

    let stimulus = match &opts.stimulus {
        Some(path) => {
            let words = loader::load_stimulus(path)?;
            if words.len() != samples {
                warn!(
                    loaded = words.len(),
                    samples, "stimulus length differs from run length; truncating or zero-filling"
                );
            }
            config.stimulus = Stimulus::Fixed(words);
            StimulusSource::new(config.stimulus.clone())
        }
        None => match opts.seed {
            Some(seed) => StimulusSource::with_seed(config.stimulus.clone(), seed),
            None => StimulusSource::new(config.stimulus.clone()),
        },
    };

    let clock = SimClock::new();
    let counter = HostClock::new(opts.clock, &clock);
    let unit = counter.unit();
    let mut harness = model::harness(config, &clock, counter, opts.fault, ConsoleSink)
        .with_stimulus(stimulus);
    let mut tally = Tally::default();

    info!(variant = ?opts.variant, fault = ?opts.fault, polls = opts.switches.len(), "starting");
    harness.banner();
    for raw in opts.switches {
        harness.regs_mut().io_mut().set_switches(raw);
        tally.record(harness.poll());
    }

    tally.print_report(unit);
    Ok(())
}
