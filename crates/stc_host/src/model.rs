//! Wiring the harness to the behavioral accelerator model.

use crate::clock::HostClock;
use stc_core::harness::{Harness, HarnessConfig, Variant};
use stc_core::selector::NoDelay;
use stc_core::sim::{Fault, Geometry, SimAccelerator, SimClock};
use stc_io::scenario::VariantKind;
use std::fmt::Write;

pub type ModelHarness<'a, W> = Harness<SimAccelerator<'a>, HostClock<'a>, NoDelay, W>;

pub fn config_for(variant: VariantKind) -> HarnessConfig {
    match variant {
        VariantKind::Line => HarnessConfig::line(),
        VariantKind::Grid => HarnessConfig::grid(),
    }
}

pub fn geometry(variant: &Variant) -> Geometry {
    match *variant {
        Variant::Line { .. } => Geometry::Line,
        Variant::Grid { width, height } => Geometry::Grid { width, height },
    }
}

/// A fresh model for `config`, ticking `clock`.
pub fn accelerator<'a>(
    config: &HarnessConfig,
    clock: &'a SimClock,
    fault: Fault,
) -> SimAccelerator<'a> {
    SimAccelerator::new(config.map, geometry(&config.variant))
        .with_clock(clock)
        .with_fault(fault)
}

/// Harness over the model. The settle delay is skipped: model switches
/// never bounce unless a glitch is scripted.
pub fn harness<'a, W: Write>(
    config: HarnessConfig,
    clock: &'a SimClock,
    counter: HostClock<'a>,
    fault: Fault,
    sink: W,
) -> ModelHarness<'a, W> {
    let sim = accelerator(&config, clock, fault);
    Harness::new(sim, counter, NoDelay, sink, config)
}
