//! The scan loop.
//!
//! Each `poll` is one iteration of the board's endless loop: sample the
//! switches through the selector, mirror the settled word on the LEDs, and
//! on a fresh selection run the kernel through the accelerator and the
//! reference, compare and report. All loop state (previous switch word,
//! stimulus seed, run count) lives in the `Harness` value.

use crate::kernel::{Catalog, Kernel};
use crate::reference::{Boundary, ReferenceEngine};
use crate::regs::{Reg, RegisterFile, RegisterIo, RegisterMap};
use crate::report::{BenchmarkRecord, FULL_PREVIEW_LIMIT, HEAD_PREVIEW_ROWS, Reporter, compare};
use crate::selector::{Selector, SettleDelay, Transition, TriggerPolicy};
use crate::stimulus::{Stimulus, StimulusSource};
use crate::stream::{DEFAULT_POLL_BUDGET, StreamingEngine};
use crate::timer::CycleCounter;
use crate::{HarnessError, SampleBuf};
use core::fmt::Write;
use stc_common::mmio::STENCIL_BASE;

/// Samples per run on the line bitstream.
pub const LINE_SAMPLES: usize = 100;

/// Frame edge of the grid bitstream.
pub const GRID_EDGE: usize = 5;

/// Zero writes appended to a grid frame to flush the line buffers.
pub const GRID_DRAIN: usize = 10;

/// Busy-wait iterations between the first switch sample and the re-sample.
pub const SETTLE_ITERATIONS: u32 = 100_000;

/// Which bitstream the harness is verifying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// 3-tap line filter over a stream of `samples`.
    Line { samples: usize },
    /// 3x3 grid filter over a `width x height` frame.
    Grid { width: usize, height: usize },
}

impl Variant {
    pub fn samples(&self) -> usize {
        match *self {
            Variant::Line { samples } => samples,
            Variant::Grid { width, height } => width * height,
        }
    }

    pub fn boundary(&self) -> Boundary {
        match *self {
            Variant::Line { .. } => Boundary::Causal,
            Variant::Grid { width, height } => Boundary::ZeroPad { width, height },
        }
    }

    pub fn catalog(&self) -> Catalog {
        match self {
            Variant::Line { .. } => Catalog::line(),
            Variant::Grid { .. } => Catalog::grid(),
        }
    }

    fn banner(&self) -> (&'static str, &'static str) {
        match self {
            Variant::Line { .. } => (
                "4-Switch Kernel Selector Demo",
                "SW[0]..SW[3] selects specific Kernel",
            ),
            Variant::Grid { .. } => (
                "3x3 Convolution Kernel Selector",
                "SW[0]/SW[1] run a frame on rising edge",
            ),
        }
    }
}

/// Everything that differs between the two bitstreams.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub variant: Variant,
    pub map: RegisterMap,
    pub engine: StreamingEngine,
    pub mask: u32,
    pub policy: TriggerPolicy,
    pub stimulus: Stimulus,
    pub settle_iterations: u32,
    pub preview_full_limit: usize,
    pub preview_head_rows: usize,
}

impl HarnessConfig {
    /// Line filter: 100 random samples, same-cycle read-back, four switches
    /// with lowest-bit priority.
    pub fn line() -> Self {
        Self {
            variant: Variant::Line {
                samples: LINE_SAMPLES,
            },
            map: RegisterMap::line(STENCIL_BASE),
            engine: StreamingEngine::immediate(),
            mask: 0xF,
            policy: TriggerPolicy::LowestBitWins,
            stimulus: Stimulus::Random,
            settle_iterations: SETTLE_ITERATIONS,
            preview_full_limit: FULL_PREVIEW_LIMIT,
            preview_head_rows: HEAD_PREVIEW_ROWS,
        }
    }

    /// Grid filter: a 5x5 ramp frame, status-gated read-back with a drain
    /// of ten writes, two edge-triggered switches.
    pub fn grid() -> Self {
        Self {
            variant: Variant::Grid {
                width: GRID_EDGE,
                height: GRID_EDGE,
            },
            map: RegisterMap::grid(STENCIL_BASE),
            engine: StreamingEngine::status_gated(DEFAULT_POLL_BUDGET, GRID_DRAIN, GRID_EDGE + 1),
            mask: 0x3,
            policy: TriggerPolicy::RisingEdge,
            stimulus: Stimulus::Ramp,
            settle_iterations: SETTLE_ITERATIONS,
            preview_full_limit: FULL_PREVIEW_LIMIT,
            preview_head_rows: HEAD_PREVIEW_ROWS,
        }
    }

    pub fn reference(&self) -> ReferenceEngine {
        ReferenceEngine::new(self.variant.boundary())
    }
}

/// What one scan iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Hold,
    Glitch,
    Idle,
    Released,
    Unmapped(u32),
    Ran(BenchmarkRecord),
}

/// Streams of the most recent completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTrace {
    pub kernel: &'static Kernel,
    pub input: SampleBuf,
    pub hardware: SampleBuf,
    pub software: SampleBuf,
}

pub struct Harness<IO, C, D, W> {
    regs: RegisterFile<IO>,
    counter: C,
    delay: D,
    reporter: Reporter<W>,
    selector: Selector,
    stimulus: StimulusSource,
    engine: StreamingEngine,
    reference: ReferenceEngine,
    catalog: Catalog,
    variant: Variant,
    runs: u32,
    trace: Option<RunTrace>,
}

impl<IO, C, D, W> Harness<IO, C, D, W>
where
    IO: RegisterIo,
    C: CycleCounter,
    D: SettleDelay,
    W: Write,
{
    pub fn new(io: IO, counter: C, delay: D, sink: W, config: HarnessConfig) -> Self {
        Self {
            regs: RegisterFile::new(io, config.map),
            counter,
            delay,
            reporter: Reporter::new(sink)
                .with_preview(config.preview_full_limit, config.preview_head_rows),
            selector: Selector::new(config.mask, config.policy),
            stimulus: StimulusSource::new(config.stimulus.clone()),
            engine: config.engine,
            reference: config.reference(),
            catalog: config.variant.catalog(),
            variant: config.variant,
            runs: 0,
            trace: None,
        }
    }

    /// Replaces the stimulus generator, e.g. to pin the seed.
    pub fn with_stimulus(mut self, stimulus: StimulusSource) -> Self {
        self.stimulus = stimulus;
        self
    }

    pub fn regs(&self) -> &RegisterFile<IO> {
        &self.regs
    }

    pub fn regs_mut(&mut self) -> &mut RegisterFile<IO> {
        &mut self.regs
    }

    pub fn reporter(&self) -> &Reporter<W> {
        &self.reporter
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Run invocations so far, including runs that ended in an error.
    pub fn runs(&self) -> u32 {
        self.runs
    }

    pub fn last_run(&self) -> Option<&RunTrace> {
        self.trace.as_ref()
    }

    pub fn banner(&mut self) {
        let (title, detail) = self.variant.banner();
        self.reporter.banner(title, detail);
    }

    /// One scan iteration.
    ///
    /// Errors are also written to the report sink before being returned.
    pub fn poll(&mut self) -> Result<Step, HarnessError> {
        let regs = &mut self.regs;
        let transition = self
            .selector
            .poll(|| regs.read(Reg::ControlInput), &mut self.delay);

        if let Some(raw) = transition.settled() {
            self.regs.write(Reg::DisplayOutput, raw);
        }

        match transition {
            Transition::Hold => Ok(Step::Hold),
            Transition::Glitch { .. } => Ok(Step::Glitch),
            Transition::Idle => {
                self.reporter.idle();
                Ok(Step::Idle)
            }
            Transition::Release { raw } => {
                self.reporter.released(raw);
                Ok(Step::Released)
            }
            Transition::Select { index, raw } => match self.catalog.lookup(index) {
                Some(kernel) => self.execute(kernel).map(Step::Ran),
                None => {
                    self.reporter.unmapped(raw);
                    Ok(Step::Unmapped(raw))
                }
            },
        }
    }

    /// Runs `kernel` once on fresh stimulus: hardware, then reference, then
    /// comparison and report.
    pub fn execute(&mut self, kernel: &'static Kernel) -> Result<BenchmarkRecord, HarnessError> {
        let entropy = self.counter.read();
        self.reporter.run_header(kernel);
        self.runs += 1;

        let input = self
            .stimulus
            .generate(self.variant.samples(), entropy)
            .inspect_err(|e| self.reporter.error(kernel, e))?;

        let hardware = self
            .engine
            .run(&mut self.regs, &mut self.counter, kernel, &input)
            .inspect_err(|e| self.reporter.error(kernel, e))?;
        let software = self
            .reference
            .run(&mut self.counter, kernel, &input)
            .inspect_err(|e| self.reporter.error(kernel, e))?;

        let record = BenchmarkRecord {
            kernel_name: kernel.name,
            samples: input.len(),
            hardware_cycles: hardware.cycles,
            software_cycles: software.cycles,
            mismatches: compare(&hardware.output, &software.output),
        };
        self.reporter
            .report(&record, &input, &hardware.output, &software.output);

        self.trace = Some(RunTrace {
            kernel,
            input,
            hardware: hardware.output,
            software: software.output,
        });
        Ok(record)
    }

    /// The board's main loop. Run errors have already been reported by
    /// `poll`; scanning simply continues.
    pub fn run_forever(&mut self) -> ! {
        self.banner();
        loop {
            let _ = self.poll();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::NoDelay;
    use crate::sim::{Geometry, SimAccelerator, SimClock, SimCounter};

    fn line_harness(
        clock: &SimClock,
    ) -> Harness<SimAccelerator<'_>, SimCounter<'_>, NoDelay, String> {
        let config = HarnessConfig::line();
        let sim = SimAccelerator::new(config.map, Geometry::Line).with_clock(clock);
        Harness::new(sim, SimCounter::new(clock), NoDelay, String::new(), config)
    }

    #[test]
    fn same_switch_word_runs_once() {
        let clock = SimClock::new();
        let mut h = line_harness(&clock);
        h.regs_mut().io_mut().set_switches(0b0001);

        let first = h.poll().unwrap();
        let second = h.poll().unwrap();
        assert!(matches!(first, Step::Ran(r) if r.mismatches == 0 && r.samples == 100));
        assert_eq!(second, Step::Hold);
        assert_eq!(h.runs(), 1);
        assert_eq!(h.regs().io().leds(), 0b0001);
    }

    #[test]
    fn idle_and_masked_bits_trigger_nothing() {
        let clock = SimClock::new();
        let config = HarnessConfig::line();
        let sim = SimAccelerator::new(config.map, Geometry::Line).with_clock(&clock);
        let mut h = Harness::new(sim, SimCounter::new(&clock), NoDelay, String::new(), config);

        assert_eq!(h.poll().unwrap(), Step::Idle);
        h.regs_mut().io_mut().set_switches(0b1_0000);
        // Bit 4 is outside the mask, so the word is still zero.
        assert_eq!(h.poll().unwrap(), Step::Hold);
        assert_eq!(h.runs(), 0);
        assert!(h.reporter().sink().contains("[IDLE] All switches OFF"));
    }

    #[test]
    fn bit_without_kernel_is_unmapped() {
        let clock = SimClock::new();
        let mut config = HarnessConfig::line();
        config.mask = 0xFF;
        let sim = SimAccelerator::new(config.map, Geometry::Line).with_clock(&clock);
        let mut h = Harness::new(sim, SimCounter::new(&clock), NoDelay, String::new(), config);

        h.regs_mut().io_mut().set_switches(0b1_0000);
        assert_eq!(h.poll().unwrap(), Step::Unmapped(0b1_0000));
        assert_eq!(h.runs(), 0);
        assert_eq!(h.regs().io().leds(), 0b1_0000);
    }

    #[test]
    fn oversized_run_length_is_an_invalid_stream() {
        let clock = SimClock::new();
        let mut config = HarnessConfig::line();
        config.variant = Variant::Line { samples: 300 };
        let sim = SimAccelerator::new(config.map, Geometry::Line).with_clock(&clock);
        let mut h = Harness::new(sim, SimCounter::new(&clock), NoDelay, String::new(), config);

        h.regs_mut().io_mut().set_switches(0b0001);
        assert_eq!(
            h.poll(),
            Err(HarnessError::InvalidStream {
                expected: 256,
                actual: 300
            })
        );
        assert!(h.last_run().is_none());
        assert_eq!(h.regs().io().writes(), 0);
        assert!(h.reporter().sink().contains("invalid stream: expected 256 samples, got 300"));
    }

    #[test]
    fn banner_names_the_variant() {
        let clock = SimClock::new();
        let mut h = line_harness(&clock);
        h.banner();
        assert!(h.reporter().sink().contains("4-Switch Kernel Selector Demo"));
    }

    #[test]
    fn grid_preset_geometry() {
        let config = HarnessConfig::grid();
        assert_eq!(config.variant.samples(), 25);
        assert_eq!(config.engine.iterations(25), 35);
        assert_eq!(config.engine.skew, Geometry::Grid { width: 5, height: 5 }.latency());
    }
}
