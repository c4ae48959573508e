//! Behavioral model of the stencil accelerator.
//!
//! `SimAccelerator` answers the same register protocol as the RTL: it decodes
//! addresses through a `RegisterMap`, computes outputs from its weight bank
//! and sample history, raises status bit 0 after a configurable number of
//! polls, and exposes the slide switches and LEDs. Every register access
//! advances a shared `SimClock`, which `SimCounter` reads, so measured
//! hardware cycles are deterministic.
//!
//! The grid model mirrors a line-buffer implementation: output pixel `p` is
//! available once sample `p + width + 1` has been written, i.e. the pipeline
//! latency is `width + 1` writes.

use crate::regs::{MAX_WEIGHTS, Reg, RegisterIo, RegisterMap};
use crate::timer::CycleCounter;
use crate::SampleBuf;
use core::cell::Cell;
use stc_common::mmio::STATUS_DONE;

/// Free-running model clock shared by the accelerator and its counter.
#[derive(Debug, Default)]
pub struct SimClock {
    now: Cell<u32>,
}

impl SimClock {
    pub const fn new() -> Self {
        Self { now: Cell::new(0) }
    }

    pub fn now(&self) -> u32 {
        self.now.get()
    }

    pub fn tick(&self, cycles: u32) {
        self.now.set(self.now.get().wrapping_add(cycles));
    }

    /// Sets the clock, e.g. close to 2^32 to exercise wraparound.
    pub fn set(&self, value: u32) {
        self.now.set(value);
    }
}

/// Cycle counter backed by a `SimClock`. Reset clears the clock to zero like
/// the fabric counter's reset strobe; each read costs one cycle.
pub struct SimCounter<'a> {
    clock: &'a SimClock,
}

impl<'a> SimCounter<'a> {
    pub fn new(clock: &'a SimClock) -> Self {
        Self { clock }
    }
}

impl CycleCounter for SimCounter<'_> {
    fn reset(&mut self) {
        self.clock.set(0);
    }

    fn read(&mut self) -> u32 {
        self.clock.tick(1);
        self.clock.now()
    }
}

/// Datapath the model implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    /// Three-tap causal FIR, output valid on the same cycle.
    Line,
    /// 3x3 window over a `width x height` frame with zero-padded edges.
    Grid { width: usize, height: usize },
}

impl Geometry {
    /// Writes between a sample entering and its output leaving.
    pub fn latency(&self) -> usize {
        match *self {
            Geometry::Line => 0,
            Geometry::Grid { width, .. } => width + 1,
        }
    }
}

/// Injected misbehaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    None,
    /// Status bit 0 never rises.
    Stuck,
    /// Bit 0 of every `every`-th output (1-based) is flipped.
    Corrupt { every: usize },
}

pub struct SimAccelerator<'a> {
    map: RegisterMap,
    geometry: Geometry,
    clock: Option<&'a SimClock>,
    fault: Fault,
    weights: [u32; MAX_WEIGHTS],
    history: SampleBuf,
    x1: u32,
    x2: u32,
    writes: usize,
    out: u32,
    ready_after: u32,
    busy: u32,
    compute_cycles: u32,
    switches: u32,
    glitch: Option<(u32, u32)>,
    leds: u32,
    clears: usize,
    status_reads: usize,
}

impl<'a> SimAccelerator<'a> {
    pub fn new(map: RegisterMap, geometry: Geometry) -> Self {
        let compute_cycles = match geometry {
            Geometry::Line => 1,
            Geometry::Grid { .. } => 3,
        };
        Self {
            map,
            geometry,
            clock: None,
            fault: Fault::None,
            weights: [0; MAX_WEIGHTS],
            history: SampleBuf::new(),
            x1: 0,
            x2: 0,
            writes: 0,
            out: 0,
            ready_after: 0,
            busy: 0,
            compute_cycles,
            switches: 0,
            glitch: None,
            leds: 0,
            clears: 0,
            status_reads: 0,
        }
    }

    /// Attaches the clock advanced by register traffic.
    pub fn with_clock(mut self, clock: &'a SimClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Number of status polls answered "busy" after each sample write.
    pub fn with_ready_after(mut self, polls: u32) -> Self {
        self.ready_after = polls;
        self
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = fault;
        self
    }

    pub fn set_fault(&mut self, fault: Fault) {
        self.fault = fault;
    }

    pub fn set_switches(&mut self, raw: u32) {
        self.switches = raw;
    }

    /// Shows `raw` on the switch register for the next `reads` reads, then
    /// falls back to the steady value.
    pub fn glitch(&mut self, raw: u32, reads: u32) {
        self.glitch = Some((raw, reads));
    }

    pub fn leds(&self) -> u32 {
        self.leds
    }

    pub fn weights(&self) -> &[u32] {
        &self.weights[..self.map.weights]
    }

    /// Times the pipeline was cleared.
    pub fn clears(&self) -> usize {
        self.clears
    }

    /// Sample writes since the last clear.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn status_reads(&self) -> usize {
        self.status_reads
    }

    fn tick(&self, cycles: u32) {
        if let Some(clock) = self.clock {
            clock.tick(cycles);
        }
    }

    fn clear(&mut self) {
        self.history.clear();
        self.x1 = 0;
        self.x2 = 0;
        self.writes = 0;
        self.out = 0;
        self.busy = 0;
        self.clears += 1;
    }

    fn push_sample(&mut self, x0: u32) {
        let index = self.writes;
        self.writes += 1;
        self.busy = self.ready_after;
        self.tick(self.compute_cycles);

        let produced = match self.geometry {
            Geometry::Line => {
                let y = x0
                    .wrapping_mul(self.weights[0])
                    .wrapping_add(self.x1.wrapping_mul(self.weights[1]))
                    .wrapping_add(self.x2.wrapping_mul(self.weights[2]));
                self.x2 = self.x1;
                self.x1 = x0;
                Some((index, y))
            }
            Geometry::Grid { width, height } => {
                let _ = self.history.push(x0);
                let latency = width + 1;
                match index.checked_sub(latency) {
                    Some(p) if p < width * height => Some((p, self.window(p, width, height))),
                    _ => None,
                }
            }
        };

        self.out = match produced {
            Some((p, y)) => match self.fault {
                Fault::Corrupt { every } if every > 0 && (p + 1) % every == 0 => y ^ 1,
                _ => y,
            },
            None => 0,
        };
    }

    fn window(&self, p: usize, width: usize, height: usize) -> u32 {
        let (x, y) = ((p % width) as isize, (p / width) as isize);
        let mut acc = 0u32;
        for ky in -1isize..=1 {
            for kx in -1isize..=1 {
                let (nx, ny) = (x + kx, y + ky);
                if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                    continue;
                }
                let n = ny as usize * width + nx as usize;
                let sample = self.history.get(n).copied().unwrap_or(0);
                let w = self.weights[((ky + 1) * 3 + (kx + 1)) as usize];
                acc = acc.wrapping_add(sample.wrapping_mul(w));
            }
        }
        acc
    }

    fn status(&mut self) -> u32 {
        self.status_reads += 1;
        if self.fault == Fault::Stuck {
            return 0;
        }
        if self.busy > 0 {
            self.busy -= 1;
            0
        } else {
            STATUS_DONE
        }
    }

    fn control_input(&mut self) -> u32 {
        match self.glitch {
            Some((raw, reads)) if reads > 0 => {
                self.glitch = Some((raw, reads - 1));
                raw
            }
            _ => {
                self.glitch = None;
                self.switches
            }
        }
    }
}

impl RegisterIo for SimAccelerator<'_> {
    fn read_word(&mut self, addr: usize) -> u32 {
        self.tick(1);
        match self.map.decode(addr) {
            Some(Reg::DataOut) => self.out,
            Some(Reg::Status) => self.status(),
            Some(Reg::ControlInput) => self.control_input(),
            Some(Reg::Weight(i)) => self.weights[i],
            _ => 0,
        }
    }

    fn write_word(&mut self, addr: usize, value: u32) {
        self.tick(1);
        match self.map.decode(addr) {
            Some(Reg::DataIn) => self.push_sample(value),
            Some(Reg::Clear) if value & 1 == 1 => self.clear(),
            Some(Reg::Weight(i)) => self.weights[i] = value,
            Some(Reg::DisplayOutput) => self.leds = value,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs::RegisterFile;
    use stc_common::mmio::STENCIL_BASE;

    fn line_regs<'a>() -> RegisterFile<SimAccelerator<'a>> {
        let map = RegisterMap::line(STENCIL_BASE);
        RegisterFile::new(SimAccelerator::new(map, Geometry::Line), map)
    }

    #[test]
    fn line_model_is_a_causal_fir() {
        let mut regs = line_regs();
        for (i, w) in [1u32, 2, 1].into_iter().enumerate() {
            regs.write(Reg::Weight(i), w);
        }
        let mut out = Vec::new();
        for x in [3, 5, 7] {
            regs.write(Reg::DataIn, x);
            out.push(regs.read(Reg::DataOut));
        }
        assert_eq!(out, vec![3, 11, 20]);
    }

    #[test]
    fn clear_drops_history_but_keeps_weights() {
        let mut regs = line_regs();
        regs.write(Reg::Weight(2), 1);
        regs.write(Reg::DataIn, 9);
        regs.write(Reg::Clear, 1);
        regs.write(Reg::DataIn, 4);
        assert_eq!(regs.read(Reg::DataOut), 0);
        assert_eq!(regs.io().weights(), &[0, 0, 1]);
        assert_eq!(regs.io().clears(), 1);
    }

    #[test]
    fn status_rises_after_configured_polls() {
        let map = RegisterMap::grid(STENCIL_BASE);
        let sim = SimAccelerator::new(map, Geometry::Grid { width: 2, height: 2 })
            .with_ready_after(2);
        let mut regs = RegisterFile::new(sim, map);
        regs.write(Reg::DataIn, 1);
        let polls: Vec<_> = (0..3).map(|_| regs.read(Reg::Status)).collect();
        assert_eq!(polls, vec![0, 0, 1]);
    }

    #[test]
    fn stuck_fault_never_signals_done() {
        let map = RegisterMap::grid(STENCIL_BASE);
        let sim = SimAccelerator::new(map, Geometry::Grid { width: 2, height: 2 })
            .with_fault(Fault::Stuck);
        let mut regs = RegisterFile::new(sim, map);
        regs.write(Reg::DataIn, 1);
        assert!((0..100).all(|_| regs.read(Reg::Status) == 0));
    }

    #[test]
    fn glitch_expires_after_its_reads() {
        let mut regs = line_regs();
        regs.io_mut().set_switches(0b0001);
        regs.io_mut().glitch(0b1000, 1);
        assert_eq!(regs.read(Reg::ControlInput), 0b1000);
        assert_eq!(regs.read(Reg::ControlInput), 0b0001);
        regs.write(Reg::DisplayOutput, 0b0001);
        assert_eq!(regs.io().leds(), 0b0001);
    }

    #[test]
    fn register_traffic_advances_the_clock() {
        let clock = SimClock::new();
        let map = RegisterMap::line(STENCIL_BASE);
        let sim = SimAccelerator::new(map, Geometry::Line).with_clock(&clock);
        let mut regs = RegisterFile::new(sim, map);
        let mut counter = SimCounter::new(&clock);
        counter.reset();
        regs.write(Reg::DataIn, 1);
        regs.read(Reg::DataOut);
        // write (1) + compute (1) + read (1) + counter read (1)
        assert_eq!(counter.read(), 4);
    }
}
