//! Streaming engine: drives one run through the accelerator registers.
//!
//! A run clears the pipeline, loads the kernel into the weight bank in index
//! order, then writes one sample at a time to `data_in` and collects one word
//! from `data_out` per write. The line bitstream answers combinationally and
//! is read back immediately; the grid bitstream raises status bit 0 when its
//! output is ready and is polled first, up to a fixed budget.
//!
//! Pipelines with latency need extra zero writes after the stream (`drain`)
//! and deliver output `i` on write `i + skew`. The engine keeps exactly
//! `input.len()` words, so `output[i]` always belongs to `input[i]`.

use crate::kernel::Kernel;
use crate::regs::{Reg, RegisterFile, RegisterIo};
use crate::timer::{CycleCounter, Stopwatch};
use crate::{HarnessError, MAX_SAMPLES, Measured, SampleBuf};
use stc_common::mmio::STATUS_DONE;

/// Default number of status reads before a sample is declared lost.
pub const DEFAULT_POLL_BUDGET: u32 = 100_000;

/// Register handshake used for each sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Read `data_out` right after writing `data_in`; no backpressure.
    Immediate,
    /// Poll `status` bit 0 before reading `data_out`, at most `poll_budget`
    /// times per sample.
    StatusGated { poll_budget: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamingEngine {
    pub protocol: Protocol,
    /// Zero-valued writes appended after the stream to flush the pipeline.
    pub drain: usize,
    /// Leading reads discarded because of pipeline latency.
    pub skew: usize,
}

impl StreamingEngine {
    /// Same-cycle accelerator: no status handshake, no latency.
    pub const fn immediate() -> Self {
        Self {
            protocol: Protocol::Immediate,
            drain: 0,
            skew: 0,
        }
    }

    pub const fn status_gated(poll_budget: u32, drain: usize, skew: usize) -> Self {
        Self {
            protocol: Protocol::StatusGated { poll_budget },
            drain,
            skew,
        }
    }

    /// Number of `data_in` writes a run of `len` samples issues.
    pub fn iterations(&self, len: usize) -> usize {
        len + self.drain
    }

    /// Streams `input` through the accelerator and times the sample loop.
    ///
    /// The counter is reset after the clear and weight writes, so setup cost
    /// is excluded from the returned cycle count.
    pub fn run<IO, C>(
        &self,
        regs: &mut RegisterFile<IO>,
        counter: &mut C,
        kernel: &Kernel,
        input: &[u32],
    ) -> Result<Measured, HarnessError>
    where
        IO: RegisterIo,
        C: CycleCounter,
    {
        if input.len() > MAX_SAMPLES {
            return Err(HarnessError::InvalidStream {
                expected: MAX_SAMPLES,
                actual: input.len(),
            });
        }
        if self.skew > self.drain {
            return Err(HarnessError::InvalidStream {
                expected: input.len() + self.skew,
                actual: self.iterations(input.len()),
            });
        }
        let weights = regs.map().weights;
        if kernel.taps.len() != weights {
            return Err(HarnessError::KernelMismatch {
                taps: kernel.taps.len(),
                weights,
            });
        }

        regs.write(Reg::Clear, 1);
        for i in 0..kernel.taps.len() {
            regs.write(Reg::Weight(i), kernel.weight(i));
        }

        let mut output = SampleBuf::new();
        let watch = Stopwatch::start(counter);

        for j in 0..self.iterations(input.len()) {
            regs.write(Reg::DataIn, input.get(j).copied().unwrap_or(0));

            if let Protocol::StatusGated { poll_budget } = self.protocol {
                wait_done(regs, j, poll_budget)?;
            }

            let value = regs.read(Reg::DataOut);
            if j >= self.skew && output.len() < input.len() {
                let _ = output.push(value);
            }
        }

        let cycles = watch.stop(counter);
        Ok(Measured { output, cycles })
    }
}

/// Polls the status register until bit 0 is set. Returns the number of reads.
fn wait_done<IO: RegisterIo>(
    regs: &mut RegisterFile<IO>,
    sample: usize,
    budget: u32,
) -> Result<u32, HarnessError> {
    let mut polls = 0;
    while polls < budget {
        polls += 1;
        if regs.read(Reg::Status) & STATUS_DONE != 0 {
            return Ok(polls);
        }
        core::hint::spin_loop();
    }
    Err(HarnessError::AcceleratorTimeout {
        sample,
        polls: budget,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::LINE_KERNELS;
    use crate::regs::RegisterMap;

    const BASE: usize = 0x1000;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Access {
        Read(Reg),
        Write(Reg, u32),
    }

    /// Echoes `data_in + 1000` on `data_out`; status reports done after
    /// `busy_polls` reads.
    struct Echo {
        map: RegisterMap,
        log: Vec<Access>,
        last_in: u32,
        busy_polls: u32,
        pending: u32,
    }

    impl Echo {
        fn new(busy_polls: u32) -> Self {
            Self {
                map: RegisterMap::line(BASE),
                log: Vec::new(),
                last_in: 0,
                busy_polls,
                pending: 0,
            }
        }
    }

    impl RegisterIo for Echo {
        fn read_word(&mut self, addr: usize) -> u32 {
            let reg = self.map.decode(addr).unwrap();
            self.log.push(Access::Read(reg));
            match reg {
                Reg::DataOut => self.last_in + 1000,
                Reg::Status if self.pending == 0 => 1,
                Reg::Status => {
                    self.pending -= 1;
                    0
                }
                _ => 0,
            }
        }

        fn write_word(&mut self, addr: usize, value: u32) {
            let reg = self.map.decode(addr).unwrap();
            self.log.push(Access::Write(reg, value));
            if reg == Reg::DataIn {
                self.last_in = value;
                self.pending = self.busy_polls;
            }
        }
    }

    struct Ticks(u32);

    impl CycleCounter for Ticks {
        fn reset(&mut self) {
            self.0 = 0;
        }

        fn read(&mut self) -> u32 {
            self.0 += 5;
            self.0
        }
    }

    #[test]
    fn clear_and_weights_precede_samples() {
        let mut regs = RegisterFile::new(Echo::new(0), RegisterMap::line(BASE));
        let engine = StreamingEngine::immediate();
        let run = engine
            .run(&mut regs, &mut Ticks(0), &LINE_KERNELS[1], &[7, 8])
            .unwrap();

        assert_eq!(run.output.as_slice(), &[1007, 1008]);
        assert_eq!(run.cycles, 5);
        assert_eq!(
            regs.io().log,
            vec![
                Access::Write(Reg::Clear, 1),
                Access::Write(Reg::Weight(0), 0xFFFF_FFFF),
                Access::Write(Reg::Weight(1), 2),
                Access::Write(Reg::Weight(2), 0xFFFF_FFFF),
                Access::Write(Reg::DataIn, 7),
                Access::Read(Reg::DataOut),
                Access::Write(Reg::DataIn, 8),
                Access::Read(Reg::DataOut),
            ]
        );
    }

    #[test]
    fn status_gate_polls_before_reading() {
        let mut regs = RegisterFile::new(Echo::new(2), RegisterMap::line(BASE));
        let engine = StreamingEngine::status_gated(10, 0, 0);
        let run = engine
            .run(&mut regs, &mut Ticks(0), &LINE_KERNELS[0], &[3])
            .unwrap();
        assert_eq!(run.output.as_slice(), &[1003]);
        let tail: Vec<_> = regs.io().log[4..].to_vec();
        assert_eq!(
            tail,
            vec![
                Access::Write(Reg::DataIn, 3),
                Access::Read(Reg::Status),
                Access::Read(Reg::Status),
                Access::Read(Reg::Status),
                Access::Read(Reg::DataOut),
            ]
        );
    }

    #[test]
    fn exhausted_budget_is_a_timeout() {
        let mut regs = RegisterFile::new(Echo::new(50), RegisterMap::line(BASE));
        let engine = StreamingEngine::status_gated(8, 0, 0);
        let err = engine
            .run(&mut regs, &mut Ticks(0), &LINE_KERNELS[0], &[1, 2])
            .unwrap_err();
        assert_eq!(err, HarnessError::AcceleratorTimeout { sample: 0, polls: 8 });
    }

    #[test]
    fn skew_drops_leading_reads_and_drain_pads_with_zero() {
        let mut regs = RegisterFile::new(Echo::new(0), RegisterMap::line(BASE));
        let engine = StreamingEngine::status_gated(4, 2, 1);
        let run = engine
            .run(&mut regs, &mut Ticks(0), &LINE_KERNELS[0], &[10, 20, 30])
            .unwrap();
        // Reads echo writes 1..=3 (20, 30, drain 0).
        assert_eq!(run.output.as_slice(), &[1020, 1030, 1000]);
        let writes = regs
            .io()
            .log
            .iter()
            .filter(|a| matches!(a, Access::Write(Reg::DataIn, _)))
            .count();
        assert_eq!(writes, 5);
    }

    #[test]
    fn rejects_skew_beyond_drain_and_wrong_rank() {
        let mut regs = RegisterFile::new(Echo::new(0), RegisterMap::line(BASE));
        let engine = StreamingEngine::status_gated(4, 1, 2);
        assert!(matches!(
            engine.run(&mut regs, &mut Ticks(0), &LINE_KERNELS[0], &[1]),
            Err(HarnessError::InvalidStream { .. })
        ));
        let square = crate::kernel::GRID_KERNELS[0].taps;
        let kernel = Kernel::new("square", square);
        assert_eq!(
            StreamingEngine::immediate().run(&mut regs, &mut Ticks(0), &kernel, &[1]),
            Err(HarnessError::KernelMismatch { taps: 9, weights: 3 })
        );
    }
}
