//! Hardware/software co-verification core for the streaming stencil
//! accelerator.
//!
//! The crate selects a kernel from a debounced switch word, streams samples
//! through the accelerator's register handshake, recomputes the same filter
//! in software, compares the two outputs and reports cycle counts for both
//! paths. Every hardware touch point is a trait (`RegisterIo`,
//! `CycleCounter`, `SettleDelay`, `core::fmt::Write`), so the same code runs
//! on the bare-metal firmware and against the behavioral model in `sim`.

#![cfg_attr(not(test), no_std)]

use core::fmt;

/// Cycle counter abstraction and wrap-aware deltas.
pub mod timer;

/// Typed register access over an injected `RegisterIo` capability.
///
/// Describes the accelerator's register map and wraps raw word accesses
/// behind named registers so the engines never compute addresses.
pub mod regs;

/// Volatile memory-mapped implementations of the register and counter
/// capabilities, used by the firmware.
pub mod mmio;

/// The fixed catalog of line (3-tap) and grid (3x3) kernels.
pub mod kernel;

/// Switch debouncing and run-trigger state machine.
///
/// Turns the raw switch word into selection transitions. Holds the previous
/// stable value explicitly so the scan loop has no hidden state.
pub mod selector;

/// Stimulus generation: counter-seeded LCG streams, ramps, fixed vectors.
pub mod stimulus;

/// Register-level handshake driver that streams one run through the
/// accelerator and measures its cycle cost.
pub mod stream;

/// Software reference filters with explicit boundary policies.
///
/// Computes the result the accelerator is expected to produce, using the
/// same wrapping 32-bit arithmetic as the datapath.
pub mod reference;

/// Output comparison, benchmark records and the text reporter.
pub mod report;

/// The scan loop tying selector, engines and reporter together.
pub mod harness;

/// Deterministic behavioral model of the accelerator and its cycle counter.
///
/// Implements the same register protocol as the RTL so the streaming engine
/// can be exercised without a board, including injected faults.
pub mod sim;

/// Stack-allocated vector with compile-time fixed capacity.
pub mod static_vec;

use static_vec::StaticVec;

/// Upper bound on the number of samples in one run.
pub const MAX_SAMPLES: usize = 256;

/// Storage for one sample stream, input or output.
pub type SampleBuf = StaticVec<u32, MAX_SAMPLES>;

/// Errors raised while executing a run.
///
/// Mismatches between hardware and software are not errors; they are counted
/// and surfaced in the verdict. Invalid switch selections are not errors
/// either; the selector reports them as idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessError {
    /// The status register never reported "done" within the poll budget.
    ///
    /// `sample` is the iteration (including drain iterations) whose result
    /// was being waited for, `polls` the number of status reads issued.
    AcceleratorTimeout { sample: usize, polls: u32 },

    /// A sample stream does not have the length the run requires.
    ///
    /// Raised when a stream exceeds `MAX_SAMPLES`, when a grid frame does not
    /// hold exactly `width * height` samples, or when the configured skew
    /// exceeds the drain iterations available to recover it.
    InvalidStream { expected: usize, actual: usize },

    /// The kernel's tap count does not match the accelerator's weight bank.
    KernelMismatch { taps: usize, weights: usize },
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarnessError::AcceleratorTimeout { sample, polls } => write!(
                f,
                "accelerator timeout on sample {} after {} status polls",
                sample, polls
            ),
            HarnessError::InvalidStream { expected, actual } => write!(
                f,
                "invalid stream: expected {} samples, got {}",
                expected, actual
            ),
            HarnessError::KernelMismatch { taps, weights } => write!(
                f,
                "kernel has {} taps but the accelerator has {} weight registers",
                taps, weights
            ),
        }
    }
}

impl core::error::Error for HarnessError {}

/// Result of one measured pass: the produced samples and the cycle cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measured {
    pub output: SampleBuf,
    pub cycles: u32,
}
