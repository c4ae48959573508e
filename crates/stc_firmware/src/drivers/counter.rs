//! Cycle counters.
//!
//! The default build reads the fabric counter at `CYCLE_COUNTER`, which the
//! harness clears through its reset strobe. With the `mcycle` feature the
//! core's own `mcycle` CSR is used instead; that CSR is not cleared, so
//! `reset` latches a baseline and `read` returns cycles since it.

#[cfg(not(feature = "mcycle"))]
use stc_common::mmio::{CYCLE_COUNTER, CYCLE_COUNTER_RESET};
#[cfg(not(feature = "mcycle"))]
use stc_core::mmio::MmioCounter;
use stc_core::timer::CycleCounter;

#[cfg(feature = "mcycle")]
pub struct McycleCounter {
    baseline: u32,
}

#[cfg(feature = "mcycle")]
impl CycleCounter for McycleCounter {
    #[inline(always)]
    fn reset(&mut self) {
        self.baseline = riscv::register::mcycle::read() as u32;
    }

    #[inline(always)]
    fn read(&mut self) -> u32 {
        (riscv::register::mcycle::read() as u32).wrapping_sub(self.baseline)
    }
}

/// The counter selected for this build.
#[cfg(feature = "mcycle")]
pub fn board_counter() -> impl CycleCounter {
    McycleCounter { baseline: 0 }
}

/// The counter selected for this build.
#[cfg(not(feature = "mcycle"))]
pub fn board_counter() -> impl CycleCounter {
    // Safety: both addresses are the board's counter registers, and the
    // harness is the only code that touches them.
    unsafe { MmioCounter::new(CYCLE_COUNTER, CYCLE_COUNTER_RESET) }
}
