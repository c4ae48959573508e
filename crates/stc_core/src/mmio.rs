//! Volatile register and counter access for the real board.

use crate::regs::RegisterIo;
use crate::timer::CycleCounter;
use core::sync::atomic::{Ordering, fence};

/// Direct memory-mapped register access.
///
/// Every write is preceded by a release fence and every read followed by an
/// acquire fence, so a status poll cannot be hoisted above the `data_in`
/// write that started the computation, and a `data_out` read cannot be
/// satisfied before the poll that observed "done".
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// # Safety
    ///
    /// Every address later passed to `read_word`/`write_word` must be a
    /// mapped, word-aligned device register, and no other code may access the
    /// same registers while this value is alive.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterIo for Mmio {
    #[inline(always)]
    fn read_word(&mut self, addr: usize) -> u32 {
        // Safety: guaranteed by the contract of `Mmio::new`.
        let value = unsafe { (addr as *const u32).read_volatile() };
        fence(Ordering::Acquire);
        value
    }

    #[inline(always)]
    fn write_word(&mut self, addr: usize, value: u32) {
        fence(Ordering::Release);
        // Safety: guaranteed by the contract of `Mmio::new`.
        unsafe { (addr as *mut u32).write_volatile(value) }
    }
}

/// The fabric's free-running cycle counter and its reset strobe.
pub struct MmioCounter {
    value: usize,
    reset: usize,
}

impl MmioCounter {
    /// # Safety
    ///
    /// `value` must be the address of the readable counter register and
    /// `reset` the address of its reset strobe.
    pub const unsafe fn new(value: usize, reset: usize) -> Self {
        Self { value, reset }
    }
}

impl CycleCounter for MmioCounter {
    #[inline(always)]
    fn reset(&mut self) {
        fence(Ordering::Release);
        // Safety: guaranteed by the contract of `MmioCounter::new`.
        unsafe { (self.reset as *mut u32).write_volatile(1) }
    }

    #[inline(always)]
    fn read(&mut self) -> u32 {
        // Safety: guaranteed by the contract of `MmioCounter::new`.
        let value = unsafe { (self.value as *const u32).read_volatile() };
        fence(Ordering::Acquire);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volatile_access_round_trips_through_memory() {
        let mut cells = [0u32; 4];
        let base = cells.as_mut_ptr() as usize;
        let mut io = unsafe { Mmio::new() };
        io.write_word(base + 8, 0xDEAD_BEEF);
        assert_eq!(io.read_word(base + 8), 0xDEAD_BEEF);
        assert_eq!(cells[2], 0xDEAD_BEEF);
    }

    #[test]
    fn counter_reset_strobes_one() {
        let mut cells = [41u32, 0];
        let base = cells.as_mut_ptr() as usize;
        let mut counter = unsafe { MmioCounter::new(base, base + 4) };
        assert_eq!(counter.read(), 41);
        counter.reset();
        assert_eq!(cells[1], 1);
    }
}
