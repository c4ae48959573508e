//! Cycle counter abstraction.
//!
//! The board exposes a free-running 32-bit counter with a reset strobe. The
//! harness resets it before each measured region and subtracts two captures.
//! Deltas use wrapping subtraction: one wrap at 2^32 is absorbed, more than
//! one silently yields a short count. Runs are far shorter than a counter
//! period, so this is accepted.

/// A monotonic cycle counter with an explicit reset.
pub trait CycleCounter {
    /// Clears the counter, or latches a new baseline if the source cannot be
    /// written.
    fn reset(&mut self);

    /// Returns the current counter value.
    fn read(&mut self) -> u32;
}

impl<C: CycleCounter + ?Sized> CycleCounter for &mut C {
    fn reset(&mut self) {
        (**self).reset();
    }

    fn read(&mut self) -> u32 {
        (**self).read()
    }
}

/// Cycles between two captures, wrap-aware for a single wrap.
#[inline(always)]
pub fn elapsed(start: u32, end: u32) -> u32 {
    end.wrapping_sub(start)
}

/// Brackets a measured region: reset, capture start, later capture end.
pub struct Stopwatch {
    start: u32,
}

impl Stopwatch {
    /// Resets the counter and captures the start value.
    #[inline(always)]
    pub fn start<C: CycleCounter>(counter: &mut C) -> Self {
        counter.reset();
        Self {
            start: counter.read(),
        }
    }

    /// Captures the end value and returns the elapsed cycles.
    #[inline(always)]
    pub fn stop<C: CycleCounter>(self, counter: &mut C) -> u32 {
        elapsed(self.start, counter.read())
    }
}
