//! Cycle sources for host runs.
//!
//! `Model` reads the behavioral model's clock, so hardware counts are exact
//! register-access cycles and software counts are near zero. `Wall` measures
//! both paths with `Instant` in nanoseconds, which puts the reference
//! engine's cost on the same footing as a real board.

use clap::ValueEnum;
use stc_core::sim::{SimClock, SimCounter};
use stc_core::timer::CycleCounter;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClockSource {
    Model,
    Wall,
}

/// Nanoseconds since the last reset, truncated to 32 bits.
pub struct HostCounter {
    origin: Instant,
}

impl HostCounter {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for HostCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleCounter for HostCounter {
    fn reset(&mut self) {
        self.origin = Instant::now();
    }

    fn read(&mut self) -> u32 {
        self.origin.elapsed().as_nanos() as u32
    }
}

pub enum HostClock<'a> {
    Model(SimCounter<'a>),
    Wall(HostCounter),
}

impl<'a> HostClock<'a> {
    pub fn new(source: ClockSource, clock: &'a SimClock) -> Self {
        match source {
            ClockSource::Model => HostClock::Model(SimCounter::new(clock)),
            ClockSource::Wall => HostClock::Wall(HostCounter::new()),
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            HostClock::Model(_) => "cycles",
            HostClock::Wall(_) => "ns",
        }
    }
}

impl CycleCounter for HostClock<'_> {
    fn reset(&mut self) {
        match self {
            HostClock::Model(c) => c.reset(),
            HostClock::Wall(c) => c.reset(),
        }
    }

    fn read(&mut self) -> u32 {
        match self {
            HostClock::Model(c) => c.read(),
            HostClock::Wall(c) => c.read(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_clock_counts_register_cycles() {
        let clock = SimClock::new();
        let mut counter = HostClock::new(ClockSource::Model, &clock);
        clock.tick(40);
        counter.reset();
        assert_eq!(counter.read(), 1);
        assert_eq!(counter.unit(), "cycles");
    }

    #[test]
    fn wall_clock_is_monotonic_after_reset() {
        let clock = SimClock::new();
        let mut counter = HostClock::new(ClockSource::Wall, &clock);
        counter.reset();
        let a = counter.read();
        let b = counter.read();
        assert!(b >= a);
        assert_eq!(counter.unit(), "ns");
    }
}
