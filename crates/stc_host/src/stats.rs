//! Cycle statistics across runs.

use stc_core::HarnessError;
use stc_core::harness::Step;
use tracing::{debug, info, warn};

const BUCKETS: usize = 16;

/// Min/avg/max and a power-of-two histogram of cycle counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleStats {
    pub min: u32,
    pub max: u32,
    pub sum: u64,
    pub count: u64,
    pub buckets: [u64; BUCKETS],
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleStats {
    pub fn new() -> Self {
        Self {
            min: u32::MAX,
            max: 0,
            sum: 0,
            count: 0,
            buckets: [0; BUCKETS],
        }
    }

    /// Bucket `i` holds counts below `2^(i + 4)`; the last one is open ended.
    fn bucket(cycles: u32) -> usize {
        let bits = (u32::BITS - cycles.leading_zeros()) as usize;
        bits.saturating_sub(4).min(BUCKETS - 1)
    }

    pub fn update(&mut self, cycles: u32) {
        self.min = self.min.min(cycles);
        self.max = self.max.max(cycles);
        self.sum += u64::from(cycles);
        self.count += 1;
        self.buckets[Self::bucket(cycles)] += 1;
    }

    /// Combines two partial tallies, e.g. from parallel workers.
    pub fn merge(mut self, other: &CycleStats) -> Self {
        if other.count > 0 {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        }
        self.sum += other.sum;
        self.count += other.count;
        for (a, b) in self.buckets.iter_mut().zip(other.buckets.iter()) {
            *a += b;
        }
        self
    }

    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }

    pub fn print_report(&self, label: &str, unit: &str) {
        println!("\n{} ({})", label, unit);
        if self.count == 0 {
            println!("No samples.");
            return;
        }
        println!("Count: {}", self.count);
        println!("Min:   {}", self.min);
        println!("Avg:   {:.2}", self.avg());
        println!("Max:   {}", self.max);
        for (i, &count) in self.buckets.iter().enumerate() {
            if count > 0 {
                let upper = 1u64 << (i + 4);
                let open = if i == BUCKETS - 1 { "+" } else { "" };
                println!("[< {:8}{}]: {}", upper, open, count);
            }
        }
    }
}

/// Outcome counts of a sequence of scan steps.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    pub hardware: CycleStats,
    pub software: CycleStats,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub glitches: usize,
}

impl Tally {
    pub fn record(&mut self, step: Result<Step, HarnessError>) {
        match step {
            Ok(Step::Ran(record)) => {
                self.hardware.update(record.hardware_cycles);
                self.software.update(record.software_cycles);
                if record.mismatches == 0 {
                    self.passed += 1;
                } else {
                    self.failed += 1;
                }
                info!(
                    kernel = record.kernel_name,
                    mismatches = record.mismatches,
                    hw = record.hardware_cycles,
                    sw = record.software_cycles,
                    "run complete"
                );
            }
            Ok(Step::Glitch) => {
                self.glitches += 1;
                debug!("switch glitch filtered");
            }
            Ok(Step::Unmapped(raw)) => debug!(raw, "switch word selects no kernel"),
            Ok(_) => {}
            Err(e) => {
                self.errors += 1;
                warn!(error = %e, "run aborted");
            }
        }
    }

    pub fn print_report(&self, unit: &str) {
        println!(
            "\nRuns: {} passed, {} failed, {} aborted ({} glitches filtered)",
            self.passed, self.failed, self.errors, self.glitches
        );
        self.hardware.print_report("Hardware", unit);
        self.software.print_report("Software", unit);
    }
}
