//! Comparison and reporting.
//!
//! Results go to any `core::fmt::Write` sink: the UART console on the board,
//! a `String` on the host. The layout is for people; the observables are the
//! index, input, hardware output, software output, verdict and both cycle
//! counts. Sink errors are dropped, a report is best effort.

use crate::HarnessError;
use crate::kernel::Kernel;
use core::fmt::{self, Write};

/// Number of indices at which the two streams differ.
///
/// Exact word equality. Indices present in only one stream count as
/// mismatches, which keeps the tally symmetric.
pub fn compare(hw: &[u32], sw: &[u32]) -> usize {
    let paired = hw.iter().zip(sw).filter(|(h, s)| h != s).count();
    paired + hw.len().abs_diff(sw.len())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Fail,
}

impl Verdict {
    pub fn from_mismatches(mismatches: usize) -> Self {
        if mismatches == 0 {
            Verdict::Success
        } else {
            Verdict::Fail
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Success => "SUCCESS",
            Verdict::Fail => "FAIL",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one hardware/software comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkRecord {
    pub kernel_name: &'static str,
    pub samples: usize,
    pub hardware_cycles: u32,
    pub software_cycles: u32,
    pub mismatches: usize,
}

impl BenchmarkRecord {
    pub fn verdict(&self) -> Verdict {
        Verdict::from_mismatches(self.mismatches)
    }
}

const RULE: &str = "==========================================";
const THIN_RULE: &str = "------------------------------------------";

/// Streams up to this many samples are shown in full.
pub const FULL_PREVIEW_LIMIT: usize = 25;

/// Rows shown for longer streams.
pub const HEAD_PREVIEW_ROWS: usize = 5;

/// Formats run results onto a text sink. Holds no state between runs.
pub struct Reporter<W> {
    sink: W,
    full_limit: usize,
    head_rows: usize,
}

impl<W: Write> Reporter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            full_limit: FULL_PREVIEW_LIMIT,
            head_rows: HEAD_PREVIEW_ROWS,
        }
    }

    /// Overrides how many table rows are printed.
    pub fn with_preview(mut self, full_limit: usize, head_rows: usize) -> Self {
        self.full_limit = full_limit;
        self.head_rows = head_rows;
        self
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_sink(self) -> W {
        self.sink
    }

    /// Table rows printed for a stream of `len` samples.
    pub fn preview_rows(&self, len: usize) -> usize {
        if len <= self.full_limit {
            len
        } else {
            self.head_rows.min(len)
        }
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.sink.write_fmt(args);
        let _ = self.sink.write_str("\r\n");
    }

    pub fn banner(&mut self, title: &str, detail: &str) {
        let _ = self.sink.write_str("\r\n");
        self.line(format_args!("{}", RULE));
        self.line(format_args!("   {}", title));
        self.line(format_args!("   {}", detail));
        self.line(format_args!("{}", RULE));
    }

    pub fn idle(&mut self) {
        self.line(format_args!("\r\n[IDLE] All switches OFF. Standing by..."));
    }

    pub fn unmapped(&mut self, raw: u32) {
        self.line(format_args!(
            "\r\n[IDLE] Switch word {:#06b} selects no kernel. Standing by...",
            raw
        ));
    }

    pub fn released(&mut self, raw: u32) {
        self.line(format_args!("[INFO] Switch released, now {:#06b}.", raw));
    }

    pub fn run_header(&mut self, kernel: &Kernel) {
        let _ = self.sink.write_str("\r\n");
        self.line(format_args!("{}", THIN_RULE));
        self.line(format_args!("[INFO] New Input Data Generated!"));
        self.line(format_args!("Running Mode -> {}", kernel.name));
    }

    /// Prints the preview table, the verdict and the cycle counts.
    pub fn report(&mut self, record: &BenchmarkRecord, input: &[u32], hw: &[u32], sw: &[u32]) {
        self.line(format_args!("[Idx]       [Input]     [HW Out]    [SW Out]"));
        let rows = self.preview_rows(input.len().min(hw.len()).min(sw.len()));
        for i in 0..rows {
            let flag = if hw[i] == sw[i] { "" } else { "  <-" };
            self.line(format_args!(
                " {:08X}    {:08X}    {:08X}    {:08X}{}",
                i, input[i], hw[i], sw[i], flag
            ));
        }

        match record.verdict() {
            Verdict::Success => self.line(format_args!("Result: SUCCESS")),
            Verdict::Fail => self.line(format_args!(
                "Result: FAIL ({} of {} samples differ)",
                record.mismatches, record.samples
            )),
        }
        self.line(format_args!(
            "Cycles - HW: {:08X}, SW: {:08X}",
            record.hardware_cycles, record.software_cycles
        ));
    }

    pub fn error(&mut self, kernel: &Kernel, err: &HarnessError) {
        self.line(format_args!("Result: ERROR [{}] {}", kernel.name, err));
    }
}
