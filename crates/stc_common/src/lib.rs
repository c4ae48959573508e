//! Board-level definitions shared by the firmware, the host tools and the
//! harness core.
//!
//! This crate holds the physical memory map of the co-verification board:
//! where the stencil accelerator's registers live, where the free-running
//! cycle counter sits, and the UART used for the text report. Nothing here
//! performs I/O; the constants are consumed by `stc_core` register maps and
//! by the firmware drivers.

#![no_std]

// Memory-mapped I/O address space of the co-verification board.
//
// The accelerator occupies one 4 KiB page starting at `STENCIL_BASE`. The two
// bitstreams (line filter and 3x3 grid filter) share the first three
// registers but place the weight bank, status, switch and LED registers at
// different offsets because the grid build carries nine weights.
pub mod mmio {
    /// Base address of the stencil accelerator register page.
    ///
    /// Must match the address decoder of the FPGA top level. Every register
    /// offset below is relative to this base.
    pub const STENCIL_BASE: usize = 0x8001_0000;

    /// Offset of the sample input register (write-only).
    ///
    /// Writing a sample pushes it into the accelerator pipeline.
    pub const DATA_IN: usize = 0x00;

    /// Offset of the sample output register (read-only).
    pub const DATA_OUT: usize = 0x04;

    /// Offset of the pipeline clear register. Writing 1 flushes all history.
    pub const CLEAR: usize = 0x08;

    /// Offset of the first weight register. Weights are consecutive words.
    pub const WEIGHT_BASE: usize = 0x0C;

    /// Register offsets specific to the 3-tap line filter bitstream.
    pub mod line {
        /// Number of weight registers.
        pub const WEIGHTS: usize = 3;
        /// Slide switch input (read-only, low nibble).
        pub const SWITCHES: usize = 0x18;
        /// LED mirror of the switch word (write-only).
        pub const LEDS: usize = 0x1C;
        /// Output-ready status word. The line bitstream produces its output
        /// combinationally, so the harness never polls it.
        pub const STATUS: usize = 0x20;
    }

    /// Register offsets specific to the 3x3 grid filter bitstream.
    pub mod grid {
        /// Number of weight registers.
        pub const WEIGHTS: usize = 9;
        /// Output-ready status word, bit 0 set when `DATA_OUT` holds a
        /// fresh result.
        pub const STATUS: usize = 0x30;
        /// Slide switch input (read-only, low two bits).
        pub const SWITCHES: usize = 0x34;
        /// LED mirror of the switch word (write-only).
        pub const LEDS: usize = 0x38;
    }

    /// Bit 0 of the status register: output ready.
    pub const STATUS_DONE: u32 = 1 << 0;

    /// Free-running 32-bit cycle counter (read-only).
    ///
    /// Increments once per fabric clock and wraps at 2^32.
    pub const CYCLE_COUNTER: usize = 0x8002_0000;

    /// Cycle counter reset strobe. Writing 1 clears the counter to zero.
    pub const CYCLE_COUNTER_RESET: usize = 0x8002_0004;

    /// UART transmit holding register.
    ///
    /// Writing a byte transmits it on the debug serial port.
    pub const UART0: usize = 0x1000_0000;
}
