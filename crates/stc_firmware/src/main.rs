//! Bare-metal co-verification firmware.
//!
//! Boots, prints a banner, then scans the slide switches forever. Each new
//! selection streams fresh stimulus through the stencil accelerator, reruns
//! the same kernel in software and reports the comparison and cycle counts
//! on the UART. Build with `--features grid` for the 3x3 bitstream.

#![no_std]
#![no_main]

use panic_halt as _;
use stc_core::harness::{Harness, HarnessConfig};
use stc_core::mmio::Mmio;

mod console;
mod drivers;

#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
core::arch::global_asm!(include_str!("entry.S"));

#[cfg(not(feature = "grid"))]
fn board_config() -> HarnessConfig {
    HarnessConfig::line()
}

#[cfg(feature = "grid")]
fn board_config() -> HarnessConfig {
    HarnessConfig::grid()
}

#[unsafe(no_mangle)]
pub extern "C" fn kmain() -> ! {
    console::println!("[BOOT] Stencil harness online");

    let config = board_config();
    let delay = drivers::delay::BusyDelay::new(config.settle_iterations);
    let counter = drivers::counter::board_counter();
    // Safety: the stencil window is mapped at `STENCIL_BASE` and this is the
    // only code touching it or the UART from here on.
    let (io, uart) = unsafe { (Mmio::new(), console::Uart::new()) };

    let mut harness = Harness::new(io, counter, delay, uart, config);
    harness.run_forever()
}
