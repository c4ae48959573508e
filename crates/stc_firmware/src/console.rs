//! UART console for the harness report stream.
//!
//! The transmit register of the board UART sits at `UART0`. Reports already
//! end their lines with CRLF; bare LFs from `println!` are expanded so the
//! serial terminal never sees a lone line feed.

use core::fmt;
use stc_common::mmio::UART0;

/// Byte-wide transmit-only UART.
pub struct Uart {
    tx: *mut u8,
    last: u8,
}

impl Uart {
    /// # Safety
    ///
    /// Only one `Uart` may be alive at a time; the firmware creates it once
    /// in `kmain` and hands it to the harness.
    pub const unsafe fn new() -> Self {
        Self {
            tx: UART0 as *mut u8,
            last: 0,
        }
    }

    #[inline(always)]
    fn put(&mut self, byte: u8) {
        // Safety: `tx` is the UART0 transmit register, valid for byte writes.
        unsafe { core::ptr::write_volatile(self.tx, byte) };
        self.last = byte;
    }
}

impl fmt::Write for Uart {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.bytes() {
            if c == b'\n' && self.last != b'\r' {
                self.put(b'\r');
            }
            self.put(c);
        }
        Ok(())
    }
}

/// Used by `println!` before the harness takes ownership of the console.
#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    use fmt::Write;
    // Safety: transmit-only and short-lived; a second writer can at worst
    // interleave bytes on the wire.
    let mut uart = unsafe { Uart::new() };
    let _ = uart.write_fmt(args);
}

#[macro_export]
macro_rules! println {
    ($($arg:tt)*) => ({
        $crate::console::_print(format_args!($($arg)*));
        $crate::console::_print(format_args!("\n"));
    });
}
pub use println;
