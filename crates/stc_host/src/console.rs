use std::fmt;
use std::io::{self, Write};

/// Report sink that forwards the harness text to stdout.
///
/// The reporter already terminates lines with CRLF, as the board UART
/// does; the host passes that through untouched.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl fmt::Write for ConsoleSink {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        io::stdout().lock().write_all(s.as_bytes()).map_err(|_| fmt::Error)
    }
}
