//! Text formats for driving the co-verification harness from the host.
//!
//! Scenario files script a sequence of switch movements and injected faults
//! against the behavioral model; stimulus files supply fixed input streams.

/// Scenario scripts: one command per line.
///
/// Parsed with nom into a list of `Command`s tagged with their line numbers,
/// so a failing `expect` can point back at the script.
pub mod scenario;

/// Stimulus files: whitespace-separated sample words in decimal, hex or binary.
pub mod loader;
