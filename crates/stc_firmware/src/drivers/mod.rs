//! Board peripherals the harness needs beyond the stencil registers.
//!
//! The register window itself is driven through `stc_core::mmio::Mmio`;
//! this module supplies the cycle source and the settle delay.

pub mod counter;
pub mod delay;
