//! Register map and typed register access.
//!
//! Addresses are configuration: a `RegisterMap` names every register the
//! harness touches, and `RegisterFile` resolves `Reg` names against it before
//! handing raw word accesses to a `RegisterIo` implementation. The volatile
//! implementation lives in `mmio`, the behavioral model in `sim`.

use stc_common::mmio;

/// Maximum number of weight registers any bitstream exposes.
pub const MAX_WEIGHTS: usize = 9;

/// Raw 32-bit register access.
///
/// Implementations must perform every access (no caching, no elision) and
/// keep program order between writes and subsequent polling reads. No error
/// is reported at this layer; an accelerator that never responds shows up as
/// a status poll that exhausts its budget.
pub trait RegisterIo {
    fn read_word(&mut self, addr: usize) -> u32;
    fn write_word(&mut self, addr: usize, value: u32);
}

impl<T: RegisterIo + ?Sized> RegisterIo for &mut T {
    fn read_word(&mut self, addr: usize) -> u32 {
        (**self).read_word(addr)
    }

    fn write_word(&mut self, addr: usize, value: u32) {
        (**self).write_word(addr, value)
    }
}

/// Named accelerator registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    /// Sample input; a write starts processing of one sample.
    DataIn,
    /// Sample output.
    DataOut,
    /// Pipeline clear; write 1.
    Clear,
    /// Kernel coefficient `i`.
    Weight(usize),
    /// Status word, bit 0 = output ready.
    Status,
    /// Raw switch word.
    ControlInput,
    /// LED mirror of the switch word.
    DisplayOutput,
}

/// Absolute addresses of every accelerator register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterMap {
    pub data_in: usize,
    pub data_out: usize,
    pub clear: usize,
    pub weight_base: usize,
    pub weights: usize,
    pub status: usize,
    pub control_input: usize,
    pub display_output: usize,
}

impl RegisterMap {
    /// Register layout of the 3-tap line filter bitstream.
    pub const fn line(base: usize) -> Self {
        Self {
            data_in: base + mmio::DATA_IN,
            data_out: base + mmio::DATA_OUT,
            clear: base + mmio::CLEAR,
            weight_base: base + mmio::WEIGHT_BASE,
            weights: mmio::line::WEIGHTS,
            status: base + mmio::line::STATUS,
            control_input: base + mmio::line::SWITCHES,
            display_output: base + mmio::line::LEDS,
        }
    }

    /// Register layout of the 3x3 grid filter bitstream.
    pub const fn grid(base: usize) -> Self {
        Self {
            data_in: base + mmio::DATA_IN,
            data_out: base + mmio::DATA_OUT,
            clear: base + mmio::CLEAR,
            weight_base: base + mmio::WEIGHT_BASE,
            weights: mmio::grid::WEIGHTS,
            status: base + mmio::grid::STATUS,
            control_input: base + mmio::grid::SWITCHES,
            display_output: base + mmio::grid::LEDS,
        }
    }

    /// Resolves a register name to its address.
    ///
    /// Returns `None` for a weight index beyond the bank.
    pub fn addr(&self, reg: Reg) -> Option<usize> {
        Some(match reg {
            Reg::DataIn => self.data_in,
            Reg::DataOut => self.data_out,
            Reg::Clear => self.clear,
            Reg::Weight(i) if i < self.weights => self.weight_base + 4 * i,
            Reg::Weight(_) => return None,
            Reg::Status => self.status,
            Reg::ControlInput => self.control_input,
            Reg::DisplayOutput => self.display_output,
        })
    }

    /// Inverse of `addr`, used by register-level models.
    pub fn decode(&self, addr: usize) -> Option<Reg> {
        if addr >= self.weight_base && addr < self.weight_base + 4 * self.weights {
            let offset = addr - self.weight_base;
            return (offset % 4 == 0).then_some(Reg::Weight(offset / 4));
        }
        [
            Reg::DataIn,
            Reg::DataOut,
            Reg::Clear,
            Reg::Status,
            Reg::ControlInput,
            Reg::DisplayOutput,
        ]
        .into_iter()
        .find(|&reg| self.addr(reg) == Some(addr))
    }
}

/// Typed accessors over a `RegisterIo` capability.
pub struct RegisterFile<IO> {
    io: IO,
    map: RegisterMap,
}

impl<IO: RegisterIo> RegisterFile<IO> {
    pub fn new(io: IO, map: RegisterMap) -> Self {
        Self { io, map }
    }

    pub fn map(&self) -> &RegisterMap {
        &self.map
    }

    pub fn io(&self) -> &IO {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    #[inline(always)]
    pub fn read(&mut self, reg: Reg) -> u32 {
        match self.map.addr(reg) {
            Some(addr) => self.io.read_word(addr),
            None => {
                debug_assert!(false, "read of unmapped register {:?}", reg);
                0
            }
        }
    }

    #[inline(always)]
    pub fn write(&mut self, reg: Reg, value: u32) {
        match self.map.addr(reg) {
            Some(addr) => self.io.write_word(addr, value),
            None => debug_assert!(false, "write of unmapped register {:?}", reg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stc_common::mmio::STENCIL_BASE;

    #[derive(Default)]
    struct Recorder {
        writes: Vec<(usize, u32)>,
    }

    impl RegisterIo for Recorder {
        fn read_word(&mut self, addr: usize) -> u32 {
            addr as u32
        }

        fn write_word(&mut self, addr: usize, value: u32) {
            self.writes.push((addr, value));
        }
    }

    #[test]
    fn line_map_matches_board_layout() {
        let map = RegisterMap::line(STENCIL_BASE);
        assert_eq!(map.addr(Reg::DataIn), Some(0x8001_0000));
        assert_eq!(map.addr(Reg::Weight(2)), Some(0x8001_0014));
        assert_eq!(map.addr(Reg::Weight(3)), None);
        assert_eq!(map.addr(Reg::ControlInput), Some(0x8001_0018));
        assert_eq!(map.addr(Reg::DisplayOutput), Some(0x8001_001C));
    }

    #[test]
    fn decode_inverts_addr() {
        for map in [RegisterMap::line(STENCIL_BASE), RegisterMap::grid(STENCIL_BASE)] {
            for i in 0..map.weights {
                let addr = map.addr(Reg::Weight(i)).unwrap();
                assert_eq!(map.decode(addr), Some(Reg::Weight(i)));
            }
            let status = map.addr(Reg::Status).unwrap();
            assert_eq!(map.decode(status), Some(Reg::Status));
            assert_eq!(map.decode(map.weight_base + 2), None);
        }
    }

    #[test]
    fn register_file_routes_by_name() {
        let mut regs = RegisterFile::new(Recorder::default(), RegisterMap::grid(STENCIL_BASE));
        regs.write(Reg::Weight(8), 7);
        regs.write(Reg::Clear, 1);
        assert_eq!(regs.read(Reg::Status), 0x8001_0030);
        assert_eq!(regs.io().writes, vec![(0x8001_002C, 7), (0x8001_0008, 1)]);
    }
}
