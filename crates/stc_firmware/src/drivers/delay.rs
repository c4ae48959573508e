use stc_core::selector::SettleDelay;

/// Switch settle delay built on the core's cycle-accurate busy loop.
pub struct BusyDelay {
    cycles: u32,
}

impl BusyDelay {
    pub fn new(cycles: u32) -> Self {
        Self { cycles }
    }
}

impl SettleDelay for BusyDelay {
    fn settle(&mut self) {
        // Safety: a pure spin on the core; no memory or CSR side effects.
        unsafe { riscv::asm::delay(self.cycles) }
    }
}
