//! Kernel catalog.
//!
//! Each bitstream supports a fixed set of kernels, selected by the position of
//! a switch bit. The line filter takes three taps, the grid filter nine
//! (row-major 3x3, index `(ky + 1) * 3 + (kx + 1)`).

/// Shape of a kernel, which also fixes the boundary rule used to check it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    /// Three taps applied causally along the stream.
    Line,
    /// Nine taps applied over a 3x3 neighbourhood of a frame.
    Square,
}

impl Rank {
    pub const fn taps(self) -> usize {
        match self {
            Rank::Line => 3,
            Rank::Square => 9,
        }
    }
}

/// A named, immutable set of signed coefficients.
#[derive(Debug, PartialEq, Eq)]
pub struct Kernel {
    pub name: &'static str,
    pub taps: &'static [i32],
}

impl Kernel {
    pub const fn new(name: &'static str, taps: &'static [i32]) -> Self {
        Self { name, taps }
    }

    /// `Line` for three taps, `Square` for nine, `None` for any other length.
    pub fn rank(&self) -> Option<Rank> {
        match self.taps.len() {
            n if n == Rank::Line.taps() => Some(Rank::Line),
            n if n == Rank::Square.taps() => Some(Rank::Square),
            _ => None,
        }
    }

    /// Tap `i` as the two's-complement word written to the weight register.
    #[inline(always)]
    pub fn weight(&self, i: usize) -> u32 {
        self.taps[i] as u32
    }

    /// Sum of all taps, wrapping like the datapath.
    pub fn sum(&self) -> u32 {
        self.taps
            .iter()
            .fold(0u32, |acc, &t| acc.wrapping_add(t as u32))
    }
}

pub static LINE_KERNELS: [Kernel; 4] = [
    Kernel::new("SW0: Smoothing (1, 2, 1)", &[1, 2, 1]),
    Kernel::new("SW1: Edge Detect (-1, 2, -1)", &[-1, 2, -1]),
    Kernel::new("SW2: Identity (0, 1, 0)", &[0, 1, 0]),
    Kernel::new("SW3: Gradient (1, 0, -1)", &[1, 0, -1]),
];

pub static GRID_KERNELS: [Kernel; 2] = [
    Kernel::new("SW0: Gaussian Blur 3x3", &[1, 2, 1, 2, 4, 2, 1, 2, 1]),
    Kernel::new("SW1: Identity 3x3", &[0, 0, 0, 0, 1, 0, 0, 0, 0]),
];

/// Kernels selectable by switch bit position.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    kernels: &'static [Kernel],
}

impl Catalog {
    pub const fn new(kernels: &'static [Kernel]) -> Self {
        Self { kernels }
    }

    pub fn line() -> Self {
        Self::new(&LINE_KERNELS)
    }

    pub fn grid() -> Self {
        Self::new(&GRID_KERNELS)
    }

    /// Kernel bound to switch bit `index`, `None` when nothing is bound.
    pub fn lookup(&self, index: usize) -> Option<&'static Kernel> {
        self.kernels.get(index)
    }

    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'static, Kernel> {
        self.kernels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_catalog_binds_four_switches() {
        let catalog = Catalog::line();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.lookup(0).unwrap().taps, &[1, 2, 1]);
        assert_eq!(catalog.lookup(3).unwrap().taps, &[1, 0, -1]);
        assert!(catalog.lookup(4).is_none());
        assert!(catalog.iter().all(|k| k.rank() == Some(Rank::Line)));
    }

    #[test]
    fn grid_catalog_is_square() {
        let catalog = Catalog::grid();
        assert!(catalog.lookup(2).is_none());
        assert!(catalog.iter().all(|k| k.rank() == Some(Rank::Square)));
        assert_eq!(catalog.lookup(0).unwrap().sum(), 16);
    }

    #[test]
    fn odd_tap_counts_have_no_rank() {
        static FIVE: [i32; 5] = [1, 1, 1, 1, 1];
        assert_eq!(Kernel::new("five", &FIVE).rank(), None);
        assert_eq!(LINE_KERNELS[0].rank(), Some(Rank::Line));
    }

    #[test]
    fn negative_taps_encode_as_twos_complement() {
        assert_eq!(LINE_KERNELS[1].weight(0), 0xFFFF_FFFF);
        assert_eq!(LINE_KERNELS[1].sum(), 0);
    }
}
