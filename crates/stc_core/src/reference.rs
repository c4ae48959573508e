//! Software reference filters.
//!
//! The reference must reproduce the accelerator bit for bit, so arithmetic is
//! wrapping `u32` throughout and negative taps act as their two's-complement
//! words, exactly like the 32-bit multiply-accumulate in the fabric.

use crate::kernel::{Kernel, Rank};
use crate::timer::{CycleCounter, Stopwatch};
use crate::{HarnessError, MAX_SAMPLES, Measured, SampleBuf};

/// How samples outside the data extent are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Three-tap causal FIR along the stream:
    /// `out[i] = in[i]*k0 + in[i-1]*k1 + in[i-2]*k2`.
    /// The history registers start at zero, so only the start is padded.
    Causal,
    /// Nine-tap 3x3 neighbourhood over a `width x height` frame stored row
    /// major. Neighbours outside the frame contribute zero on all edges.
    ZeroPad { width: usize, height: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceEngine {
    pub boundary: Boundary,
}

impl Boundary {
    /// Kernel shape the boundary rule applies to.
    pub fn rank(&self) -> Rank {
        match self {
            Boundary::Causal => Rank::Line,
            Boundary::ZeroPad { .. } => Rank::Square,
        }
    }
}

impl ReferenceEngine {
    pub const fn new(boundary: Boundary) -> Self {
        Self { boundary }
    }

    /// Computes the expected output and times only the arithmetic loop.
    pub fn run<C: CycleCounter>(
        &self,
        counter: &mut C,
        kernel: &Kernel,
        input: &[u32],
    ) -> Result<Measured, HarnessError> {
        if input.len() > MAX_SAMPLES {
            return Err(HarnessError::InvalidStream {
                expected: MAX_SAMPLES,
                actual: input.len(),
            });
        }
        expect_rank(kernel, self.boundary.rank())?;
        let mut output = SampleBuf::new();

        let cycles = match self.boundary {
            Boundary::Causal => {
                let watch = Stopwatch::start(counter);
                causal(kernel.taps, input, &mut output);
                watch.stop(counter)
            }
            Boundary::ZeroPad { width, height } => {
                if input.len() != width * height {
                    return Err(HarnessError::InvalidStream {
                        expected: width * height,
                        actual: input.len(),
                    });
                }
                let watch = Stopwatch::start(counter);
                zero_pad(kernel.taps, input, width, height, &mut output);
                watch.stop(counter)
            }
        };

        Ok(Measured { output, cycles })
    }
}

fn expect_rank(kernel: &Kernel, rank: Rank) -> Result<(), HarnessError> {
    if kernel.rank() == Some(rank) {
        Ok(())
    } else {
        Err(HarnessError::KernelMismatch {
            taps: kernel.taps.len(),
            weights: rank.taps(),
        })
    }
}

#[inline(never)]
fn causal(taps: &[i32], input: &[u32], out: &mut SampleBuf) {
    let (k0, k1, k2) = (taps[0] as u32, taps[1] as u32, taps[2] as u32);
    let (mut x1, mut x2) = (0u32, 0u32);
    for &x0 in input {
        let y = x0
            .wrapping_mul(k0)
            .wrapping_add(x1.wrapping_mul(k1))
            .wrapping_add(x2.wrapping_mul(k2));
        let _ = out.push(y);
        x2 = x1;
        x1 = x0;
    }
}

#[inline(never)]
fn zero_pad(taps: &[i32], input: &[u32], width: usize, height: usize, out: &mut SampleBuf) {
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0u32;
            for ky in -1isize..=1 {
                let ny = y as isize + ky;
                if ny < 0 || ny >= height as isize {
                    continue;
                }
                for kx in -1isize..=1 {
                    let nx = x as isize + kx;
                    if nx < 0 || nx >= width as isize {
                        continue;
                    }
                    let k = taps[((ky + 1) * 3 + (kx + 1)) as usize] as u32;
                    let v = input[ny as usize * width + nx as usize];
                    acc = acc.wrapping_add(v.wrapping_mul(k));
                }
            }
            let _ = out.push(acc);
        }
    }
}
