//! Input sample generation.
//!
//! Random streams come from a 32-bit LCG whose seed is perturbed with the
//! cycle counter before every run, so two presses of the same switch see
//! different data. This is stimulus variety, not randomness anyone should
//! rely on.

use crate::{HarnessError, MAX_SAMPLES, SampleBuf};

/// Seed the board starts from after reset.
pub const DEFAULT_SEED: u32 = 0x1234_5678;

const LCG_MUL: u32 = 1_664_525;
const LCG_INC: u32 = 1_013_904_223;

/// Kind of input stream generated for each run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stimulus {
    /// Counter-seeded LCG, upper 16 bits of each state.
    Random,
    /// `sample[i] = i`.
    Ramp,
    /// Every sample equals the value.
    Constant(u32),
    /// A caller-supplied vector, truncated or zero-extended to the run length.
    Fixed(SampleBuf),
}

/// Owns the generator state carried from one run to the next.
#[derive(Debug, Clone)]
pub struct StimulusSource {
    kind: Stimulus,
    seed: u32,
}

impl StimulusSource {
    pub fn new(kind: Stimulus) -> Self {
        Self::with_seed(kind, DEFAULT_SEED)
    }

    pub fn with_seed(kind: Stimulus, seed: u32) -> Self {
        Self { kind, seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Produces a fresh stream of `len` samples. `entropy` is mixed into the
    /// seed first; the firmware passes the current cycle counter value.
    ///
    /// A length beyond `MAX_SAMPLES` is rejected before the seed moves.
    pub fn generate(&mut self, len: usize, entropy: u32) -> Result<SampleBuf, HarnessError> {
        if len > MAX_SAMPLES {
            return Err(HarnessError::InvalidStream {
                expected: MAX_SAMPLES,
                actual: len,
            });
        }
        let mut out = SampleBuf::new();
        match &self.kind {
            Stimulus::Random => {
                self.seed ^= entropy;
                for _ in 0..len {
                    self.seed = self.seed.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC);
                    let _ = out.push(self.seed >> 16);
                }
            }
            Stimulus::Ramp => {
                for i in 0..len {
                    let _ = out.push(i as u32);
                }
            }
            Stimulus::Constant(v) => {
                for _ in 0..len {
                    let _ = out.push(*v);
                }
            }
            Stimulus::Fixed(samples) => {
                for i in 0..len {
                    let _ = out.push(samples.get(i).copied().unwrap_or(0));
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_stream_follows_lcg() {
        let mut src = StimulusSource::with_seed(Stimulus::Random, 1);
        let data = src.generate(2, 0).unwrap();
        let s1 = 1u32.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC);
        let s2 = s1.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC);
        assert_eq!(data.as_slice(), &[s1 >> 16, s2 >> 16]);
        assert_eq!(src.seed(), s2);
    }

    #[test]
    fn entropy_changes_the_stream() {
        let mut a = StimulusSource::new(Stimulus::Random);
        let mut b = StimulusSource::new(Stimulus::Random);
        assert_ne!(a.generate(8, 100).unwrap(), b.generate(8, 101).unwrap());
        assert!(a.generate(100, 7).unwrap().iter().all(|&s| s <= 0xFFFF));
    }

    #[test]
    fn ramp_and_fixed_are_deterministic() {
        let mut ramp = StimulusSource::new(Stimulus::Ramp);
        assert_eq!(ramp.generate(4, 99).unwrap().as_slice(), &[0, 1, 2, 3]);

        let fixed = SampleBuf::from_slice(&[9, 8]).unwrap();
        let mut src = StimulusSource::new(Stimulus::Fixed(fixed));
        assert_eq!(src.generate(3, 0).unwrap().as_slice(), &[9, 8, 0]);
        assert_eq!(src.generate(1, 0).unwrap().as_slice(), &[9]);
    }

    #[test]
    fn oversized_stream_is_rejected_without_touching_the_seed() {
        let mut src = StimulusSource::with_seed(Stimulus::Random, 5);
        assert_eq!(
            src.generate(MAX_SAMPLES + 1, 3),
            Err(HarnessError::InvalidStream {
                expected: MAX_SAMPLES,
                actual: MAX_SAMPLES + 1
            })
        );
        assert_eq!(src.seed(), 5);
        assert_eq!(src.generate(MAX_SAMPLES, 0).unwrap().len(), MAX_SAMPLES);
    }
}
