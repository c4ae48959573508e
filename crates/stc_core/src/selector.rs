//! Switch debouncing and run triggering.
//!
//! The selector samples the raw switch word once per scan iteration. When the
//! word differs from the last stable value it enters `Debouncing`, waits out
//! a fixed settle delay and samples again. Only a re-sample that still
//! differs becomes the new stable value; whether that value triggers a run is
//! decided by the `TriggerPolicy`.
//!
//! When several bits change together both policies resolve to the lowest
//! numbered bit, so one transition never triggers more than one run.

/// Busy-wait used between the first sample and the re-sample.
pub trait SettleDelay {
    fn settle(&mut self);
}

impl<D: SettleDelay + ?Sized> SettleDelay for &mut D {
    fn settle(&mut self) {
        (**self).settle();
    }
}

/// Settle delay that returns immediately, for models and tests where the
/// switch word never bounces.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

impl SettleDelay for NoDelay {
    fn settle(&mut self) {}
}

/// How a new stable switch word maps to a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPolicy {
    /// Any change to a different nonzero word triggers one run of the kernel
    /// bound to its lowest set bit (bit0 > bit1 > bit2 > bit3).
    LowestBitWins,
    /// Each bit is an independent level-to-edge trigger: a 0 -> 1 transition
    /// runs that bit's kernel. Releasing a bit triggers nothing.
    RisingEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    Idle,
    Debouncing { candidate: u32 },
    Stable(u32),
}

/// Outcome of one selector poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The switch word equals the last stable value.
    Hold,
    /// The word changed but settled back to the last stable value.
    Glitch { raw: u32 },
    /// All switches off.
    Idle,
    /// A new nonzero word with no rising bit (`RisingEdge` only).
    Release { raw: u32 },
    /// Run the kernel bound to switch bit `index`.
    Select { index: usize, raw: u32 },
}

impl Transition {
    /// The re-sampled switch word, if the poll went through a settle.
    pub fn settled(&self) -> Option<u32> {
        match *self {
            Transition::Hold => None,
            Transition::Idle => Some(0),
            Transition::Glitch { raw }
            | Transition::Release { raw }
            | Transition::Select { raw, .. } => Some(raw),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Selector {
    state: SelectorState,
    last: Option<u32>,
    mask: u32,
    policy: TriggerPolicy,
}

impl Selector {
    /// A selector in the power-on state: no previous stable value, so the
    /// first sample always counts as a change.
    pub fn new(mask: u32, policy: TriggerPolicy) -> Self {
        Self {
            state: SelectorState::Idle,
            last: None,
            mask,
            policy,
        }
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    /// Last stable switch word, `None` before the first settle.
    pub fn previous(&self) -> Option<u32> {
        self.last
    }

    /// Forgets the previous stable value.
    pub fn reset_history(&mut self) {
        self.state = SelectorState::Idle;
        self.last = None;
    }

    /// One complete scan step: sample, and on change settle and re-sample.
    pub fn poll<F, D>(&mut self, mut sample: F, delay: &mut D) -> Transition
    where
        F: FnMut() -> u32,
        D: SettleDelay,
    {
        if !self.observe(sample()) {
            return Transition::Hold;
        }
        delay.settle();
        self.settle(sample())
    }

    /// Feeds the first sample of a scan step. Returns `true` when the word
    /// differs from the last stable value and a settle must follow.
    pub fn observe(&mut self, raw: u32) -> bool {
        let raw = raw & self.mask;
        if self.last == Some(raw) {
            return false;
        }
        self.state = SelectorState::Debouncing { candidate: raw };
        true
    }

    /// Feeds the re-sample taken after the settle delay.
    pub fn settle(&mut self, raw: u32) -> Transition {
        let raw = raw & self.mask;
        let previous = self.last;

        if previous == Some(raw) {
            self.state = Self::resting(previous);
            return Transition::Glitch { raw };
        }

        self.last = Some(raw);
        if raw == 0 {
            self.state = SelectorState::Idle;
            return Transition::Idle;
        }
        self.state = SelectorState::Stable(raw);

        match self.policy {
            TriggerPolicy::LowestBitWins => Transition::Select {
                index: raw.trailing_zeros() as usize,
                raw,
            },
            TriggerPolicy::RisingEdge => {
                let rising = raw & !previous.unwrap_or(0);
                if rising == 0 {
                    Transition::Release { raw }
                } else {
                    Transition::Select {
                        index: rising.trailing_zeros() as usize,
                        raw,
                    }
                }
            }
        }
    }

    fn resting(last: Option<u32>) -> SelectorState {
        match last {
            Some(v) if v != 0 => SelectorState::Stable(v),
            _ => SelectorState::Idle,
        }
    }
}
