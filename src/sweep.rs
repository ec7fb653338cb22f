//! The back-and-forth sweep.
//!
//! A [`SweepPlan`] lists the samples between two endpoints; a [`SweepState`] walks that
//! list up and down forever. The last step up lands exactly on the end value even when
//! the step does not divide the span, and the way down visits the same samples in
//! reverse order.

use embassy_time::Duration;

use crate::pulse::MAX_DEGREES;
use crate::{Error, Result};

/// How the sweep advances. Picked once in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum SweepMode {
    /// Step the pulse width by `step_us`, waiting `tick` between samples.
    Pulse {
        /// Pulse width increment per tick.
        step_us: u16,
        /// Delay between ticks.
        tick: Duration,
    },
    /// Step the angle by `step_degrees` once per PWM frame, as a wrap interrupt would.
    Angle {
        /// Angle increment per frame.
        step_degrees: u16,
    },
}

impl SweepMode {
    /// 5 µs every 10 ms.
    pub const DEFAULT: Self = Self::Pulse {
        step_us: 5,
        tick: Duration::from_millis(10),
    };

    /// Plan the samples for this mode. Pulse mode sweeps `min_us..=max_us`; angle mode
    /// sweeps `0..=180`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroSweepStep`] for a zero step.
    pub const fn plan(self, min_us: u16, max_us: u16) -> Result<SweepPlan> {
        match self {
            Self::Pulse { step_us, .. } => SweepPlan::new(min_us, max_us, step_us),
            Self::Angle { step_degrees } => SweepPlan::new(0, MAX_DEGREES, step_degrees),
        }
    }
}

impl Default for SweepMode {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Which way the next step goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum Direction {
    /// Towards the end value.
    Ascending,
    /// Towards the start value.
    Descending,
}

/// Samples from `start` to `end` in steps of `step`, the last one clamped to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct SweepPlan {
    start: u16,
    end: u16,
    step: u16,
    last_index: u16,
}

impl SweepPlan {
    /// Plan a sweep.
    ///
    /// # Errors
    ///
    /// [`Error::ZeroSweepStep`] if `step` is zero, [`Error::EmptyPulseRange`] unless
    /// `start < end`.
    pub const fn new(start: u16, end: u16, step: u16) -> Result<Self> {
        if step == 0 {
            return Err(Error::ZeroSweepStep);
        }
        if start >= end {
            return Err(Error::EmptyPulseRange {
                min_us: start,
                max_us: end,
            });
        }
        let last_index = (end - start).div_ceil(step);
        Ok(Self {
            start,
            end,
            step,
            last_index,
        })
    }

    /// First sample.
    #[must_use]
    pub const fn start(&self) -> u16 {
        self.start
    }

    /// Final sample of the way up.
    #[must_use]
    pub const fn end(&self) -> u16 {
        self.end
    }

    /// Distance between neighbouring samples (except possibly the last pair).
    #[must_use]
    pub const fn step(&self) -> u16 {
        self.step
    }

    /// Index of the `end` sample. There are `last_index + 1` samples.
    #[must_use]
    pub const fn last_index(&self) -> u16 {
        self.last_index
    }

    /// Sample at `index`, clamped to `end`.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "value < end")]
    pub const fn sample(&self, index: u16) -> u16 {
        let value = self.start as u32 + index as u32 * self.step as u32;
        if value >= self.end as u32 {
            self.end
        } else {
            value as u16
        }
    }
}

/// Where the sweep is and which way it is heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct SweepState {
    direction: Direction,
    index: u16,
}

impl SweepState {
    /// At the start sample, heading up.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            direction: Direction::Ascending,
            index: 0,
        }
    }

    /// Direction of the next step.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Position in the plan.
    #[must_use]
    pub const fn index(&self) -> u16 {
        self.index
    }

    /// Current sample value.
    #[must_use]
    pub const fn value(&self, plan: &SweepPlan) -> u16 {
        plan.sample(self.index)
    }

    /// Move one step. Reaching `end` turns the sweep down; reaching `start` turns it up.
    ///
    /// A state belongs to the plan it is advanced with. An index past that plan's end
    /// is pulled back onto its last sample first, so the result stays inside the plan.
    pub const fn advance(&mut self, plan: &SweepPlan) {
        if self.index > plan.last_index {
            self.index = plan.last_index;
        }
        match self.direction {
            Direction::Ascending => {
                if self.index < plan.last_index {
                    self.index += 1;
                }
                if self.index == plan.last_index {
                    self.direction = Direction::Descending;
                }
            }
            Direction::Descending => {
                if self.index > 0 {
                    self.index -= 1;
                }
                if self.index == 0 {
                    self.direction = Direction::Ascending;
                }
            }
        }
    }
}

impl Default for SweepState {
    fn default() -> Self {
        Self::new()
    }
}
