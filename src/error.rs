//! Crate-wide error type.
//!
//! Every variant is a configuration fault caught at start-up; the control loop itself
//! has no failure path.

use derive_more::{Display, Error};

/// Errors reported while validating PWM timing and sweep configuration.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum Error {
    /// The integer part of the clock divider is zero.
    #[display("clock divider must be at least 1")]
    ZeroDivider,

    /// The fractional part of the clock divider is not a sixteenth.
    #[display("clock divider fraction {divider_frac}/16 is out of range (0..=15)")]
    DividerFractionOutOfRange {
        /// The rejected fraction.
        divider_frac: u8,
    },

    /// The wrap (top) value is zero.
    #[display("PWM wrap value must be non-zero")]
    ZeroWrap,

    /// `min_us` is not below `max_us`.
    #[display("pulse range {min_us}..={max_us} us is empty")]
    EmptyPulseRange {
        /// Requested minimum pulse width.
        min_us: u16,
        /// Requested maximum pulse width.
        max_us: u16,
    },

    /// A pulse width does not fit inside the PWM frame.
    #[display("pulse width {pulse_us} us does not fit the {frame_us} us frame")]
    PulseExceedsFrame {
        /// The rejected pulse width.
        pulse_us: u16,
        /// The PWM frame length.
        frame_us: u32,
    },

    /// The servo channel timing does not produce a 20 ms frame at the running clock.
    #[display("PWM frame is {frame_us} us, servo needs {expected_us} us")]
    FramePeriodMismatch {
        /// Frame length produced by the timing.
        frame_us: u32,
        /// Frame length the servo expects.
        expected_us: u32,
    },

    /// A sweep step of zero would never move.
    #[display("sweep step must be non-zero")]
    ZeroSweepStep,

    /// A hold position is outside 0..=180 degrees.
    #[display("hold angle {degrees} is outside 0..=180 degrees")]
    HoldAngleOutOfRange {
        /// The rejected angle.
        degrees: u16,
    },

    /// The LED would never light.
    #[display("max brightness must be non-zero")]
    ZeroBrightness,
}

/// Result type used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
