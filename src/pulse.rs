//! Conversions between pulse widths, angles, brightness and PWM compare levels.
//!
//! Everything here is integer arithmetic with truncation. The functions never fail;
//! out-of-range inputs are clamped to their domain first.
//!
//! ```
//! use servo_glow::pulse::{PulseRange, degrees_to_pulse_us, micros_to_level};
//! use servo_glow::pwm::PwmTiming;
//!
//! let range = PulseRange::DEFAULT;
//! let timing = PwmTiming::SERVO_DEFAULT;
//!
//! assert_eq!(degrees_to_pulse_us(0, range), 500);
//! assert_eq!(micros_to_level(500, timing), 625);
//! assert_eq!(micros_to_level(2_400, timing), 3_000);
//! ```

use crate::pwm::{PwmTiming, SERVO_PERIOD_US};
use crate::{Error, Result};

/// Largest servo angle.
pub const MAX_DEGREES: u16 = 180;

/// Default minimum pulse width (0°), in microseconds.
pub const SERVO_MIN_US_DEFAULT: u16 = 500;

/// Default maximum pulse width (180°), in microseconds.
pub const SERVO_MAX_US_DEFAULT: u16 = 2_400;

/// Full LED brightness.
pub const BRIGHTNESS_FULL: u8 = u8::MAX;

/// Calibrated pulse widths for 0° and 180°.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct PulseRange {
    min_us: u16,
    max_us: u16,
}

impl PulseRange {
    /// 500 µs to 2400 µs.
    pub const DEFAULT: Self = Self {
        min_us: SERVO_MIN_US_DEFAULT,
        max_us: SERVO_MAX_US_DEFAULT,
    };

    /// Create a pulse range that fits in a servo frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPulseRange`] unless `min_us < max_us`, and
    /// [`Error::PulseExceedsFrame`] if `max_us` is not shorter than the 20 ms frame.
    pub const fn new(min_us: u16, max_us: u16) -> Result<Self> {
        if min_us >= max_us {
            return Err(Error::EmptyPulseRange { min_us, max_us });
        }
        if max_us as u32 >= SERVO_PERIOD_US {
            return Err(Error::PulseExceedsFrame {
                pulse_us: max_us,
                frame_us: SERVO_PERIOD_US,
            });
        }
        Ok(Self { min_us, max_us })
    }

    /// Pulse width for 0°.
    #[must_use]
    pub const fn min_us(self) -> u16 {
        self.min_us
    }

    /// Pulse width for 180°.
    #[must_use]
    pub const fn max_us(self) -> u16 {
        self.max_us
    }

    /// Width of the range in microseconds.
    #[must_use]
    pub const fn span_us(self) -> u16 {
        self.max_us - self.min_us
    }

    /// Midpoint of the range.
    #[must_use]
    pub const fn center(self) -> u16 {
        self.min_us + self.span_us() / 2
    }

    /// Clamp `us` into the range.
    #[must_use]
    pub const fn clamp(self, us: u16) -> u16 {
        if us < self.min_us {
            self.min_us
        } else if us > self.max_us {
            self.max_us
        } else {
            us
        }
    }
}

impl Default for PulseRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Compare level for a pulse of `us` microseconds: `us * (top + 1) / 20_000`.
///
/// The counter runs `top + 1` ticks per 20 ms frame. The result is truncated, so with a
/// coarse timing two neighbouring pulse widths can share a level. Never decreases as
/// `us` grows.
#[must_use]
pub const fn micros_to_level(us: u16, timing: PwmTiming) -> u16 {
    let level = us as u32 * timing.counts_per_period() / SERVO_PERIOD_US;
    saturate_u16(level)
}

/// Brightness for an angle: `degrees * max_brightness / 180`.
///
/// 0° is dark and 180° is `max_brightness`; angles past 180° count as 180°.
#[must_use]
#[expect(clippy::cast_possible_truncation, reason = "brightness <= max_brightness")]
pub const fn degrees_to_brightness(degrees: u16, max_brightness: u8) -> u8 {
    let degrees = if degrees > MAX_DEGREES {
        MAX_DEGREES
    } else {
        degrees
    };
    let brightness = degrees as u32 * max_brightness as u32 / MAX_DEGREES as u32;
    brightness as u8
}

/// Brightness for a pulse width, interpolated across `range`.
///
/// Tracks the servo during a sweep without going through an angle. `us` is clamped
/// into `range` first.
#[must_use]
#[expect(clippy::cast_possible_truncation, reason = "offset <= span, so brightness <= max")]
pub const fn pulse_to_brightness(us: u16, range: PulseRange, max_brightness: u8) -> u8 {
    let offset = (range.clamp(us) - range.min_us) as u32;
    let brightness = offset * max_brightness as u32 / range.span_us() as u32;
    brightness as u8
}

/// Pulse width for an angle, linear across `range`. Angles past 180° count as 180°.
#[must_use]
#[expect(clippy::cast_possible_truncation, reason = "offset <= span_us")]
pub const fn degrees_to_pulse_us(degrees: u16, range: PulseRange) -> u16 {
    let degrees = if degrees > MAX_DEGREES {
        MAX_DEGREES
    } else {
        degrees
    };
    let offset = degrees as u32 * range.span_us() as u32 / MAX_DEGREES as u32;
    range.min_us + offset as u16
}

/// Compare level for an LED brightness. 255 keeps the output high for the whole period.
#[must_use]
pub const fn brightness_to_level(brightness: u8, timing: PwmTiming) -> u16 {
    let level = brightness as u32 * timing.counts_per_period() / BRIGHTNESS_FULL as u32;
    saturate_u16(level)
}

#[expect(clippy::cast_possible_truncation, reason = "checked against u16::MAX")]
const fn saturate_u16(value: u32) -> u16 {
    if value > u16::MAX as u32 {
        u16::MAX
    } else {
        value as u16
    }
}
