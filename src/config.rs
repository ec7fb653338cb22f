//! Start-up configuration for the servo and LED demo.
//!
//! [`SweepConfig::DEFAULT`] reproduces the classic demo: hold at 180°, 90° and 0° for
//! five seconds each, then sweep 500–2400 µs in 5 µs steps every 10 ms with the LED
//! brightness following the servo.
//!
//! ```
//! use embassy_time::Duration;
//! use servo_glow::config::SweepConfig;
//! use servo_glow::sweep::SweepMode;
//!
//! const HOLDS: [(u16, Duration); 2] = [
//!     (0, Duration::from_millis(500)),
//!     (180, Duration::from_millis(500)),
//! ];
//!
//! let config = SweepConfig::DEFAULT
//!     .with_holds(&HOLDS)
//!     .with_sweep(SweepMode::Angle { step_degrees: 2 })
//!     .validate()
//!     .expect("valid configuration");
//! assert_eq!(config.holds.len(), 2);
//! ```

use embassy_time::Duration;

use crate::pulse::{BRIGHTNESS_FULL, MAX_DEGREES, PulseRange};
use crate::pwm::PwmTiming;
use crate::sweep::{SweepMode, SweepPlan};
use crate::{Error, Result};

const HOLD_DURATION: Duration = Duration::from_millis(5_000);

/// Hold 180°, then 90°, then 0°, five seconds each.
pub const HOLDS_DEFAULT: [(u16, Duration); 3] = [
    (180, HOLD_DURATION),
    (90, HOLD_DURATION),
    (0, HOLD_DURATION),
];

/// Everything the actuation loop needs, fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    /// Servo channel divider and wrap.
    pub servo_timing: PwmTiming,
    /// LED channel divider and wrap.
    pub led_timing: PwmTiming,
    /// Pulse widths for 0° and 180°.
    pub pulse_range: PulseRange,
    /// LED brightness at 180°.
    pub max_brightness: u8,
    /// Fixed positions `(degrees, duration)` shown before the sweep starts.
    pub holds: &'static [(u16, Duration)],
    /// How the sweep advances.
    pub sweep: SweepMode,
}

impl SweepConfig {
    /// The classic demo settings.
    pub const DEFAULT: Self = Self {
        servo_timing: PwmTiming::SERVO_DEFAULT,
        led_timing: PwmTiming::LED_DEFAULT,
        pulse_range: PulseRange::DEFAULT,
        max_brightness: BRIGHTNESS_FULL,
        holds: &HOLDS_DEFAULT,
        sweep: SweepMode::DEFAULT,
    };

    /// Replace the servo timing.
    #[must_use]
    pub const fn with_servo_timing(mut self, servo_timing: PwmTiming) -> Self {
        self.servo_timing = servo_timing;
        self
    }

    /// Replace the LED timing.
    #[must_use]
    pub const fn with_led_timing(mut self, led_timing: PwmTiming) -> Self {
        self.led_timing = led_timing;
        self
    }

    /// Replace the pulse range.
    #[must_use]
    pub const fn with_pulse_range(mut self, pulse_range: PulseRange) -> Self {
        self.pulse_range = pulse_range;
        self
    }

    /// Replace the maximum LED brightness.
    #[must_use]
    pub const fn with_max_brightness(mut self, max_brightness: u8) -> Self {
        self.max_brightness = max_brightness;
        self
    }

    /// Replace the hold sequence. An empty slice goes straight to the sweep.
    #[must_use]
    pub const fn with_holds(mut self, holds: &'static [(u16, Duration)]) -> Self {
        self.holds = holds;
        self
    }

    /// Replace the sweep mode.
    #[must_use]
    pub const fn with_sweep(mut self, sweep: SweepMode) -> Self {
        self.sweep = sweep;
        self
    }

    /// Sweep samples for this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroSweepStep`] for a zero step.
    pub const fn sweep_plan(&self) -> Result<SweepPlan> {
        self.sweep
            .plan(self.pulse_range.min_us(), self.pulse_range.max_us())
    }

    /// Check everything that can be checked without hardware.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: a bad timing, zero brightness, a hold angle past
    /// 180° or a zero sweep step. The pulse range was checked when it was built.
    pub fn validate(self) -> Result<Self> {
        self.servo_timing.validate()?;
        self.led_timing.validate()?;
        if self.max_brightness == 0 {
            return Err(Error::ZeroBrightness);
        }
        if let Some(&(degrees, _)) = self.holds.iter().find(|(degrees, _)| *degrees > MAX_DEGREES)
        {
            return Err(Error::HoldAngleOutOfRange { degrees });
        }
        self.sweep_plan()?;
        Ok(self)
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
