//! PWM channel timing and the peripheral seam the actuation loop writes through.
//!
//! A [`PwmTiming`] is fixed for the whole run: the clock divider slows `clk_sys` down to
//! the counting rate, and the counter wraps after `top + 1` ticks. Only the compare
//! level changes while the loop runs.

use embassy_time::Duration;

use crate::{Error, Result};

/// Servo frame length (50 Hz).
pub const SERVO_PERIOD_US: u32 = 20_000;

/// One servo frame as a [`Duration`].
pub const SERVO_FRAME: Duration = Duration::from_micros(SERVO_PERIOD_US as u64);

// 20_000 ticks per frame at 1 tick/µs.
const SERVO_TOP_1US: u16 = 19_999;

/// Servo wrap value: 25 000 counts per frame, 1.25 counts per µs.
pub const SERVO_TOP_DEFAULT: u16 = 24_999;

/// `clk_sys` after `embassy_rp::init` on a Pico 1 (RP2040).
pub const CLK_SYS_PICO1_HZ: u32 = 125_000_000;

/// `clk_sys` after `embassy_rp::init` on a Pico 2 (RP2350).
pub const CLK_SYS_PICO2_HZ: u32 = 150_000_000;

/// Default `clk_sys` of the board being built for. Host builds use the Pico 1 clock.
#[cfg(not(feature = "pico2"))]
pub const CLK_SYS_DEFAULT_HZ: u32 = CLK_SYS_PICO1_HZ;

/// Default `clk_sys` of the board being built for.
#[cfg(feature = "pico2")]
pub const CLK_SYS_DEFAULT_HZ: u32 = CLK_SYS_PICO2_HZ;

// 255 + 15/16
const MAX_DIVIDER_X16: u64 = 0xFFF;

/// The two logical outputs driven by the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum ChannelId {
    /// Servo signal line.
    Servo,
    /// Status LED.
    Led,
}

/// Clock divider and wrap value for one PWM channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct PwmTiming {
    /// Integer part of the clock divider (1..=255).
    pub divider_int: u8,
    /// Fractional part of the clock divider, in sixteenths (0..=15).
    pub divider_frac: u8,
    /// Counter value at which the timer wraps.
    pub top: u16,
}

impl PwmTiming {
    /// Servo timing for [`CLK_SYS_DEFAULT_HZ`]: 1.25 MHz counter, 25 000 counts per
    /// 20 ms frame. The divider is 100 on a Pico 1 and 120 on a Pico 2.
    pub const SERVO_DEFAULT: Self =
        match Self::servo_frame(CLK_SYS_DEFAULT_HZ, SERVO_TOP_DEFAULT) {
            Ok(timing) => timing,
            Err(_) => panic!("default clock cannot produce a servo frame"),
        };

    /// LED timing: 4096 counts at full clock speed (~30 kHz, no visible flicker).
    pub const LED_DEFAULT: Self = Self::new(1, 0, 4_095);

    /// Create a timing without validating it. See [`PwmTiming::validate`].
    #[must_use]
    pub const fn new(divider_int: u8, divider_frac: u8, top: u16) -> Self {
        Self {
            divider_int,
            divider_frac,
            top,
        }
    }

    /// Servo timing that wraps after `top + 1` counts every 20 ms at `clk_sys_hz`.
    ///
    /// The divider is rounded to the nearest sixteenth, so clocks that are not a round
    /// number still land close to the 20 ms frame.
    ///
    /// # Errors
    ///
    /// [`Error::ZeroDivider`] if the clock is too slow for `top`, [`Error::ZeroWrap`] for
    /// a zero `top`, and [`Error::FramePeriodMismatch`] if even the largest divider
    /// cannot stretch the frame to 20 ms.
    #[expect(clippy::cast_possible_truncation, reason = "divider clamped to 12 bits")]
    pub const fn servo_frame(clk_sys_hz: u32, top: u16) -> Result<Self> {
        let counts_per_second = (top as u64 + 1) * (1_000_000 / SERVO_PERIOD_US as u64);
        let mut div_x16 = (clk_sys_hz as u64 * 16 + counts_per_second / 2) / counts_per_second;
        if div_x16 > MAX_DIVIDER_X16 {
            div_x16 = MAX_DIVIDER_X16;
        }
        let timing = Self::new((div_x16 >> 4) as u8, (div_x16 & 0xF) as u8, top);
        match timing.validate() {
            Ok(timing) => timing.check_servo_frame(clk_sys_hz),
            Err(err) => Err(err),
        }
    }

    /// Servo timing whose counter ticks once per microsecond at `clk_sys_hz`.
    ///
    /// # Errors
    ///
    /// As [`PwmTiming::servo_frame`].
    pub const fn servo_microsecond_ticks(clk_sys_hz: u32) -> Result<Self> {
        Self::servo_frame(clk_sys_hz, SERVO_TOP_1US)
    }

    /// Reject timings the hardware cannot run or the mapper cannot divide by.
    ///
    /// # Errors
    ///
    /// [`Error::ZeroDivider`], [`Error::DividerFractionOutOfRange`] or [`Error::ZeroWrap`].
    pub const fn validate(self) -> Result<Self> {
        if self.divider_int == 0 {
            return Err(Error::ZeroDivider);
        }
        if self.divider_frac > 15 {
            return Err(Error::DividerFractionOutOfRange {
                divider_frac: self.divider_frac,
            });
        }
        if self.top == 0 {
            return Err(Error::ZeroWrap);
        }
        Ok(self)
    }

    /// Counter ticks per PWM period (`top + 1`).
    #[must_use]
    pub const fn counts_per_period(self) -> u32 {
        self.top as u32 + 1
    }

    /// Divider in sixteenths, the way the hardware register holds it.
    #[must_use]
    pub const fn divider_x16(self) -> u16 {
        ((self.divider_int as u16) << 4) | (self.divider_frac as u16 & 0xF)
    }

    /// Length of one PWM period in microseconds at `clk_sys_hz`.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "checked against u32::MAX")]
    pub const fn period_us(self, clk_sys_hz: u32) -> u32 {
        if clk_sys_hz == 0 {
            return u32::MAX;
        }
        let ticks_x16 = self.counts_per_period() as u64 * self.divider_x16() as u64;
        let period_us = ticks_x16 * 1_000_000 / (clk_sys_hz as u64 * 16);
        if period_us > u32::MAX as u64 {
            u32::MAX
        } else {
            period_us as u32
        }
    }

    /// Check that this timing produces a servo frame (20 ms ±1%) at `clk_sys_hz`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FramePeriodMismatch`] when the frame is off.
    pub const fn check_servo_frame(self, clk_sys_hz: u32) -> Result<Self> {
        let frame_us = self.period_us(clk_sys_hz);
        let tolerance = SERVO_PERIOD_US / 100;
        if frame_us.abs_diff(SERVO_PERIOD_US) > tolerance {
            return Err(Error::FramePeriodMismatch {
                frame_us,
                expected_us: SERVO_PERIOD_US,
            });
        }
        Ok(self)
    }
}

/// The PWM peripheral the actuation loop drives.
///
/// Implemented by [`PicoPwm`](crate::servo::PicoPwm) on hardware and by recording
/// mocks in tests.
pub trait PwmPeripheral {
    /// One-time channel setup. Calling it again with the same timing changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the timing is unusable on this hardware.
    fn configure_channel(&mut self, channel: ChannelId, timing: PwmTiming) -> Result<()>;

    /// Turn the channel's output on or off. The compare level is kept.
    fn set_channel_enabled(&mut self, channel: ChannelId, enabled: bool);

    /// Set the compare level. Takes effect at the next period boundary.
    fn set_compare_level(&mut self, channel: ChannelId, level: u16);

    /// Suspend the calling loop for `duration`.
    async fn wait(&mut self, duration: Duration);
}
