//! The control loop: hold a few fixed positions, then sweep forever.
//!
//! [`Actuation`] owns the PWM peripheral and the sweep state, which only ever advances
//! against the loop's own plan. Each step computes the servo level and the LED level
//! first, writes the servo, then the LED, and only then waits. The LED therefore never
//! lags the servo by more than one write.
//!
//! ```rust,ignore
//! let pwm = PicoPwm::new(p.PIN_22, p.PWM_SLICE3, p.PIN_12, p.PWM_SLICE6);
//! let mut actuation = Actuation::new(pwm, SweepConfig::DEFAULT)?;
//! actuation.run().await
//! ```

#[cfg(feature = "defmt")]
use defmt::{debug, info};
use embassy_time::Duration;
use portable_atomic::{AtomicBool, Ordering};

use crate::Result;
use crate::config::SweepConfig;
use crate::pulse::{
    brightness_to_level, degrees_to_brightness, degrees_to_pulse_us, micros_to_level,
    pulse_to_brightness,
};
use crate::pwm::{ChannelId, PwmPeripheral, SERVO_FRAME};
use crate::sweep::{SweepMode, SweepPlan, SweepState};

/// Compare levels for one step, computed before either is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct Levels {
    /// Servo channel compare level.
    pub servo: u16,
    /// LED channel compare level.
    pub led: u16,
}

/// Drives the servo and LED channels from one loop.
pub struct Actuation<P: PwmPeripheral> {
    pwm: P,
    config: SweepConfig,
    plan: SweepPlan,
    sweep: SweepState,
}

impl<P: PwmPeripheral> Actuation<P> {
    /// Validate `config`, configure both channels and switch them on.
    ///
    /// # Errors
    ///
    /// Returns the configuration error, or the error the peripheral reports while
    /// configuring a channel. Nothing is written to the compare registers in that case.
    pub fn new(mut pwm: P, config: SweepConfig) -> Result<Self> {
        let config = config.validate()?;
        let plan = config.sweep_plan()?;

        pwm.configure_channel(ChannelId::Servo, config.servo_timing)?;
        pwm.configure_channel(ChannelId::Led, config.led_timing)?;
        pwm.set_channel_enabled(ChannelId::Servo, true);
        pwm.set_channel_enabled(ChannelId::Led, true);

        #[cfg(feature = "defmt")]
        info!(
            "actuation ready: servo {} led {} sweep {}",
            config.servo_timing, config.led_timing, config.sweep
        );

        Ok(Self {
            pwm,
            config,
            plan,
            sweep: SweepState::new(),
        })
    }

    /// The validated configuration.
    pub const fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// The sweep samples.
    pub const fn plan(&self) -> &SweepPlan {
        &self.plan
    }

    /// Where the sweep is. Only the loop advances it, always against [`plan`](Self::plan).
    pub const fn sweep(&self) -> SweepState {
        self.sweep
    }

    /// Borrow the peripheral.
    pub const fn pwm(&self) -> &P {
        &self.pwm
    }

    /// Give the peripheral back.
    pub fn into_pwm(self) -> P {
        self.pwm
    }

    /// Levels that put the servo at `degrees` with the LED lit to match.
    #[must_use]
    pub const fn levels_for_degrees(&self, degrees: u16) -> Levels {
        let config = &self.config;
        let pulse_us = degrees_to_pulse_us(degrees, config.pulse_range);
        let brightness = degrees_to_brightness(degrees, config.max_brightness);
        Levels {
            servo: micros_to_level(pulse_us, config.servo_timing),
            led: brightness_to_level(brightness, config.led_timing),
        }
    }

    /// Levels that put the servo at `pulse_us` with the LED lit to match.
    #[must_use]
    pub const fn levels_for_pulse(&self, pulse_us: u16) -> Levels {
        let config = &self.config;
        let pulse_us = config.pulse_range.clamp(pulse_us);
        let brightness = pulse_to_brightness(pulse_us, config.pulse_range, config.max_brightness);
        Levels {
            servo: micros_to_level(pulse_us, config.servo_timing),
            led: brightness_to_level(brightness, config.led_timing),
        }
    }

    /// Levels for the sweep's current position.
    #[must_use]
    pub const fn sweep_levels(&self) -> Levels {
        let value = self.sweep.value(&self.plan);
        match self.config.sweep {
            SweepMode::Pulse { .. } => self.levels_for_pulse(value),
            SweepMode::Angle { .. } => self.levels_for_degrees(value),
        }
    }

    /// Time between sweep steps.
    #[must_use]
    pub const fn tick_duration(&self) -> Duration {
        match self.config.sweep {
            SweepMode::Pulse { tick, .. } => tick,
            SweepMode::Angle { .. } => SERVO_FRAME,
        }
    }

    fn apply(&mut self, levels: Levels) {
        self.pwm.set_compare_level(ChannelId::Servo, levels.servo);
        self.pwm.set_compare_level(ChannelId::Led, levels.led);
    }

    /// Move to `degrees` and stay there for `duration`.
    pub async fn hold_at(&mut self, degrees: u16, duration: Duration) {
        let levels = self.levels_for_degrees(degrees);
        #[cfg(feature = "defmt")]
        info!("hold {}° for {} ms -> {}", degrees, duration.as_millis(), levels);
        self.apply(levels);
        self.pwm.wait(duration).await;
    }

    /// Show every configured hold position in order.
    pub async fn hold_sequence(&mut self) {
        let holds = self.config.holds;
        for &(degrees, duration) in holds {
            self.hold_at(degrees, duration).await;
        }
    }

    /// One sweep step: write the current position, wait, then advance.
    pub async fn tick(&mut self) {
        let levels = self.sweep_levels();
        #[cfg(feature = "defmt")]
        debug!(
            "tick {} {} -> {}",
            self.sweep.value(&self.plan),
            self.sweep.direction(),
            levels
        );
        self.apply(levels);
        let tick = self.tick_duration();
        self.pwm.wait(tick).await;
        self.sweep.advance(&self.plan);
    }

    /// Hold the fixed positions, then sweep forever from the start of the plan.
    pub async fn run(&mut self) -> ! {
        self.hold_sequence().await;
        self.sweep = SweepState::new();
        loop {
            self.tick().await;
        }
    }

    /// Like [`run`](Self::run), but return once `stop` is set.
    ///
    /// The flag is checked before every hold and every sweep step, so a step that has
    /// started always finishes. Returns the sweep state at the point of stopping.
    pub async fn run_until(&mut self, stop: &AtomicBool) -> SweepState {
        self.sweep = SweepState::new();
        let holds = self.config.holds;
        for &(degrees, duration) in holds {
            if stop.load(Ordering::Acquire) {
                return self.sweep;
            }
            self.hold_at(degrees, duration).await;
        }
        while !stop.load(Ordering::Acquire) {
            self.tick().await;
        }
        #[cfg(feature = "defmt")]
        info!("actuation stopped at {}", self.sweep.value(&self.plan));
        self.sweep
    }

    /// Stop driving both channels. The servo goes limp and the LED turns off.
    pub fn relax(&mut self) {
        self.pwm.set_channel_enabled(ChannelId::Servo, false);
        self.pwm.set_channel_enabled(ChannelId::Led, false);
    }

    /// Drive both channels again at their last levels.
    pub fn hold(&mut self) {
        self.pwm.set_channel_enabled(ChannelId::Servo, true);
        self.pwm.set_channel_enabled(ChannelId::Led, true);
    }
}
