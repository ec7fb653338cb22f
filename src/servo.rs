//! The Pico PWM peripheral driving one servo and one LED.
//!
//! Each output takes a whole [PWM slice](crate#glossary), so the servo and the LED must
//! sit on pins of different slices. On a Pico 1 the slice is `(pin / 2) % 8`. The Pico 2
//! repeats that for GPIO 0..=31 and maps GPIO 32..=47 to slices 8..=11
//! (`8 + (pin / 2) % 4`). Pins are matched to their slice and channel at compile time:
//! passing a pin with the wrong slice does not build.
//!
//! ```rust,ignore
//! let p = embassy_rp::init(Default::default());
//! // GPIO 22 -> slice 3 channel A, GPIO 12 -> slice 6 channel A
//! let pwm = PicoPwm::new(p.PIN_22, p.PWM_SLICE3, p.PIN_12, p.PWM_SLICE6);
//! ```

use defmt::info;
use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::pwm::{Config, Pwm};
use embassy_rp::{Peri, PeripheralType};
use embassy_time::{Duration, Timer};
use fixed::FixedU16;
use fixed::types::extra::U4;

use crate::Result;
use crate::pwm::{ChannelId, PwmPeripheral, PwmTiming};

/// A GPIO pin that can carry output of PWM slice `S`.
pub trait PwmPin<S: PeripheralType>: PeripheralType {
    /// Even pins are channel A, odd pins channel B.
    const IS_CHANNEL_A: bool;

    /// Build the embassy PWM driver for this pin on `slice`, starting from `config`.
    fn new_pwm<'d>(slice: Peri<'d, S>, pin: Peri<'d, Self>, config: Config) -> Pwm<'d>;
}

macro_rules! pwm_pin_map {
    ($pin:ident, $slice:ident, A) => {
        impl PwmPin<embassy_rp::peripherals::$slice> for embassy_rp::peripherals::$pin {
            const IS_CHANNEL_A: bool = true;
            fn new_pwm<'d>(
                slice: Peri<'d, embassy_rp::peripherals::$slice>,
                pin: Peri<'d, Self>,
                config: Config,
            ) -> Pwm<'d> {
                Pwm::new_output_a(slice, pin, config)
            }
        }
    };
    ($pin:ident, $slice:ident, B) => {
        impl PwmPin<embassy_rp::peripherals::$slice> for embassy_rp::peripherals::$pin {
            const IS_CHANNEL_A: bool = false;
            fn new_pwm<'d>(
                slice: Peri<'d, embassy_rp::peripherals::$slice>,
                pin: Peri<'d, Self>,
                config: Config,
            ) -> Pwm<'d> {
                Pwm::new_output_b(slice, pin, config)
            }
        }
    };
}

pwm_pin_map!(PIN_0, PWM_SLICE0, A);
pwm_pin_map!(PIN_1, PWM_SLICE0, B);
pwm_pin_map!(PIN_2, PWM_SLICE1, A);
pwm_pin_map!(PIN_3, PWM_SLICE1, B);
pwm_pin_map!(PIN_4, PWM_SLICE2, A);
pwm_pin_map!(PIN_5, PWM_SLICE2, B);
pwm_pin_map!(PIN_6, PWM_SLICE3, A);
pwm_pin_map!(PIN_7, PWM_SLICE3, B);
pwm_pin_map!(PIN_8, PWM_SLICE4, A);
pwm_pin_map!(PIN_9, PWM_SLICE4, B);
pwm_pin_map!(PIN_10, PWM_SLICE5, A);
pwm_pin_map!(PIN_11, PWM_SLICE5, B);
pwm_pin_map!(PIN_12, PWM_SLICE6, A);
pwm_pin_map!(PIN_13, PWM_SLICE6, B);
pwm_pin_map!(PIN_14, PWM_SLICE7, A);
pwm_pin_map!(PIN_15, PWM_SLICE7, B);
pwm_pin_map!(PIN_16, PWM_SLICE0, A);
pwm_pin_map!(PIN_17, PWM_SLICE0, B);
pwm_pin_map!(PIN_18, PWM_SLICE1, A);
pwm_pin_map!(PIN_19, PWM_SLICE1, B);
pwm_pin_map!(PIN_20, PWM_SLICE2, A);
pwm_pin_map!(PIN_21, PWM_SLICE2, B);
pwm_pin_map!(PIN_22, PWM_SLICE3, A);
pwm_pin_map!(PIN_23, PWM_SLICE3, B);
pwm_pin_map!(PIN_24, PWM_SLICE4, A);
pwm_pin_map!(PIN_25, PWM_SLICE4, B);
pwm_pin_map!(PIN_26, PWM_SLICE5, A);
pwm_pin_map!(PIN_27, PWM_SLICE5, B);
pwm_pin_map!(PIN_28, PWM_SLICE6, A);
pwm_pin_map!(PIN_29, PWM_SLICE6, B);

#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_30, PWM_SLICE7, A);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_31, PWM_SLICE7, B);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_32, PWM_SLICE8, A);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_33, PWM_SLICE8, B);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_34, PWM_SLICE9, A);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_35, PWM_SLICE9, B);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_36, PWM_SLICE10, A);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_37, PWM_SLICE10, B);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_38, PWM_SLICE11, A);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_39, PWM_SLICE11, B);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_40, PWM_SLICE8, A);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_41, PWM_SLICE8, B);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_42, PWM_SLICE9, A);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_43, PWM_SLICE9, B);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_44, PWM_SLICE10, A);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_45, PWM_SLICE10, B);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_46, PWM_SLICE11, A);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_47, PWM_SLICE11, B);

#[derive(Debug, Clone, Copy)]
enum SliceChannel {
    A,
    B,
}

/// One PWM slice driving one pin.
struct PwmOutput<'d> {
    pwm: Pwm<'d>,
    cfg: Config, // kept so compare updates do not reset the divider
    channel: SliceChannel,
}

impl<'d> PwmOutput<'d> {
    fn new<P, S>(pin: Peri<'d, P>, slice: Peri<'d, S>) -> Self
    where
        P: PwmPin<S>,
        S: PeripheralType,
    {
        let channel = if P::IS_CHANNEL_A {
            SliceChannel::A
        } else {
            SliceChannel::B
        };
        // Claimed with the output off, so the pin stays low until configured and enabled.
        let mut cfg = Config::default();
        cfg.enable = false;
        Self {
            pwm: P::new_pwm(slice, pin, cfg.clone()),
            cfg,
            channel,
        }
    }

    fn configure(&mut self, timing: PwmTiming) {
        self.cfg.top = timing.top;
        self.cfg.divider = FixedU16::<U4>::from_bits(timing.divider_x16());
        self.cfg.phase_correct = false; // edge-aligned: one count per divided tick
        self.pwm.set_config(&self.cfg);
    }

    fn set_level(&mut self, level: u16) {
        match self.channel {
            SliceChannel::A => self.cfg.compare_a = level,
            SliceChannel::B => self.cfg.compare_b = level,
        }
        self.pwm.set_config(&self.cfg);
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.cfg.enable = enabled;
        self.pwm.set_config(&self.cfg);
    }
}

/// Servo and LED outputs on the Pico's PWM peripheral.
pub struct PicoPwm<'d> {
    servo: PwmOutput<'d>,
    led: PwmOutput<'d>,
}

impl<'d> PicoPwm<'d> {
    /// Claim one slice for the servo pin and one for the LED pin. Both start disabled.
    ///
    /// See the [module-level example](self) for usage.
    pub fn new<SP, SS, LP, LS>(
        servo_pin: Peri<'d, SP>,
        servo_slice: Peri<'d, SS>,
        led_pin: Peri<'d, LP>,
        led_slice: Peri<'d, LS>,
    ) -> Self
    where
        SP: PwmPin<SS>,
        SS: PeripheralType,
        LP: PwmPin<LS>,
        LS: PeripheralType,
    {
        Self {
            servo: PwmOutput::new(servo_pin, servo_slice),
            led: PwmOutput::new(led_pin, led_slice),
        }
    }

    fn output(&mut self, channel: ChannelId) -> &mut PwmOutput<'d> {
        match channel {
            ChannelId::Servo => &mut self.servo,
            ChannelId::Led => &mut self.led,
        }
    }
}

impl PwmPeripheral for PicoPwm<'_> {
    fn configure_channel(&mut self, channel: ChannelId, timing: PwmTiming) -> Result<()> {
        let timing = timing.validate()?;
        let clk = clk_sys_freq();
        if channel == ChannelId::Servo {
            timing.check_servo_frame(clk)?;
        }
        self.output(channel).configure(timing);
        info!(
            "{} clk={}Hz div={}.{}/16 top={} period={}us",
            channel,
            clk,
            timing.divider_int,
            timing.divider_frac,
            timing.top,
            timing.period_us(clk)
        );
        Ok(())
    }

    fn set_channel_enabled(&mut self, channel: ChannelId, enabled: bool) {
        self.output(channel).set_enabled(enabled);
    }

    fn set_compare_level(&mut self, channel: ChannelId, level: u16) {
        // NOTE: only the compare register moves; divider and top stay as configured.
        self.output(channel).set_level(level);
    }

    async fn wait(&mut self, duration: Duration) {
        Timer::after(duration).await;
    }
}
