#![no_std]
#![no_main]

use core::{convert::Infallible, panic};
use embassy_executor::Spawner;
use embassy_rp::clocks::clk_sys_freq;
use embassy_time::Duration;
use servo_glow::{
    Result,
    actuation::Actuation,
    config::SweepConfig,
    pulse::PulseRange,
    pwm::{PwmTiming, SERVO_TOP_DEFAULT},
    servo::PicoPwm,
    sweep::SweepMode,
};
use {defmt::info, defmt_rtt as _, panic_probe as _};

// Center briefly, then sweep one degree per PWM frame (3.6 s each way).
const HOLDS: [(u16, Duration); 1] = [(90, Duration::from_secs(1))];

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    let err = inner_main().await.unwrap_err();
    panic!("{err}");
}

async fn inner_main() -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    let pwm = PicoPwm::new(p.PIN_22, p.PWM_SLICE3, p.PIN_12, p.PWM_SLICE6);

    // 1-2 ms pulses: the conservative range most hobby servos accept.
    let config = SweepConfig::DEFAULT
        .with_servo_timing(PwmTiming::servo_frame(clk_sys_freq(), SERVO_TOP_DEFAULT)?)
        .with_pulse_range(PulseRange::new(1_000, 2_000)?)
        .with_holds(&HOLDS)
        .with_sweep(SweepMode::Angle { step_degrees: 1 });

    info!("Angle sweep, one degree per frame");
    let mut actuation = Actuation::new(pwm, config)?;
    actuation.run().await
}
