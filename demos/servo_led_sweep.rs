#![no_std]
#![no_main]

use core::{convert::Infallible, panic};
use embassy_executor::Spawner;
use embassy_rp::clocks::clk_sys_freq;
use servo_glow::{
    Result,
    actuation::Actuation,
    config::SweepConfig,
    pwm::{PwmTiming, SERVO_TOP_DEFAULT},
    servo::PicoPwm,
};
use {defmt::info, defmt_rtt as _, panic_probe as _};

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    let err = inner_main().await.unwrap_err();
    panic!("{err}");
}

async fn inner_main() -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    // Servo on GPIO 22 (22 → (22/2) % 8 = slice 3), LED on GPIO 12 (slice 6)
    let pwm = PicoPwm::new(p.PIN_22, p.PWM_SLICE3, p.PIN_12, p.PWM_SLICE6);

    // Divider follows the running clock: 100 on a Pico 1, 120 on a Pico 2.
    let servo_timing = PwmTiming::servo_frame(clk_sys_freq(), SERVO_TOP_DEFAULT)?;
    let config = SweepConfig::DEFAULT.with_servo_timing(servo_timing);

    info!("Hold 180°, 90°, 0°, then sweep 500-2400 µs in 5 µs steps");
    let mut actuation = Actuation::new(pwm, config)?;
    actuation.run().await
}
