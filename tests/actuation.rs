#![allow(missing_docs)]
//! Host-level tests for the actuation loop over a recording PWM mock.

use core::cell::RefCell;

use embassy_futures::block_on;
use embassy_time::Duration;
use portable_atomic::{AtomicBool, Ordering};
use servo_glow::actuation::{Actuation, Levels};
use servo_glow::config::SweepConfig;
use servo_glow::pwm::{ChannelId, PwmPeripheral, PwmTiming, SERVO_FRAME};
use servo_glow::sweep::{Direction, SweepMode, SweepState};
use servo_glow::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Configure(ChannelId, PwmTiming),
    Enable(ChannelId, bool),
    Level(ChannelId, u16),
    Wait(Duration),
}

/// Records every call; optionally raises `stop` after a number of waits.
struct RecordingPwm<'a> {
    log: &'a RefCell<Vec<Event>>,
    stop: Option<(&'a AtomicBool, usize)>,
    waits: usize,
    reject: Option<Error>,
}

impl<'a> RecordingPwm<'a> {
    fn new(log: &'a RefCell<Vec<Event>>) -> Self {
        Self {
            log,
            stop: None,
            waits: 0,
            reject: None,
        }
    }

    fn stop_after(mut self, stop: &'a AtomicBool, waits: usize) -> Self {
        self.stop = Some((stop, waits));
        self
    }

    fn rejecting(mut self, err: Error) -> Self {
        self.reject = Some(err);
        self
    }
}

impl PwmPeripheral for RecordingPwm<'_> {
    fn configure_channel(&mut self, channel: ChannelId, timing: PwmTiming) -> Result<()> {
        if let Some(err) = self.reject {
            return Err(err);
        }
        self.log.borrow_mut().push(Event::Configure(channel, timing));
        Ok(())
    }

    fn set_channel_enabled(&mut self, channel: ChannelId, enabled: bool) {
        self.log.borrow_mut().push(Event::Enable(channel, enabled));
    }

    fn set_compare_level(&mut self, channel: ChannelId, level: u16) {
        self.log.borrow_mut().push(Event::Level(channel, level));
    }

    async fn wait(&mut self, duration: Duration) {
        self.log.borrow_mut().push(Event::Wait(duration));
        self.waits += 1;
        if let Some((stop, after)) = self.stop {
            if self.waits >= after {
                stop.store(true, Ordering::Release);
            }
        }
    }
}

const INIT_EVENTS: usize = 4;
const HOLD: Duration = Duration::from_millis(5_000);
const TICK: Duration = Duration::from_millis(10);

fn step(servo: u16, led: u16, wait: Duration) -> [Event; 3] {
    [
        Event::Level(ChannelId::Servo, servo),
        Event::Level(ChannelId::Led, led),
        Event::Wait(wait),
    ]
}

fn after_init(log: &RefCell<Vec<Event>>) -> Vec<Event> {
    log.borrow().iter().skip(INIT_EVENTS).copied().collect()
}

#[test]
fn new_configures_then_enables_both_channels() {
    let log = RefCell::new(Vec::new());
    let _actuation =
        Actuation::new(RecordingPwm::new(&log), SweepConfig::DEFAULT).expect("valid config");

    assert_eq!(
        *log.borrow(),
        [
            Event::Configure(ChannelId::Servo, PwmTiming::SERVO_DEFAULT),
            Event::Configure(ChannelId::Led, PwmTiming::LED_DEFAULT),
            Event::Enable(ChannelId::Servo, true),
            Event::Enable(ChannelId::Led, true),
        ]
    );
}

#[test]
fn new_rejects_bad_config_before_touching_hardware() {
    let cases = [
        (
            SweepConfig::DEFAULT.with_servo_timing(PwmTiming::new(0, 0, 24_999)),
            Error::ZeroDivider,
        ),
        (
            SweepConfig::DEFAULT.with_led_timing(PwmTiming::new(1, 0, 0)),
            Error::ZeroWrap,
        ),
        (
            SweepConfig::DEFAULT.with_max_brightness(0),
            Error::ZeroBrightness,
        ),
        (
            SweepConfig::DEFAULT.with_sweep(SweepMode::Pulse {
                step_us: 0,
                tick: TICK,
            }),
            Error::ZeroSweepStep,
        ),
    ];

    for (config, expected) in cases {
        let log = RefCell::new(Vec::new());
        let result = Actuation::new(RecordingPwm::new(&log), config);
        assert_eq!(result.err(), Some(expected));
        assert!(log.borrow().is_empty());
    }
}

#[test]
fn new_rejects_hold_angle_past_180() {
    static HOLDS: [(u16, Duration); 2] = [(90, HOLD), (200, HOLD)];
    let log = RefCell::new(Vec::new());
    let result = Actuation::new(
        RecordingPwm::new(&log),
        SweepConfig::DEFAULT.with_holds(&HOLDS),
    );
    assert_eq!(
        result.err(),
        Some(Error::HoldAngleOutOfRange { degrees: 200 })
    );
}

#[test]
fn new_surfaces_peripheral_configuration_errors() {
    let log = RefCell::new(Vec::new());
    let mismatch = Error::FramePeriodMismatch {
        frame_us: 16_666,
        expected_us: 20_000,
    };
    let pwm = RecordingPwm::new(&log).rejecting(mismatch);
    let result = Actuation::new(pwm, SweepConfig::DEFAULT);
    assert_eq!(result.err(), Some(mismatch));
    assert!(log.borrow().is_empty());
}

#[test]
fn hold_sequence_writes_servo_then_led_then_waits() {
    let log = RefCell::new(Vec::new());
    let mut actuation =
        Actuation::new(RecordingPwm::new(&log), SweepConfig::DEFAULT).expect("valid config");

    block_on(actuation.hold_sequence());

    let expected: Vec<Event> = [
        step(3_000, 4_096, HOLD), // 180°: 2400 µs, full brightness
        step(1_812, 2_039, HOLD), // 90°: 1450 µs, brightness 127
        step(625, 0, HOLD),       // 0°: 500 µs, dark
    ]
    .concat();
    assert_eq!(after_init(&log), expected);
}

#[test]
fn tick_computes_both_levels_before_waiting() {
    let log = RefCell::new(Vec::new());
    let mut actuation =
        Actuation::new(RecordingPwm::new(&log), SweepConfig::DEFAULT).expect("valid config");

    block_on(async {
        actuation.tick().await;
        actuation.tick().await;
    });

    // 505 µs -> 631 counts; brightness 5 * 255 / 1900 rounds to 0
    let expected: Vec<Event> = [step(625, 0, TICK), step(631, 0, TICK)].concat();
    assert_eq!(after_init(&log), expected);
    assert_eq!(actuation.sweep().index(), 2);
    assert_eq!(actuation.sweep().value(actuation.plan()), 510);
}

#[test]
fn led_follows_servo_through_a_full_sweep() {
    let log = RefCell::new(Vec::new());
    let mut actuation =
        Actuation::new(RecordingPwm::new(&log), SweepConfig::DEFAULT).expect("valid config");

    let mut previous = actuation.sweep_levels();
    assert_eq!(previous, Levels { servo: 625, led: 0 });
    while actuation.sweep().direction() == Direction::Ascending {
        block_on(actuation.tick());
        let levels = actuation.sweep_levels();
        assert!(levels.servo > previous.servo);
        assert!(levels.led >= previous.led);
        previous = levels;
    }
    assert_eq!(previous, Levels { servo: 3_000, led: 4_096 });
    assert_eq!(actuation.sweep().index(), actuation.plan().last_index());
}

#[test]
fn run_until_stops_at_a_tick_boundary() {
    let log = RefCell::new(Vec::new());
    let stop = AtomicBool::new(false);
    // three holds, then ten sweep ticks
    let pwm = RecordingPwm::new(&log).stop_after(&stop, 13);
    let mut actuation = Actuation::new(pwm, SweepConfig::DEFAULT).expect("valid config");

    let sweep = block_on(actuation.run_until(&stop));

    assert_eq!(sweep.index(), 10);
    assert_eq!(sweep.value(actuation.plan()), 550);
    let events = after_init(&log);
    assert_eq!(events.len(), 13 * 3);
    assert_eq!(
        events.iter().filter(|event| **event == Event::Wait(TICK)).count(),
        10
    );
    assert_eq!(events.last(), Some(&Event::Wait(TICK)));
}

#[test]
fn run_until_with_stop_already_set_does_nothing() {
    let log = RefCell::new(Vec::new());
    let stop = AtomicBool::new(true);
    let mut actuation =
        Actuation::new(RecordingPwm::new(&log), SweepConfig::DEFAULT).expect("valid config");

    let sweep = block_on(actuation.run_until(&stop));

    assert_eq!(sweep, SweepState::new());
    assert!(after_init(&log).is_empty());
}

#[test]
fn angle_mode_steps_one_degree_per_frame() {
    let log = RefCell::new(Vec::new());
    let config = SweepConfig::DEFAULT
        .with_holds(&[])
        .with_sweep(SweepMode::Angle { step_degrees: 1 });
    let mut actuation = Actuation::new(RecordingPwm::new(&log), config).expect("valid config");
    assert_eq!(actuation.tick_duration(), SERVO_FRAME);

    block_on(async {
        actuation.tick().await;
        actuation.tick().await;
    });

    // 1° -> 510 µs -> 637 counts; brightness 1 -> 16 counts
    let expected: Vec<Event> =
        [step(625, 0, SERVO_FRAME), step(637, 16, SERVO_FRAME)].concat();
    assert_eq!(after_init(&log), expected);
    assert_eq!(actuation.plan().last_index(), 180);
}

#[test]
fn relax_and_hold_toggle_both_outputs() {
    let log = RefCell::new(Vec::new());
    let mut actuation =
        Actuation::new(RecordingPwm::new(&log), SweepConfig::DEFAULT).expect("valid config");

    actuation.relax();
    actuation.hold();

    assert_eq!(
        after_init(&log),
        [
            Event::Enable(ChannelId::Servo, false),
            Event::Enable(ChannelId::Led, false),
            Event::Enable(ChannelId::Servo, true),
            Event::Enable(ChannelId::Led, true),
        ]
    );
}

#[test]
fn run_until_restarts_the_sweep_from_the_first_sample() {
    let log = RefCell::new(Vec::new());
    let stop = AtomicBool::new(false);
    let config = SweepConfig::DEFAULT.with_holds(&[]);
    let pwm = RecordingPwm::new(&log).stop_after(&stop, 5);
    let mut actuation = Actuation::new(pwm, config).expect("valid config");

    block_on(async {
        actuation.tick().await;
        actuation.tick().await;
    });
    assert_eq!(actuation.sweep().index(), 2);

    let sweep = block_on(actuation.run_until(&stop));

    // two ticks before, three more from index 0
    assert_eq!(sweep.index(), 3);
    assert_eq!(sweep, actuation.sweep());
    let events = after_init(&log);
    assert_eq!(events.get(6..9), Some(step(625, 0, TICK).as_slice()));
}

#[test]
fn accessors_expose_config_and_hand_back_the_peripheral() {
    let log = RefCell::new(Vec::new());
    let mut actuation =
        Actuation::new(RecordingPwm::new(&log), SweepConfig::DEFAULT).expect("valid config");
    assert_eq!(actuation.config(), &SweepConfig::DEFAULT);

    block_on(actuation.hold_sequence());
    assert_eq!(actuation.pwm().waits, 3);

    let pwm = actuation.into_pwm();
    assert_eq!(pwm.waits, 3);
    assert_eq!(pwm.log.borrow().len(), INIT_EVENTS + 3 * 3);
}
