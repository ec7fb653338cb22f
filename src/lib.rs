//! Servo sweep with a brightness-following status LED for Pico 1 and 2.
//!
//! The crate turns pulse widths and angles into PWM compare levels, then drives two
//! channels from one loop: hold 180°, 90° and 0°, then sweep the servo back and forth
//! while the LED brightness tracks its position. See [`actuation`] for the loop and
//! [`pulse`] for the arithmetic.
//!
//! Without board features the crate is the pure core (mapping, sweep and the loop over
//! any [`PwmPeripheral`](pwm::PwmPeripheral)), which is what the host tests exercise.
//! Enable `embedded` (Pico 1) or `pico2,arm,defmt` for the [`servo`] hardware driver.
//!
//! # Glossary
//!
//! - **PWM ([Pulse Width Modulation](https://en.wikipedia.org/wiki/Pulse-width_modulation)) Slices:** Both Pico 1 and 2 have 8 slices (& 16 channels). These "slices"
//!   are unrelated to Rust slices.
//! - **Wrap (top):** counter value at which a slice restarts its period. A period is `top + 1` counts.
//! - **Compare level:** counts per period during which the output stays high.
//! - **Clock divider:** slows `clk_sys` down to the counting rate, in 1/16 steps.
//! - **Tick:** one sweep step: write both channels, then wait.
#![no_std]
#![allow(async_fn_in_trait, reason = "single-threaded embedded")]

#[cfg(all(feature = "pico1", feature = "pico2"))]
compile_error!("Cannot enable both 'pico1' and 'pico2' features simultaneously");

// A board needs an architecture to run on.
#[cfg(all(any(feature = "pico1", feature = "pico2"), not(feature = "arm")))]
compile_error!("Board features 'pico1'/'pico2' require the 'arm' architecture feature");

#[cfg(all(feature = "arm", not(any(feature = "pico1", feature = "pico2"))))]
compile_error!("Must enable exactly one board feature with 'arm': 'pico1' or 'pico2'");

pub mod actuation;
pub mod config;
mod error;
pub mod pulse;
pub mod pwm;
#[cfg(any(feature = "pico1", feature = "pico2"))]
pub mod servo;
pub mod sweep;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};
