//! Board support for the music box on a Raspberry Pi Pico.
//!
//! | Signal            | Pin         |
//! |-------------------|-------------|
//! | Keypad rows 0-3   | GP6 - GP9   |
//! | Keypad columns 0-3| GP10 - GP13 |
//! | Buzzer            | GP15        |
//! | LCD RS / E        | GP16 / GP17 |
//! | LCD D4 - D7       | GP18 - GP21 |

#![no_std]

mod macros;

pub mod keypad;
pub mod lcd;
pub mod ticks;

/// The board resets if the tick source goes this long without running
pub const WATCHDOG_PERIOD_US: u32 = 2_000_000;
