//! Host-side simulator for the keypad music box.
//!
//! Runs the same control loop as the firmware against a virtual board: a
//! matrix keypad fed from a press script, a buzzer line that records its edges,
//! and a display that records its titles. Time is virtual and only advances
//! when the music box waits, so a whole song simulates in milliseconds.

pub mod config;
pub mod script;
pub mod session;
pub mod trace;
pub mod wav;
pub mod world;

pub use script::{Press, PressScript};
pub use session::Session;
pub use trace::TraceEvent;
pub use world::World;
