#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod control;
pub mod display;
pub mod keypad;
pub mod note;
pub mod player;
pub mod song;
pub mod tables;
pub mod ticks;

#[cfg(test)]
mod testing;

pub use control::{Command, MusicBox, PlaybackState, Step};
pub use display::{SongTitle, TitleDisplay};
pub use keypad::{Key, KeySource, Keypad};
pub use note::{Duration, Note, PlayingNote};
pub use player::{play_note, play_song, NoteReport, SongOutcome};
pub use song::Song;
pub use tables::{DerivedPeriods, FrequencyBand, FrequencyTable, TempoBand, TempoTable};
pub use ticks::{DelayTicks, TickSource, FINE_TICK_US};

use core::convert::Infallible;

/// Discharges the result of a pin operation that cannot fail
#[inline(always)]
pub(crate) fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}
