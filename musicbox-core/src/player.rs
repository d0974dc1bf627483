use core::convert::Infallible;

use embedded_hal::digital::OutputPin;

use crate::{
    control::PlaybackState,
    fmt::{debug, trace},
    infallible,
    keypad::{Key, KeySource},
    note::PlayingNote,
    tables::{DerivedPeriods, TempoTable},
    ticks::{micros_to_fine_ticks, TickSource, FINE_TICK_US},
};

/// Key that stops a song between notes
pub const CANCEL_KEY: Key = Key::Star;

/// What the note player emitted for one note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoteReport {
    pub note: PlayingNote,
    /// Full high/low cycles driven on the buzzer, zero for a rest
    pub pulses: u32,
    /// Fine ticks spent waiting
    pub fine_ticks: u32,
}

impl NoteReport {
    pub fn elapsed_us(&self) -> u64 {
        self.fine_ticks as u64 * FINE_TICK_US as u64
    }
}

/// How a song ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "outcome", rename_all = "snake_case"))]
pub enum SongOutcome {
    /// Every note was played
    Finished { notes: usize },
    /// The cancel key was seen before note `at`, which was never started
    Cancelled { at: usize },
}

impl SongOutcome {
    pub fn notes_played(&self) -> usize {
        match *self {
            SongOutcome::Finished { notes } => notes,
            SongOutcome::Cancelled { at } => at,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SongOutcome::Cancelled { .. })
    }
}

/// Converts half periods into whole fine ticks, carrying the sub-tick
/// remainder into the next half so the emitted cycles don't drift short
struct HalfPeriodTicks {
    half_us: f32,
    carry_us: f32,
}

impl HalfPeriodTicks {
    fn new(half_us: f32) -> Self {
        Self {
            half_us,
            carry_us: 0.0,
        }
    }

    fn next(&mut self) -> u32 {
        let exact = self.half_us + self.carry_us;
        let whole = (exact / FINE_TICK_US as f32) as u32;
        self.carry_us = exact - (whole * FINE_TICK_US) as f32;
        whole
    }
}

/// Plays one note as a square wave on `buzzer`, blocking until it is done.
///
/// A sounding note emits `floor(length / period)` cycles, each high for half
/// a period and low for the other half. A rest holds the buzzer low for the
/// full length. There is no way to interrupt a note once started.
pub fn play_note<B, T>(
    note: PlayingNote,
    tempo: &TempoTable,
    periods: &DerivedPeriods,
    buzzer: &mut B,
    ticks: &mut T,
) -> NoteReport
where
    B: OutputPin<Error = Infallible>,
    T: TickSource,
{
    let length_us = tempo[note.duration.index()];

    infallible(buzzer.set_low());

    let (Some(period_us), Some(half_us)) = (
        periods.period_us(note.note),
        periods.half_period_us(note.note),
    ) else {
        let rest = micros_to_fine_ticks(length_us);
        ticks.wait_fine(rest);

        return NoteReport {
            note,
            pulses: 0,
            fine_ticks: rest,
        };
    };

    let pulses = (length_us as f32 / period_us) as u32;
    let mut halves = HalfPeriodTicks::new(half_us);
    let mut fine_ticks = 0;

    for _ in 0..pulses {
        let high = halves.next();
        infallible(buzzer.set_high());
        ticks.wait_fine(high);

        let low = halves.next();
        infallible(buzzer.set_low());
        ticks.wait_fine(low);

        fine_ticks += high + low;
    }

    NoteReport {
        note,
        pulses,
        fine_ticks,
    }
}

/// Plays `song` from the top with the tempo and periods in `state`.
///
/// The keypad is scanned before every note. Seeing [`CANCEL_KEY`] stops
/// playback: `is_playing` is cleared and this waits until no key is held so
/// the same press isn't read again by the caller.
pub fn play_song<K, B, T>(
    song: &[PlayingNote],
    state: &mut PlaybackState,
    keys: &mut K,
    buzzer: &mut B,
    ticks: &mut T,
) -> SongOutcome
where
    K: KeySource,
    B: OutputPin<Error = Infallible>,
    T: TickSource,
{
    for (i, note) in song.iter().enumerate() {
        if keys.scan(ticks) == Some(CANCEL_KEY) {
            debug!("playback cancelled before note {}", i);
            state.stop();

            while keys.scan(ticks).is_some() {}

            return SongOutcome::Cancelled { at: i };
        }

        let report = play_note(*note, state.tempo_table(), state.periods(), buzzer, ticks);
        trace!("note {}: {} pulses", i, report.pulses);
    }

    SongOutcome::Finished { notes: song.len() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        note::{Duration, Note},
        song::Song,
        tables::{FrequencyBand, TempoBand},
        testing::{Bench, ScriptedKeys},
    };

    const FREQUENCY_BANDS: [FrequencyBand; 3] =
        [FrequencyBand::Low, FrequencyBand::Mid, FrequencyBand::High];
    const TEMPO_BANDS: [TempoBand; 3] = [TempoBand::Slow, TempoBand::Normal, TempoBand::Fast];

    #[test]
    fn emitted_time_tracks_the_note_length() {
        for frequency in FREQUENCY_BANDS {
            let periods = DerivedPeriods::from(frequency);

            for tempo in TEMPO_BANDS {
                for duration in Duration::ALL {
                    for pitch in Note::PITCHES {
                        let bench = Bench::new();
                        let note = PlayingNote::new(pitch, duration);

                        let report = play_note(
                            note,
                            tempo.table(),
                            &periods,
                            &mut bench.buzzer(),
                            &mut bench.clock(),
                        );

                        let length = tempo.micros(duration) as f32;
                        let period = periods.period_us(pitch).unwrap();

                        assert_eq!(report.pulses, (length / period) as u32);
                        assert_eq!(bench.rising_edges(), report.pulses as usize);
                        assert_eq!(bench.now_us(), report.elapsed_us());

                        let error = (length - bench.now_us() as f32).abs();
                        assert!(
                            error < period + FINE_TICK_US as f32,
                            "{note:?} at {frequency:?}/{tempo:?}: off by {error}µs"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn square_wave_has_the_requested_period() {
        let bench = Bench::new();
        let periods = DerivedPeriods::from(FrequencyBand::Mid);

        play_note(
            PlayingNote::new(Note::A, Duration::Quarter),
            TempoBand::Normal.table(),
            &periods,
            &mut bench.buzzer(),
            &mut bench.clock(),
        );

        let rising: Vec<u64> = bench
            .edges()
            .iter()
            .filter(|(_, high)| *high)
            .map(|(time, _)| *time)
            .collect();

        // 250ms of 440Hz
        assert_eq!(rising.len(), 110);

        for pair in rising.windows(2) {
            let period = pair[1] - pair[0];
            assert!((2264..=2280).contains(&period), "period {period}µs");
        }

        let average = (rising[rising.len() - 1] - rising[0]) as f32 / (rising.len() - 1) as f32;
        assert!((average - 2272.7).abs() < 1.0, "average period {average}µs");
        assert!(!bench.buzzer_high());
    }

    #[test]
    fn duty_cycle_stays_even() {
        let bench = Bench::new();
        let periods = DerivedPeriods::from(FrequencyBand::High);

        play_note(
            PlayingNote::new(Note::GSharp, Duration::Half),
            TempoBand::Fast.table(),
            &periods,
            &mut bench.buzzer(),
            &mut bench.clock(),
        );

        for pair in bench.edges().windows(2) {
            let width = pair[1].0 - pair[0].0;
            // 1661.2Hz gives ~301µs halves, i.e. 37 or 38 ticks
            assert!(width == 296 || width == 304, "half width {width}µs");
        }
    }

    #[test]
    fn rests_are_silent() {
        for tempo in TEMPO_BANDS {
            for duration in Duration::ALL {
                let bench = Bench::new();

                let report = play_note(
                    PlayingNote::rest(duration),
                    tempo.table(),
                    &DerivedPeriods::from(FrequencyBand::Mid),
                    &mut bench.buzzer(),
                    &mut bench.clock(),
                );

                assert_eq!(report.pulses, 0);
                assert!(bench.edges().is_empty());
                assert_eq!(bench.fine_ticks(), (tempo.micros(duration) / 8) as u64);
            }
        }
    }

    #[test]
    fn longest_rest_fits_the_tick_counter() {
        let bench = Bench::new();

        let report = play_note(
            PlayingNote::rest(Duration::DoubleWhole),
            TempoBand::Slow.table(),
            &DerivedPeriods::from(FrequencyBand::Low),
            &mut bench.buzzer(),
            &mut bench.clock(),
        );

        assert_eq!(report.fine_ticks, 500_000);
        assert_eq!(bench.now_us(), 4_000_000);
    }

    #[test]
    fn full_song_plays_every_note() {
        let bench = Bench::new();
        let mut state = PlaybackState::default();
        state.start();
        let mut keys = ScriptedKeys::default();

        let outcome = play_song(
            Song::MaryHadALittleLamb.notes(),
            &mut state,
            &mut keys,
            &mut bench.buzzer(),
            &mut bench.clock(),
        );

        assert_eq!(outcome, SongOutcome::Finished { notes: 27 });
        assert_eq!(outcome.notes_played(), 27);
        assert_eq!(keys.scans, 27);
        // The song player leaves resetting the flag to its caller on a normal finish
        assert!(state.is_playing());
    }

    #[test]
    fn cancel_stops_before_the_next_note() {
        let song = Song::TwinkleTwinkle.notes();

        for k in [0, 1, 7, 41] {
            let bench = Bench::new();
            let mut state = PlaybackState::default();
            state.start();

            // Idle for k scans, then '*' held for three scans
            let mut keys = ScriptedKeys::press_after(k, CANCEL_KEY, 3);

            let outcome = play_song(
                song,
                &mut state,
                &mut keys,
                &mut bench.buzzer(),
                &mut bench.clock(),
            );

            assert_eq!(outcome, SongOutcome::Cancelled { at: k });
            assert_eq!(outcome.notes_played(), k);
            assert!(!state.is_playing());
            assert_eq!(keys.remaining(), 0, "should wait for the key to be released");

            // Reference: exactly the first k notes worth of buzzer cycles
            let reference = Bench::new();
            for note in &song[..k] {
                play_note(
                    *note,
                    state.tempo_table(),
                    state.periods(),
                    &mut reference.buzzer(),
                    &mut reference.clock(),
                );
            }
            assert_eq!(bench.rising_edges(), reference.rising_edges());
        }
    }

    #[test]
    fn other_keys_do_not_cancel() {
        let bench = Bench::new();
        let mut state = PlaybackState::default();
        state.start();
        let mut keys = ScriptedKeys::new([Some(Key::A), Some(Key::One), Some(Key::Hash)]);

        let outcome = play_song(
            Song::HappyBirthday.notes(),
            &mut state,
            &mut keys,
            &mut bench.buzzer(),
            &mut bench.clock(),
        );

        assert_eq!(outcome, SongOutcome::Finished { notes: 25 });
    }

    #[test]
    fn rebuilt_periods_are_used_immediately() {
        let mut state = PlaybackState::default();
        let note = PlayingNote::new(Note::A, Duration::Whole);

        let mid = Bench::new();
        let mid_report = play_note(
            note,
            state.tempo_table(),
            state.periods(),
            &mut mid.buzzer(),
            &mut mid.clock(),
        );

        state.select_frequency(FrequencyBand::High);

        let high = Bench::new();
        let high_report = play_note(
            note,
            state.tempo_table(),
            state.periods(),
            &mut high.buzzer(),
            &mut high.clock(),
        );

        assert_eq!(mid_report.pulses, 440);
        assert_eq!(high_report.pulses, 880);
    }
}
