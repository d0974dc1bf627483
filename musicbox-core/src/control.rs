use core::convert::Infallible;

use embedded_hal::digital::OutputPin;

use crate::{
    display::TitleDisplay,
    fmt::{debug, info},
    infallible,
    keypad::{Key, KeySource},
    player::{play_song, SongOutcome},
    song::Song,
    tables::{DerivedPeriods, FrequencyBand, TempoBand, TempoTable},
    ticks::TickSource,
};

/// Coarse ticks between keypad polls while waiting for a key to be released
pub const RELEASE_POLL_TICKS: u32 = 10;

/// What a key does when pressed while the music box is idle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Command {
    TogglePlayback,
    SelectSong(Song),
    SelectFrequency(FrequencyBand),
    SelectTempo(TempoBand),
}

impl Command {
    /// Keys without a job (`0`, `#`, `D` and `7`-`9`) map to `None`
    pub fn from_key(key: Key) -> Option<Self> {
        let command = match key {
            Key::Star => Command::TogglePlayback,
            Key::A => Command::SelectSong(Song::TwinkleTwinkle),
            Key::B => Command::SelectSong(Song::MaryHadALittleLamb),
            Key::C => Command::SelectSong(Song::HappyBirthday),
            Key::One => Command::SelectFrequency(FrequencyBand::Low),
            Key::Two => Command::SelectFrequency(FrequencyBand::Mid),
            Key::Three => Command::SelectFrequency(FrequencyBand::High),
            Key::Four => Command::SelectTempo(TempoBand::Slow),
            Key::Five => Command::SelectTempo(TempoBand::Normal),
            Key::Six => Command::SelectTempo(TempoBand::Fast),
            Key::Zero | Key::Hash | Key::D | Key::Seven | Key::Eight | Key::Nine => return None,
        };

        Some(command)
    }
}

/// Everything the keypad can change. Starts as Twinkle Twinkle at 440Hz and
/// normal tempo, not playing.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    playing: bool,
    song: Song,
    frequency: FrequencyBand,
    tempo: TempoBand,
    periods: DerivedPeriods,
}

impl Default for PlaybackState {
    fn default() -> Self {
        let frequency = FrequencyBand::default();

        Self {
            playing: false,
            song: Song::default(),
            frequency,
            tempo: TempoBand::default(),
            periods: DerivedPeriods::from(frequency),
        }
    }
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn start(&mut self) {
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        self.playing = !self.playing;
    }

    pub fn song(&self) -> Song {
        self.song
    }

    pub fn select_song(&mut self, song: Song) {
        self.song = song;
    }

    pub fn frequency(&self) -> FrequencyBand {
        self.frequency
    }

    /// Switches pitch band and swaps in freshly derived periods
    pub fn select_frequency(&mut self, band: FrequencyBand) {
        self.frequency = band;
        self.periods = DerivedPeriods::from(band);
    }

    pub fn tempo(&self) -> TempoBand {
        self.tempo
    }

    pub fn select_tempo(&mut self, band: TempoBand) {
        self.tempo = band;
    }

    pub fn tempo_table(&self) -> &'static TempoTable {
        self.tempo.table()
    }

    pub fn periods(&self) -> &DerivedPeriods {
        &self.periods
    }
}

/// Record of one pass through the control loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Step {
    pub key: Option<Key>,
    pub command: Option<Command>,
    pub playback: Option<SongOutcome>,
}

/// The music box control loop and the hardware it owns
pub struct MusicBox<K, B, D, T> {
    keys: K,
    buzzer: B,
    display: D,
    ticks: T,
    state: PlaybackState,
}

impl<K, B, D, T> MusicBox<K, B, D, T>
where
    K: KeySource,
    B: OutputPin<Error = Infallible>,
    D: TitleDisplay,
    T: TickSource,
{
    pub fn new(keys: K, mut buzzer: B, mut display: D, ticks: T) -> Self {
        let state = PlaybackState::default();

        infallible(buzzer.set_low());
        display.show_title(&state.song().title());

        Self {
            keys,
            buzzer,
            display,
            ticks,
            state,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn keys_mut(&mut self) -> &mut K {
        &mut self.keys
    }

    pub fn buzzer(&self) -> &B {
        &self.buzzer
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn ticks(&self) -> &T {
        &self.ticks
    }

    pub fn into_parts(self) -> (K, B, D, T) {
        (self.keys, self.buzzer, self.display, self.ticks)
    }

    /// Runs the control loop forever
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }

    /// One pass of the control loop: read a key, act on it, wait for it to be
    /// released, then play the selected song if playback is on.
    pub fn step(&mut self) -> Step {
        let key = self.keys.scan(&mut self.ticks);
        let command = key.and_then(Command::from_key);

        if let Some(key) = key {
            debug!("key {} pressed", key.symbol());

            if let Some(command) = command {
                self.apply(command);
            }

            while self.keys.scan(&mut self.ticks).is_some() {
                self.ticks.wait_coarse(RELEASE_POLL_TICKS);
            }
        }

        let playback = if self.state.is_playing() {
            let song = self.state.song();
            info!("playing {}", song);

            let outcome = play_song(
                song.notes(),
                &mut self.state,
                &mut self.keys,
                &mut self.buzzer,
                &mut self.ticks,
            );

            info!("playback ended: {}", outcome);

            // A finished song must not start over on the next pass
            self.state.stop();
            Some(outcome)
        } else {
            None
        };

        Step {
            key,
            command,
            playback,
        }
    }

    fn apply(&mut self, command: Command) {
        info!("{}", command);

        match command {
            Command::TogglePlayback => self.state.toggle(),
            Command::SelectSong(song) => {
                self.state.select_song(song);
                self.display.show_title(&song.title());
            }
            Command::SelectFrequency(band) => self.state.select_frequency(band),
            Command::SelectTempo(band) => self.state.select_tempo(band),
        }
    }
}
