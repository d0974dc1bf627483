use musicbox_core::{Keypad, MusicBox, PlaybackState, SongOutcome, Step};
use tracing::{debug, info};

use crate::{
    script::PressScript,
    trace::TraceEvent,
    wav,
    world::{SimBuzzer, SimClock, SimColumn, SimDisplay, SimRow, World},
};

pub type SimMusicBox = MusicBox<Keypad<SimRow, SimColumn>, SimBuzzer, SimDisplay, SimClock>;

/// The music box firmware running on the virtual board
pub struct Session {
    world: World,
    music_box: SimMusicBox,
    trace: Vec<TraceEvent>,
    outcomes: Vec<SongOutcome>,
    display_seen: usize,
}

impl Session {
    pub fn new(script: &PressScript) -> Self {
        let world = World::new(script);

        let music_box = MusicBox::new(
            world.keypad(),
            world.buzzer(),
            world.display_port(),
            world.clock(),
        );

        let mut session = Self {
            world,
            music_box,
            trace: Vec::new(),
            outcomes: Vec::new(),
            display_seen: 0,
        };

        session.collect_display();
        session
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn state(&self) -> &PlaybackState {
        self.music_box.state()
    }

    pub fn trace(&self) -> &[TraceEvent] {
        &self.trace
    }

    /// Every song that was started, in order
    pub fn outcomes(&self) -> &[SongOutcome] {
        &self.outcomes
    }

    /// Runs one pass of the control loop
    pub fn step(&mut self) -> Step {
        let started_us = self.world.now_us();
        let step = self.music_box.step();
        let ended_us = self.world.now_us();

        self.collect_display();

        if let Some(key) = step.key {
            debug!(at_us = started_us, key = %key.symbol(), command = ?step.command, "key");
        }

        if let Some(outcome) = step.playback {
            info!(
                song = ?self.state().song(),
                ?outcome,
                took_ms = (ended_us - started_us) / 1_000,
                "playback ended"
            );
            self.outcomes.push(outcome);
        }

        if step.key.is_some() || step.playback.is_some() {
            self.trace.push(TraceEvent::step(started_us, ended_us, &step));
        }

        step
    }

    /// Steps the control loop until virtual time reaches `until_ms`. A song
    /// that is still playing at that point is played out.
    pub fn run_until(&mut self, until_ms: u64) {
        while self.world.now_us() < until_ms.saturating_mul(1_000) {
            self.step();
        }
    }

    /// The buzzer line from time zero to now
    pub fn render_wav(&self, sample_rate: u32) -> Vec<i16> {
        wav::render(&self.world.edges(), self.world.now_us(), sample_rate)
    }

    fn collect_display(&mut self) {
        let changes = self.world.display_changes();

        for change in &changes[self.display_seen..] {
            self.trace.push(TraceEvent::display(change.at_us, &change.title));
        }

        self.display_seen = changes.len();
    }
}
