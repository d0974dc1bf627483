use std::io::Write;

use anyhow::Result;
use musicbox_core::{Command, SongOutcome, SongTitle, Step};
use serde::Serialize;

/// One line of the simulation trace
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// The display was cleared and given a new title
    Display {
        at_us: u64,
        top: &'static str,
        bottom: &'static str,
    },
    /// A pass of the control loop that saw a key or played a song. Idle
    /// passes are left out.
    Step {
        started_us: u64,
        ended_us: u64,
        key: Option<char>,
        command: Option<Command>,
        playback: Option<SongOutcome>,
    },
}

impl TraceEvent {
    pub fn display(at_us: u64, title: &SongTitle) -> Self {
        TraceEvent::Display {
            at_us,
            top: title.top,
            bottom: title.bottom,
        }
    }

    pub fn step(started_us: u64, ended_us: u64, step: &Step) -> Self {
        TraceEvent::Step {
            started_us,
            ended_us,
            key: step.key.map(|key| key.symbol()),
            command: step.command,
            playback: step.playback,
        }
    }
}

/// Writes one JSON object per line
pub fn write_trace(w: &mut impl Write, events: &[TraceEvent]) -> Result<()> {
    for event in events {
        serde_json::to_writer(&mut *w, event)?;
        w.write_all(b"\n")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use musicbox_core::{Key, Song};

    use super::*;

    #[test]
    fn one_json_object_per_line() {
        let events = [
            TraceEvent::display(0, &Song::HappyBirthday.title()),
            TraceEvent::step(
                20_000,
                5_000_000,
                &Step {
                    key: Some(Key::Star),
                    command: Some(Command::TogglePlayback),
                    playback: Some(SongOutcome::Cancelled { at: 3 }),
                },
            ),
        ];

        let mut buf = Vec::new();
        write_trace(&mut buf, &events).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 2);

        let display: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(display["event"], "display");
        assert_eq!(display["top"], "Birthday Song");
        assert_eq!(display["bottom"], "");

        let step: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(step["event"], "step");
        assert_eq!(step["key"], "*");
        assert_eq!(step["command"], "toggle_playback");
        assert_eq!(step["playback"]["outcome"], "cancelled");
        assert_eq!(step["playback"]["at"], 3);
    }
}
