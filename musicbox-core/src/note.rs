use num_enum::{IntoPrimitive, TryFromPrimitive};

/// One of the 12 chromatic pitches of a band, or a rest.
///
/// The discriminant is the index into a [`FrequencyTable`](crate::tables::FrequencyTable),
/// so the variant order must match the table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Note {
    A = 0,
    ASharp,
    B,
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    Wait,
}

impl Note {
    pub const PITCH_COUNT: usize = 12;

    /// Every sounding note, in table order
    pub const PITCHES: [Note; Self::PITCH_COUNT] = [
        Note::A,
        Note::ASharp,
        Note::B,
        Note::C,
        Note::CSharp,
        Note::D,
        Note::DSharp,
        Note::E,
        Note::F,
        Note::FSharp,
        Note::G,
        Note::GSharp,
    ];

    pub const fn is_playable(self) -> bool {
        !matches!(self, Note::Wait)
    }

    /// Index into the frequency and period tables, `None` for a rest
    pub const fn pitch_index(self) -> Option<usize> {
        match self {
            Note::Wait => None,
            pitch => Some(pitch as usize),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Note::A => "A",
            Note::ASharp => "A#",
            Note::B => "B",
            Note::C => "C",
            Note::CSharp => "C#",
            Note::D => "D",
            Note::DSharp => "D#",
            Note::E => "E",
            Note::F => "F",
            Note::FSharp => "F#",
            Note::G => "G",
            Note::GSharp => "G#",
            Note::Wait => "-",
        }
    }
}

/// Relative length of a note. The discriminant indexes a [`TempoTable`](crate::tables::TempoTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Duration {
    DoubleWhole = 0,
    Whole,
    Half,
    Quarter,
    Eighth,
}

impl Duration {
    pub const COUNT: usize = 5;

    pub const ALL: [Duration; Self::COUNT] = [
        Duration::DoubleWhole,
        Duration::Whole,
        Duration::Half,
        Duration::Quarter,
        Duration::Eighth,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayingNote {
    pub note: Note,
    pub duration: Duration,
}

impl PlayingNote {
    pub const fn new(note: Note, duration: Duration) -> Self {
        Self { note, duration }
    }

    pub const fn rest(duration: Duration) -> Self {
        Self::new(Note::Wait, duration)
    }
}
