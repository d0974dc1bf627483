use crate::note::{Duration, Note};

/// Base frequency in Hz for each pitch, indexed by [`Note`] discriminant
pub type FrequencyTable = [f32; Note::PITCH_COUNT];

/// Length in microseconds for each note value, indexed by [`Duration`] discriminant
pub type TempoTable = [u32; Duration::COUNT];

pub const FREQUENCIES_220: FrequencyTable = [
    220.0, 233.1, 246.9, 261.6, 277.2, 293.7, 311.1, 329.6, 349.2, 370.0, 392.0, 415.3,
];

pub const FREQUENCIES_440: FrequencyTable = [
    440.0, 466.2, 493.9, 523.3, 554.4, 587.3, 622.3, 659.3, 698.5, 740.0, 784.0, 830.6,
];

pub const FREQUENCIES_880: FrequencyTable = [
    880.0, 932.3, 987.8, 1046.5, 1108.7, 1174.7, 1244.5, 1318.5, 1396.9, 1480.0, 1568.0, 1661.2,
];

pub const TEMPO_SLOW: TempoTable = [4_000_000, 2_000_000, 1_000_000, 500_000, 250_000];
pub const TEMPO_NORMAL: TempoTable = [2_000_000, 1_000_000, 500_000, 250_000, 125_000];
pub const TEMPO_FAST: TempoTable = [1_000_000, 500_000, 250_000, 125_000, 62_500];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FrequencyBand {
    /// Rooted at A3 (220 Hz)
    Low,
    /// Rooted at A4 (440 Hz)
    #[default]
    Mid,
    /// Rooted at A5 (880 Hz)
    High,
}

impl FrequencyBand {
    pub const fn table(self) -> &'static FrequencyTable {
        match self {
            FrequencyBand::Low => &FREQUENCIES_220,
            FrequencyBand::Mid => &FREQUENCIES_440,
            FrequencyBand::High => &FREQUENCIES_880,
        }
    }

    pub const fn root_hz(self) -> u32 {
        match self {
            FrequencyBand::Low => 220,
            FrequencyBand::Mid => 440,
            FrequencyBand::High => 880,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TempoBand {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl TempoBand {
    pub const fn table(self) -> &'static TempoTable {
        match self {
            TempoBand::Slow => &TEMPO_SLOW,
            TempoBand::Normal => &TEMPO_NORMAL,
            TempoBand::Fast => &TEMPO_FAST,
        }
    }

    pub const fn micros(self, duration: Duration) -> u32 {
        self.table()[duration.index()]
    }
}

/// Period and half period of every pitch in the active frequency band.
///
/// Built in one go from a [`FrequencyTable`]; the only way to change it is to
/// build a new one and assign it, so a partially rebuilt set is never visible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedPeriods {
    period_us: [f32; Note::PITCH_COUNT],
    half_period_us: [f32; Note::PITCH_COUNT],
}

impl DerivedPeriods {
    pub fn from_table(table: &FrequencyTable) -> Self {
        let mut period_us = [0.0; Note::PITCH_COUNT];
        let mut half_period_us = [0.0; Note::PITCH_COUNT];

        for (i, frequency) in table.iter().enumerate() {
            // 1 s = 1_000_000 µs
            period_us[i] = 1_000_000.0f32 / frequency;
            half_period_us[i] = period_us[i] / 2.0f32;
        }

        Self {
            period_us,
            half_period_us,
        }
    }

    /// Full period of a pitch in µs. `None` for [`Note::Wait`].
    pub fn period_us(&self, note: Note) -> Option<f32> {
        note.pitch_index().map(|i| self.period_us[i])
    }

    /// Time the buzzer spends high (and then low) per cycle, in µs
    pub fn half_period_us(&self, note: Note) -> Option<f32> {
        note.pitch_index().map(|i| self.half_period_us[i])
    }

    pub fn half_periods(&self) -> &[f32; Note::PITCH_COUNT] {
        &self.half_period_us
    }
}

impl From<FrequencyBand> for DerivedPeriods {
    fn from(band: FrequencyBand) -> Self {
        Self::from_table(band.table())
    }
}
