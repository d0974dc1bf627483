use crate::{
    display::SongTitle,
    note::{
        Duration::{self, *},
        Note::{self, *},
        PlayingNote,
    },
};

const fn n(note: Note, duration: Duration) -> PlayingNote {
    PlayingNote::new(note, duration)
}

#[rustfmt::skip]
pub static TWINKLE_TWINKLE: [PlayingNote; 42] = [
    // twinkle twinkle little star
    n(C, Half), n(C, Half),
    n(G, Half), n(G, Half),
    n(GSharp, Half), n(GSharp, Half),
    n(G, Whole),

    // how i wonder where you are
    n(F, Half), n(F, Half),
    n(E, Half), n(E, Half),
    n(D, Half), n(D, Half),
    n(C, Whole),

    // up above the world so high
    n(G, Half), n(G, Half),
    n(F, Half), n(F, Half),
    n(E, Half), n(E, Half),
    n(D, Whole),

    // like a diamond in the sky
    n(G, Half), n(G, Half),
    n(F, Half), n(F, Half),
    n(E, Half), n(E, Half),
    n(D, Whole),

    // twinkle twinkle little star
    n(C, Half), n(C, Half),
    n(G, Half), n(G, Half),
    n(GSharp, Half), n(GSharp, Half),
    n(G, Whole),

    // how i wonder where you are
    n(F, Half), n(F, Half),
    n(E, Half), n(E, Half),
    n(D, Half), n(D, Half),
    n(C, DoubleWhole),
];

#[rustfmt::skip]
pub static MARY_HAD_A_LITTLE_LAMB: [PlayingNote; 27] = [
    // mary had a little lamb
    n(E, Quarter), n(D, Quarter), n(C, Quarter), n(D, Quarter),
    n(E, Quarter), n(E, Quarter), n(E, Half),

    // little lamb, little lamb
    n(D, Quarter), n(D, Quarter), n(D, Half),
    n(E, Quarter), n(G, Quarter), n(G, Half),

    // mary had a little lamb
    n(E, Quarter), n(D, Quarter), n(C, Quarter), n(D, Quarter),
    n(E, Quarter), n(E, Quarter), n(E, Quarter), n(E, Quarter),

    // its fleece was white as snow
    PlayingNote::rest(Eighth),
    n(D, Quarter), n(D, Quarter), n(E, Quarter), n(D, Quarter), n(C, Whole),
];

#[rustfmt::skip]
pub static HAPPY_BIRTHDAY: [PlayingNote; 25] = [
    // happy birthday to you
    n(C, Quarter), n(C, Eighth), n(D, Half),
    n(C, Half), n(F, Half), n(E, Whole),

    // happy birthday to you
    n(C, Quarter), n(C, Eighth), n(D, Half),
    n(C, Half), n(G, Half), n(F, Whole),

    // happy birthday dear ...
    n(C, Quarter), n(C, Eighth), n(GSharp, Half),
    n(CSharp, Half), n(F, Half), n(CSharp, Half), n(D, Whole),

    // happy birthday to you
    n(ASharp, Quarter), n(ASharp, Eighth), n(A, Half),
    n(F, Half), n(G, Half), n(F, Whole),
];

/// The melodies the music box knows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Song {
    #[default]
    TwinkleTwinkle,
    MaryHadALittleLamb,
    HappyBirthday,
}

impl Song {
    pub const ALL: [Song; 3] = [
        Song::TwinkleTwinkle,
        Song::MaryHadALittleLamb,
        Song::HappyBirthday,
    ];

    pub fn notes(self) -> &'static [PlayingNote] {
        match self {
            Song::TwinkleTwinkle => &TWINKLE_TWINKLE,
            Song::MaryHadALittleLamb => &MARY_HAD_A_LITTLE_LAMB,
            Song::HappyBirthday => &HAPPY_BIRTHDAY,
        }
    }

    pub fn len(self) -> usize {
        self.notes().len()
    }

    pub fn is_empty(self) -> bool {
        self.notes().is_empty()
    }

    pub const fn title(self) -> SongTitle {
        match self {
            Song::TwinkleTwinkle => SongTitle::new("Twinkle Twinkle", "Little Star"),
            Song::MaryHadALittleLamb => SongTitle::new("Mary Had A", "Little Lamb"),
            Song::HappyBirthday => SongTitle::new("Birthday Song", ""),
        }
    }
}
