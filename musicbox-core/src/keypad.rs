use core::convert::Infallible;

use embedded_hal::digital::{InputPin, OutputPin};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{infallible, ticks::TickSource};

pub const ROWS: usize = 4;
pub const COLUMNS: usize = 4;

/// Coarse ticks to let a freshly driven row settle before sensing the columns
pub const SETTLE_TICKS: u32 = 5;

/// A key of the 4×4 keypad. The discriminant is the linear key index
/// `row * 4 + column + 1`.
///
/// ```text
/// 1 2 3 A
/// 4 5 6 B
/// 7 8 9 C
/// * 0 # D
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Key {
    One = 1,
    Two,
    Three,
    A,
    Four,
    Five,
    Six,
    B,
    Seven,
    Eight,
    Nine,
    C,
    Star,
    Zero,
    Hash,
    D,
}

impl Key {
    pub const LAYOUT: [[Key; COLUMNS]; ROWS] = [
        [Key::One, Key::Two, Key::Three, Key::A],
        [Key::Four, Key::Five, Key::Six, Key::B],
        [Key::Seven, Key::Eight, Key::Nine, Key::C],
        [Key::Star, Key::Zero, Key::Hash, Key::D],
    ];

    /// Looks up a key by its linear index (1..=16)
    pub fn from_index(index: u8) -> Option<Self> {
        Self::try_from(index).ok()
    }

    pub fn index(self) -> u8 {
        self.into()
    }

    pub const fn at(row: usize, column: usize) -> Self {
        Self::LAYOUT[row][column]
    }

    /// `(row, column)` of the key on the matrix
    pub fn position(self) -> (usize, usize) {
        let zero_based = (self.index() - 1) as usize;
        (zero_based / COLUMNS, zero_based % COLUMNS)
    }

    pub const fn symbol(self) -> char {
        match self {
            Key::One => '1',
            Key::Two => '2',
            Key::Three => '3',
            Key::A => 'A',
            Key::Four => '4',
            Key::Five => '5',
            Key::Six => '6',
            Key::B => 'B',
            Key::Seven => '7',
            Key::Eight => '8',
            Key::Nine => '9',
            Key::C => 'C',
            Key::Star => '*',
            Key::Zero => '0',
            Key::Hash => '#',
            Key::D => 'D',
        }
    }

    /// Inverse of [`Key::symbol`]. Letters are accepted in either case.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        let symbol = symbol.to_ascii_uppercase();

        Self::LAYOUT
            .iter()
            .flatten()
            .copied()
            .find(|key| key.symbol() == symbol)
    }
}

/// Anything that can report the currently held key
pub trait KeySource {
    fn scan<T: TickSource>(&mut self, ticks: &mut T) -> Option<Key>;
}

/// Matrix keypad scanner.
///
/// Rows are open-drain lines: `set_low` drives the row, `set_high` releases it
/// so it floats. Columns are inputs pulled weakly high; a held key connects its
/// column to a driven row and reads low.
pub struct Keypad<R, C> {
    rows: [R; ROWS],
    columns: [C; COLUMNS],
}

impl<R, C> Keypad<R, C>
where
    R: OutputPin<Error = Infallible>,
    C: InputPin<Error = Infallible>,
{
    pub fn new(rows: [R; ROWS], columns: [C; COLUMNS]) -> Self {
        let mut keypad = Self { rows, columns };
        keypad.release_rows();
        keypad
    }

    pub fn into_parts(self) -> ([R; ROWS], [C; COLUMNS]) {
        (self.rows, self.columns)
    }

    fn release_rows(&mut self) {
        for row in self.rows.iter_mut() {
            infallible(row.set_high());
        }
    }

    /// Drives `row` low with every other row floating and returns the first
    /// column that reads low
    fn sense_row<T: TickSource>(&mut self, row: usize, ticks: &mut T) -> Option<usize> {
        self.release_rows();
        infallible(self.rows[row].set_low());

        ticks.wait_coarse(SETTLE_TICKS);

        self.columns
            .iter_mut()
            .position(|column| infallible(column.is_low()))
    }
}

impl<R, C> KeySource for Keypad<R, C>
where
    R: OutputPin<Error = Infallible>,
    C: InputPin<Error = Infallible>,
{
    fn scan<T: TickSource>(&mut self, ticks: &mut T) -> Option<Key> {
        let mut found = None;

        for row in 0..ROWS {
            if let Some(column) = self.sense_row(row, ticks) {
                found = Some(Key::at(row, column));
                break;
            }
        }

        self.release_rows();

        found
    }
}
