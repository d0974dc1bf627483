//! Fake hardware for unit tests: a virtual clock, a buzzer that records its
//! edges against that clock, a wired keypad matrix and scripted key sources.

use std::{cell::RefCell, collections::VecDeque, convert::Infallible, rc::Rc};

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::{
    display::{SongTitle, TitleDisplay},
    keypad::{Key, KeySource, Keypad, COLUMNS, ROWS},
    ticks::{TickSource, FINE_TICK_US},
};

#[derive(Default)]
struct BenchState {
    now_us: u64,
    fine_ticks: u64,
    buzzer_high: bool,
    edges: Vec<(u64, bool)>,
}

/// Shared virtual time and buzzer line
#[derive(Clone, Default)]
pub struct Bench {
    state: Rc<RefCell<BenchState>>,
}

impl Bench {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock(&self) -> BenchClock {
        BenchClock {
            state: self.state.clone(),
        }
    }

    pub fn buzzer(&self) -> BenchBuzzer {
        BenchBuzzer {
            state: self.state.clone(),
        }
    }

    pub fn now_us(&self) -> u64 {
        self.state.borrow().now_us
    }

    pub fn fine_ticks(&self) -> u64 {
        self.state.borrow().fine_ticks
    }

    /// Every level change of the buzzer as `(time_us, level)`
    pub fn edges(&self) -> Vec<(u64, bool)> {
        self.state.borrow().edges.clone()
    }

    pub fn rising_edges(&self) -> usize {
        self.state.borrow().edges.iter().filter(|(_, high)| *high).count()
    }

    pub fn buzzer_high(&self) -> bool {
        self.state.borrow().buzzer_high
    }

    pub fn clear_edges(&self) {
        self.state.borrow_mut().edges.clear();
    }
}

pub struct BenchClock {
    state: Rc<RefCell<BenchState>>,
}

impl TickSource for BenchClock {
    fn wait_coarse(&mut self, ticks: u32) {
        self.state.borrow_mut().now_us += ticks as u64 * 1_000;
    }

    fn wait_fine(&mut self, ticks: u32) {
        let mut state = self.state.borrow_mut();
        state.now_us += ticks as u64 * FINE_TICK_US as u64;
        state.fine_ticks += ticks as u64;
    }
}

pub struct BenchBuzzer {
    state: Rc<RefCell<BenchState>>,
}

impl BenchBuzzer {
    fn drive(&mut self, high: bool) {
        let mut state = self.state.borrow_mut();
        if state.buzzer_high != high {
            let now = state.now_us;
            state.edges.push((now, high));
        }
        state.buzzer_high = high;
    }
}

impl ErrorType for BenchBuzzer {
    type Error = Infallible;
}

impl OutputPin for BenchBuzzer {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

#[derive(Default)]
struct MatrixState {
    driven_low: [bool; ROWS],
    drives: [usize; ROWS],
    most_driven_at_once: usize,
    pressed: Vec<(usize, usize)>,
}

/// Keypad wiring: a column reads low when a held key joins it to a driven row
#[derive(Clone, Default)]
pub struct FakeMatrix {
    state: Rc<RefCell<MatrixState>>,
}

impl FakeMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keypad(&self) -> Keypad<FakeRow, FakeColumn> {
        let rows = core::array::from_fn(|index| FakeRow {
            index,
            state: self.state.clone(),
        });
        let columns = core::array::from_fn(|index| FakeColumn {
            index,
            state: self.state.clone(),
        });

        Keypad::new(rows, columns)
    }

    pub fn press_at(&self, row: usize, column: usize) {
        self.state.borrow_mut().pressed.push((row, column));
    }

    pub fn press(&self, key: Key) {
        let (row, column) = key.position();
        self.press_at(row, column);
    }

    pub fn release_all(&self) {
        self.state.borrow_mut().pressed.clear();
    }

    pub fn rows_released(&self) -> bool {
        self.state.borrow().driven_low.iter().all(|low| !low)
    }

    /// How many times each row has been pulled low
    pub fn drives(&self) -> [usize; ROWS] {
        self.state.borrow().drives
    }

    /// Largest number of rows that were ever pulled low together
    pub fn most_driven_at_once(&self) -> usize {
        self.state.borrow().most_driven_at_once
    }
}

pub struct FakeRow {
    index: usize,
    state: Rc<RefCell<MatrixState>>,
}

impl ErrorType for FakeRow {
    type Error = Infallible;
}

impl OutputPin for FakeRow {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();

        state.driven_low[self.index] = true;
        state.drives[self.index] += 1;

        let driven = state.driven_low.iter().filter(|&&low| low).count();
        state.most_driven_at_once = state.most_driven_at_once.max(driven);

        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.state.borrow_mut().driven_low[self.index] = false;
        Ok(())
    }
}

pub struct FakeColumn {
    index: usize,
    state: Rc<RefCell<MatrixState>>,
}

impl ErrorType for FakeColumn {
    type Error = Infallible;
}

impl InputPin for FakeColumn {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        let state = self.state.borrow();
        debug_assert!(self.index < COLUMNS);

        Ok(state
            .pressed
            .iter()
            .any(|&(row, column)| column == self.index && state.driven_low[row]))
    }
}

/// Key source that replays one entry per scan, then reports nothing
#[derive(Default)]
pub struct ScriptedKeys {
    script: VecDeque<Option<Key>>,
    pub scans: usize,
}

impl ScriptedKeys {
    pub fn new(script: impl IntoIterator<Item = Option<Key>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            scans: 0,
        }
    }

    /// No key for `idle` scans, then `key` held for `held` scans
    pub fn press_after(idle: usize, key: Key, held: usize) -> Self {
        Self::new(
            core::iter::repeat(None)
                .take(idle)
                .chain(core::iter::repeat(Some(key)).take(held)),
        )
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl KeySource for ScriptedKeys {
    fn scan<T: TickSource>(&mut self, _ticks: &mut T) -> Option<Key> {
        self.scans += 1;
        self.script.pop_front().flatten()
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    pub titles: Vec<SongTitle>,
}

impl TitleDisplay for RecordingDisplay {
    fn show_title(&mut self, title: &SongTitle) {
        self.titles.push(*title);
    }
}
