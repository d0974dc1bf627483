//! Virtual-time stand-ins for the music box hardware.
//!
//! Every part shares one [`World`], so the keypad sees the presses that are
//! held at the current virtual time and every buzzer edge or display change is
//! stamped with it. Time only moves when the music box waits on its
//! [`SimClock`].

use std::{cell::RefCell, convert::Infallible, rc::Rc};

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use musicbox_core::{
    keypad::{COLUMNS, ROWS},
    ticks::{COARSE_TICK_MS, FINE_TICK_US},
    Keypad, SongTitle, TickSource, TitleDisplay,
};
use tracing::{debug, trace};

use crate::script::{Press, PressScript};

/// The title as it appeared on the display at `at_us`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayChange {
    pub at_us: u64,
    pub title: SongTitle,
}

#[derive(Default)]
struct WorldState {
    now_us: u64,
    presses: Vec<Press>,
    driven_low: [bool; ROWS],
    buzzer_high: bool,
    edges: Vec<(u64, bool)>,
    display: Vec<DisplayChange>,
}

/// Shared state of the simulated board
#[derive(Clone, Default)]
pub struct World {
    state: Rc<RefCell<WorldState>>,
}

impl World {
    pub fn new(script: &PressScript) -> Self {
        let world = Self::default();
        world.state.borrow_mut().presses = script.presses().to_vec();
        world
    }

    pub fn now_us(&self) -> u64 {
        self.state.borrow().now_us
    }

    /// Buzzer level changes as `(time µs, high)`, in time order
    pub fn edges(&self) -> Vec<(u64, bool)> {
        self.state.borrow().edges.clone()
    }

    pub fn rising_edges(&self) -> usize {
        self.state
            .borrow()
            .edges
            .iter()
            .filter(|(_, high)| *high)
            .count()
    }

    pub fn buzzer_high(&self) -> bool {
        self.state.borrow().buzzer_high
    }

    pub fn display_changes(&self) -> Vec<DisplayChange> {
        self.state.borrow().display.clone()
    }

    /// What the display is showing right now
    pub fn display(&self) -> Option<SongTitle> {
        self.state.borrow().display.last().map(|change| change.title)
    }

    /// Keys held at the current virtual time
    pub fn held_keys(&self) -> Vec<musicbox_core::Key> {
        let state = self.state.borrow();

        state
            .presses
            .iter()
            .filter(|press| press.is_held_at(state.now_us))
            .map(|press| press.key)
            .collect()
    }

    pub fn keypad(&self) -> Keypad<SimRow, SimColumn> {
        let rows = std::array::from_fn(|index| SimRow {
            index,
            world: self.clone(),
        });
        let columns = std::array::from_fn(|index| SimColumn {
            index,
            world: self.clone(),
        });

        Keypad::new(rows, columns)
    }

    pub fn buzzer(&self) -> SimBuzzer {
        SimBuzzer {
            world: self.clone(),
        }
    }

    pub fn display_port(&self) -> SimDisplay {
        SimDisplay {
            world: self.clone(),
        }
    }

    pub fn clock(&self) -> SimClock {
        SimClock {
            world: self.clone(),
        }
    }
}

/// Open-drain keypad row
pub struct SimRow {
    index: usize,
    world: World,
}

impl ErrorType for SimRow {
    type Error = Infallible;
}

impl OutputPin for SimRow {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.world.state.borrow_mut().driven_low[self.index] = true;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.world.state.borrow_mut().driven_low[self.index] = false;
        Ok(())
    }
}

/// Pulled-up keypad column
pub struct SimColumn {
    index: usize,
    world: World,
}

impl ErrorType for SimColumn {
    type Error = Infallible;
}

impl InputPin for SimColumn {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        let state = self.world.state.borrow();
        debug_assert!(self.index < COLUMNS);

        Ok(state
            .presses
            .iter()
            .filter(|press| press.is_held_at(state.now_us))
            .any(|press| {
                let (row, column) = press.key.position();
                column == self.index && state.driven_low[row]
            }))
    }
}

pub struct SimBuzzer {
    world: World,
}

impl SimBuzzer {
    fn set_level(&mut self, high: bool) {
        let mut state = self.world.state.borrow_mut();

        if state.buzzer_high != high {
            let now_us = state.now_us;
            state.buzzer_high = high;
            state.edges.push((now_us, high));
        }
    }
}

impl ErrorType for SimBuzzer {
    type Error = Infallible;
}

impl OutputPin for SimBuzzer {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set_level(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set_level(true);
        Ok(())
    }
}

/// 16×2 character display, records every title it is asked to show
pub struct SimDisplay {
    world: World,
}

impl TitleDisplay for SimDisplay {
    fn show_title(&mut self, title: &SongTitle) {
        let mut state = self.world.state.borrow_mut();
        debug!(at_us = state.now_us, top = title.top, bottom = title.bottom, "display");

        let at_us = state.now_us;
        state.display.push(DisplayChange {
            at_us,
            title: *title,
        });
    }
}

/// Tick source that advances virtual time instantly
pub struct SimClock {
    world: World,
}

impl SimClock {
    fn advance(&mut self, micros: u64) {
        let mut state = self.world.state.borrow_mut();
        state.now_us += micros;
        trace!(now_us = state.now_us, "tick");
    }
}

impl TickSource for SimClock {
    fn wait_coarse(&mut self, ticks: u32) {
        self.advance(ticks as u64 * COARSE_TICK_MS as u64 * 1_000);
    }

    fn wait_fine(&mut self, ticks: u32) {
        self.advance(ticks as u64 * FINE_TICK_US as u64);
    }
}
