use musicbox_core::{
    ticks::{COARSE_TICK_MS, FINE_TICK_US},
    TickSource,
};
use rp_pico::hal::{
    fugit::{ExtU64, MicrosDurationU64},
    watchdog::Watchdog,
    Timer,
};

/// Busy-wait tick source on the RP2040's 1MHz system timer.
///
/// Every tick spins on the free-running counter until its deadline passes and
/// then feeds the watchdog. Deadlines are chained from the start of the wait,
/// so time spent feeding the watchdog doesn't stretch the total.
pub struct HardwareTicks {
    timer: Timer,
    watchdog: Watchdog,
}

impl HardwareTicks {
    /// `watchdog` should already be started
    pub fn new(timer: Timer, watchdog: Watchdog) -> Self {
        Self { timer, watchdog }
    }

    fn spin(&mut self, ticks: u32, tick: MicrosDurationU64) {
        let mut deadline = self.timer.get_counter();

        for _ in 0..ticks {
            deadline = deadline + tick;

            while self.timer.get_counter() < deadline {}

            self.watchdog.feed();
        }
    }
}

impl TickSource for HardwareTicks {
    fn wait_coarse(&mut self, ticks: u32) {
        self.spin(ticks, (COARSE_TICK_MS as u64 * 1_000).micros());
    }

    fn wait_fine(&mut self, ticks: u32) {
        self.spin(ticks, (FINE_TICK_US as u64).micros());
    }
}
