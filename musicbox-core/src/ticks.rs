use embedded_hal::delay::DelayNs;

/// Length of one fine tick in microseconds. The tone generator's native unit.
pub const FINE_TICK_US: u32 = 8;

/// Length of one coarse tick in milliseconds
pub const COARSE_TICK_MS: u32 = 1;

/// Blocking time source used for every wait in the music box.
///
/// Implementations spin until the requested number of ticks has elapsed; there
/// is nothing else to yield to.
pub trait TickSource {
    /// Block for `ticks` × [`COARSE_TICK_MS`]
    fn wait_coarse(&mut self, ticks: u32);

    /// Block for `ticks` × [`FINE_TICK_US`]
    fn wait_fine(&mut self, ticks: u32);
}

impl<T: TickSource + ?Sized> TickSource for &mut T {
    fn wait_coarse(&mut self, ticks: u32) {
        (**self).wait_coarse(ticks)
    }

    fn wait_fine(&mut self, ticks: u32) {
        (**self).wait_fine(ticks)
    }
}

/// Converts a span in µs to whole fine ticks, truncating
pub const fn micros_to_fine_ticks(micros: u32) -> u32 {
    micros / FINE_TICK_US
}

/// Tick source backed by any `embedded-hal` delay, one delay call per tick
pub struct DelayTicks<D> {
    delay: D,
}

impl<D: DelayNs> DelayTicks<D> {
    pub fn new(delay: D) -> Self {
        Self { delay }
    }

    pub fn into_inner(self) -> D {
        self.delay
    }
}

impl<D: DelayNs> TickSource for DelayTicks<D> {
    fn wait_coarse(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.delay.delay_ms(COARSE_TICK_MS);
        }
    }

    fn wait_fine(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.delay.delay_us(FINE_TICK_US);
        }
    }
}
