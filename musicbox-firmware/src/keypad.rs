use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use rp_pico::hal::gpio::{DynPinId, FunctionSioOutput, OutputEnableOverride, Pin, PullNone};

/// Keypad row wired open-drain.
///
/// The output latch is held low and only the output enable changes: driving
/// the row low enables the output, releasing it high disables the output so
/// the line floats and the column pull-ups win.
pub struct OpenDrainRow(Pin<DynPinId, FunctionSioOutput, PullNone>);

impl OpenDrainRow {
    /// Starts out released
    pub fn new(mut pin: Pin<DynPinId, FunctionSioOutput, PullNone>) -> Self {
        pin.set_low().unwrap();
        pin.set_output_enable_override(OutputEnableOverride::Disable);

        Self(pin)
    }
}

impl ErrorType for OpenDrainRow {
    type Error = Infallible;
}

impl OutputPin for OpenDrainRow {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_output_enable_override(OutputEnableOverride::Enable);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_output_enable_override(OutputEnableOverride::Disable);
        Ok(())
    }
}
