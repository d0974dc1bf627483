use core::convert::Infallible;

use embedded_hal::{delay::DelayNs, digital::OutputPin};
use musicbox_core::{display::LINE_WIDTH, SongTitle, TitleDisplay};

use crate::macros::delay_cycles;

const CLEAR_DISPLAY: u8 = 0x01;
const ENTRY_MODE_INCREMENT: u8 = 0x06;
const DISPLAY_ON_CURSOR_OFF: u8 = 0x0C;
const FUNCTION_SET_4BIT_2LINE: u8 = 0x28;
const SET_DDRAM_ADDRESS: u8 = 0x80;

/// DDRAM address of the first character of each line
const LINE_ADDRESS: [u8; 2] = [0x00, 0x40];

/// HD44780 character LCD (16x2) driven over its 4-bit parallel interface.
///
/// RW is tied to ground, so the busy flag can't be read and every command
/// waits out its worst case execution time instead.
///
/// https://www.sparkfun.com/datasheets/LCD/HD44780.pdf
pub struct Hd44780<P, D> {
    register_select: P,
    enable: P,
    data: [P; 4],
    delay: D,
}

impl<P, D> Hd44780<P, D>
where
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    /// Runs the power-on initialization sequence. Leaves the display cleared,
    /// on, and with the cursor hidden.
    pub fn new(register_select: P, enable: P, data: [P; 4], delay: D) -> Self {
        let mut lcd = Self {
            register_select,
            enable,
            data,
            delay,
        };

        lcd.register_select.set_low().unwrap();
        lcd.enable.set_low().unwrap();

        // Vcc rise time
        lcd.delay.delay_ms(50);

        // Force 8-bit mode three times so the controller is in a known state,
        // whatever nibble it was waiting for, then switch to 4-bit
        lcd.write_nibble(0x3);
        lcd.delay.delay_us(4_500);
        lcd.write_nibble(0x3);
        lcd.delay.delay_us(150);
        lcd.write_nibble(0x3);
        lcd.delay.delay_us(150);
        lcd.write_nibble(0x2);
        lcd.delay.delay_us(150);

        lcd.command(FUNCTION_SET_4BIT_2LINE);
        lcd.command(DISPLAY_ON_CURSOR_OFF);
        lcd.clear();
        lcd.command(ENTRY_MODE_INCREMENT);

        lcd
    }

    #[inline]
    fn pulse_enable(&mut self) {
        self.enable.set_high().unwrap();
        // PWeh >= 450ns
        delay_cycles!(64);
        self.enable.set_low().unwrap();
        delay_cycles!(64);
    }

    fn write_nibble(&mut self, nibble: u8) {
        for (bit, pin) in self.data.iter_mut().enumerate() {
            pin.set_state(((nibble >> bit) & 1 == 1).into()).unwrap();
        }

        self.pulse_enable();
    }

    fn write_byte(&mut self, byte: u8, is_data: bool) {
        self.register_select.set_state(is_data.into()).unwrap();

        self.write_nibble(byte >> 4);
        self.write_nibble(byte & 0x0F);

        // Execution time for everything except clear/home
        self.delay.delay_us(50);
    }

    pub fn command(&mut self, command: u8) {
        self.write_byte(command, false);
    }

    pub fn clear(&mut self) {
        self.command(CLEAR_DISPLAY);
        self.delay.delay_us(2_000);
    }

    /// Moves the cursor to `column` of `line` (0 or 1)
    pub fn set_position(&mut self, line: usize, column: usize) {
        let address = LINE_ADDRESS[line.min(1)] + column.min(LINE_WIDTH - 1) as u8;
        self.command(SET_DDRAM_ADDRESS | address);
    }

    /// Writes at the cursor, cut to the line width. Anything outside printable
    /// ASCII shows as `?`.
    pub fn write_str(&mut self, text: &str) {
        for c in text.chars().take(LINE_WIDTH) {
            let byte = if c.is_ascii_graphic() || c == ' ' {
                c as u8
            } else {
                b'?'
            };

            self.write_byte(byte, true);
        }
    }

    pub fn show_lines(&mut self, top: &str, bottom: &str) {
        self.clear();
        self.set_position(0, 0);
        self.write_str(top);
        self.set_position(1, 0);
        self.write_str(bottom);
    }
}

impl<P, D> TitleDisplay for Hd44780<P, D>
where
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    fn show_title(&mut self, title: &SongTitle) {
        defmt::debug!("display: {} / {}", title.top, title.bottom);
        self.show_lines(title.top, title.bottom);
    }
}
