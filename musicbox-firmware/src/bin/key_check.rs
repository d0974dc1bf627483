//! Wiring check: shows every key pressed on the LCD and chirps the buzzer
//! with a short note whose pitch follows the key index.

#![no_std]
#![no_main]

use core::fmt::Write;

use defmt::info;
use defmt_rtt as _;
use heapless::String;
use panic_probe as _;
use rp_pico::{
    entry,
    hal::{self, fugit::ExtU32, gpio::PullNone},
};

use hal::{clocks::init_clocks_and_plls, pac, watchdog::Watchdog, Sio};

use musicbox_core::{
    play_note, DerivedPeriods, Duration, FrequencyBand, KeySource, Keypad, Note, PlayingNote,
    TempoBand, TickSource,
};
use musicbox_firmware::{
    keypad::OpenDrainRow, lcd::Hd44780, ticks::HardwareTicks, WATCHDOG_PERIOD_US,
};

#[entry]
fn main() -> ! {
    info!("Music Box key check v{}", env!("CARGO_PKG_VERSION"));

    let mut pac = pac::Peripherals::take().unwrap();
    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    let sio = Sio::new(pac.SIO);

    let clocks = init_clocks_and_plls(
        rp_pico::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    let timer = hal::Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

    let pins = hal::gpio::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let rows = [
        pins.gpio6
            .into_push_pull_output()
            .into_pull_type::<PullNone>()
            .into_dyn_pin(),
        pins.gpio7
            .into_push_pull_output()
            .into_pull_type::<PullNone>()
            .into_dyn_pin(),
        pins.gpio8
            .into_push_pull_output()
            .into_pull_type::<PullNone>()
            .into_dyn_pin(),
        pins.gpio9
            .into_push_pull_output()
            .into_pull_type::<PullNone>()
            .into_dyn_pin(),
    ];

    let mut keypad = Keypad::new(
        rows.map(OpenDrainRow::new),
        [
            pins.gpio10.into_pull_up_input().into_dyn_pin(),
            pins.gpio11.into_pull_up_input().into_dyn_pin(),
            pins.gpio12.into_pull_up_input().into_dyn_pin(),
            pins.gpio13.into_pull_up_input().into_dyn_pin(),
        ],
    );

    let mut buzzer = pins.gpio15.into_push_pull_output();

    let mut lcd = Hd44780::new(
        pins.gpio16.into_push_pull_output().into_dyn_pin(),
        pins.gpio17.into_push_pull_output().into_dyn_pin(),
        [
            pins.gpio18.into_push_pull_output().into_dyn_pin(),
            pins.gpio19.into_push_pull_output().into_dyn_pin(),
            pins.gpio20.into_push_pull_output().into_dyn_pin(),
            pins.gpio21.into_push_pull_output().into_dyn_pin(),
        ],
        timer,
    );

    lcd.show_lines("Key check", "press any key");

    watchdog.pause_on_debug(true);
    watchdog.start(WATCHDOG_PERIOD_US.micros());

    let mut ticks = HardwareTicks::new(timer, watchdog);
    let periods = DerivedPeriods::from(FrequencyBand::Mid);

    loop {
        let Some(key) = keypad.scan(&mut ticks) else {
            ticks.wait_coarse(10);
            continue;
        };

        let (row, column) = key.position();
        info!("key {} (index {}, row {}, column {})", key.symbol(), key.index(), row, column);

        let mut top: String<16> = String::new();
        let mut bottom: String<16> = String::new();
        let _ = write!(top, "Key {}", key.symbol());
        let _ = write!(bottom, "idx {} r{} c{}", key.index(), row, column);
        lcd.show_lines(&top, &bottom);

        let pitch = Note::PITCHES[(key.index() as usize - 1) % Note::PITCH_COUNT];
        play_note(
            PlayingNote::new(pitch, Duration::Eighth),
            TempoBand::Normal.table(),
            &periods,
            &mut buzzer,
            &mut ticks,
        );

        while keypad.scan(&mut ticks).is_some() {
            ticks.wait_coarse(10);
        }
    }
}
