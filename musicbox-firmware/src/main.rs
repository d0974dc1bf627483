#![no_std]
#![no_main]

use defmt_rtt as _;
use panic_probe as _;
use rp_pico::{
    entry,
    hal::{
        self,
        fugit::ExtU32,
        gpio::{DynPinId, FunctionSioOutput, Pin, PullDown, PullNone},
    },
};

use hal::{clocks::init_clocks_and_plls, pac, watchdog::Watchdog, Sio};

use musicbox_core::{Keypad, MusicBox};
use musicbox_firmware::{
    keypad::OpenDrainRow, lcd::Hd44780, ticks::HardwareTicks, WATCHDOG_PERIOD_US,
};

type LcdPin = Pin<DynPinId, FunctionSioOutput, PullDown>;

#[entry]
fn main() -> ! {
    defmt::info!("Music Box v{}", env!("CARGO_PKG_VERSION"));

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

    /* Set up the keypad */

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
    let rows = rows.map(OpenDrainRow::new);

    let columns = [
        pins.gpio10.into_pull_up_input().into_dyn_pin(),
        pins.gpio11.into_pull_up_input().into_dyn_pin(),
        pins.gpio12.into_pull_up_input().into_dyn_pin(),
        pins.gpio13.into_pull_up_input().into_dyn_pin(),
    ];

    let keypad = Keypad::new(rows, columns);

    /* Set up the buzzer and the display */

    let buzzer = pins.gpio15.into_push_pull_output();

    let lcd_data: [LcdPin; 4] = [
        pins.gpio18.into_push_pull_output().into_dyn_pin(),
        pins.gpio19.into_push_pull_output().into_dyn_pin(),
        pins.gpio20.into_push_pull_output().into_dyn_pin(),
        pins.gpio21.into_push_pull_output().into_dyn_pin(),
    ];

    let display = Hd44780::new(
        pins.gpio16.into_push_pull_output().into_dyn_pin(),
        pins.gpio17.into_push_pull_output().into_dyn_pin(),
        lcd_data,
        timer,
    );

    /* Start the watchdog, it gets fed on every tick from here on */

    watchdog.pause_on_debug(true);
    watchdog.start(WATCHDOG_PERIOD_US.micros());

    let ticks = HardwareTicks::new(timer, watchdog);

    defmt::info!("Ready!");

    MusicBox::new(keypad, buzzer, display, ticks).run()
}
