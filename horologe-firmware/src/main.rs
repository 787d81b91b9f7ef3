//! Horologe - Hollow Clock Firmware
//!
//! Main firmware binary for an RP2040 driving a 28BYJ-48 style stepper
//! through a ULN2003 board. The hands are walked around a 12-hour dial and
//! kept converged with the on-chip RTC.
//!
//! Pin assignments (Raspberry Pi Pico):
//!
//! | Function      | GPIO      |
//! |---------------|-----------|
//! | Console UART0 | 0 TX, 1 RX |
//! | Coils IN1-IN4 | 2, 3, 4, 5 |
//! | Buzzer        | 15        |

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::rtc::Rtc;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use horologe_core::engine::{ClockHandle, EngineParts};
use horologe_drivers::chime::Buzzer;
use horologe_drivers::stepper::Uln2003;
use horologe_hal_rp2040::flash::Rp2040FlashStorage;
use horologe_hal_rp2040::rtc::{RtcClock, SharedRtc};

use crate::store::{FlashStore, SharedStore, StoreHandle};

/// Embedded default configuration (compiled into firmware)
/// Edit clock.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../clock.toml");

mod config;
mod store;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

// Shared state referenced by both tasks
static CLOCK: StaticCell<ClockHandle> = StaticCell::new();
static RTC: StaticCell<SharedRtc> = StaticCell::new();
static STORE: StaticCell<SharedStore> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Horologe firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Settings and the last hands position from flash
    let mut flash = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    let settings = config::load_settings(&mut flash, EMBEDDED_CONFIG).await;
    info!(
        "Settings: {} steps/min, {}ms delay, flip={}, backward={}, chime={}",
        settings.steps_per_minute,
        settings.delay_time,
        settings.flip_rotation,
        settings.allow_backward,
        settings.chime
    );
    let position = config::load_position(&mut flash, &settings).await;

    let store = STORE.init(Mutex::new(RefCell::new(FlashStore::new(flash, position))));
    let store = StoreHandle::new(store);

    // The RTC does not run until the console sets the time
    let rtc = RTC.init(Mutex::new(RefCell::new(Rtc::new(p.RTC))));
    let rtc = RtcClock::new(rtc);

    let clock: &'static ClockHandle = CLOCK.init(ClockHandle::new(settings, position));

    // Setup UART for the console
    let uart_config = UartConfig::default(); // 115200 baud default

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 64]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized for the console");

    // Coils idle low until the first move
    let coils = [
        Output::new(p.PIN_2, Level::Low),
        Output::new(p.PIN_3, Level::Low),
        Output::new(p.PIN_4, Level::Low),
        Output::new(p.PIN_5, Level::Low),
    ];
    let stepper = Uln2003::new(coils, Delay);
    let chime = Buzzer::new(Output::new(p.PIN_15, Level::Low), Delay);

    info!("Stepper and buzzer initialized");

    let engine = match clock.start(EngineParts {
        stepper,
        time: rtc,
        chime,
        store,
    }) {
        Ok(engine) => engine,
        Err(e) => {
            // The handle was created just above, so this is unreachable
            error!("Failed to start clock engine: {:?}", e);
            return;
        }
    };

    // Spawn tasks
    spawner.spawn(tasks::clock_task(engine)).unwrap();
    spawner
        .spawn(tasks::console_task(rx, tx, clock, rtc, store, EMBEDDED_CONFIG))
        .unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
