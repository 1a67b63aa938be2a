#![no_std]
#![no_main]

use core::cell::RefCell;

use chair_can_bridge::{
    AdcInput, ChairBridge, Clock, EmbassyClock, Mcp2515, UartDebugSink, CONFIG, DEBUG_BAUD,
    PROFILE,
};
use defmt::{error, info};
use defmt_rtt as _;
use embassy_embedded_hal::shared_bus::blocking::spi::SpiDevice;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig};
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Level, Output, Pull};
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{self, Config as SpiConfig, Spi};
use embassy_rp::uart::{Config as UartConfig, UartTx};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Delay, Timer};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

#[link_section = ".bi_entries"]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"chair-can-bridge"),
    embassy_rp::binary_info::rp_program_description!(
        c"Chair button box / joystick to J1939 CAN bridge"
    ),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

/// MCP2515 SPI clock (the controller is rated to 10 MHz).
const CAN_SPI_FREQUENCY: u32 = 8_000_000;

type SpiBus = Spi<'static, SPI0, spi::Blocking>;

/// SPI bus shared with the MCP2515 chip select.
static SPI_BUS: StaticCell<Mutex<NoopRawMutex, RefCell<SpiBus>>> = StaticCell::new();

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Chair CAN bridge starting ({:?})...", PROFILE);

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- Analog inputs A0-A4 ---
    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let input = AdcInput::new(
        adc,
        [
            Channel::new_pin(p.PIN_40, Pull::None),
            Channel::new_pin(p.PIN_41, Pull::None),
            Channel::new_pin(p.PIN_42, Pull::None),
            Channel::new_pin(p.PIN_43, Pull::None),
            Channel::new_pin(p.PIN_44, Pull::None),
        ],
    );

    // --- MCP2515 on SPI0 ---
    let mut spi_config = SpiConfig::default();
    spi_config.frequency = CAN_SPI_FREQUENCY;
    let spi = Spi::new_blocking(
        p.SPI0,
        p.PIN_18, // SCK
        p.PIN_19, // MOSI
        p.PIN_16, // MISO
        spi_config,
    );
    let bus = SPI_BUS.init(Mutex::new(RefCell::new(spi)));
    let cs = Output::new(p.PIN_17, Level::High);
    let can = Mcp2515::new(SpiDevice::new(bus, cs), Delay);

    // --- Debug console ---
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = DEBUG_BAUD;
    let debug = UartDebugSink::new(UartTx::new_blocking(p.UART0, p.PIN_0, uart_config));

    // Status LED
    let mut led = Output::new(p.PIN_25, Level::Low);

    let clock = EmbassyClock;
    match ChairBridge::start(&CONFIG, input, can, debug, clock.now_ms()) {
        Ok(mut bridge) => {
            info!("Chair CAN bridge running");
            led.set_high();
            bridge.run(&clock).await
        }
        Err(e) => {
            // No frame is ever sent after a failed startup
            error!("Startup failed: {:?}", e);
            loop {
                led.toggle();
                Timer::after_millis(250).await;
            }
        }
    }
}
