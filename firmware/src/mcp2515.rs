//! MCP2515 CAN controller over SPI.
//!
//! Transmit-only, polled driver: frames go out through transmit buffer 0 and
//! the controller's interrupts are left disabled. Bit timings assume the
//! 16 MHz crystal fitted to the common breakout boards.
//!
//! # Pins
//!
//! SPI0 at 8 MHz, mode 0:
//! - GPIO 16: MISO
//! - GPIO 17: CS
//! - GPIO 18: SCK
//! - GPIO 19: MOSI

use chair_core::{CanController, CanError, ExtendedId};
use defmt::{debug, info};
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{Operation, SpiDevice};

/// SPI instructions.
mod instruction {
    pub const RESET: u8 = 0xC0;
    pub const READ: u8 = 0x03;
    pub const WRITE: u8 = 0x02;
    pub const BIT_MODIFY: u8 = 0x05;
    pub const LOAD_TXB0: u8 = 0x40;
    pub const RTS_TXB0: u8 = 0x81;
}

/// Register addresses.
mod reg {
    pub const CANSTAT: u8 = 0x0E;
    pub const CANCTRL: u8 = 0x0F;
    pub const CNF3: u8 = 0x28;
    pub const CANINTE: u8 = 0x2B;
    pub const TXB0CTRL: u8 = 0x30;
}

const MODE_MASK: u8 = 0xE0;
const MODE_NORMAL: u8 = 0x00;
const MODE_CONFIG: u8 = 0x80;

const TXB_TXREQ: u8 = 0x08;
const TXB_TXERR: u8 = 0x10;
const TXB_MLOA: u8 = 0x20;

/// Extended identifier enable bit in SIDL.
const SIDL_EXIDE: u8 = 0x08;

/// Mode change polls before giving up.
const MODE_POLLS: u32 = 10;

/// `(CNF1, CNF2, CNF3)` for a 16 MHz crystal.
const fn bit_timing(baud: u32) -> Option<(u8, u8, u8)> {
    match baud {
        1_000_000 => Some((0x00, 0xD0, 0x82)),
        500_000 => Some((0x00, 0xF0, 0x86)),
        250_000 => Some((0x41, 0xF1, 0x85)),
        125_000 => Some((0x03, 0xF0, 0x86)),
        _ => None,
    }
}

/// Pack a 29-bit identifier into the SIDH, SIDL, EID8, EID0 registers.
fn id_registers(id: ExtendedId) -> [u8; 4] {
    let raw = id.as_raw();
    let sid = raw >> 18;
    let eid = raw & 0x3_FFFF;
    [
        (sid >> 3) as u8,
        (((sid & 0x07) as u8) << 5) | SIDL_EXIDE | ((eid >> 16) & 0x03) as u8,
        (eid >> 8) as u8,
        eid as u8,
    ]
}

/// MCP2515 on an SPI device, implementing [`CanController`].
pub struct Mcp2515<SPI, D> {
    spi: SPI,
    delay: D,
}

impl<SPI: SpiDevice, D: DelayNs> Mcp2515<SPI, D> {
    pub fn new(spi: SPI, delay: D) -> Self {
        Self { spi, delay }
    }

    fn reset(&mut self) -> Result<(), CanError> {
        self.spi
            .write(&[instruction::RESET])
            .map_err(|_| CanError::Io)?;
        // Oscillator start-up after reset
        self.delay.delay_us(100);
        Ok(())
    }

    fn read_register(&mut self, addr: u8) -> Result<u8, CanError> {
        let mut value = [0u8; 1];
        self.spi
            .transaction(&mut [
                Operation::Write(&[instruction::READ, addr]),
                Operation::Read(&mut value),
            ])
            .map_err(|_| CanError::Io)?;
        Ok(value[0])
    }

    fn write_registers(&mut self, addr: u8, values: &[u8]) -> Result<(), CanError> {
        self.spi
            .transaction(&mut [
                Operation::Write(&[instruction::WRITE, addr]),
                Operation::Write(values),
            ])
            .map_err(|_| CanError::Io)
    }

    fn modify_register(&mut self, addr: u8, mask: u8, value: u8) -> Result<(), CanError> {
        self.spi
            .write(&[instruction::BIT_MODIFY, addr, mask, value])
            .map_err(|_| CanError::Io)
    }

    fn set_mode(&mut self, mode: u8) -> Result<(), CanError> {
        self.modify_register(reg::CANCTRL, MODE_MASK, mode)?;
        for _ in 0..MODE_POLLS {
            if self.read_register(reg::CANSTAT)? & MODE_MASK == mode {
                return Ok(());
            }
            self.delay.delay_ms(1);
        }
        Err(CanError::Timeout)
    }
}

impl<SPI: SpiDevice, D: DelayNs> CanController for Mcp2515<SPI, D> {
    fn initialize(&mut self, baud: u32) -> Result<(), CanError> {
        let (cnf1, cnf2, cnf3) = bit_timing(baud).ok_or(CanError::Io)?;

        self.reset()?;
        self.set_mode(MODE_CONFIG)?;
        // CNF3, CNF2, CNF1 are consecutive registers
        self.write_registers(reg::CNF3, &[cnf3, cnf2, cnf1])?;
        // Polled operation
        self.write_registers(reg::CANINTE, &[0x00])?;
        self.set_mode(MODE_NORMAL)?;

        info!("MCP2515 in normal mode at {} bit/s", baud);
        Ok(())
    }

    fn send_frame(&mut self, id: ExtendedId, data: &[u8]) -> Result<(), CanError> {
        let ctrl = self.read_register(reg::TXB0CTRL)?;
        if ctrl & TXB_TXREQ != 0 {
            if ctrl & (TXB_TXERR | TXB_MLOA) != 0 {
                // Drop the stuck frame so the next interval can go out
                self.modify_register(reg::TXB0CTRL, TXB_TXREQ, 0)?;
                debug!("TXB0 aborted, TXB0CTRL={=u8:#x}", ctrl);
                return Err(CanError::ArbitrationLost);
            }
            return Err(CanError::BusBusy);
        }

        let len = data.len().min(8);
        let [sidh, sidl, eid8, eid0] = id_registers(id);
        let header = [instruction::LOAD_TXB0, sidh, sidl, eid8, eid0, len as u8];
        self.spi
            .transaction(&mut [
                Operation::Write(&header),
                Operation::Write(&data[..len]),
            ])
            .map_err(|_| CanError::Io)?;
        self.spi
            .write(&[instruction::RTS_TXB0])
            .map_err(|_| CanError::Io)
    }
}
