//! AT86RF215 SPI Device Interface
//!
//! This module provides the bus-level interface for the AT86RF215 through SPI
//! communication. Every access starts with a 16-bit command header:
//!
//! | bit 15 | bit 14 | bits 13:0 |
//! |--------|--------|-----------|
//! | 1 = write, 0 = read | reserved (0) | register address |
//!
//! followed by one or more data bytes. The address auto-increments, so a burst
//! covers consecutive registers or the frame buffer.
//!
//! # Example
//! ```no_run
//! use at86rf215::{Device, RegisterAccess, PartNumber};
//!
//! fn part<SPI: embedded_hal::spi::SpiDevice>(spi: SPI) -> Result<u8, at86rf215::Error> {
//!     let mut device = Device::new(spi);
//!     let pn: PartNumber = device.read_register()?;
//!     Ok(pn.value)
//! }
//! ```

use regiface::errors::Error as RegifaceError;

use crate::{Error, RegisterAccess};

const CMD_WRITE: u8 = 0x80;
const CMD_ADDR_MSB: u8 = 0x3F;

/// Bus interface for the AT86RF215 radio.
///
/// This struct wraps an SPI device and implements [`RegisterAccess`] on top of it.
pub struct Device<SPI> {
    spi: SPI,
}

impl<SPI> Device<SPI> {
    /// Creates a new Device instance wrapping the provided SPI interface.
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Releases the underlying SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

fn header(addr: u16, write: bool) -> [u8; 2] {
    let [msb, lsb] = addr.to_be_bytes();
    let msb = msb & CMD_ADDR_MSB;
    [if write { msb | CMD_WRITE } else { msb }, lsb]
}

impl<SPI> Device<SPI>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    /// Reads consecutive registers starting at `addr`.
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    pub fn read_bytes(&mut self, addr: u16, bytes: &mut [u8]) -> Result<(), RegifaceError> {
        let header = header(addr, false);

        self.spi
            .transaction(&mut [
                embedded_hal::spi::Operation::Write(header.as_slice()),
                embedded_hal::spi::Operation::Read(bytes),
            ])
            .map_err(|_| RegifaceError::BusError)
    }

    /// Writes consecutive registers starting at `addr`.
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    pub fn write_bytes(&mut self, addr: u16, bytes: &[u8]) -> Result<(), RegifaceError> {
        let header = header(addr, true);

        self.spi
            .transaction(&mut [
                embedded_hal::spi::Operation::Write(header.as_slice()),
                embedded_hal::spi::Operation::Write(bytes),
            ])
            .map_err(|_| RegifaceError::BusError)
    }
}

impl<SPI> RegisterAccess for Device<SPI>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    fn read_burst(&mut self, addr: u16, bytes: &mut [u8]) -> Result<(), Error> {
        self.read_bytes(addr, bytes).map_err(|_| Error::Bus)
    }

    fn write_burst(&mut self, addr: u16, bytes: &[u8]) -> Result<(), Error> {
        self.write_bytes(addr, bytes).map_err(|_| Error::Bus)
    }
}
