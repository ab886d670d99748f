//! Common (chip-wide) registers
//!
//! This module contains the identification registers shared by both radio
//! cores. They are read once during detection to confirm that an AT86RF215
//! family device is on the bus.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister};

/// AT86RF215 part number
pub const PN_AT86RF215: u8 = 0x34;
/// AT86RF215IQ part number (I/Q radio only, no baseband)
pub const PN_AT86RF215IQ: u8 = 0x35;
/// AT86RF215M part number (sub-GHz only)
pub const PN_AT86RF215M: u8 = 0x36;

/// Part number register (address: 0x000D)
///
/// Identifies the device variant. Read-only.
#[register(0x000Du16)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct PartNumber {
    pub value: u8,
}

impl PartNumber {
    /// Returns `true` for any member of the AT86RF215 family.
    pub fn is_supported(&self) -> bool {
        matches!(
            self.value,
            PN_AT86RF215 | PN_AT86RF215IQ | PN_AT86RF215M
        )
    }
}

/// Version number register (address: 0x000E)
///
/// Silicon revision of the device. Read-only.
#[register(0x000Eu16)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct VersionNumber {
    pub value: u8,
}

impl FromByteArray for PartNumber {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl FromByteArray for VersionNumber {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}
