//! BBC0 (sub-GHz baseband) registers
//!
//! This module contains the baseband registers used for frame transmission and
//! MAC assistance:
//! - Transmit frame length and frame buffer
//! - Frame filter (promiscuous mode)
//! - Auto mode control (CCA before TX, automatic acknowledgement)
//! - Energy detection threshold

use bitflags::bitflags;
use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// BBC0_AFC0 register address
pub const RG_BBC0_AFC0: u16 = 0x0320;
/// BBC0_AMCS register address
pub const RG_BBC0_AMCS: u16 = 0x0340;
/// Start of the BBC0 transmit frame buffer
pub const RG_BBC0_FBTXS: u16 = 0x2800;

/// Transmit frame length registers (address: 0x0306, BBC0_TXFLL / BBC0_TXFLH)
///
/// Length of the PSDU held in the transmit frame buffer, FCS included.
///
/// # Important Notes
/// - 11-bit value, only the low 3 bits of TXFLH are used
/// - Must be written before the transmit command is issued
#[register(0x0306u16)]
#[derive(Debug, Clone, Copy, WritableRegister, Default)]
pub struct TxFrameLength {
    pub length: u16,
}

bitflags! {
    /// Frame filter configuration flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FrameFilterFlags: u8 {
        /// Address filter unit 0 enable
        const AFEN0 = 1 << 0;
        /// Address filter unit 1 enable
        const AFEN1 = 1 << 1;
        /// Address filter unit 2 enable
        const AFEN2 = 1 << 2;
        /// Address filter unit 3 enable
        const AFEN3 = 1 << 3;
        /// Promiscuous mode: accept every frame with a valid FCS
        const PM = 1 << 4;
    }
}

/// Frame filter register (address: 0x0320)
///
/// # Important Notes
/// - With `PM` set, frames are accepted regardless of the address filters
/// - Automatic acknowledgement should be disabled while promiscuous
#[register(0x0320u16)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct FrameFilter {
    pub flags: FrameFilterFlags,
}

bitflags! {
    /// Auto mode configuration flags
    ///
    /// Controls the MAC-assist behaviour of the baseband core.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AutoModeFlags: u8 {
        /// Switch to RX automatically after TX
        const TX2RX = 1 << 0;
        /// Perform CCA measurement before TX
        const CCATX = 1 << 1;
        /// Use energy detection for CCA
        const CCAED = 1 << 2;
        /// Automatic acknowledgement
        const AACK = 1 << 3;
        /// Source address match for AACK
        const AACKS = 1 << 4;
        /// Data rate of the ACK frame
        const AACKDR = 1 << 5;
        /// ACK frame pending bit
        const AACKFA = 1 << 6;
        /// ACK transmit trigger
        const AACKFT = 1 << 7;
    }
}

/// Auto mode register (address: 0x0340)
///
/// See chapter 6.7 of the datasheet.
#[register(0x0340u16)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct AutoMode {
    pub flags: AutoModeFlags,
}

/// Energy detection threshold register (address: 0x0341)
///
/// A CCA reports a busy medium when the measured energy exceeds this threshold.
#[register(0x0341u16)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct EnergyThreshold {
    pub value: u8,
}

impl ToByteArray for TxFrameLength {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.length as u8, ((self.length >> 8) as u8) & 0x07])
    }
}

impl FromByteArray for FrameFilter {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: FrameFilterFlags::from_bits_retain(bytes[0]),
        })
    }
}

impl ToByteArray for FrameFilter {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.flags.bits()])
    }
}

impl FromByteArray for AutoMode {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: AutoModeFlags::from_bits_retain(bytes[0]),
        })
    }
}

impl ToByteArray for AutoMode {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.flags.bits()])
    }
}

impl FromByteArray for EnergyThreshold {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for EnergyThreshold {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}
