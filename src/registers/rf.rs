//! RF09 (sub-GHz) radio core registers
//!
//! This module contains registers of the sub-GHz transceiver core including:
//! - Radio state readback and state commands
//! - Channel selection
//! - Power amplifier output level
//!
//! State changes are requested through [`RadioCommand`] and observed through
//! [`RadioState`]. The two registers use the same 3-bit encoding, captured by
//! [`TrxState`].

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

use super::SubRegister;

/// RF09_STATE register address
pub const RG_RF09_STATE: u16 = 0x0102;
/// RF09_CMD register address
pub const RG_RF09_CMD: u16 = 0x0103;
/// RF09_PAC register address
pub const RG_RF09_PAC: u16 = 0x0114;

/// Mask of the state / command field
pub const TRX_STATE_MASK: u8 = 0x07;

/// Radio state field of RF09_STATE
pub const SR_RF09_STATE: SubRegister = SubRegister::new(RG_RF09_STATE, TRX_STATE_MASK, 0);
/// Transmit output power field of RF09_PAC
pub const SR_RF09_PAC_TXPWR: SubRegister = SubRegister::new(RG_RF09_PAC, 0x1F, 0);

/// Transceiver state (TRX state)
///
/// Encoding shared by the state readback and the command register. The
/// hardware is the source of truth; software only caches it inside an
/// in-flight transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrxState {
    /// No operation / idle command
    Nop = 0x0,
    /// Deep sleep, register access gated
    Sleep = 0x1,
    /// Transceiver off, crystal running
    TrxOff = 0x2,
    /// Transmit preparation, PLL locked
    TxPrep = 0x3,
    /// Busy transmitting
    Tx = 0x4,
    /// Receive
    Rx = 0x5,
    /// Internal state change in progress
    Transition = 0x6,
    /// Reset
    Reset = 0x7,
}

impl TrxState {
    /// Decodes the 3-bit state field; bits above the field are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & TRX_STATE_MASK {
            0x0 => Self::Nop,
            0x1 => Self::Sleep,
            0x2 => Self::TrxOff,
            0x3 => Self::TxPrep,
            0x4 => Self::Tx,
            0x5 => Self::Rx,
            0x6 => Self::Transition,
            _ => Self::Reset,
        }
    }

    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Radio state register (address: 0x0102)
///
/// Reports the current state of the RF09 state machine.
///
/// # Important Notes
/// - Reads `Transition` while the chip is still executing a state change
/// - The state must be polled again until a terminal state is observed
#[register(0x0102u16)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct RadioState {
    pub state: TrxState,
}

/// Radio command register (address: 0x0103)
///
/// Writing a state value requests the corresponding state change. The new state
/// is only guaranteed to be observable after the transition's settle time.
///
/// # Important Notes
/// - `TrxOff` aborts any ongoing receive or transmit unconditionally
/// - `Tx` is only accepted from `TxPrep`
#[register(0x0103u16)]
#[derive(Debug, Clone, Copy, WritableRegister)]
pub struct RadioCommand {
    pub command: TrxState,
}

/// Channel number registers (address: 0x0107, RF09_CNL / RF09_CNM)
///
/// Writing RF09_CNM applies the new channel, so both bytes are always written
/// together, low byte first.
#[register(0x0107u16)]
#[derive(Debug, Clone, Copy, WritableRegister, Default)]
pub struct ChannelNumber {
    /// 9-bit channel number
    pub channel: u16,
}

impl FromByteArray for RadioState {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            state: TrxState::from_bits(bytes[0]),
        })
    }
}

impl ToByteArray for RadioCommand {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.command.bits()])
    }
}

impl ToByteArray for ChannelNumber {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        // CNM.CM = 0: IEEE-compliant channel scheme
        Ok([self.channel as u8, ((self.channel >> 8) as u8) & 0x01])
    }
}
