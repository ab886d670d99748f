//! Register definitions for the AT86RF215
//! Generated from the AT86RF215 datasheet (DS40001876), sub-GHz core RF09 and baseband core BBC0

mod baseband;
mod common;
mod rf;

pub use baseband::*;
pub use common::*;
pub use rf::*;

/// Bit-field inside an 8-bit register, accessed with read-modify-write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SubRegister {
    /// Register address
    pub addr: u16,
    /// Field mask, already shifted into position
    pub mask: u8,
    /// Position of the least significant field bit
    pub shift: u8,
}

impl SubRegister {
    pub const fn new(addr: u16, mask: u8, shift: u8) -> Self {
        Self { addr, mask, shift }
    }

    /// Extracts the field from a full register value.
    pub const fn extract(self, register: u8) -> u8 {
        (register & self.mask) >> self.shift
    }

    /// Replaces the field inside a full register value.
    pub const fn insert(self, register: u8, value: u8) -> u8 {
        (register & !self.mask) | ((value << self.shift) & self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_insert_keeps_neighbouring_bits() {
        let pacur = SubRegister::new(0x0114, 0x60, 5);
        assert_eq!(pacur.insert(0x9F, 0b10), 0xDF);
        assert_eq!(pacur.extract(0xDF), 0b10);
    }

    #[test]
    fn field_insert_truncates_oversized_values() {
        assert_eq!(SR_RF09_PAC_TXPWR.insert(0x60, 0xFF), 0x7F);
    }
}
