//! Driver error type

use core::fmt;

/// Errors reported by the driver.
///
/// Transport failures (`Bus`, `Pin`) and `TimedOut` are also what the
/// transition engine hands to error recovery; callers of the asynchronous
/// paths only ever observe them through [`Upstream`](crate::Upstream).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// SPI transaction with the radio failed
    Bus,
    /// Register contents could not be decoded
    Deserialization,
    /// The SLP_TR line could not be driven
    Pin,
    /// A synchronous state change did not complete within its bound
    TimedOut,
    /// The slot or pipeline already has a request outstanding
    Busy,
    /// Frame exceeds the link-layer maximum
    FrameTooLong,
    /// Value is not supported by the transceiver
    InvalidArgument,
    /// Part number read back from the chip is not an AT86RF215 variant
    UnknownPart(u8),
    /// Recovery itself failed; the device instance must be torn down
    Faulted,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus => f.write_str("bus transfer failed"),
            Error::Deserialization => f.write_str("register value could not be decoded"),
            Error::Pin => f.write_str("SLP_TR pin error"),
            Error::TimedOut => f.write_str("state change timed out"),
            Error::Busy => f.write_str("request already outstanding"),
            Error::FrameTooLong => f.write_str("frame too long"),
            Error::InvalidArgument => f.write_str("unsupported value"),
            Error::UnknownPart(pn) => write!(f, "unknown part number {:#04x}", pn),
            Error::Faulted => f.write_str("device faulted"),
        }
    }
}
