//! Collaborator interfaces
//!
//! The transition engine talks to the outside world through three seams:
//! - [`RegisterAccess`]: synchronous register and frame buffer I/O
//! - [`Timer`]: one-shot timers and a monotonic clock
//! - [`Upstream`]: notifications for the MAC layer above the driver

use core::time::Duration;

use regiface::{ByteArray, ReadableRegister, WritableRegister};

use crate::{
    engine::{Slot, TimerHandle},
    registers::SubRegister,
    transmit::TxOutcome,
    Error, TrxState,
};

/// Register access to the transceiver.
///
/// Implementors provide burst reads and writes starting at a register address;
/// single registers, bit-fields and typed [`regiface`] registers are built on
/// top of those.
pub trait RegisterAccess {
    /// Reads `bytes.len()` consecutive registers starting at `addr`.
    fn read_burst(&mut self, addr: u16, bytes: &mut [u8]) -> Result<(), Error>;

    /// Writes `bytes` to consecutive registers starting at `addr`.
    fn write_burst(&mut self, addr: u16, bytes: &[u8]) -> Result<(), Error>;

    fn read(&mut self, addr: u16) -> Result<u8, Error> {
        let mut value = [0u8];
        self.read_burst(addr, &mut value)?;
        Ok(value[0])
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), Error> {
        self.write_burst(addr, &[value])
    }

    fn read_field(&mut self, field: SubRegister) -> Result<u8, Error> {
        self.read(field.addr).map(|value| field.extract(value))
    }

    /// Read-modify-write of a bit-field.
    fn write_field(&mut self, field: SubRegister, value: u8) -> Result<(), Error> {
        let current = self.read(field.addr)?;
        self.write(field.addr, field.insert(current, value))
    }

    /// Reads a typed register.
    ///
    /// # Errors
    /// * `Error::Bus` - transfer failed
    /// * `Error::Deserialization` - register value could not be parsed
    fn read_register<R>(&mut self) -> Result<R, Error>
    where
        R: ReadableRegister<IdType = u16>,
    {
        let mut raw_value = R::Array::new();
        self.read_burst(R::id(), raw_value.as_mut())?;
        R::from_bytes(raw_value).map_err(|_| Error::Deserialization)
    }

    /// Writes a typed register.
    fn write_register<R>(&mut self, register: R) -> Result<(), Error>
    where
        R: WritableRegister<IdType = u16>,
    {
        let raw_value = register.to_bytes().map_err(|_| Error::InvalidArgument)?;
        self.write_burst(R::id(), raw_value.as_ref())
    }
}

/// One-shot timers and monotonic time.
///
/// `schedule` must not call back synchronously; expiry is reported later by
/// handing the same handle to [`Transceiver::on_timer`](crate::Transceiver::on_timer)
/// from the thread that owns the transceiver.
pub trait Timer {
    /// Monotonic time since an arbitrary epoch.
    fn now(&self) -> Duration;

    /// Arms a one-shot timer firing after `delay_us` microseconds.
    fn schedule(&mut self, handle: TimerHandle, delay_us: u32);
}

/// Notifications delivered to the layer above the driver.
pub trait Upstream {
    /// A transmit request reached its terminal outcome and the radio is back in RX.
    fn on_transmit_outcome(&mut self, outcome: TxOutcome, attempts: u8);

    /// Post-settle verification read back a different state than requested.
    fn on_mode_mismatch(&mut self, expected: TrxState, actual: TrxState) {
        let _ = (expected, actual);
    }

    /// A transition requested through
    /// [`Transceiver::request_transition`](crate::Transceiver::request_transition) completed.
    fn on_transition_complete(&mut self, slot: Slot, state: TrxState) {
        let _ = (slot, state);
    }

    /// The in-flight frame was dropped because error recovery took over the radio.
    fn on_transmit_aborted(&mut self, attempts: u8) {
        let _ = attempts;
    }

    /// Error recovery brought the radio back to RX; the transmit queue may resume.
    fn on_recovered(&mut self) {}

    /// Error recovery failed; the device instance is no longer usable.
    fn on_fault(&mut self, error: Error) {
        let _ = error;
    }
}
