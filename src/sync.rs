//! Synchronous transition adapter
//!
//! Lifecycle operations (init, start, stop) need to wait for a state change.
//! The adapter runs a normal control-slot transition and drives its timers
//! itself with the blocking delay, bounded by a timeout. On expiry the
//! transition is abandoned and handed to error recovery exactly once.

use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::{
    engine::{Completion, ContextId},
    Error, RegisterAccess, Timer, Transceiver, TrxState, Upstream,
};

impl<B, P, D, T, U> Transceiver<B, P, D, T, U>
where
    B: RegisterAccess,
    P: OutputPin,
    D: DelayNs,
    T: Timer,
    U: Upstream,
{
    /// Moves the radio to `target` on the control slot and waits for it.
    ///
    /// Timers armed by the chain are consumed by this call; the external
    /// [`Timer`] still sees them scheduled and later expiries are ignored as
    /// stale.
    ///
    /// # Errors
    /// * `Error::TimedOut` - not completed within `timeout_ms`; recovery was started
    /// * `Error::Bus` / `Error::Deserialization` - transfer failed; recovery was started
    /// * `Error::Busy` - the control slot has a request outstanding
    /// * `Error::Faulted` - the device failed during recovery
    pub fn blocking_transition(&mut self, target: TrxState, timeout_ms: u32) -> Result<(), Error> {
        self.ensure_operational()?;
        self.sync_result = None;
        self.begin_transition(ContextId::Control, target, Completion::Signal)?;

        let budget_us = timeout_ms.saturating_mul(1000);
        let mut waited_us: u32 = 0;
        loop {
            if let Some(result) = self.sync_result.take() {
                return result;
            }
            let Some(pending) = self.control.timer else {
                break;
            };
            let elapsed = waited_us.saturating_add(pending.delay_us);
            if elapsed > budget_us {
                break;
            }
            self.delay.delay_us(pending.delay_us);
            waited_us = elapsed;
            self.on_timer(pending.handle);
        }

        warn!("transition to {} timed out after {} ms", target, timeout_ms);
        self.recover(ContextId::Control, Error::TimedOut);
        self.sync_result = None;
        Err(Error::TimedOut)
    }
}
