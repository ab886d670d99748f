//! Error recovery
//!
//! Any transport failure or timeout inside a transition chain releases the
//! failing context and hands the radio to a detached recovery context, which
//! forces TRXOFF and then returns to RX. The failing slot is immediately free
//! for new requests. The in-flight frame, if any, is dropped.
//!
//! Recovery runs at most once at a time. A failure of the recovery context
//! itself is fatal: the device is marked faulted and every further request is
//! rejected with [`Error::Faulted`].

use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::{
    engine::{Completion, ContextId, TransitionContext},
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
    /// Returns `true` while error recovery owns the radio.
    pub fn is_recovering(&self) -> bool {
        self.recovery.is_some()
    }

    /// Returns `true` once recovery has failed.
    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    pub(crate) fn ensure_operational(&self) -> Result<(), Error> {
        match self.fault {
            Some(_) => Err(Error::Faulted),
            None => Ok(()),
        }
    }

    pub(crate) fn recover(&mut self, id: ContextId, err: Error) {
        error!("{} transition failed: {}", id, err);

        if id == ContextId::Recovery {
            self.recovery = None;
            self.abandon_transmit();
            error!("error recovery failed, device faulted");
            self.fault = Some(err);
            self.upstream.on_fault(err);
            return;
        }

        self.release_context(id, err);
        self.abandon_transmit();

        if self.recovery.is_some() {
            debug!("recovery already running");
            return;
        }
        if self.fault.is_some() {
            return;
        }

        warn!("forcing radio off for recovery");
        self.recovery = Some(TransitionContext::new());
        // Freshly created, cannot be busy
        let _ = self.begin_transition(
            ContextId::Recovery,
            TrxState::TrxOff,
            Completion::RecoveryOff,
        );
    }

    pub(crate) fn resume_recovery(&mut self) {
        let _ = self.begin_transition(
            ContextId::Recovery,
            TrxState::Rx,
            Completion::RecoveryDone,
        );
    }

    pub(crate) fn finish_recovery(&mut self) {
        self.recovery = None;
        info!("recovered, radio back in RX");
        self.upstream.on_recovered();
    }

    fn release_context(&mut self, id: ContextId, err: Error) {
        let Some(ctx) = self.context_mut(id) else {
            return;
        };
        if ctx.abort() == Some(Completion::Signal) {
            self.sync_result = Some(Err(err));
        }
    }

    pub(crate) fn abandon_transmit(&mut self) {
        if let Some(attempt) = self.attempt.take() {
            self.transmit.abort();
            warn!(
                "dropping frame in stage {} after {} attempts",
                attempt.stage,
                attempt.attempts
            );
            self.upstream.on_transmit_aborted(attempt.attempts);
        }
    }
}
