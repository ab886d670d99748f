//! Asynchronous state transition engine
//!
//! A state change is a chain of register exchanges separated by timed waits:
//!
//! 1. Read RF09_STATE.
//! 2. `Transition` observed: poll again after [`POLL_INTERVAL_US`].
//! 3. Target already reached: complete without writing.
//! 4. Otherwise write the target to RF09_CMD, remember the observed state as
//!    `from_state`, and arm the settle timer from the [`TimingTable`](crate::TimingTable).
//! 5. On expiry read RF09_STATE again; a mismatch is reported through
//!    [`Upstream::on_mode_mismatch`] but the transition still completes.
//!
//! Each in-flight chain lives in a `TransitionContext`. There is one context
//! per [`Slot`], reused for every request on that slot, plus a detached context
//! that only exists while error recovery runs. A context never has more than one
//! request outstanding. Instead of completion callbacks every context carries a
//! `Completion` tag which is dispatched when the target state is reached.
//!
//! Nothing in here blocks. Waits are handed to the [`Timer`] and resumed from
//! [`Transceiver::on_timer`].

use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::{
    timing::POLL_INTERVAL_US, Error, RadioCommand, RadioState, RegisterAccess, Timer, Transceiver,
    TrxState, Upstream,
};

/// Independent users of the transition engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    /// Lifecycle and monitoring transitions
    Control,
    /// Transmit sequencing
    Transmit,
}

/// Owner of a transition context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ContextId {
    Control,
    Transmit,
    /// Detached context used by error recovery
    Recovery,
}

impl ContextId {
    pub fn slot(self) -> Option<Slot> {
        match self {
            ContextId::Control => Some(Slot::Control),
            ContextId::Transmit => Some(Slot::Transmit),
            ContextId::Recovery => None,
        }
    }
}

impl From<Slot> for ContextId {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::Control => ContextId::Control,
            Slot::Transmit => ContextId::Transmit,
        }
    }
}

/// Identifies one armed timer.
///
/// Handles are unique per arming; a handle that no longer matches its context's
/// pending timer is stale and ignored by [`Transceiver::on_timer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerHandle {
    context: ContextId,
    sequence: u32,
}

impl TimerHandle {
    pub fn context(&self) -> ContextId {
        self.context
    }
}

/// What runs once a context reaches its target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum Completion {
    /// Wake the synchronous adapter
    Signal,
    /// Report to [`Upstream::on_transition_complete`]
    Notify,
    /// TXPREP reached, fire the transmit trigger
    TxTrigger,
    /// Back in RX after a transmit, report the outcome
    TxComplete,
    /// Recovery reached TRXOFF, continue to RX
    RecoveryOff,
    /// Recovery finished
    RecoveryDone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum Step {
    Idle,
    /// State read in progress
    Reading,
    /// Waiting to re-read after observing `Transition`
    Polling,
    /// Command written, waiting for the settle delay
    Settling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingTimer {
    pub(crate) handle: TimerHandle,
    pub(crate) delay_us: u32,
}

/// One in-flight state change.
#[derive(Debug, Clone)]
pub(crate) struct TransitionContext {
    pub(crate) step: Step,
    pub(crate) from_state: TrxState,
    pub(crate) to_state: TrxState,
    pub(crate) completion: Option<Completion>,
    pub(crate) timer: Option<PendingTimer>,
}

impl TransitionContext {
    pub(crate) const fn new() -> Self {
        Self {
            step: Step::Idle,
            from_state: TrxState::Nop,
            to_state: TrxState::Nop,
            completion: None,
            timer: None,
        }
    }

    pub(crate) fn is_outstanding(&self) -> bool {
        self.step != Step::Idle
    }

    fn start(&mut self, target: TrxState, completion: Completion) {
        self.step = Step::Reading;
        self.to_state = target;
        self.completion = Some(completion);
        self.timer = None;
    }

    /// Returns the context to idle, handing back the pending completion.
    pub(crate) fn abort(&mut self) -> Option<Completion> {
        self.step = Step::Idle;
        self.timer = None;
        self.completion.take()
    }
}

impl<B, P, D, T, U> Transceiver<B, P, D, T, U>
where
    B: RegisterAccess,
    P: OutputPin,
    D: DelayNs,
    T: Timer,
    U: Upstream,
{
    /// Requests a state change on `slot` without waiting for it.
    ///
    /// Completion is reported through [`Upstream::on_transition_complete`].
    /// A sleeping radio is woken first.
    ///
    /// # Errors
    /// * `Error::Busy` - the slot's previous request has not completed yet
    /// * `Error::Faulted` - the device failed during recovery
    /// * `Error::Pin` - SLP_TR could not be driven to wake the radio
    ///
    /// Transport failures during the chain are not returned here; they hand the
    /// radio over to error recovery.
    pub fn request_transition(&mut self, slot: Slot, target: TrxState) -> Result<(), Error> {
        self.ensure_operational()?;
        if self.is_pending(slot) {
            return Err(Error::Busy);
        }
        self.ensure_awake()?;
        self.begin_transition(slot.into(), target, Completion::Notify)
    }

    /// Resumes the chain that armed `handle`. Stale handles are ignored.
    pub fn on_timer(&mut self, handle: TimerHandle) {
        let id = handle.context;
        let step = match self.context_mut(id) {
            Some(ctx) if ctx.timer.map(|pending| pending.handle) == Some(handle) => {
                ctx.timer = None;
                ctx.step
            }
            _ => {
                trace!("ignoring stale timer {}", handle);
                return;
            }
        };

        match step {
            Step::Polling => self.read_state(id),
            Step::Settling => self.verify_state(id),
            Step::Idle | Step::Reading => {}
        }
    }

    /// Returns `true` while `slot` has a request outstanding.
    pub fn is_pending(&self, slot: Slot) -> bool {
        self.context(slot.into())
            .is_some_and(TransitionContext::is_outstanding)
    }

    pub(crate) fn begin_transition(
        &mut self,
        id: ContextId,
        target: TrxState,
        completion: Completion,
    ) -> Result<(), Error> {
        let ctx = self.context_mut(id).ok_or(Error::Busy)?;
        if ctx.is_outstanding() {
            return Err(Error::Busy);
        }
        ctx.start(target, completion);
        trace!("{}: requesting {}", id, target);

        self.read_state(id);
        Ok(())
    }

    pub(crate) fn context(&self, id: ContextId) -> Option<&TransitionContext> {
        match id {
            ContextId::Control => Some(&self.control),
            ContextId::Transmit => Some(&self.transmit),
            ContextId::Recovery => self.recovery.as_ref(),
        }
    }

    pub(crate) fn context_mut(&mut self, id: ContextId) -> Option<&mut TransitionContext> {
        match id {
            ContextId::Control => Some(&mut self.control),
            ContextId::Transmit => Some(&mut self.transmit),
            ContextId::Recovery => self.recovery.as_mut(),
        }
    }

    fn read_state(&mut self, id: ContextId) {
        let state = match self.bus.read_register::<RadioState>() {
            Ok(reg) => reg.state,
            Err(err) => return self.recover(id, err),
        };
        let Some(ctx) = self.context_mut(id) else {
            return;
        };

        if state == TrxState::Transition {
            ctx.step = Step::Polling;
            self.arm_timer(id, POLL_INTERVAL_US);
            return;
        }

        if state == ctx.to_state {
            self.finish(id);
            return;
        }

        ctx.from_state = state;
        let target = ctx.to_state;
        if let Err(err) = self.bus.write_register(RadioCommand { command: target }) {
            return self.recover(id, err);
        }

        let delay_us = self.timings.settle_delay(state, target);
        trace!("{}: {} -> {}, settling {} us", id, state, target, delay_us);
        if let Some(ctx) = self.context_mut(id) {
            ctx.step = Step::Settling;
        }
        self.arm_timer(id, delay_us);
    }

    fn verify_state(&mut self, id: ContextId) {
        let actual = match self.bus.read_register::<RadioState>() {
            Ok(reg) => reg.state,
            Err(err) => return self.recover(id, err),
        };
        let Some(ctx) = self.context(id) else {
            return;
        };
        let (from, expected) = (ctx.from_state, ctx.to_state);

        // Reported, not enforced: the chain completes as dispatched.
        if actual != expected {
            warn!(
                "unexpected state change from {} to {}, actual state {}",
                from,
                expected,
                actual
            );
            self.upstream.on_mode_mismatch(expected, actual);
        }
        self.finish(id);
    }

    fn arm_timer(&mut self, id: ContextId, delay_us: u32) {
        self.timer_sequence = self.timer_sequence.wrapping_add(1);
        let handle = TimerHandle {
            context: id,
            sequence: self.timer_sequence,
        };
        if let Some(ctx) = self.context_mut(id) {
            ctx.timer = Some(PendingTimer { handle, delay_us });
        }
        self.timer.schedule(handle, delay_us);
    }

    fn finish(&mut self, id: ContextId) {
        let Some(ctx) = self.context_mut(id) else {
            return;
        };
        let reached = ctx.to_state;
        if let Some(completion) = ctx.abort() {
            self.dispatch(id, completion, reached);
        }
    }

    fn dispatch(&mut self, id: ContextId, completion: Completion, reached: TrxState) {
        match completion {
            Completion::Signal => self.sync_result = Some(Ok(())),
            Completion::Notify => {
                if let Some(slot) = id.slot() {
                    self.upstream.on_transition_complete(slot, reached);
                }
            }
            Completion::TxTrigger => self.trigger_transmit(),
            Completion::TxComplete => self.complete_transmit(),
            Completion::RecoveryOff => self.resume_recovery(),
            Completion::RecoveryDone => self.finish_recovery(),
        }
    }
}
