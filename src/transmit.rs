//! Frame transmission pipeline
//!
//! One frame at a time is carried through:
//!
//! `BufferUpload` -> `TransmitTrigger` -> `BusyTransmit` -> `OutcomeCheck` -> `ReturnToReceive`
//!
//! The frame is written to the baseband TX buffer, the transmit slot drives the
//! radio to TXPREP, and the trigger starts the transmission. Completion arrives
//! from the interrupt path as a TRAC code via [`Transceiver::on_tx_done`].
//! Channel-access failures and missing acknowledgements re-enter the pipeline at
//! `BufferUpload` until the retry ceiling is reached; every other outcome is
//! terminal and returns the radio to RX before it is reported upstream.

use core::fmt;

use embedded_hal::{delay::DelayNs, digital::OutputPin};
use heapless::Vec;

use crate::{
    engine::{Completion, ContextId},
    Error, RadioCommand, RegisterAccess, Timer, Transceiver, TrxState, TxFrameLength, Upstream,
    RG_BBC0_FBTXS,
};

/// Length of the frame check sequence appended by the baseband.
pub const FCS_LEN: usize = 2;

/// Largest PSDU accepted by IEEE 802.15.4 (aMaxPhyPacketSize).
pub const MAX_PSDU_LEN: usize = 127;

/// Largest frame accepted by [`Transceiver::transmit`], FCS excluded.
pub const MAX_FRAME_LEN: usize = MAX_PSDU_LEN - FCS_LEN;

/// SLP_TR pulse width used as transmit trigger.
const TRIGGER_PULSE_US: u32 = 1;

/// Result of one transmit attempt, as reported by the TRAC status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxOutcome {
    Success,
    SuccessDataPending,
    SuccessWaitForAck,
    ChannelAccessFailure,
    NoAck,
    Invalid,
}

impl TxOutcome {
    /// Maps a raw TRAC code. Unknown codes are treated as `Invalid`.
    pub const fn from_trac(code: u8) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::SuccessDataPending,
            2 => Self::SuccessWaitForAck,
            3 => Self::ChannelAccessFailure,
            5 => Self::NoAck,
            _ => Self::Invalid,
        }
    }

    /// Channel-access failures and missing acknowledgements are worth another attempt.
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::ChannelAccessFailure | Self::NoAck)
    }

    pub const fn is_success(self) -> bool {
        matches!(
            self,
            Self::Success | Self::SuccessDataPending | Self::SuccessWaitForAck
        )
    }
}

/// Position of the in-flight frame in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxStage {
    #[default]
    Idle,
    BufferUpload,
    TransmitTrigger,
    BusyTransmit,
    OutcomeCheck,
    ReturnToReceive,
}

/// Per-outcome transmit statistics.
///
/// Every completed attempt increments exactly one counter, retries included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TracCounters {
    pub success: u64,
    pub success_data_pending: u64,
    pub success_wait_for_ack: u64,
    pub channel_access_failure: u64,
    pub no_ack: u64,
    pub invalid: u64,
}

impl TracCounters {
    pub fn record(&mut self, outcome: TxOutcome) {
        let counter = match outcome {
            TxOutcome::Success => &mut self.success,
            TxOutcome::SuccessDataPending => &mut self.success_data_pending,
            TxOutcome::SuccessWaitForAck => &mut self.success_wait_for_ack,
            TxOutcome::ChannelAccessFailure => &mut self.channel_access_failure,
            TxOutcome::NoAck => &mut self.no_ack,
            TxOutcome::Invalid => &mut self.invalid,
        };
        *counter = counter.saturating_add(1);
    }

    pub fn total(&self) -> u64 {
        self.success
            + self.success_data_pending
            + self.success_wait_for_ack
            + self.channel_access_failure
            + self.no_ack
            + self.invalid
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for TracCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SUCCESS:\t\t\t{:8}", self.success)?;
        writeln!(f, "SUCCESS_DATA_PENDING:\t\t{:8}", self.success_data_pending)?;
        writeln!(f, "SUCCESS_WAIT_FOR_ACK:\t\t{:8}", self.success_wait_for_ack)?;
        writeln!(f, "CHANNEL_ACCESS_FAILURE:\t\t{:8}", self.channel_access_failure)?;
        writeln!(f, "NO_ACK:\t\t\t\t{:8}", self.no_ack)?;
        writeln!(f, "INVALID:\t\t\t{:8}", self.invalid)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TransmitAttempt {
    pub(crate) frame: Vec<u8, MAX_FRAME_LEN>,
    pub(crate) stage: TxStage,
    pub(crate) attempts: u8,
    pub(crate) outcome: Option<TxOutcome>,
}

impl<B, P, D, T, U> Transceiver<B, P, D, T, U>
where
    B: RegisterAccess,
    P: OutputPin,
    D: DelayNs,
    T: Timer,
    U: Upstream,
{
    /// Starts transmitting `frame` (FCS excluded).
    ///
    /// Returns once the frame is queued in the pipeline; the terminal outcome
    /// is delivered through [`Upstream::on_transmit_outcome`]. A sleeping
    /// radio is woken first and stays awake.
    ///
    /// # Errors
    /// * `Error::FrameTooLong` - `frame` exceeds [`MAX_FRAME_LEN`]
    /// * `Error::Busy` - a frame is in flight or error recovery owns the radio
    /// * `Error::Faulted` - the device failed during recovery
    /// * `Error::Pin` - SLP_TR could not be driven to wake the radio
    pub fn transmit(&mut self, frame: &[u8]) -> Result<(), Error> {
        self.ensure_operational()?;
        if frame.len() > MAX_FRAME_LEN {
            return Err(Error::FrameTooLong);
        }
        if self.attempt.is_some() || self.recovery.is_some() || self.transmit.is_outstanding() {
            return Err(Error::Busy);
        }

        let frame = Vec::from_slice(frame).map_err(|_| Error::FrameTooLong)?;
        self.ensure_awake()?;
        self.attempt = Some(TransmitAttempt {
            frame,
            stage: TxStage::Idle,
            attempts: 0,
            outcome: None,
        });
        self.upload_frame();
        Ok(())
    }

    /// Reports transmit completion with the raw TRAC status code.
    ///
    /// Called from the TX-end interrupt path. Ignored unless a frame is
    /// actually on air.
    pub fn on_tx_done(&mut self, trac: u8) {
        let Some(attempt) = self.attempt.as_mut() else {
            warn!("tx done without a frame in flight");
            return;
        };
        if attempt.stage != TxStage::BusyTransmit {
            warn!("tx done in stage {}, ignored", attempt.stage);
            return;
        }

        attempt.stage = TxStage::OutcomeCheck;
        let outcome = TxOutcome::from_trac(trac);
        self.trac.record(outcome);

        if outcome.is_retryable() && attempt.attempts <= self.mac.frame_retries {
            debug!(
                "attempt {} failed with {}, retrying",
                attempt.attempts,
                outcome
            );
            self.upload_frame();
            return;
        }

        attempt.outcome = Some(outcome);
        attempt.stage = TxStage::ReturnToReceive;
        if let Err(err) =
            self.begin_transition(ContextId::Transmit, TrxState::Rx, Completion::TxComplete)
        {
            self.recover(ContextId::Transmit, err);
        }
    }

    /// Stage of the frame in flight, `Idle` if there is none.
    pub fn tx_stage(&self) -> TxStage {
        self.attempt
            .as_ref()
            .map_or(TxStage::Idle, |attempt| attempt.stage)
    }

    /// Transmit statistics since the last [`start`](Transceiver::start).
    pub fn trac(&self) -> &TracCounters {
        &self.trac
    }

    fn upload_frame(&mut self) {
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        attempt.stage = TxStage::BufferUpload;
        attempt.attempts = attempt.attempts.saturating_add(1);
        trace!(
            "uploading {} byte frame, attempt {}",
            attempt.frame.len(),
            attempt.attempts
        );

        let length = TxFrameLength {
            length: (attempt.frame.len() + FCS_LEN) as u16,
        };
        let uploaded = self
            .bus
            .write_register(length)
            .and_then(|()| self.bus.write_burst(RG_BBC0_FBTXS, &attempt.frame));
        if let Err(err) = uploaded {
            return self.recover(ContextId::Transmit, err);
        }

        attempt.stage = TxStage::TransmitTrigger;
        if let Err(err) =
            self.begin_transition(ContextId::Transmit, TrxState::TxPrep, Completion::TxTrigger)
        {
            self.recover(ContextId::Transmit, err);
        }
    }

    pub(crate) fn trigger_transmit(&mut self) {
        let triggered = match self.slp_tr.as_mut() {
            Some(pin) => {
                let pulse = pin.set_high().and_then(|()| {
                    self.delay.delay_us(TRIGGER_PULSE_US);
                    pin.set_low()
                });
                pulse.map_err(|_| Error::Pin)
            }
            None => self.bus.write_register(RadioCommand {
                command: TrxState::Tx,
            }),
        };
        if let Err(err) = triggered {
            return self.recover(ContextId::Transmit, err);
        }

        if let Some(attempt) = self.attempt.as_mut() {
            attempt.stage = TxStage::BusyTransmit;
        }
    }

    pub(crate) fn complete_transmit(&mut self) {
        let Some(attempt) = self.attempt.take() else {
            return;
        };
        // Stored before ReturnToReceive is entered
        let outcome = attempt.outcome.unwrap_or(TxOutcome::Invalid);
        debug!(
            "transmit finished with {} after {} attempts",
            outcome,
            attempt.attempts
        );
        self.upstream.on_transmit_outcome(outcome, attempt.attempts);
    }
}
