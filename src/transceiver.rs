//! Transceiver instance and lifecycle
//!
//! [`Transceiver`] owns the bus, the optional SLP_TR line and every piece of
//! driver state: both transition slots, the recovery context, the transmit
//! pipeline, the TRAC counters and the calibration deadline. There is no
//! shared or global state; each instance drives exactly one radio.
//!
//! # Lifecycle
//! 1. [`Transceiver::init`]: detect the part, force TRXOFF, sleep
//! 2. [`Transceiver::start`]: wake, clear statistics, enter RX
//! 3. [`Transceiver::transmit`] / [`Transceiver::request_transition`] while
//!    running; either wakes a sleeping radio first
//! 4. [`Transceiver::stop`]: drop the frame in flight, TRXOFF, reseed the
//!    backoff generator, sleep

use core::convert::Infallible;

use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorType, OutputPin},
};
use rand_core::RngCore;

use crate::{
    calibration::CalibrationDeadline,
    config::{Config, MacParams},
    engine::TransitionContext,
    phy::{DEFAULT_CCA_ED_LEVEL, DEFAULT_TX_POWER},
    transmit::{TracCounters, TransmitAttempt},
    Error, PartNumber, RegisterAccess, Timer, TimingTable, TrxState, Upstream, VersionNumber,
};

/// Placeholder for an unconnected SLP_TR line.
///
/// Without SLP_TR the radio never sleeps and transmissions are triggered by
/// writing the TX command.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Identification read back by [`Transceiver::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipInfo {
    pub part_number: u8,
    pub version: u8,
}

/// AT86RF215 driver instance.
///
/// Generic over the register bus `B`, the SLP_TR pin `P`, a blocking delay `D`
/// used by the synchronous paths, the one-shot [`Timer`] `T` and the
/// [`Upstream`] MAC layer `U`.
pub struct Transceiver<B, P, D, T, U> {
    pub(crate) bus: B,
    pub(crate) slp_tr: Option<P>,
    pub(crate) delay: D,
    pub(crate) timer: T,
    pub(crate) upstream: U,
    pub(crate) config: Config,
    pub(crate) timings: TimingTable,
    pub(crate) control: TransitionContext,
    pub(crate) transmit: TransitionContext,
    pub(crate) recovery: Option<TransitionContext>,
    pub(crate) timer_sequence: u32,
    pub(crate) sync_result: Option<Result<(), Error>>,
    pub(crate) attempt: Option<TransmitAttempt>,
    pub(crate) trac: TracCounters,
    pub(crate) calibration: CalibrationDeadline,
    pub(crate) mac: MacParams,
    pub(crate) tx_power: i32,
    pub(crate) cca_ed_level: i32,
    pub(crate) sleeping: bool,
    pub(crate) fault: Option<Error>,
}

impl<B, D, T, U> Transceiver<B, NoPin, D, T, U> {
    /// Creates a driver for a radio without SLP_TR wired.
    pub fn new(bus: B, delay: D, timer: T, upstream: U, config: Config) -> Self {
        Self::build(bus, None, delay, timer, upstream, config)
    }
}

impl<B, P, D, T, U> Transceiver<B, P, D, T, U> {
    /// Creates a driver using `slp_tr` for sleep control and as transmit trigger.
    pub fn with_slp_tr(bus: B, slp_tr: P, delay: D, timer: T, upstream: U, config: Config) -> Self {
        Self::build(bus, Some(slp_tr), delay, timer, upstream, config)
    }

    fn build(bus: B, slp_tr: Option<P>, delay: D, timer: T, upstream: U, config: Config) -> Self {
        Self {
            bus,
            slp_tr,
            delay,
            timer,
            upstream,
            timings: TimingTable::from(&config.timings),
            control: TransitionContext::new(),
            transmit: TransitionContext::new(),
            recovery: None,
            timer_sequence: 0,
            sync_result: None,
            attempt: None,
            trac: TracCounters::default(),
            calibration: CalibrationDeadline::new(config.calibration_interval),
            mac: MacParams::new(config.max_tx_retries),
            tx_power: DEFAULT_TX_POWER,
            cca_ed_level: DEFAULT_CCA_ED_LEVEL,
            sleeping: false,
            fault: None,
            config,
        }
    }

    /// Settle-delay table used by the transition engine.
    pub fn timings_mut(&mut self) -> &mut TimingTable {
        &mut self.timings
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mac_params(&self) -> &MacParams {
        &self.mac
    }

    /// Seed for the MAC backoff generator, refreshed by [`stop`](Transceiver::stop).
    pub fn backoff_seed(&self) -> u16 {
        self.mac.backoff_seed
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    pub fn upstream_mut(&mut self) -> &mut U {
        &mut self.upstream
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Tears the driver down, returning the bus and the SLP_TR pin.
    pub fn release(self) -> (B, Option<P>) {
        (self.bus, self.slp_tr)
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
    /// Identifies the chip, forces it off and puts it to sleep.
    ///
    /// # Errors
    /// * `Error::UnknownPart` - the part number is not an AT86RF215 variant
    /// * any error of [`blocking_transition`](Transceiver::blocking_transition)
    pub fn init(&mut self) -> Result<ChipInfo, Error> {
        let info = self.detect()?;
        self.blocking_transition(TrxState::TrxOff, self.config.sync_timeout_ms)?;
        self.sleep()?;
        Ok(info)
    }

    /// Reads and checks the part and version number.
    pub fn detect(&mut self) -> Result<ChipInfo, Error> {
        let part: PartNumber = self.bus.read_register()?;
        if !part.is_supported() {
            error!("unexpected part number {=u8:#x}", part.value);
            return Err(Error::UnknownPart(part.value));
        }
        let version: VersionNumber = self.bus.read_register()?;
        info!(
            "detected AT86RF215 part {=u8:#x} version {=u8}",
            part.value,
            version.value
        );
        Ok(ChipInfo {
            part_number: part.value,
            version: version.value,
        })
    }

    /// Wakes the radio and enters RX. Statistics are cleared.
    pub fn start(&mut self) -> Result<(), Error> {
        self.ensure_operational()?;
        self.trac.reset();
        self.awake()?;
        self.blocking_transition(TrxState::Rx, self.config.sync_timeout_ms)
    }

    /// Drops the frame in flight, forces TRXOFF, reseeds the backoff
    /// generator and sleeps.
    ///
    /// If TRXOFF cannot be reached the error is returned and the radio is
    /// left to error recovery instead of being put to sleep.
    pub fn stop<R: RngCore>(&mut self, rng: &mut R) -> Result<(), Error> {
        if self.sleeping {
            self.awake()?;
        }
        // TRXOFF ends any transmission, no TX-end will follow
        self.abandon_transmit();
        self.blocking_transition(TrxState::TrxOff, self.config.sync_timeout_ms)?;

        let mut seed = [0u8; 2];
        rng.fill_bytes(&mut seed);
        self.mac.backoff_seed = u16::from_le_bytes(seed);

        self.sleep()
    }

    /// Runs `f` with the radio awake, restoring sleep afterwards.
    pub(crate) fn with_awake<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let was_sleeping = self.sleeping;
        if was_sleeping {
            self.awake()?;
        }
        let result = f(self);
        if was_sleeping {
            let slept = self.sleep();
            return result.and_then(|value| slept.map(|()| value));
        }
        result
    }

    /// Wakes the radio for good before it is driven out of TRXOFF.
    pub(crate) fn ensure_awake(&mut self) -> Result<(), Error> {
        if self.sleeping {
            debug!("waking radio for request");
            self.awake()?;
        }
        Ok(())
    }

    /// Drives SLP_TR high. The radio must be in TRXOFF.
    pub(crate) fn sleep(&mut self) -> Result<(), Error> {
        let Some(pin) = self.slp_tr.as_mut() else {
            return Ok(());
        };
        pin.set_high().map_err(|_| Error::Pin)?;
        self.delay
            .delay_us(u32::from(self.config.timings.off_to_sleep));
        self.sleeping = true;
        trace!("sleeping");
        Ok(())
    }

    pub(crate) fn awake(&mut self) -> Result<(), Error> {
        let Some(pin) = self.slp_tr.as_mut() else {
            return Ok(());
        };
        pin.set_low().map_err(|_| Error::Pin)?;
        self.delay
            .delay_us(u32::from(self.config.timings.sleep_to_off));
        self.sleeping = false;
        trace!("awake");
        Ok(())
    }
}
