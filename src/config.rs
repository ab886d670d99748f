//! Driver configuration

use core::time::Duration;

use crate::{timing::ChipTimings, Error};

/// Retries of a transmit attempt after channel-access failure or missing ACK.
///
/// Mirrors macMaxFrameRetries of IEEE 802.15.4.
pub const MAX_TX_RETRIES: u8 = 7;

/// Bound on a synchronous state change.
pub const SYNC_TIMEOUT_MS: u32 = 100;

/// Recommended interval between PLL recalibrations.
pub const CALIBRATION_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Driver configuration.
///
/// # Example
/// ```
/// use at86rf215::Config;
///
/// let config = Config {
///     sync_timeout_ms: 50,
///     ..Config::default()
/// };
/// assert_eq!(config.max_tx_retries, 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Chip timing characteristics; also seeds the settle-delay table
    pub timings: ChipTimings,
    /// Bound on synchronous state changes (start, stop, init)
    pub sync_timeout_ms: u32,
    /// Initial transmit retry ceiling, 0..=7
    pub max_tx_retries: u8,
    /// Time after a channel change until recalibration is due
    pub calibration_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timings: ChipTimings::default(),
            sync_timeout_ms: SYNC_TIMEOUT_MS,
            max_tx_retries: MAX_TX_RETRIES,
            calibration_interval: CALIBRATION_INTERVAL,
        }
    }
}

/// CSMA-CA parameters
///
/// The AT86RF215 baseband has no CSMA-CA engine; the MAC layer reads these back
/// to run its own backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CsmaParams {
    /// Minimum backoff exponent, 0..=max_be
    pub min_be: u8,
    /// Maximum backoff exponent, 3..=8
    pub max_be: u8,
    /// Maximum CSMA backoffs, 0..=5
    pub retries: u8,
}

impl CsmaParams {
    /// Checks the ranges allowed by IEEE 802.15.4.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_be < 3 || self.max_be > 8 || self.min_be > self.max_be || self.retries > 5 {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }
}

impl Default for CsmaParams {
    fn default() -> Self {
        Self {
            min_be: 3,
            max_be: 5,
            retries: 4,
        }
    }
}

/// MAC-level settings held by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacParams {
    pub csma: CsmaParams,
    /// Transmit retry ceiling after channel-access failure or missing ACK
    pub frame_retries: u8,
    /// Listen-before-talk
    pub lbt: bool,
    /// Seed for the MAC backoff generator, re-randomised on every stop
    pub backoff_seed: u16,
}

impl MacParams {
    pub fn new(frame_retries: u8) -> Self {
        Self {
            csma: CsmaParams::default(),
            frame_retries: frame_retries.min(MAX_TX_RETRIES),
            lbt: false,
            backoff_seed: 0,
        }
    }
}
