//! PHY and MAC configuration
//!
//! Channel, transmit power and CCA settings are written to the RF09 core and
//! baseband 0. CSMA-CA parameters, frame retries and listen-before-talk have no
//! hardware counterpart on the AT86RF215 and are kept in [`MacParams`](crate::MacParams).

use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::{
    AutoMode, AutoModeFlags, ChannelNumber, CsmaParams, EnergyThreshold, Error, FrameFilter,
    FrameFilterFlags, RegisterAccess, Timer, Transceiver, Upstream, MAX_TX_RETRIES,
    SR_RF09_PAC_TXPWR,
};

/// Supported output power levels in mBm, indexed by the PAC.TXPWR value.
pub const TX_POWERS: [i32; 32] = [
    3100, 3000, 2900, 2800, 2700, 2600, 2500, 2400, 2300, 2200, 2100, 2000, 1900, 1800, 1700,
    1600, 1500, 1400, 1300, 1200, 1100, 1000, 900, 800, 700, 600, 500, 400, 300, 200, 100, 0,
];

/// Supported CCA energy-detection thresholds in mBm, indexed by the AMEDT value.
pub const ED_LEVELS: [i32; 16] = [
    -9800, -9600, -9400, -9200, -9000, -8800, -8600, -8400, -8200, -8000, -7800, -7600, -7400,
    -7200, -7000, -6800,
];

pub(crate) const DEFAULT_TX_POWER: i32 = TX_POWERS[0];
pub(crate) const DEFAULT_CCA_ED_LEVEL: i32 = ED_LEVELS[7];

/// Clear channel assessment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CcaMode {
    /// Energy above threshold
    Energy,
    /// Carrier sense only
    Carrier,
    /// Carrier sense with energy above threshold
    EnergyAndCarrier,
    /// Carrier sense or energy above threshold
    EnergyOrCarrier,
}

fn table_index(table: &[i32], mbm: i32) -> Result<u8, Error> {
    table
        .iter()
        .position(|&level| level == mbm)
        .map(|index| index as u8)
        .ok_or(Error::InvalidArgument)
}

impl<B, P, D, T, U> Transceiver<B, P, D, T, U>
where
    B: RegisterAccess,
    P: OutputPin,
    D: DelayNs,
    T: Timer,
    U: Upstream,
{
    /// Selects `channel`, waits for the PLL and restarts the calibration interval.
    ///
    /// Only channel page 0 exists on the sub-GHz core; `page` is accepted for
    /// interface compatibility and otherwise ignored.
    pub fn set_channel(&mut self, page: u8, channel: u16) -> Result<(), Error> {
        trace!("set channel {} on page {}", channel, page);
        self.with_awake(|radio| {
            radio.bus.write_register(ChannelNumber { channel })?;
            radio
                .delay
                .delay_us(u32::from(radio.config.timings.channel_switch));
            Ok(())
        })?;
        self.calibration.arm(self.timer.now());
        Ok(())
    }

    /// Returns `true` once the PLL should be recalibrated.
    pub fn is_calibration_due(&self) -> bool {
        self.calibration.is_due(self.timer.now())
    }

    /// Sets the transmit power to one of [`TX_POWERS`].
    pub fn set_tx_power(&mut self, mbm: i32) -> Result<(), Error> {
        let index = table_index(&TX_POWERS, mbm)?;
        self.with_awake(|radio| radio.bus.write_field(SR_RF09_PAC_TXPWR, index))?;
        self.tx_power = mbm;
        Ok(())
    }

    pub fn tx_power(&self) -> i32 {
        self.tx_power
    }

    /// Sets the CCA energy-detection threshold to one of [`ED_LEVELS`].
    pub fn set_cca_ed_level(&mut self, mbm: i32) -> Result<(), Error> {
        let index = table_index(&ED_LEVELS, mbm)?;
        self.with_awake(|radio| radio.bus.write_register(EnergyThreshold { value: index }))?;
        self.cca_ed_level = mbm;
        Ok(())
    }

    pub fn cca_ed_level(&self) -> i32 {
        self.cca_ed_level
    }

    /// Selects the CCA mode. The baseband only implements energy detection.
    pub fn set_cca_mode(&mut self, mode: CcaMode) -> Result<(), Error> {
        if mode != CcaMode::Energy {
            warn!("unsupported CCA mode {}", mode);
            return Err(Error::InvalidArgument);
        }
        self.with_awake(|radio| {
            let mut amcs: AutoMode = radio.bus.read_register()?;
            amcs.flags |= AutoModeFlags::CCATX | AutoModeFlags::CCAED;
            radio.bus.write_register(amcs)
        })
    }

    /// Promiscuous mode disables automatic acknowledgement and accepts every frame.
    pub fn set_promiscuous(&mut self, on: bool) -> Result<(), Error> {
        self.with_awake(|radio| {
            let mut amcs: AutoMode = radio.bus.read_register()?;
            amcs.flags.set(AutoModeFlags::AACK, !on);
            radio.bus.write_register(amcs)?;

            let mut afc0: FrameFilter = radio.bus.read_register()?;
            afc0.flags.set(FrameFilterFlags::PM, on);
            radio.bus.write_register(afc0)
        })
    }

    pub fn set_csma_params(&mut self, params: CsmaParams) -> Result<(), Error> {
        params.validate()?;
        self.mac.csma = params;
        Ok(())
    }

    /// Sets how often a frame is retried after channel-access failure or missing ACK.
    pub fn set_frame_retries(&mut self, retries: u8) -> Result<(), Error> {
        if retries > MAX_TX_RETRIES {
            return Err(Error::InvalidArgument);
        }
        self.mac.frame_retries = retries;
        Ok(())
    }

    pub fn set_lbt(&mut self, on: bool) {
        self.mac.lbt = on;
    }
}
