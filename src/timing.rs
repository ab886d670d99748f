//! Chip timing data and the settle-delay table
//!
//! After a state command is written the new state is only guaranteed to be
//! observable once the chip-specific settle time has elapsed. [`TimingTable`]
//! holds those delays keyed by `(from, to)`; pairs without an entry fall back to
//! [`DEFAULT_SETTLE_US`].

use heapless::Vec;

use crate::TrxState;

/// Settle delay used when the table has no entry for a transition.
pub const DEFAULT_SETTLE_US: u32 = 1;

/// Delay between two state reads while the chip reports `Transition`.
pub const POLL_INTERVAL_US: u32 = 1;

const MAX_TIMING_ENTRIES: usize = 8;

/// AT86RF215 timing characteristics, in microseconds.
///
/// See the transition time table of the datasheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipTimings {
    /// Leaving P_ON until the clock is available (tDEEP_SLEEP_TRXOFF)
    pub sleep_cycle: u16,
    /// PLL channel switch within a band (tPLL_CH_SW)
    pub channel_switch: u16,
    /// RESET to TRXOFF (tRESET_TRXOFF)
    pub reset_to_off: u16,
    /// TRXOFF to TXPREP (tTRXOFF_TXPREP)
    pub off_to_txprep: u16,
    /// TRXOFF to RX (tTRXOFF_RX)
    pub off_to_rx: u16,
    /// TRXOFF to SLEEP through SLP_TR
    pub off_to_sleep: u16,
    /// SLEEP to TRXOFF (tSLEEP_TRXOFF)
    pub sleep_to_off: u16,
    /// Maximum frame duration
    pub frame: u16,
    /// Acknowledgement wait period
    pub p_ack: u16,
}

impl Default for ChipTimings {
    fn default() -> Self {
        Self {
            sleep_cycle: 500,
            channel_switch: 100,
            reset_to_off: 1,
            off_to_txprep: 90,
            off_to_rx: 90,
            off_to_sleep: 0,
            sleep_to_off: 1,
            frame: 4096,
            p_ack: 545,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    from: TrxState,
    to: TrxState,
    delay_us: u32,
}

/// Minimum settle delay per `(from, to)` state pair.
#[derive(Debug, Clone)]
pub struct TimingTable {
    entries: Vec<Entry, MAX_TIMING_ENTRIES>,
}

impl TimingTable {
    /// Creates a table without entries; every transition uses the default delay.
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds or replaces the delay for a transition.
    ///
    /// Returns `Err(Error::InvalidArgument)` once the table is full.
    pub fn set(&mut self, from: TrxState, to: TrxState, delay_us: u32) -> Result<(), crate::Error> {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.from == from && entry.to == to)
        {
            entry.delay_us = delay_us;
            return Ok(());
        }
        self.entries
            .push(Entry { from, to, delay_us })
            .map_err(|_| crate::Error::InvalidArgument)
    }

    /// Settle delay for the given transition.
    pub fn settle_delay(&self, from: TrxState, to: TrxState) -> u32 {
        self.entries
            .iter()
            .find(|entry| entry.from == from && entry.to == to)
            .map_or(DEFAULT_SETTLE_US, |entry| entry.delay_us)
    }
}

impl From<&ChipTimings> for TimingTable {
    fn from(timings: &ChipTimings) -> Self {
        let rows = [
            (TrxState::Nop, TrxState::TrxOff, timings.reset_to_off),
            (TrxState::Reset, TrxState::TrxOff, timings.reset_to_off),
            (TrxState::Sleep, TrxState::TrxOff, timings.sleep_to_off),
            (TrxState::TrxOff, TrxState::TxPrep, timings.off_to_txprep),
            (TrxState::TrxOff, TrxState::Rx, timings.off_to_rx),
        ];
        let mut table = Self::empty();
        for (from, to, delay_us) in rows {
            // rows.len() < MAX_TIMING_ENTRIES
            let _ = table.set(from, to, u32::from(delay_us));
        }
        table
    }
}

impl Default for TimingTable {
    fn default() -> Self {
        Self::from(&ChipTimings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listed_pairs_use_chip_timings() {
        let table = TimingTable::default();
        assert_eq!(table.settle_delay(TrxState::TrxOff, TrxState::Rx), 90);
        assert_eq!(table.settle_delay(TrxState::TrxOff, TrxState::TxPrep), 90);
        assert_eq!(table.settle_delay(TrxState::Reset, TrxState::TrxOff), 1);
    }

    #[test]
    fn unlisted_pairs_use_default() {
        let table = TimingTable::default();
        assert_eq!(
            table.settle_delay(TrxState::Rx, TrxState::TxPrep),
            DEFAULT_SETTLE_US
        );
        assert_eq!(
            TimingTable::empty().settle_delay(TrxState::TrxOff, TrxState::Rx),
            DEFAULT_SETTLE_US
        );
    }

    #[test]
    fn set_replaces_existing_entry() {
        let mut table = TimingTable::default();
        table.set(TrxState::TrxOff, TrxState::Rx, 200).unwrap();
        assert_eq!(table.settle_delay(TrxState::TrxOff, TrxState::Rx), 200);
    }

    #[test]
    fn full_table_rejects_new_pairs() {
        let mut table = TimingTable::empty();
        let states = [
            TrxState::Nop,
            TrxState::Sleep,
            TrxState::TrxOff,
            TrxState::TxPrep,
            TrxState::Tx,
            TrxState::Rx,
            TrxState::Transition,
            TrxState::Reset,
        ];
        for from in states {
            table.set(from, TrxState::Rx, 5).unwrap();
        }
        assert_eq!(
            table.set(TrxState::Rx, TrxState::TrxOff, 5),
            Err(crate::Error::InvalidArgument)
        );
    }
}
