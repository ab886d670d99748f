#![cfg_attr(not(test), no_std)]
//! AT86RF215 Radio Driver
//!
//! This crate provides a non-blocking driver for the sub-GHz core of the
//! Microchip AT86RF215 IEEE 802.15.4 transceiver.
//!
//! # Features
//! - Typed register access through the `regiface` crate
//! - Timer-driven radio state changes that never block the caller
//! - Blocking state changes with a timeout for lifecycle operations
//! - Automatic error recovery to RX after bus failures and timeouts
//! - Frame transmission with retries on channel-access failure and missing ACK
//! - Per-outcome TRAC statistics
//! - Optional `defmt` logging
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: SPI implementation of [`RegisterAccess`]
//! - [`registers`]: Register definitions for direct hardware access
//!   - RF09 core: state, command, channel, power amplifier
//!   - Baseband 0: frame length, auto mode, frame filter, TX buffer
//!   - Identification: part and version number
//! - [`interface`]: the [`RegisterAccess`], [`Timer`] and [`Upstream`] seams
//! - [`engine`]: the asynchronous state transition engine
//! - [`transmit`]: the frame transmission pipeline and TRAC counters
//! - [`timing`]: chip timings and the settle-delay table
//! - [`calibration`]: the PLL recalibration deadline
//!
//! # Execution model
//! All entry points take `&mut self` and are expected to be called from a
//! single context: [`Transceiver::on_timer`] when a scheduled timer fires,
//! [`Transceiver::on_tx_done`] from the TX-end interrupt path, everything else
//! from the MAC layer. No call blocks except [`Transceiver::init`],
//! [`Transceiver::start`], [`Transceiver::stop`] and the configuration
//! setters, which wait on the [`DelayNs`](embedded_hal::delay::DelayNs)
//! provided at construction.
//!
//! # Example
//! ```no_run
//! use core::time::Duration;
//! use embedded_hal::{delay::DelayNs, spi::SpiDevice};
//! use at86rf215::{
//!     Config, Device, Error, TimerHandle, Timer, Transceiver, TxOutcome, Upstream,
//! };
//!
//! struct Mac;
//!
//! impl Upstream for Mac {
//!     fn on_transmit_outcome(&mut self, outcome: TxOutcome, attempts: u8) {
//!         let _ = (outcome, attempts);
//!     }
//! }
//!
//! struct Alarm;
//!
//! impl Timer for Alarm {
//!     fn now(&self) -> Duration {
//!         Duration::ZERO
//!     }
//!
//!     fn schedule(&mut self, _handle: TimerHandle, _delay_us: u32) {}
//! }
//!
//! fn bring_up<SPI: SpiDevice, D: DelayNs>(spi: SPI, delay: D) -> Result<(), Error> {
//!     let mut radio = Transceiver::new(Device::new(spi), delay, Alarm, Mac, Config::default());
//!     radio.init()?;
//!     radio.start()?;
//!     radio.set_channel(0, 11)?;
//!     radio.transmit(&[0x41, 0x88, 0x01])
//! }
//! ```

#[macro_use]
mod fmt;

pub mod calibration;
pub mod config;
pub mod device;
pub mod engine;
mod error;
pub mod interface;
mod phy;
mod recovery;
pub mod registers;
mod sync;
pub mod timing;
mod transceiver;
pub mod transmit;

pub use calibration::CalibrationDeadline;
pub use config::{Config, CsmaParams, MacParams, MAX_TX_RETRIES};
pub use device::Device;
pub use engine::{ContextId, Slot, TimerHandle};
pub use error::Error;
pub use interface::{RegisterAccess, Timer, Upstream};
pub use phy::{CcaMode, ED_LEVELS, TX_POWERS};
pub use registers::*;
pub use timing::{ChipTimings, TimingTable};
pub use transceiver::{ChipInfo, NoPin, Transceiver};
pub use transmit::{TracCounters, TxOutcome, TxStage, MAX_FRAME_LEN};
