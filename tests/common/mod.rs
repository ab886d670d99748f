#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use at86rf215::{
    Config, Error, NoPin, RegisterAccess, Slot, Timer, TimerHandle, Transceiver, TrxState,
    TxOutcome, Upstream, PN_AT86RF215, RG_RF09_CMD, RG_RF09_STATE,
};
use embedded_hal::{delay::DelayNs, digital::OutputPin};
use rand_core::RngCore;

pub const RG_PN: u16 = 0x000D;
pub const RG_VN: u16 = 0x000E;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Read(u16),
    Write(u16, Vec<u8>),
}

/// Register-level model of the RF09 state machine.
///
/// Commands written to RF09_CMD take effect after `transition_reads` reads of
/// RF09_STATE that report `Transition`.
#[derive(Debug, Default)]
pub struct SimRadio {
    pub state: Option<TrxState>,
    pub transition_reads: usize,
    /// State change in progress and the `Transition` reads left before it lands
    pub pending: Option<(TrxState, usize)>,
    /// Commands are accepted but the state never changes
    pub ignore_commands: bool,
    /// The state machine never leaves `Transition`
    pub stuck: bool,
    /// Fail this many accesses to the given address
    pub fail_at: Option<(u16, usize)>,
    /// Fail every access
    pub broken: bool,
    pub memory: HashMap<u16, u8>,
    pub ops: Vec<Op>,
}

impl SimRadio {
    pub fn new(state: TrxState) -> Self {
        let mut memory = HashMap::new();
        memory.insert(RG_PN, PN_AT86RF215);
        memory.insert(RG_VN, 0x03);
        Self {
            state: Some(state),
            memory,
            ..Self::default()
        }
    }

    pub fn state(&self) -> TrxState {
        self.state.unwrap_or(TrxState::Nop)
    }

    pub fn commands(&self) -> Vec<TrxState> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Write(RG_RF09_CMD, bytes) => Some(TrxState::from_bits(bytes[0])),
                _ => None,
            })
            .collect()
    }

    pub fn state_reads(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| **op == Op::Read(RG_RF09_STATE))
            .count()
    }

    pub fn writes_to(&self, addr: u16) -> Vec<Vec<u8>> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Write(a, bytes) if *a == addr => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    fn check_failure(&mut self, addr: u16) -> Result<(), Error> {
        if self.broken {
            return Err(Error::Bus);
        }
        if let Some((fail_addr, remaining)) = self.fail_at.as_mut() {
            if *fail_addr == addr && *remaining > 0 {
                *remaining -= 1;
                return Err(Error::Bus);
            }
        }
        Ok(())
    }

    fn read_state(&mut self) -> TrxState {
        if self.stuck {
            return TrxState::Transition;
        }
        match self.pending.take() {
            Some((target, 0)) => {
                self.state = Some(target);
                target
            }
            Some((target, left)) => {
                self.pending = Some((target, left - 1));
                TrxState::Transition
            }
            None => self.state(),
        }
    }
}

impl RegisterAccess for SimRadio {
    fn read_burst(&mut self, addr: u16, bytes: &mut [u8]) -> Result<(), Error> {
        self.ops.push(Op::Read(addr));
        self.check_failure(addr)?;
        if addr == RG_RF09_STATE {
            bytes[0] = self.read_state().bits();
            return Ok(());
        }
        for (offset, byte) in bytes.iter_mut().enumerate() {
            *byte = self
                .memory
                .get(&(addr + offset as u16))
                .copied()
                .unwrap_or(0);
        }
        Ok(())
    }

    fn write_burst(&mut self, addr: u16, bytes: &[u8]) -> Result<(), Error> {
        self.ops.push(Op::Write(addr, bytes.to_vec()));
        self.check_failure(addr)?;
        if addr == RG_RF09_CMD {
            if !self.ignore_commands {
                self.pending = Some((TrxState::from_bits(bytes[0]), self.transition_reads));
            }
            return Ok(());
        }
        for (offset, byte) in bytes.iter().enumerate() {
            self.memory.insert(addr + offset as u16, *byte);
        }
        Ok(())
    }
}

/// Collects scheduled timers; tests fire them explicitly.
#[derive(Debug, Default)]
pub struct ManualTimer {
    pub now: Duration,
    pub scheduled: VecDeque<(TimerHandle, u32)>,
    pub history: Vec<u32>,
}

impl ManualTimer {
    pub fn pop(&mut self) -> Option<(TimerHandle, u32)> {
        self.scheduled.pop_front()
    }
}

impl Timer for ManualTimer {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule(&mut self, handle: TimerHandle, delay_us: u32) {
        self.history.push(delay_us);
        self.scheduled.push_back((handle, delay_us));
    }
}

#[derive(Debug, Default)]
pub struct RecordingUpstream {
    pub outcomes: Vec<(TxOutcome, u8)>,
    pub mismatches: Vec<(TrxState, TrxState)>,
    pub completions: Vec<(Slot, TrxState)>,
    pub aborted: Vec<u8>,
    pub recovered: usize,
    pub faults: Vec<Error>,
}

impl Upstream for RecordingUpstream {
    fn on_transmit_outcome(&mut self, outcome: TxOutcome, attempts: u8) {
        self.outcomes.push((outcome, attempts));
    }

    fn on_mode_mismatch(&mut self, expected: TrxState, actual: TrxState) {
        self.mismatches.push((expected, actual));
    }

    fn on_transition_complete(&mut self, slot: Slot, state: TrxState) {
        self.completions.push((slot, state));
    }

    fn on_transmit_aborted(&mut self, attempts: u8) {
        self.aborted.push(attempts);
    }

    fn on_recovered(&mut self) {
        self.recovered += 1;
    }

    fn on_fault(&mut self, error: Error) {
        self.faults.push(error);
    }
}

/// Blocking delay that only records how long it was asked to wait.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub waits_us: Vec<u32>,
}

impl RecordingDelay {
    pub fn total_us(&self) -> u64 {
        self.waits_us.iter().map(|&us| u64::from(us)).sum()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waits_us.push(ns / 1000);
    }

    fn delay_us(&mut self, us: u32) {
        self.waits_us.push(us);
    }
}

/// Deterministic byte source.
pub struct CountingRng(pub u8);

impl RngCore for CountingRng {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.fill_bytes(&mut bytes);
        u32::from_le_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.fill_bytes(&mut bytes);
        u64::from_le_bytes(bytes)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest {
            *byte = self.0;
            self.0 = self.0.wrapping_add(1);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

pub type Sim<P> = Transceiver<SimRadio, P, RecordingDelay, ManualTimer, RecordingUpstream>;
pub type Radio = Sim<NoPin>;

pub fn radio(sim: SimRadio) -> Radio {
    Transceiver::new(
        sim,
        RecordingDelay::default(),
        ManualTimer::default(),
        RecordingUpstream::default(),
        Config::default(),
    )
}

pub fn radio_with_slp_tr<P: OutputPin>(sim: SimRadio, slp_tr: P) -> Sim<P> {
    Transceiver::with_slp_tr(
        sim,
        slp_tr,
        RecordingDelay::default(),
        ManualTimer::default(),
        RecordingUpstream::default(),
        Config::default(),
    )
}

/// Fires one scheduled timer. Returns its delay, or `None` if nothing was armed.
pub fn fire_next<P: OutputPin>(radio: &mut Sim<P>) -> Option<u32> {
    let (handle, delay_us) = radio.timer_mut().pop()?;
    radio.on_timer(handle);
    Some(delay_us)
}

/// Fires timers until none are left.
pub fn run_timers<P: OutputPin>(radio: &mut Sim<P>) {
    for _ in 0..10_000 {
        if fire_next(radio).is_none() {
            return;
        }
    }
    panic!("timers never settled");
}
