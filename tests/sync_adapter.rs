mod common;

use at86rf215::{Error, Slot, TrxState, RG_RF09_CMD};
use common::{radio, run_timers, SimRadio};

#[test]
fn waits_settle_delay_and_returns() {
    let mut radio = radio(SimRadio::new(TrxState::TrxOff));

    assert_eq!(radio.blocking_transition(TrxState::Rx, 100), Ok(()));

    assert_eq!(radio.delay_mut().waits_us, [90]);
    assert_eq!(radio.bus_mut().state(), TrxState::Rx);
    assert!(!radio.is_pending(Slot::Control));
    // Synchronous completions are not reported upstream
    assert!(radio.upstream().completions.is_empty());
}

#[test]
fn already_in_target_does_not_wait() {
    let mut radio = radio(SimRadio::new(TrxState::Rx));

    assert_eq!(radio.blocking_transition(TrxState::Rx, 100), Ok(()));
    assert!(radio.delay_mut().waits_us.is_empty());
    assert!(radio.bus_mut().commands().is_empty());
}

#[test]
fn polls_through_transition() {
    let mut sim = SimRadio::new(TrxState::Sleep);
    sim.pending = Some((TrxState::TrxOff, 3));
    let mut radio = radio(sim);

    assert_eq!(radio.blocking_transition(TrxState::Rx, 100), Ok(()));
    assert_eq!(radio.delay_mut().waits_us, [1, 1, 1, 90]);
}

#[test]
fn timeout_starts_exactly_one_recovery() {
    let mut sim = SimRadio::new(TrxState::TrxOff);
    sim.stuck = true;
    let mut radio = radio(sim);

    assert_eq!(
        radio.blocking_transition(TrxState::Rx, 1),
        Err(Error::TimedOut)
    );
    assert_eq!(radio.delay_mut().total_us(), 1000);
    assert!(radio.is_recovering());
    assert!(!radio.is_pending(Slot::Control));

    radio.bus_mut().stuck = false;
    run_timers(&mut radio);

    assert!(!radio.is_recovering());
    assert_eq!(radio.upstream().recovered, 1);
    assert_eq!(radio.bus_mut().state(), TrxState::Rx);
    assert_eq!(radio.bus_mut().commands(), [TrxState::Rx]);
    assert!(radio.upstream().faults.is_empty());
}

#[test]
fn bus_failure_returns_error_without_second_recovery() {
    let mut sim = SimRadio::new(TrxState::TrxOff);
    sim.fail_at = Some((RG_RF09_CMD, 1));
    let mut radio = radio(sim);

    assert_eq!(radio.blocking_transition(TrxState::Rx, 100), Err(Error::Bus));
    // Recovery found TRXOFF already and is settling into RX
    assert!(radio.is_recovering());
    assert!(radio.delay_mut().waits_us.is_empty());

    run_timers(&mut radio);

    assert_eq!(radio.upstream().recovered, 1);
    assert_eq!(radio.bus_mut().state(), TrxState::Rx);
    assert_eq!(radio.bus_mut().commands(), [TrxState::Rx, TrxState::Rx]);
}

#[test]
fn busy_control_slot_is_rejected() {
    let mut radio = radio(SimRadio::new(TrxState::TrxOff));

    radio.request_transition(Slot::Control, TrxState::Rx).unwrap();
    assert_eq!(
        radio.blocking_transition(TrxState::TrxOff, 100),
        Err(Error::Busy)
    );
    assert!(!radio.is_recovering());
}

#[test]
fn next_call_after_timeout_starts_clean() {
    let mut sim = SimRadio::new(TrxState::TrxOff);
    sim.stuck = true;
    let mut radio = radio(sim);

    assert_eq!(
        radio.blocking_transition(TrxState::Rx, 1),
        Err(Error::TimedOut)
    );
    radio.bus_mut().stuck = false;
    run_timers(&mut radio);

    assert_eq!(radio.blocking_transition(TrxState::TrxOff, 100), Ok(()));
    assert_eq!(radio.bus_mut().state(), TrxState::TrxOff);
}
