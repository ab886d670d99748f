mod common;

use at86rf215::{Error, Slot, TrxState, TxStage, RG_RF09_STATE};
use common::{fire_next, radio, run_timers, SimRadio};

#[test]
fn read_failure_releases_slot_and_returns_to_rx() {
    let mut sim = SimRadio::new(TrxState::TrxOff);
    sim.fail_at = Some((RG_RF09_STATE, 1));
    let mut radio = radio(sim);

    // Failures inside the chain are not returned to the requester
    radio.request_transition(Slot::Control, TrxState::TxPrep).unwrap();

    assert!(!radio.is_pending(Slot::Control));
    assert!(radio.is_recovering());

    run_timers(&mut radio);

    assert!(!radio.is_recovering());
    assert_eq!(radio.upstream().recovered, 1);
    assert_eq!(radio.bus_mut().state(), TrxState::Rx);
    assert!(radio.upstream().completions.is_empty());
}

#[test]
fn recovery_forces_off_before_rx() {
    let mut sim = SimRadio::new(TrxState::TxPrep);
    sim.fail_at = Some((RG_RF09_STATE, 1));
    let mut radio = radio(sim);

    radio.request_transition(Slot::Control, TrxState::Rx).unwrap();
    run_timers(&mut radio);

    assert_eq!(
        radio.bus_mut().commands(),
        [TrxState::TrxOff, TrxState::Rx]
    );
    assert_eq!(radio.upstream().recovered, 1);
}

#[test]
fn slot_is_free_while_recovery_runs() {
    let mut sim = SimRadio::new(TrxState::TrxOff);
    sim.fail_at = Some((RG_RF09_STATE, 1));
    let mut radio = radio(sim);

    radio.request_transition(Slot::Control, TrxState::Rx).unwrap();
    assert!(radio.is_recovering());

    // Lands on RX once recovery's command has been applied
    radio.request_transition(Slot::Control, TrxState::Rx).unwrap();
    run_timers(&mut radio);

    assert_eq!(radio.upstream().recovered, 1);
    assert_eq!(radio.upstream().completions, [(Slot::Control, TrxState::Rx)]);
}

#[test]
fn concurrent_failure_does_not_start_second_recovery() {
    let mut sim = SimRadio::new(TrxState::TrxOff);
    sim.fail_at = Some((RG_RF09_STATE, 1));
    let mut radio = radio(sim);

    radio.request_transition(Slot::Control, TrxState::Rx).unwrap();
    assert!(radio.is_recovering());

    radio.bus_mut().fail_at = Some((RG_RF09_STATE, 1));
    radio.request_transition(Slot::Transmit, TrxState::TxPrep).unwrap();
    assert!(!radio.is_pending(Slot::Transmit));
    assert!(!radio.is_faulted());

    run_timers(&mut radio);

    assert_eq!(radio.upstream().recovered, 1);
    assert_eq!(radio.bus_mut().state(), TrxState::Rx);
}

#[test]
fn in_flight_frame_is_dropped() {
    let mut sim = SimRadio::new(TrxState::Rx);
    sim.fail_at = Some((RG_RF09_STATE, 1));
    let mut radio = radio(sim);

    radio.transmit(&[0x01, 0x02, 0x03]).unwrap();

    assert_eq!(radio.tx_stage(), TxStage::Idle);
    assert_eq!(radio.upstream().aborted, [1]);
    assert_eq!(radio.transmit(&[0x04]), Err(Error::Busy));

    run_timers(&mut radio);

    assert_eq!(radio.upstream().recovered, 1);
    assert!(radio.upstream().outcomes.is_empty());
    assert_eq!(radio.bus_mut().state(), TrxState::Rx);

    // The pipeline accepts frames again
    radio.transmit(&[0x04]).unwrap();
    assert_eq!(radio.tx_stage(), TxStage::TransmitTrigger);
}

#[test]
fn failure_after_settle_recovers() {
    let mut radio = radio(SimRadio::new(TrxState::TrxOff));

    radio.request_transition(Slot::Control, TrxState::Rx).unwrap();
    radio.bus_mut().fail_at = Some((RG_RF09_STATE, 1));
    assert_eq!(fire_next(&mut radio), Some(90));

    assert!(radio.is_recovering());
    assert!(radio.upstream().completions.is_empty());
    run_timers(&mut radio);
    assert_eq!(radio.upstream().recovered, 1);
}

#[test]
fn failure_during_recovery_is_fatal() {
    let mut sim = SimRadio::new(TrxState::Rx);
    sim.broken = true;
    let mut radio = radio(sim);

    radio.request_transition(Slot::Control, TrxState::TrxOff).unwrap();

    assert!(radio.is_faulted());
    assert!(!radio.is_recovering());
    assert_eq!(radio.upstream().faults, [Error::Bus]);
    assert_eq!(radio.upstream().recovered, 0);

    assert_eq!(
        radio.request_transition(Slot::Control, TrxState::TrxOff),
        Err(Error::Faulted)
    );
    assert_eq!(radio.transmit(&[0x01]), Err(Error::Faulted));
    assert_eq!(
        radio.blocking_transition(TrxState::Rx, 100),
        Err(Error::Faulted)
    );
    assert_eq!(radio.start(), Err(Error::Faulted));
}
