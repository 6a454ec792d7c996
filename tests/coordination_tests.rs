//! Coordination primitive validation tests
//!
//! These tests exercise the scheduler, ledger, detector, and accident log
//! directly, without running a full simulation.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use signal_ring::simulation::{
    check_rear_end, transit_time, AccidentLog, SignalId, SimVehicle, TurnScheduler, VehicleId,
    VehicleLedger, VehicleStatus,
};

fn vehicle(seq: u32, signal: u32, released_at: f64, signal_count: u32) -> SimVehicle {
    let origin = SignalId(signal);
    let id = VehicleId { seq, signal: origin };
    let completes_at = released_at + transit_time(signal_count, origin);
    SimVehicle::new(id, origin, released_at, completes_at)
}

#[test]
fn test_scheduler_starts_at_signal_one() {
    let scheduler = TurnScheduler::new(4);
    assert_eq!(scheduler.current_green(), SignalId(1));
}

#[test]
fn test_rotation_follows_strict_cyclic_order() {
    let scheduler = Arc::new(TurnScheduler::new(4));
    let order = Arc::new(Mutex::new(Vec::new()));

    let mut handles = Vec::new();
    for raw_id in 1..=4u32 {
        let scheduler = Arc::clone(&scheduler);
        let order = Arc::clone(&order);
        handles.push(thread::spawn(move || {
            for _ in 0..3 {
                if !scheduler.acquire_turn(SignalId(raw_id)) {
                    return;
                }
                order.lock().unwrap().push(raw_id);
                scheduler.release_turn(SignalId(raw_id));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let order = order.lock().unwrap();
    assert_eq!(order.len(), 12, "every signal should serve three turns");
    for (index, id) in order.iter().enumerate() {
        assert_eq!(
            *id,
            index as u32 % 4 + 1,
            "turn {} went to the wrong signal: {:?}",
            index,
            *order
        );
    }
}

#[test]
fn test_green_is_mutually_exclusive() {
    let scheduler = Arc::new(TurnScheduler::new(3));
    let holders = Arc::new(AtomicU32::new(0));
    let violated = Arc::new(AtomicBool::new(false));

    let mut handles = Vec::new();
    for raw_id in 1..=3u32 {
        let scheduler = Arc::clone(&scheduler);
        let holders = Arc::clone(&holders);
        let violated = Arc::clone(&violated);
        handles.push(thread::spawn(move || {
            for _ in 0..5 {
                if !scheduler.acquire_turn(SignalId(raw_id)) {
                    return;
                }
                if holders.fetch_add(1, Ordering::SeqCst) != 0 {
                    violated.store(true, Ordering::SeqCst);
                }
                thread::sleep(Duration::from_millis(2));
                holders.fetch_sub(1, Ordering::SeqCst);
                scheduler.release_turn(SignalId(raw_id));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(
        !violated.load(Ordering::SeqCst),
        "two signals held green at the same time"
    );
}

#[test]
fn test_shutdown_wakes_blocked_waiter() {
    let scheduler = Arc::new(TurnScheduler::new(4));

    // Signal 3 is not green, so this waiter parks on the condvar
    let waiter = {
        let scheduler = Arc::clone(&scheduler);
        thread::spawn(move || scheduler.acquire_turn(SignalId(3)))
    };

    thread::sleep(Duration::from_millis(50));
    scheduler.shutdown();

    let acquired = waiter.join().unwrap();
    assert!(!acquired, "a wait ended by stop must report failure");
}

#[test]
fn test_acquire_after_shutdown_returns_false() {
    let scheduler = TurnScheduler::new(4);
    scheduler.shutdown();

    // Even the current green holder must observe stop
    assert!(!scheduler.acquire_turn(SignalId(1)));
    assert!(!scheduler.acquire_turn(SignalId(2)));
    assert!(scheduler.is_stopped());
}

#[test]
fn test_shutdown_is_idempotent() {
    let scheduler = TurnScheduler::new(2);
    scheduler.shutdown();
    scheduler.shutdown();
    assert!(scheduler.is_stopped());
}

#[test]
fn test_ledger_remove_is_idempotent() {
    let ledger = VehicleLedger::new();
    let v = vehicle(1, 2, 0.0, 4);
    ledger.add(v.clone());
    assert_eq!(ledger.len(), 1);

    ledger.remove(v.id);
    assert!(ledger.is_empty());

    // Removing an absent id is a silent no-op
    ledger.remove(v.id);
    assert!(ledger.is_empty());
}

#[test]
fn test_ledger_snapshot_is_point_in_time() {
    let ledger = VehicleLedger::new();
    ledger.add(vehicle(1, 1, 0.0, 4));

    let snapshot = ledger.snapshot();
    ledger.add(vehicle(2, 1, 1.0, 4));

    assert_eq!(snapshot.len(), 1, "a snapshot must not see later additions");
    assert_eq!(ledger.len(), 2);
}

#[test]
fn test_ledger_expires_vehicles_at_completion() {
    let ledger = VehicleLedger::new();
    // Released at t=0 from signal 4 of 4: completes at t=2
    let v = vehicle(1, 4, 0.0, 4);
    ledger.add(v.clone());

    assert!(ledger.remove_expired(1.9).is_empty());

    let expired = ledger.remove_expired(2.0);
    assert_eq!(expired.len(), 1, "the completion bound is inclusive");
    assert_eq!(expired[0].id, v.id);
    assert_eq!(expired[0].status, VehicleStatus::Completed);
    assert!(ledger.is_empty());
}

#[test]
fn test_ledger_drain_empties_the_street() {
    let ledger = VehicleLedger::new();
    ledger.add(vehicle(1, 1, 0.0, 4));
    ledger.add(vehicle(1, 2, 0.5, 4));

    let drained = ledger.drain();
    assert_eq!(drained.len(), 2);
    assert!(ledger.is_empty());
    assert!(ledger.drain().is_empty());
}

#[test]
fn test_detector_flags_window_bounds_inclusive() {
    // New vehicle from signal 2 at now=10: gap to signal 1 is 2.0.
    // Timestamps here are exact binary fractions so the bounds compare
    // exactly.
    let new_vehicle = vehicle(1, 2, 10.0, 4);
    let window = 0.25;
    let at_gap = vehicle(1, 1, 8.0, 4);
    let at_gap_plus_window = vehicle(2, 1, 7.75, 4);
    let snapshot = vec![at_gap.clone(), at_gap_plus_window.clone(), new_vehicle.clone()];

    let conflicts = check_rear_end(&new_vehicle, &snapshot, 10.0, window);
    assert_eq!(conflicts, vec![at_gap.id, at_gap_plus_window.id]);
}

#[test]
fn test_detector_ignores_deltas_outside_window() {
    let new_vehicle = vehicle(1, 2, 10.0, 4);
    let window = 0.25;
    let too_young = vehicle(1, 1, 8.0625, 4); // delta just under the gap
    let too_old = vehicle(2, 1, 7.6875, 4); // delta just past gap + window
    let snapshot = vec![too_young, too_old];

    assert!(check_rear_end(&new_vehicle, &snapshot, 10.0, window).is_empty());
}

#[test]
fn test_detector_only_considers_immediately_preceding_signal() {
    let new_vehicle = vehicle(1, 3, 10.0, 4);
    let two_back = vehicle(1, 1, 8.0, 4); // delta 2.0 but from signal 1
    let same_origin = vehicle(2, 3, 8.0, 4); // own earlier release
    let preceding = vehicle(1, 2, 8.0, 4);
    let snapshot = vec![two_back, same_origin, preceding.clone()];

    let conflicts = check_rear_end(&new_vehicle, &snapshot, 10.0, 0.3);
    assert_eq!(conflicts, vec![preceding.id]);
}

#[test]
fn test_detector_signal_one_has_no_predecessor() {
    // Adjacency does not wrap: signal 1 never conflicts with signal N
    let new_vehicle = vehicle(1, 1, 10.0, 4);
    let last_signal = vehicle(1, 4, 8.0, 4);
    let snapshot = vec![last_signal];

    assert!(check_rear_end(&new_vehicle, &snapshot, 10.0, 5.0).is_empty());
}

#[test]
fn test_accident_log_first_writer_wins() {
    let log = AccidentLog::new();
    let first = vec![VehicleId {
        seq: 1,
        signal: SignalId(1),
    }];
    let second = vec![VehicleId {
        seq: 9,
        signal: SignalId(3),
    }];

    assert!(log.record([SignalId(1), SignalId(2)], first.clone()));
    assert!(!log.record([SignalId(3), SignalId(4)], second));

    let accident = log.get().expect("an accident was recorded");
    assert_eq!(accident.vehicles, first);
    assert!(accident.signals.contains(&SignalId(1)));
    assert!(accident.signals.contains(&SignalId(2)));
    assert!(!accident.signals.contains(&SignalId(3)));
    assert!(log.has_accident());
}
