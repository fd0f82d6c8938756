//! Tests for tracking, waves, targeting, drive prediction, fire inference,
//! strategies and the agent engine.

use std::cell::RefCell;
use std::f64::consts::{FRAC_PI_2, PI};
use std::rc::Rc;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use duelist_core::config::AgentConfig;
use duelist_core::constants::MAX_EXTRAPOLATION_TICKS;
use duelist_core::enums::*;
use duelist_core::error::AgentError;
use duelist_core::events::{Notification, ObservedBullet, ScanObservation, SelfState, WaveEvent};
use duelist_core::geometry::turn_angle;
use duelist_core::physics::simple_escape_angle;
use duelist_core::snapshot::Snapshot;
use duelist_core::types::{Arena, Point, Rect};
use duelist_tactics::power::PowerSelector;
use duelist_tactics::scenarios::ScenarioContext;

use crate::drive::orbit::orbit_direction;
use crate::drive::{advance, DrivePredictor, DriveRegion, DriveState};
use crate::engine::{default_chain, AgentEngine};
use crate::gun_watcher::GunWatcher;
use crate::hit_stats::HitStats;
use crate::snapshot_store::SnapshotStore;
use crate::strategies::{TargetingGun, TickView, WeaponStrategy};
use crate::targeting::circular::{solve_circular, turn_circle, TurnCircle};
use crate::targeting::detector::AimDetector;
use crate::targeting::linear::solve_linear;
use crate::targeting::*;
use crate::waves::{BulletShadow, Wave, WaveBullet, WaveHistory};

fn snap(name: &str, x: f64, y: f64, heading_deg: f64, velocity: f64, tick: u64) -> Snapshot {
    Snapshot::new(name, Point::new(x, y), heading_deg.to_radians(), velocity, 0.0, 100.0, tick)
}

fn simple_config() -> AgentConfig {
    AgentConfig {
        precise_escape_angles: false,
        ..Default::default()
    }
}

fn bullet(owner: &str, x: f64, y: f64, heading: f64, power: f64, tick: u64) -> ObservedBullet {
    ObservedBullet {
        owner: owner.to_string(),
        position: Point::new(x, y),
        heading,
        power,
        tick,
    }
}

fn predictor() -> DrivePredictor {
    DrivePredictor::new(DriveRegion::new(Arena::default(), 18.0, 15.0))
}

// ---- Snapshot store ----

#[test]
fn test_store_extrapolates_one_velocity_step() {
    let mut store = SnapshotStore::default();
    store.record(snap("a", 200.0, 200.0, 0.0, 4.0, 10)).unwrap();

    let next = store.at("a", 11, true).expect("extrapolation allowed");
    assert_eq!(next.tick, 11);
    assert!((next.position.x - 200.0).abs() < 1e-9, "x moved: {:?}", next.position);
    assert!((next.position.y - 204.0).abs() < 1e-9, "y should advance by 4: {:?}", next.position);
}

#[test]
fn test_store_lookup_without_extrapolation() {
    let mut store = SnapshotStore::default();
    store.record(snap("a", 200.0, 200.0, 0.0, 4.0, 10)).unwrap();

    assert!(store.at("a", 10, false).is_some());
    assert!(store.at("a", 11, false).is_none());
    assert!(store.at("a", 9, true).is_none(), "nothing recorded before tick 10");
    assert!(store.at("ghost", 10, true).is_none());
}

#[test]
fn test_store_does_not_extrapolate_across_long_gaps() {
    let mut store = SnapshotStore::default();
    store.record(snap("a", 200.0, 200.0, 0.0, 0.0, 10)).unwrap();

    let edge = store.at("a", 10 + MAX_EXTRAPOLATION_TICKS, true);
    assert_eq!(edge.map(|s| s.tick), Some(10 + MAX_EXTRAPOLATION_TICKS));
    assert!(store.at("a", 11 + MAX_EXTRAPOLATION_TICKS, true).is_none());
    assert!(store.at("a", u64::MAX, true).is_none());
}

#[test]
fn test_store_evicts_oldest_per_identity() {
    let mut store = SnapshotStore::new(3);
    for tick in 1..=5 {
        store.record(snap("a", 100.0, 100.0, 0.0, 0.0, tick)).unwrap();
    }
    store.record(snap("b", 100.0, 100.0, 0.0, 0.0, 1)).unwrap();

    assert_eq!(store.history("a").count(), 3);
    assert_eq!(store.earliest("a").map(|s| s.tick), Some(3));
    assert_eq!(store.latest("a").map(|s| s.tick), Some(5));
    assert_eq!(store.history("b").count(), 1, "eviction is per identity");
}

#[test]
fn test_store_rejects_bad_records() {
    let mut store = SnapshotStore::default();
    store.record(snap("a", 100.0, 100.0, 0.0, 0.0, 5)).unwrap();

    let older = store.record(snap("a", 100.0, 100.0, 0.0, 0.0, 4));
    assert!(matches!(older, Err(AgentError::InvalidObservation { .. })));

    let nan = store.record(snap("a", f64::NAN, 100.0, 0.0, 0.0, 6));
    assert!(matches!(nan, Err(AgentError::InvalidObservation { .. })));

    store.record(snap("a", 120.0, 100.0, 0.0, 0.0, 5)).unwrap();
    assert_eq!(store.history("a").count(), 1, "same tick replaces");
    assert_eq!(store.latest("a").map(|s| s.position.x), Some(120.0));
}

#[test]
fn test_store_liveness_and_round_reset() {
    let mut store = SnapshotStore::default();
    store.set_self_name("me");
    for name in ["me", "b", "a"] {
        store.record(snap(name, 100.0, 100.0, 0.0, 0.0, 1)).unwrap();
    }
    assert_eq!(store.alive_opponents(), vec!["a", "b"]);
    assert_eq!(store.liveness("ghost"), Liveness::Unknown);

    store.mark_dead("b");
    assert_eq!(store.liveness("b"), Liveness::Dead);
    assert_eq!(store.opponent_count(), 1);
    assert!(store.latest("b").is_some(), "history kept after death");

    store.begin_round();
    assert!(store.latest("a").is_none(), "histories cleared for the new round");
    assert_eq!(store.alive_opponents(), vec!["a", "b"]);
    assert_eq!(store.known(), vec!["a", "b", "me"]);
}

// ---- Wave lifecycle ----

/// Lifecycle events for one wave, ranked by how far along they are.
fn lifecycle_ranks(events: Vec<WaveEvent>, id: u32) -> Vec<u8> {
    events
        .into_iter()
        .filter_map(|event| match event {
            WaveEvent::Hit { wave_id, .. } if wave_id == id => Some(1),
            WaveEvent::Passing { wave_id, .. } if wave_id == id => Some(2),
            WaveEvent::Passed { wave_id, .. } if wave_id == id => Some(3),
            WaveEvent::Destroyed { wave_id, .. } if wave_id == id => Some(4),
            _ => None,
        })
        .collect()
}

#[test]
fn test_wave_state_never_regresses() {
    let bounds = Arena::default().bounds().inset(18.0);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for round in 0..40 {
        let mut history = WaveHistory::new(&simple_config(), Arena::default());
        let mut store = SnapshotStore::default();

        let start = Point::new(rng.gen_range(50.0..750.0), rng.gen_range(50.0..550.0));
        let heading = rng.gen_range(0.0..2.0 * PI);
        let velocity = rng.gen_range(-8.0..8.0);
        let defender = Snapshot::new("d", start, heading, velocity, 0.0, 100.0, 0);
        let attacker = snap("a", rng.gen_range(50.0..750.0), rng.gen_range(50.0..550.0), 0.0, 0.0, 0);
        let power = rng.gen_range(0.1..3.0);
        let id = history.create(&defender, &attacker, power, 0, WaveOwner::Opponent);

        let mut last = WaveState::Leading;
        let mut ranks = Vec::new();
        let mut destroyed = false;
        for tick in 0..400u64 {
            // Bodies stop at the walls.
            let position = bounds.clamp(&start.project(heading, velocity * tick as f64));
            store
                .record(Snapshot::new("d", position, heading, velocity, 0.0, 100.0, tick))
                .unwrap();
            history.update(tick, &store);
            ranks.extend(lifecycle_ranks(history.drain_events(), id));
            let Some(wave) = history.get(id) else {
                destroyed = true;
                break;
            };
            assert!(wave.state >= last, "state regressed from {last:?} to {:?}", wave.state);
            last = wave.state;
        }
        assert!(destroyed, "round {round}: wave outlived the arena");
        assert_eq!(ranks, vec![1, 2, 3, 4], "round {round}: lifecycle out of order");
    }
}

#[test]
fn test_dead_defender_freezes_wave() {
    let mut history = WaveHistory::new(&simple_config(), Arena::default());
    let mut store = SnapshotStore::default();
    let defender = snap("d", 400.0, 200.0, 0.0, 0.0, 0);
    let attacker = snap("a", 400.0, 100.0, 0.0, 0.0, 0);
    store.record(defender.clone()).unwrap();
    store.mark_dead("d");
    let id = history.create(&defender, &attacker, 3.0, 0, WaveOwner::Opponent);

    for tick in 1..=50 {
        history.update(tick, &store);
    }
    assert_eq!(history.get(id).map(|w| w.state), Some(WaveState::Leading));
    assert!(lifecycle_ranks(history.drain_events(), id).is_empty());

    // 11 units per tick crosses the 1000 unit diagonal at tick 91.
    for tick in 51..=95 {
        history.update(tick, &store);
    }
    assert!(history.get(id).is_none());
    assert_eq!(lifecycle_ranks(history.drain_events(), id), vec![4]);
}

#[test]
fn test_wave_orphaned_when_defender_track_goes_stale() {
    let mut history = WaveHistory::new(&simple_config(), Arena::default());
    let mut store = SnapshotStore::default();
    // Far enough that the frontier is still short of the body when the
    // single snapshot can no longer be extrapolated.
    let defender = snap("d", 400.0, 580.0, 0.0, 0.0, 0);
    let attacker = snap("a", 400.0, 20.0, 0.0, 0.0, 0);
    store.record(defender.clone()).unwrap();
    let id = history.create(&defender, &attacker, 3.0, 0, WaveOwner::Opponent);

    for tick in 1..=95 {
        history.update(tick, &store);
        if tick == 90 {
            assert!(history.get(id).is_some(), "kept until it crosses the arena");
        }
    }
    assert!(history.get(id).is_none());
    assert_eq!(lifecycle_ranks(history.drain_events(), id), vec![4]);
}

#[test]
fn test_time_until_hit_decreases_by_speed() {
    let defender = snap("d", 100.0, 500.0, 0.0, 0.0, 0);
    let attacker = snap("a", 100.0, 100.0, 0.0, 0.0, 0);
    let wave = Wave::new(0, WaveOwner::Opponent, &defender, &attacker, 2.0, 0);
    assert!((wave.speed - 14.0).abs() < 1e-9);

    let target = defender.position;
    for tick in 0..26 {
        let now = wave.distance_until_hit(&target, tick);
        let next = wave.distance_until_hit(&target, tick + 1);
        assert!((now - next - wave.speed).abs() < 1e-9, "tick {tick}: {now} -> {next}");
        assert!(
            wave.time_until_hit(&target, tick + 1) <= wave.time_until_hit(&target, tick),
            "time until hit increased at tick {tick}"
        );
    }
    assert!(wave.time_until_matched(&target, 0) > wave.time_until_hit(&target, 0));
    assert!(wave.time_until_passed(&target, 0) > wave.time_until_matched(&target, 0));
}

#[test]
fn test_wave_events_reach_listeners_in_order() {
    let mut history = WaveHistory::new(&simple_config(), Arena::default());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    history.subscribe(Box::new(move |e: &WaveEvent| sink.borrow_mut().push(e.clone())));

    let defender = snap("d", 400.0, 200.0, 0.0, 0.0, 0);
    let attacker = snap("me", 400.0, 100.0, 0.0, 0.0, 0);
    let id = history.create(&defender, &attacker, 3.0, 0, WaveOwner::Mine);

    let mut store = SnapshotStore::default();
    for tick in 1..=95 {
        store.record(snap("d", 400.0, 200.0, 0.0, 0.0, tick)).unwrap();
        history.update(tick, &store);
    }

    let owner = WaveOwner::Mine;
    let expected = vec![
        WaveEvent::Hit { wave_id: id, owner, tick: 8 },
        WaveEvent::Passing { wave_id: id, owner, tick: 10 },
        WaveEvent::Passed { wave_id: id, owner, tick: 11 },
        WaveEvent::Destroyed { wave_id: id, owner },
    ];
    assert_eq!(*seen.borrow(), expected);
    assert_eq!(history.drain_events(), expected);
    assert!(history.drain_events().is_empty());
    assert!(history.is_empty());
}

#[test]
fn test_virtual_wave_reports_hit_once() {
    let mut history = WaveHistory::new(&simple_config(), Arena::default());
    let defender = snap("d", 400.0, 300.0, 0.0, 0.0, 0);
    let attacker = snap("me", 100.0, 300.0, 0.0, 0.0, 0);
    let id = history.create(&defender, &attacker, 3.0, 0, WaveOwner::Virtual);
    history.attach_bullet(
        id,
        WaveBullet {
            aim: FRAC_PI_2,
            gun: "linear".to_string(),
        },
        0,
    );

    let mut store = SnapshotStore::default();
    for tick in 1..=30 {
        store.record(snap("d", 400.0, 300.0, 0.0, 0.0, tick)).unwrap();
        history.update(tick, &store);
    }
    let hits: Vec<WaveEvent> = history
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, WaveEvent::VirtualBulletHit { .. }))
        .collect();
    assert_eq!(
        hits,
        vec![WaveEvent::VirtualBulletHit {
            wave_id: id,
            gun: "linear".to_string(),
            tick: 26
        }]
    );
}

#[test]
fn test_bullet_matching() {
    let mut history = WaveHistory::new(&simple_config(), Arena::default());
    let me = snap("me", 400.0, 500.0, 0.0, 0.0, 0);
    let them = snap("a", 400.0, 100.0, 0.0, 0.0, 0);
    let theirs = history.create(&me, &them, 2.0, 0, WaveOwner::Opponent);

    let on_frontier = bullet("a", 400.0, 240.0, 0.0, 2.0, 10);
    assert_eq!(history.match_bullet(WaveOwner::Opponent, &on_frontier), Some(theirs));

    let too_far = bullet("a", 400.0, 300.0, 0.0, 2.0, 10);
    assert_eq!(history.match_bullet(WaveOwner::Opponent, &too_far), None);

    let wrong_owner = bullet("b", 400.0, 240.0, 0.0, 2.0, 10);
    assert_eq!(history.match_bullet(WaveOwner::Opponent, &wrong_owner), None);

    let wrong_speed = bullet("a", 400.0, 240.0, 0.0, 3.0, 10);
    assert_eq!(history.match_bullet(WaveOwner::Opponent, &wrong_speed), None);
}

#[test]
fn test_bullet_hit_bullet_removes_both_waves() {
    let mut history = WaveHistory::new(&simple_config(), Arena::default());
    let me = snap("me", 400.0, 500.0, 0.0, 0.0, 0);
    let them = snap("a", 400.0, 100.0, 0.0, 0.0, 0);
    history.create(&me, &them, 2.0, 0, WaveOwner::Opponent);
    history.create(&them, &me, 2.0, 0, WaveOwner::Mine);
    assert_eq!(history.len(), 2);

    history.on_bullet_hit_bullet(
        &bullet("me", 400.0, 360.0, PI, 2.0, 10),
        &bullet("a", 400.0, 240.0, 0.0, 2.0, 10),
    );
    assert!(history.is_empty());
    let matched = history
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, WaveEvent::BulletMatched { hit: false, .. }))
        .count();
    assert_eq!(matched, 2);
}

#[test]
fn test_own_bullet_casts_shadow_on_opponent_wave() {
    let mut history = WaveHistory::new(&simple_config(), Arena::default());
    let me = snap("me", 400.0, 100.0, 0.0, 0.0, 0);
    let them = snap("a", 400.0, 500.0, 0.0, 0.0, 0);
    let mine = history.create(&them, &me, 3.0, 0, WaveOwner::Mine);
    let theirs = history.create(&me, &them, 3.0, 0, WaveOwner::Opponent);
    assert!(history.get(theirs).unwrap().shadows.is_empty(), "no projectile yet");

    history.attach_bullet(
        mine,
        WaveBullet {
            aim: 0.2,
            gun: "head-on".to_string(),
        },
        0,
    );
    let wave = history.get(theirs).unwrap();
    assert_eq!(wave.shadows.len(), 1);
    let shadow = wave.shadows[0];
    assert!(shadow.width() > 0.0, "degenerate shadow {shadow:?}");

    let crossing = history.get(mine).unwrap().bullet_position(19).unwrap();
    assert!(wave.shadowed(&crossing), "crossing point {crossing:?} outside {shadow:?}");
    assert!(!wave.shadowed(&me.position), "the direct line to us stays open");
}

#[test]
fn test_next_opponent_wave_tracking() {
    let mut history = WaveHistory::new(&simple_config(), Arena::default());
    let me = snap("me", 400.0, 500.0, 0.0, 0.0, 0);
    let them = snap("a", 400.0, 100.0, 0.0, 0.0, 0);
    let first = history.create(&me, &them, 2.0, 0, WaveOwner::Opponent);
    let second = history.create(&me, &them, 2.0, 5, WaveOwner::Opponent);

    let soonest = history.soonest_opponent_wave(&me.position, 6).map(|w| w.id);
    assert_eq!(soonest, Some(first));
    let after = history.opponent_wave_after(first, &me.position, 6).map(|w| w.id);
    assert_eq!(after, Some(second));
    assert!(history.opponent_wave_after(second, &me.position, 6).is_none());

    let mut store = SnapshotStore::default();
    store.set_self_name("me");
    store.record(snap("me", 400.0, 500.0, 0.0, 0.0, 6)).unwrap();
    history.update(6, &store);
    assert_eq!(history.next_opponent_wave_id(), Some(first));
    assert!(history
        .drain_events()
        .contains(&WaveEvent::NextOpponentWave { wave_id: Some(first) }));
}

#[test]
fn test_precise_escape_range_within_simple_bound() {
    let history = &mut WaveHistory::new(&AgentConfig::default(), Arena::default());
    let defender = snap("d", 400.0, 300.0, 90.0, 0.0, 0);
    let attacker = snap("a", 400.0, 100.0, 0.0, 0.0, 0);
    let id = history.create(&defender, &attacker, 2.0, 0, WaveOwner::Opponent);
    let wave = history.get(id).unwrap();

    let bound = simple_escape_angle(wave.speed);
    assert!(wave.escape.ccw < 0.0 && wave.escape.cw > 0.0, "range {:?}", wave.escape);
    assert!(wave.escape.ccw >= -bound - 1e-6 && wave.escape.cw <= bound + 1e-6);
}

#[test]
fn test_orbit_direction_at_fire_time() {
    let attacker = snap("a", 400.0, 100.0, 0.0, 0.0, 0);
    let east = snap("d", 400.0, 300.0, 90.0, 8.0, 0);
    let west = snap("d", 400.0, 300.0, 270.0, 8.0, 0);
    assert_eq!(orbit_direction(&east, &attacker), OrbitDirection::Clockwise);
    assert_eq!(orbit_direction(&west, &attacker), OrbitDirection::CounterClockwise);
}

// ---- Targeting ----

#[test]
fn test_linear_intercept_round_trip() {
    let shooter = Point::new(100.0, 100.0);
    let target = Point::new(500.0, 300.0);
    let velocity = DVec2::new(0.0, 2.0);
    let hit = solve_linear(shooter, target, velocity, 11.0, None).expect("catchable target");

    let target_then = Point::new(500.0, 300.0 + 2.0 * hit.time);
    let projectile_then = shooter.project(hit.aim, 11.0 * hit.time);
    assert!(
        target_then.distance_to(&projectile_then) < 1.0,
        "miss by {} at t={}",
        target_then.distance_to(&projectile_then),
        hit.time
    );
}

#[test]
fn test_linear_solver_matches_closed_form() {
    let mut store = SnapshotStore::default();
    let target = snap("t", 500.0, 300.0, 0.0, 2.0, 10);
    let me = snap("me", 100.0, 100.0, 0.0, 0.0, 10);
    store.record(target.clone()).unwrap();
    let arena = Arena::default();
    let ctx = AimContext { store: &store, arena: &arena };

    let wave = Wave::new(0, WaveOwner::Mine, &target, &me, 3.0, 10);
    let aim = LinearSolver.aim(&target, &me, &wave, &ctx).expect("solution");
    let hit = solve_linear(me.position, target.position, DVec2::new(0.0, 2.0), 11.0, None).unwrap();
    assert!(turn_angle(aim, hit.aim).abs() < 1e-9);
}

#[test]
fn test_linear_pure_chase_has_no_solution() {
    let shooter = Point::new(0.0, 0.0);
    let target = Point::new(0.0, 100.0);
    assert!(solve_linear(shooter, target, DVec2::new(0.0, 8.0), 5.0, None).is_none());
}

#[test]
fn test_linear_intercept_clamped_to_bounds() {
    let shooter = Point::new(100.0, 300.0);
    let target = Point::new(700.0, 300.0);
    let bounds = Rect::new(0.0, 0.0, 800.0, 600.0);

    let free = solve_linear(shooter, target, DVec2::new(8.0, 0.0), 11.0, None).expect("catchable");
    assert!((free.time - 200.0).abs() < 1e-6, "t={}", free.time);
    assert!((free.point.x - 2300.0).abs() < 1e-6);

    let hit = solve_linear(shooter, target, DVec2::new(8.0, 0.0), 11.0, Some(&bounds)).expect("catchable");
    assert!((hit.point.x - 800.0).abs() < 1e-9 && (hit.point.y - 300.0).abs() < 1e-9, "{:?}", hit.point);
    assert!((hit.time - 700.0 / 11.0).abs() < 1e-9, "time follows the clamped point, got {}", hit.time);
    assert!(turn_angle(hit.aim, FRAC_PI_2).abs() < 1e-9);
}

#[test]
fn test_turn_circle_rejects_parallel_normals() {
    // Reversed headings give parallel normals, horizontal then vertical.
    let older = snap("t", 300.0, 300.0, 0.0, 8.0, 8);
    let newer = snap("t", 300.0, 400.0, 180.0, 8.0, 10);
    assert!(turn_circle(&newer, &older, 4f64.to_radians()).is_none());

    let older = snap("t", 300.0, 300.0, 90.0, 8.0, 8);
    let newer = snap("t", 400.0, 300.0, 270.0, 8.0, 10);
    assert!(turn_circle(&newer, &older, 4f64.to_radians()).is_none());
}

#[test]
fn test_circular_degenerate_inputs() {
    let start = Point::new(400.0, 300.0);
    let point_circle = TurnCircle {
        center: start,
        radius: 0.0,
        turn_rate: 0.1,
    };
    // A zero radius pins the target to the centre.
    let aim = solve_circular(Point::new(400.0, 100.0), 11.0, &start, &point_circle, 0.0, 4, 12);
    assert!(aim.is_some_and(|a| turn_angle(a, 0.0).abs() < 1e-9), "{aim:?}");
    assert!(solve_circular(start, 11.0, &start, &point_circle, 0.0, 4, 12).is_none());

    let circle = TurnCircle {
        center: Point::new(400.0, 300.0),
        radius: 100.0,
        turn_rate: 0.1,
    };
    let origin = Point::new(100.0, 100.0);
    let on_circle = Point::new(400.0, 400.0);
    assert!(solve_circular(origin, f64::NAN, &on_circle, &circle, 0.0, 4, 12).is_none());
    assert!(solve_circular(origin, 0.0, &on_circle, &circle, 0.0, 4, 12).is_none());
    assert!(solve_circular(origin, 11.0, &on_circle, &circle, 0.0, 4, 1).is_none());
    let nan_radius = TurnCircle {
        radius: f64::NAN,
        ..circle
    };
    assert!(solve_circular(origin, 11.0, &on_circle, &nan_radius, 0.0, 4, 12).is_none());

    let older = snap("t", 300.0, 300.0, 0.0, 8.0, 8);
    let newer = snap("t", 310.0, 305.0, f64::NAN, 8.0, 10);
    assert!(turn_circle(&newer, &older, 4f64.to_radians()).is_none());
}

#[test]
fn test_circular_needs_heading_change() {
    let older = snap("t", 300.0, 300.0, 45.0, 8.0, 8);
    let newer = snap("t", 311.3, 311.3, 45.0, 8.0, 10);
    assert!(turn_circle(&newer, &older, 4f64.to_radians()).is_none());

    let mut store = SnapshotStore::default();
    store.record(older).unwrap();
    store.record(newer.clone()).unwrap();
    let arena = Arena::default();
    let ctx = AimContext { store: &store, arena: &arena };
    assert!(!CircularSolver::default().can_aim(&newer, &ctx));
}

#[test]
fn test_circular_leads_a_turning_target() {
    let center = Point::new(400.0, 300.0);
    let radius = 100.0;
    let rate = 4f64.to_radians();
    let speed = radius * rate;
    let at = |tick: u64| {
        let theta = 0.3 + rate * tick as f64;
        Snapshot::new(
            "t",
            center.project(theta, radius),
            theta + FRAC_PI_2,
            speed,
            0.0,
            100.0,
            tick,
        )
    };

    let mut store = SnapshotStore::default();
    for tick in 0..=10 {
        store.record(at(tick)).unwrap();
    }
    let target = at(10);
    let me = snap("me", 100.0, 100.0, 0.0, 0.0, 10);
    let arena = Arena::default();
    let ctx = AimContext { store: &store, arena: &arena };
    let solver = CircularSolver::default();

    let circle = solver.find_circle(&target, &store).expect("turning target");
    assert!(circle.center.distance_to(&center) < 1e-6, "centre {:?}", circle.center);
    assert!((circle.turn_rate - rate).abs() < 1e-9);

    let wave = Wave::new(0, WaveOwner::Mine, &target, &me, 3.0, 10);
    let aim = solver.aim(&target, &me, &wave, &ctx).expect("solution");
    let closest = (0..2000)
        .map(|i| {
            let t = i as f64 * 0.1;
            let projectile = me.position.project(aim, wave.speed * t);
            projectile.distance_to(&circle.position_after(&target.position, t))
        })
        .fold(f64::INFINITY, f64::min);
    assert!(closest < 10.0, "projectile passes {closest} from the target");
}

#[test]
fn test_stationary_target_all_solvers_agree() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let arena = Arena::default();
    for _ in 0..50 {
        let (x, y) = (rng.gen_range(40.0..760.0), rng.gen_range(40.0..560.0));
        let mut store = SnapshotStore::default();
        for tick in 8..=10 {
            store.record(snap("t", x, y, rng.gen_range(0.0..360.0), 0.0, tick)).unwrap();
        }
        let target = store.latest("t").unwrap().clone();
        let me = snap("me", rng.gen_range(40.0..760.0), rng.gen_range(40.0..560.0), 0.0, 0.0, 10);
        if me.position.distance_to(&target.position) < 40.0 {
            continue;
        }
        let ctx = AimContext { store: &store, arena: &arena };
        let wave = Wave::new(0, WaveOwner::Mine, &target, &me, rng.gen_range(0.1..3.0), 10);

        let head_on = HeadOnSolver.aim(&target, &me, &wave, &ctx).unwrap();
        let linear = LinearSolver.aim(&target, &me, &wave, &ctx).unwrap();
        let circular = CircularSolver::default().aim(&target, &me, &wave, &ctx).unwrap();
        assert!(turn_angle(head_on, linear).abs() < 1e-6, "linear {linear} vs {head_on}");
        assert!(turn_angle(head_on, circular).abs() < 1e-6, "circular {circular} vs {head_on}");
    }
}

#[test]
fn test_detector_credits_matching_solvers() {
    let store = SnapshotStore::default();
    let arena = Arena::default();
    let ctx = AimContext { store: &store, arena: &arena };
    let me = snap("me", 400.0, 500.0, 0.0, 0.0, 0);
    let them = snap("a", 400.0, 100.0, 0.0, 0.0, 0);
    let mut wave = Wave::new(0, WaveOwner::Opponent, &me, &them, 2.0, 0);
    let shot = bullet("a", 400.0, 240.0, 0.0, 2.0, 10);

    let mut detector = AimDetector::default();
    assert!(detector.record(&wave, &shot, &ctx));
    let scores = detector.scores("a");
    assert_eq!((scores.head_on, scores.linear, scores.circular, scores.samples), (1, 1, 1, 1));
    assert_eq!(detector.likely_kind("a"), TargetingKind::HeadOn);
    assert!(detector.predicted_factor_angle(&wave, &ctx).abs() < 1e-9);

    wave.shadows.push(BulletShadow { ccw: -0.1, cw: 0.1 });
    assert!(!detector.record(&wave, &shot, &ctx), "shadowed projectiles are not credited");
    assert_eq!(detector.scores("a").samples, 1);
}

// ---- Drive prediction ----

#[test]
fn test_advance_reverses_instead_of_turning_around() {
    let state = DriveState {
        position: Point::new(400.0, 300.0),
        heading: 0.0,
        velocity: 0.0,
        tick: 0,
    };
    let next = advance(state, PI, 8.0);
    assert!(next.heading.abs() < 1e-9, "heading should stay put, got {}", next.heading);
    assert_eq!(next.velocity, -1.0);
    assert!((next.position.y - 299.0).abs() < 1e-9);
}

#[test]
fn test_advance_limits_turn_and_braking() {
    let state = DriveState {
        position: Point::new(400.0, 300.0),
        heading: 0.0,
        velocity: 8.0,
        tick: 0,
    };
    let turned = advance(state, 45f64.to_radians(), 8.0);
    assert!((turned.heading - 4f64.to_radians()).abs() < 1e-9, "turn rate at full speed is 4°");

    let braked = advance(state, 0.0, 0.0);
    assert_eq!(braked.velocity, 6.0, "deceleration is 2 per tick");
    let sped = advance(braked, 0.0, 8.0);
    assert_eq!(sped.velocity, 7.0, "acceleration is 1 per tick");
}

#[test]
fn test_should_stop_near_wall() {
    let predictor = predictor();
    let heading_north = 0.0;
    let near_wall = DriveState {
        position: Point::new(400.0, 570.0),
        heading: heading_north,
        velocity: 8.0,
        tick: 0,
    };
    assert!(predictor.should_stop(near_wall, heading_north, 8.0));

    let centre = DriveState {
        position: Point::new(400.0, 300.0),
        ..near_wall
    };
    assert!(!predictor.should_stop(centre, heading_north, 8.0));
}

#[test]
fn test_should_stop_outside_region_heading_inward() {
    let predictor = predictor();
    // Between the drive region edge (582) and the wall hard limit (585).
    let outside = DriveState {
        position: Point::new(400.0, 584.0),
        heading: PI,
        velocity: 0.0,
        tick: 0,
    };
    assert!(!predictor.should_stop(outside, PI, 8.0), "heading back in needs no stop");
    assert!(!predictor.should_stop(DriveState { velocity: 8.0, ..outside }, PI, 8.0));

    let outward = DriveState {
        heading: 0.0,
        velocity: 8.0,
        ..outside
    };
    assert!(predictor.should_stop(outward, 0.0, 8.0));
}

#[test]
fn test_should_stop_for_wave_compares_both_branches() {
    let predictor = predictor();
    let defender = snap("d", 400.0, 300.0, 90.0, 8.0, 0);
    let attacker = snap("a", 400.0, 100.0, 0.0, 0.0, 0);
    let wave = Wave::new(0, WaveOwner::Opponent, &defender, &attacker, 3.0, 0);
    let state = DriveState::from(&defender);
    let east = FRAC_PI_2;

    assert!(predictor.should_stop_for_wave(&wave, 0.0, state, east, 8.0));
    assert!(!predictor.should_stop_for_wave(&wave, 0.3, state, east, 8.0));
}

#[test]
fn test_predict_until_stops_when_wave_arrives() {
    let predictor = predictor();
    let defender = snap("d", 400.0, 300.0, 90.0, 0.0, 0);
    let attacker = snap("a", 400.0, 100.0, 0.0, 0.0, 0);
    let wave = Wave::new(0, WaveOwner::Opponent, &defender, &attacker, 3.0, 0);

    let prediction = predictor.predict_path_until(&wave, DriveState::from(&defender), FRAC_PI_2, 8.0);
    assert!(wave.time_until_hit(&prediction.state.position, prediction.state.tick) <= 0);
    assert_eq!(prediction.path.len() as u64, prediction.state.tick + 1);
    assert!(prediction.state.position.x > 400.0, "moved east");
}

// ---- Opponent fire inference ----

#[test]
fn test_energy_drop_infers_a_shot() {
    let mut watcher = GunWatcher::new();
    let scan = |energy: f64, tick: u64| Snapshot::new("a", Point::new(100.0, 100.0), 0.0, 0.0, 0.0, energy, tick);

    assert!(watcher.on_scan(&scan(100.0, 10)).is_none());
    let shot = watcher.on_scan(&scan(98.0, 11)).expect("power 2 shot");
    assert!((shot.power - 2.0).abs() < 1e-9);
    assert_eq!(shot.fire_tick, 10);
    assert!(watcher.on_scan(&scan(96.0, 12)).is_none(), "gun still hot");
}

#[test]
fn test_energy_we_explain_is_not_a_shot() {
    let mut watcher = GunWatcher::new();
    let scan = |name: &str, energy: f64, tick: u64| {
        Snapshot::new(name, Point::new(100.0, 100.0), 0.0, 0.0, 0.0, energy, tick)
    };

    watcher.on_scan(&scan("a", 100.0, 10));
    watcher.on_bullet_hit("a", 1.0);
    assert!(watcher.on_scan(&scan("a", 96.0, 11)).is_none(), "drop explained by our hit");

    watcher.on_scan(&scan("b", 100.0, 12));
    assert!(watcher.on_scan(&scan("a", 94.0, 13)).is_none(), "scans of a were not consecutive");
}

// ---- Hit statistics ----

#[test]
fn test_threat_weights_follow_recent_hits() {
    let mut stats = HitStats::new();
    assert_eq!(stats.threat_weight("a"), 1.0);

    for _ in 0..3 {
        stats.record_hit_taken("a", 1.0);
    }
    stats.record_hit_taken("b", 1.0);
    assert!((stats.threat_weight("a") - 0.8125).abs() < 1e-9);
    assert!((stats.threat_weight("b") - 0.4375).abs() < 1e-9);
    assert!((stats.threat_weight("c") - 0.25).abs() < 1e-9);

    stats.on_death("a");
    assert_eq!(stats.threat_weight("b"), 1.0);
    assert_eq!(stats.opponent("a").hits_taken, 3, "totals survive death");
}

// ---- Strategies ----

#[test]
fn test_targeting_gun_aims_then_fires() {
    let config = AgentConfig::default();
    let arena = Arena::default();
    let waves = WaveHistory::new(&config, arena);
    let stats = HitStats::new();
    let detector = AimDetector::default();
    let mut store = SnapshotStore::default();
    store.set_self_name("me");
    let mut gun = TargetingGun::with_default_solvers(
        "targeting",
        CircularSolver::default(),
        PowerSelector::default(),
    );

    let mut state = SelfState {
        name: "me".to_string(),
        position: Point::new(400.0, 100.0),
        heading: 0.0,
        velocity: 0.0,
        energy: 100.0,
        gun_heat: 0.0,
        gun_heading: 0.3,
        radar_heading: 0.0,
        tick: 10,
        arena,
        others: 1,
    };

    let mut decisions = Vec::new();
    for tick in 10..=11 {
        state.tick = tick;
        let me = snap("me", 400.0, 100.0, 0.0, 0.0, tick);
        store.record(me.clone()).unwrap();
        store.record(snap("t", 400.0, 500.0, 0.0, 0.0, tick)).unwrap();
        let target = store.latest("t").unwrap().clone();
        let view = TickView {
            state: &state,
            me: &me,
            store: &store,
            waves: &waves,
            stats: &stats,
            detector: &detector,
            config: &config,
        };
        let decision = gun.engage(&view, &target);
        state.gun_heading = (state.gun_heading + decision.command.turn).rem_euclid(2.0 * PI);
        decisions.push(decision);
    }

    assert!(decisions[0].shot.is_none());
    assert!((decisions[0].command.turn + 0.3).abs() < 1e-9, "turns onto the aim");

    let shot = decisions[1].shot.as_ref().expect("fires on the scheduled tick");
    assert_eq!(shot.gun, "linear", "circular has no turn circle for a still target");
    assert!(shot.aim.abs() < 1e-9);
    assert!((shot.power - 1.06875).abs() < 1e-9, "distance-scaled power, got {}", shot.power);
    assert_eq!(decisions[1].command.fire_power, Some(shot.power));
    let virtual_guns: Vec<&str> = shot.virtual_aims.iter().map(|(g, _)| g.as_str()).collect();
    assert_eq!(virtual_guns, vec!["head-on"]);
}

#[test]
fn test_default_chain_partial_overrides() {
    let config = AgentConfig::default();
    let chain = default_chain(&config);
    assert_eq!(chain.len(), 3);

    let duel_behind = ScenarioContext {
        tick: 1,
        others: 1,
        my_energy: 50.0,
        max_opponent_energy: Some(80.0),
    };
    let slots = chain.resolve(&duel_behind);
    assert_eq!((slots.sensor, slots.movement, slots.weapon), (Some(2), Some(0), Some(2)));

    let melee_ahead = ScenarioContext {
        tick: 1,
        others: 3,
        my_energy: 100.0,
        max_opponent_energy: Some(80.0),
    };
    let slots = chain.resolve(&melee_ahead);
    assert_eq!((slots.sensor, slots.movement, slots.weapon), (Some(2), Some(2), Some(1)));
    assert_eq!(chain.label(1), Some("stronger"));
}

// ---- Agent engine ----

fn self_state(tick: u64) -> SelfState {
    SelfState {
        name: "me".to_string(),
        position: Point::new(400.0, 100.0),
        heading: 0.0,
        velocity: 0.0,
        energy: 100.0,
        gun_heat: 0.0,
        gun_heading: 0.0,
        radar_heading: 0.0,
        tick,
        arena: Arena::default(),
        others: 1,
    }
}

fn scan_a(energy: f64, tick: u64) -> Notification {
    Notification::Scanned(ScanObservation {
        name: "a".to_string(),
        bearing: 0.0,
        distance: 300.0,
        heading: FRAC_PI_2,
        velocity: 0.0,
        energy,
        tick,
    })
}

#[test]
fn test_engine_tracks_fires_and_infers_shots() {
    let mut engine = AgentEngine::new(AgentConfig::default(), Arena::default());
    engine.begin_round(0);

    engine.queue_notification(scan_a(100.0, 1));
    let first = engine.tick(&self_state(1));
    assert!(first.drive.is_some() && first.gun.is_some() && first.sensor.is_some());
    let a = engine.store().latest("a").expect("scan recorded");
    assert!(a.position.distance_to(&Point::new(400.0, 400.0)) < 1e-9);

    engine.queue_notification(scan_a(98.0, 2));
    let second = engine.tick(&self_state(2));
    assert_eq!(engine.waves().waves_of(WaveOwner::Opponent).count(), 1, "energy drop became a wave");
    let fired = second.gun.and_then(|g| g.fire_power);
    assert!(fired.is_some(), "scheduled shot fired");
    assert_eq!(engine.waves().waves_of(WaveOwner::Mine).count(), 1);
    assert!(engine.waves().waves_of(WaveOwner::Virtual).count() >= 1);
    assert_eq!(engine.stats().opponent("a").shots_fired, 1);

    let summary = engine.end_round();
    assert!(summary.contains_key("a"));
    assert!(summary.contains_key(duelist_core::constants::COMMON_STATS_KEY));
}

#[test]
fn test_engine_abandons_round_on_bad_state() {
    let mut engine = AgentEngine::new(AgentConfig::default(), Arena::default());
    assert!(engine.tick(&self_state(1)).is_empty(), "no round started");

    engine.begin_round(0);
    let mut broken = self_state(1);
    broken.position = Point::new(f64::NAN, 100.0);
    assert!(engine.tick(&broken).is_empty());
    assert!(engine.is_abandoned());
    assert!(engine.tick(&self_state(2)).is_empty(), "abandoned rounds stay silent");

    engine.begin_round(1);
    let mut alone = self_state(1);
    alone.others = 0;
    let commands = engine.tick(&alone);
    assert!(commands.sensor.is_some(), "radar keeps searching");
    assert!(commands.gun.is_none(), "nothing to shoot at");
    assert_eq!(commands.drive.map(|d| d.speed), Some(0.0), "nothing to run from");
}

#[test]
fn test_engine_drops_malformed_scans() {
    let mut engine = AgentEngine::new(AgentConfig::default(), Arena::default());
    engine.begin_round(0);
    engine.queue_notification(Notification::Scanned(ScanObservation {
        name: "a".to_string(),
        bearing: f64::NAN,
        distance: 300.0,
        heading: 0.0,
        velocity: 0.0,
        energy: 100.0,
        tick: 1,
    }));
    let commands = engine.tick(&self_state(1));
    assert!(!commands.is_empty());
    assert!(engine.is_round_active());
    assert!(engine.store().latest("a").is_none());
}
