// Round lifecycle, scoring and power-up behaviour, driven with explicit
// timestamps so everything runs natively under `cargo test`.

use whack_a_mole::{Difficulty, Engine, GameConfig, GameEvent, MemoryStore, PowerUpKind};

fn quiet_engine() -> Engine<MemoryStore> {
    let config = GameConfig {
        powerup_chance: 0.0,
        ..GameConfig::default()
    };
    Engine::with_seed(config, MemoryStore::new(), 42).unwrap()
}

/// Advance in 100ms steps until a target shows up, then hit it.
fn hit_next_target(e: &mut Engine<MemoryStore>, now: &mut f64) -> usize {
    loop {
        assert!(e.is_running(), "round ended before a target appeared");
        *now += 100.0;
        e.tick(*now);
        if let Some(slot) = e.active_slot() {
            assert!(e.register_hit(slot, *now));
            return slot;
        }
    }
}

#[test]
fn normal_hit_scores_two_and_builds_streak() {
    let mut e = quiet_engine();
    let mut now = 0.0;
    e.start_round(Difficulty::Normal, now);
    let slot = hit_next_target(&mut e, &mut now);
    assert_eq!(e.state().score, 2);
    assert_eq!(e.state().streak, 1);
    assert_eq!(e.hit_slot(), Some(slot));
    assert_eq!(e.active_slot(), None);
}

#[test]
fn double_points_on_hard_adds_six() {
    let mut e = quiet_engine();
    let mut now = 0.0;
    e.start_round(Difficulty::Hard, now);
    e.activate_power_up(PowerUpKind::DoublePoints, now);
    hit_next_target(&mut e, &mut now);
    assert_eq!(e.state().score, 6);
}

#[test]
fn extra_time_is_instant_and_leaves_no_active_power_up() {
    let mut e = quiet_engine();
    e.start_round(Difficulty::Normal, 0.0);
    e.tick(20_000.0);
    assert_eq!(e.state().time_left, 10);

    e.activate_power_up(PowerUpKind::DoublePoints, 20_000.0);
    assert!(e.activate_power_up(PowerUpKind::ExtraTime, 20_000.0));
    assert_eq!(e.state().time_left, 15);
    assert_eq!(e.state().active_power_up, None);
}

#[test]
fn extra_time_cancels_the_pending_clear_of_the_replaced_power_up() {
    let mut e = quiet_engine();
    e.start_round(Difficulty::Normal, 0.0);
    e.activate_power_up(PowerUpKind::SlowMotion, 0.0);
    e.activate_power_up(PowerUpKind::ExtraTime, 1000.0);
    e.drain_events();
    e.tick(6000.0);
    assert!(
        !e.drain_events()
            .iter()
            .any(|ev| matches!(ev, GameEvent::PowerUpExpired { .. }))
    );
}

#[test]
fn miss_changes_nothing() {
    let mut e = quiet_engine();
    e.start_round(Difficulty::Normal, 0.0);
    e.tick(800.0);
    let active = e.active_slot().unwrap();
    let before = e.state().clone();

    assert!(!e.register_hit((active + 1) % 9, 810.0));
    assert!(!e.register_hit(99, 820.0));
    assert_eq!(*e.state(), before);
    assert_eq!(e.active_slot(), Some(active));
    assert_eq!(e.hit_slot(), None);
}

#[test]
fn hitting_while_idle_is_a_no_op() {
    let mut e = quiet_engine();
    for slot in 0..9 {
        assert!(!e.register_hit(slot, 0.0));
    }
    assert_eq!(e.state().score, 0);
}

#[test]
fn abandoned_target_is_replaced_without_penalty() {
    let mut e = quiet_engine();
    e.start_round(Difficulty::Easy, 0.0);
    e.tick(1200.0);
    assert!(e.active_slot().is_some());
    e.tick(2400.0);
    assert!(e.active_slot().is_some());
    assert_eq!(e.state().score, 0);
    assert_eq!(e.state().streak, 0);
}

#[test]
fn score_only_grows_and_only_on_matching_hits() {
    let mut e = quiet_engine();
    e.start_round(Difficulty::Normal, 0.0);
    let mut now = 0.0;
    let mut last = 0;
    let mut guess = 0usize;
    while e.is_running() {
        now += 150.0;
        e.tick(now);
        let active = e.active_slot();
        let hit = e.register_hit(guess % 9, now);
        assert_eq!(hit, active == Some(guess % 9));
        let score = e.state().score;
        assert!(score >= last);
        if !hit {
            assert_eq!(score, last);
        }
        last = score;
        guess += 1;
    }
}

#[test]
fn countdown_ends_round_exactly_once_at_zero() {
    let mut e = quiet_engine();
    let mut now = 0.0;
    e.start_round(Difficulty::Normal, now);
    hit_next_target(&mut e, &mut now);

    e.tick(29_999.0);
    assert!(e.is_running());
    assert_eq!(e.state().time_left, 1);

    e.tick(30_000.0);
    assert!(!e.is_running());
    assert_eq!(e.state().time_left, 0);

    let frozen = e.state().clone();
    e.tick(120_000.0);
    for slot in 0..9 {
        assert!(!e.register_hit(slot, 120_000.0));
    }
    assert_eq!(*e.state(), frozen);
    assert_eq!(e.active_slot(), None);

    let ended = e
        .drain_events()
        .into_iter()
        .filter(|ev| matches!(ev, GameEvent::RoundEnded { .. }))
        .count();
    assert_eq!(ended, 1);
    assert_eq!(e.stats().total_games, 1);
}

#[test]
fn start_round_resets_everything_from_the_previous_round() {
    let mut e = quiet_engine();
    let mut now = 0.0;
    e.start_round(Difficulty::Hard, now);
    e.activate_power_up(PowerUpKind::SlowMotion, now);
    for _ in 0..3 {
        hit_next_target(&mut e, &mut now);
    }
    e.tick(now + 60_000.0);
    assert!(!e.is_running());

    assert!(e.start_round(Difficulty::Easy, 100_000.0));
    let state = e.state();
    assert_eq!(state.score, 0);
    assert_eq!(state.streak, 0);
    assert_eq!(state.time_left, 30);
    assert_eq!(state.active_power_up, None);
    assert_eq!(state.difficulty, Difficulty::Easy);
    assert_eq!(e.active_slot(), None);
    assert_eq!(e.hit_slot(), None);
}

#[test]
fn timers_of_an_old_round_do_not_leak_into_the_next() {
    let mut e = quiet_engine();
    let mut now = 0.0;
    e.start_round(Difficulty::Normal, now);
    e.activate_power_up(PowerUpKind::DoublePoints, 25_000.0);
    hit_next_target(&mut e, &mut now);
    e.tick(30_000.0);
    assert!(!e.is_running());

    // Only the new round's first activation may fire here.
    e.start_round(Difficulty::Normal, 30_100.0);
    e.drain_events();
    e.tick(30_900.0);
    let events = e.drain_events();
    assert_eq!(events.len(), 1);
    assert!(
        events
            .iter()
            .all(|ev| matches!(ev, GameEvent::TargetActivated { .. }))
    );
    assert_eq!(e.state().time_left, 30);
}

#[test]
fn snapshot_reflects_hit_feedback() {
    let mut e = quiet_engine();
    let mut now = 0.0;
    e.start_round(Difficulty::Normal, now);
    let slot = hit_next_target(&mut e, &mut now);
    let snap = e.snapshot();
    assert!(snap.is_running);
    assert!(snap.is_hit_showing);
    assert_eq!(snap.hit_slot, Some(slot));
    assert_eq!(snap.slot_count, 9);

    let json = serde_json::to_value(&snap).unwrap();
    assert_eq!(json["state"]["score"], 2);
    assert_eq!(json["isHitShowing"], true);
}
