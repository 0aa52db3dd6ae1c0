// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use masteryhub::commands::{Ctx, habits, mastery};
use masteryhub::config::AppConfig;
use masteryhub::metrics::habit_week;
use masteryhub::models::{MasteryHabit, Win};
use masteryhub::state::AppState;
use masteryhub::storage::MemoryStorage;
use masteryhub::store::Store;
use masteryhub::cli;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn at(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(10, 0, 0).unwrap()
}

fn win(id: &str, history: Vec<NaiveDate>) -> Win {
    Win {
        id: id.into(),
        label: "Deep work".into(),
        icon: "bolt".into(),
        completed: false,
        color: "blue".into(),
        streak: 0,
        custom_icon: None,
        completion_history: history,
    }
}

fn run(store: &mut Store, now: NaiveDateTime, args: &[&str]) -> anyhow::Result<()> {
    let storage = MemoryStorage::new();
    let config = AppConfig::default();
    let ctx = Ctx::new(&storage, &config, now);
    let mut argv = vec!["masteryhub"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("habit", m)) => habits::handle(store, &ctx, m),
        Some(("mastery", m)) => mastery::handle(store, &ctx, m),
        _ => panic!("command not parsed"),
    }
}

#[test]
fn toggling_today_extends_and_restores_the_streak() {
    let mut state = AppState::empty();
    state.wins = vec![win("w1", vec![d(2024, 1, 1), d(2024, 1, 2)])];
    let mut store = Store::new(state);
    let now = at(d(2024, 1, 3));

    run(&mut store, now, &["habit", "toggle", "--id", "w1"]).unwrap();
    let w = &store.state().wins[0];
    assert!(w.completed);
    assert_eq!(w.streak, 3);
    assert_eq!(w.completion_history.len(), 3);

    run(&mut store, now, &["habit", "toggle", "--id", " w1 "]).unwrap();
    let w = &store.state().wins[0];
    assert!(!w.completed);
    assert_eq!(w.streak, 2);
    assert_eq!(w.completion_history, vec![d(2024, 1, 1), d(2024, 1, 2)]);
}

#[test]
fn toggling_a_past_day_keeps_todays_streak() {
    let mut state = AppState::empty();
    state.wins = vec![win("w1", vec![d(2024, 1, 1)])];
    let mut store = Store::new(state);

    run(
        &mut store,
        at(d(2024, 1, 3)),
        &["habit", "toggle", "--id", "w1", "--date", "2024-01-02"],
    )
    .unwrap();
    let w = &store.state().wins[0];
    assert_eq!(w.completion_history, vec![d(2024, 1, 1), d(2024, 1, 2)]);
    // Today is still open, so the run ends yesterday.
    assert!(!w.completed);
    assert_eq!(w.streak, 2);
}

#[test]
fn backfilling_a_detached_day_leaves_today_alone() {
    let mut state = AppState::empty();
    state.wins = vec![win("w1", vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3)])];
    let mut store = Store::new(state);
    let now = at(d(2024, 1, 3));

    run(
        &mut store,
        now,
        &["habit", "toggle", "--id", "w1", "--date", "2023-12-25"],
    )
    .unwrap();
    let w = &store.state().wins[0];
    assert_eq!(w.completion_history.len(), 4);
    assert!(w.completed);
    assert_eq!(w.streak, 3);

    run(
        &mut store,
        now,
        &["habit", "toggle", "--id", "w1", "--date", "2024-01-02"],
    )
    .unwrap();
    let w = &store.state().wins[0];
    assert!(w.completed);
    assert_eq!(w.streak, 1);
    assert_eq!(
        w.completion_history,
        vec![d(2023, 12, 25), d(2024, 1, 1), d(2024, 1, 3)]
    );
}

#[test]
fn unknown_habit_is_an_error_and_changes_nothing() {
    let mut state = AppState::empty();
    state.wins = vec![win("w1", vec![])];
    let mut store = Store::new(state.clone());
    let err = run(&mut store, at(d(2024, 1, 3)), &["habit", "toggle", "--id", "nope"]);
    assert!(err.is_err());
    assert_eq!(store.state(), &state);
}

#[test]
fn add_rejects_blank_label() {
    let mut store = Store::new(AppState::empty());
    assert!(run(&mut store, at(d(2024, 1, 3)), &["habit", "add", "--label", "   "]).is_err());
    run(&mut store, at(d(2024, 1, 3)), &["habit", "add", "--label", "Walk"]).unwrap();
    assert_eq!(store.state().wins.len(), 1);
    assert_eq!(store.state().wins[0].label, "Walk");
    assert_eq!(store.state().wins[0].streak, 0);
}

#[test]
fn week_counts_completions_per_day() {
    // 2024-01-03 is a Wednesday; the week starts on Sunday 2023-12-31.
    let wins = vec![
        win("a", vec![d(2024, 1, 1), d(2024, 1, 2)]),
        win("b", vec![d(2024, 1, 2), d(2024, 1, 4)]),
    ];
    let (days, avg) = habit_week(&wins, d(2024, 1, 3));
    assert_eq!(days.len(), 7);
    assert_eq!(days[0].date, d(2023, 12, 31));
    assert_eq!(days[1].completed, 1);
    assert_eq!(days[2].completed, 2);
    assert_eq!(days[2].pct, 100.0);
    // Future days count as zero even when the history has them.
    assert_eq!(days[4].completed, 0);
    // (50 + 100) / 7 = 21.4
    assert_eq!(avg, 21);
}

#[test]
fn mastery_increment_wraps_after_total() {
    let mut state = AppState::empty();
    state.mastery_habits = vec![MasteryHabit {
        id: "m1".into(),
        label: "Scales".into(),
        icon: "music_note".into(),
        tags: vec![],
        progress: 1,
        total: 2,
        color: "amber".into(),
        subject: None,
        duration: None,
    }];
    let mut store = Store::new(state);
    let now = at(d(2024, 1, 3));

    run(&mut store, now, &["mastery", "inc", "--id", "m1"]).unwrap();
    assert_eq!(store.state().mastery_habits[0].progress, 2);
    run(&mut store, now, &["mastery", "inc", "--id", "m1"]).unwrap();
    assert_eq!(store.state().mastery_habits[0].progress, 0);
}
